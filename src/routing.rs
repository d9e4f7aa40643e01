//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};

use crate::{
    AppState, endpoints,
    logging::logging_middleware,
    routes::{transaction, user},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::REGISTER, post(user::register))
        .route(endpoints::LOG_IN, post(user::log_in))
        .route(endpoints::REFRESH, post(user::refresh))
        .route(endpoints::PROFILE, get(user::profile))
        .route(endpoints::LOG_OUT, get(user::log_out))
        .route(
            endpoints::TRANSACTIONS,
            get(transaction::get_all).post(transaction::create),
        )
        .route(
            endpoints::TRANSACTION,
            patch(transaction::update).delete(transaction::delete),
        )
        .route(
            endpoints::TRANSACTIONS_BY_MONTH,
            get(transaction::filter_by_month),
        )
        .route(endpoints::CATEGORY_TOTALS, get(transaction::category_totals))
        .route(
            endpoints::CATEGORY_TOTALS_BY_MONTH,
            get(transaction::category_totals_by_month),
        )
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
