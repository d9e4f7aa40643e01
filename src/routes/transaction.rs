//! Route handlers for creating, listing, filtering, updating, and deleting
//! transactions, and for the per-category totals.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState, Error,
    aggregation::{self, CategorySummary},
    auth::AuthenticatedUser,
    category, date,
    models::{DatabaseID, NewTransaction, Transaction, TransactionChanges},
};

/// The request body for creating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionBody {
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
    is_income: Option<bool>,
    comment: Option<String>,
}

/// The request body for partially updating a transaction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTransactionBody {
    amount: Option<f64>,
    category: Option<String>,
    date: Option<String>,
    is_income: Option<bool>,
    comment: Option<String>,
}

/// Handler for listing all of the caller's transactions.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub async fn get_all(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = state.db_connection().lock().unwrap();

    let transactions = Transaction::select_by_user(user.id(), &connection)?;

    Ok(Json(transactions))
}

/// Handler for creating a new transaction owned by the caller.
///
/// The date and income flag are required. Income transactions are stored in
/// the synthetic income category no matter which category the client sent.
///
/// # Errors
/// This function will return an error if a required field is missing, the
/// amount is not positive, the date does not match an accepted format, or
/// the category is not in the catalog.
pub async fn create(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    Json(body): Json<CreateTransactionBody>,
) -> Result<impl IntoResponse, Error> {
    let (Some(date), Some(is_income), Some(amount)) = (body.date, body.is_income, body.amount)
    else {
        return Err(Error::MissingRequiredFields);
    };

    if amount <= 0.0 {
        return Err(Error::NonPositiveAmount);
    }

    let date = date::canonicalize(&date)?;

    let final_category = if is_income {
        category::INCOME.to_string()
    } else {
        body.category.unwrap_or_default()
    };

    if !category::is_valid(&final_category) {
        return Err(Error::InvalidCategory);
    }

    let connection = state.db_connection().lock().unwrap();

    let transaction = NewTransaction {
        amount,
        category: final_category,
        date,
        is_income,
        comment: body.comment,
        user_id: user.id(),
    }
    .insert(&connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Handler for partially updating one of the caller's transactions.
///
/// Only the supplied fields are replaced. A supplied date or category is
/// validated the same way as during creation.
///
/// # Errors
/// This function will return an error if the ID is malformed, the
/// transaction does not exist, the caller does not own it, or a supplied
/// date/category is invalid.
pub async fn update(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateTransactionBody>,
) -> Result<Json<Transaction>, Error> {
    let id: DatabaseID = id.parse().map_err(|_| Error::InvalidTransactionId)?;

    let connection = state.db_connection().lock().unwrap();

    let transaction = Transaction::select(id, &connection)?.ok_or(Error::TransactionNotFound)?;

    if transaction.user_id() != user.id() {
        return Err(Error::NotOwner);
    }

    let date = body.date.map(|raw| date::canonicalize(&raw)).transpose()?;

    let is_income = body.is_income.unwrap_or(transaction.is_income());

    if let Some(ref category) = body.category {
        if !is_income && !category::is_valid(category) {
            return Err(Error::InvalidCategory);
        }
    }

    let updated = transaction.merge(TransactionChanges {
        amount: body.amount,
        category: body.category,
        date,
        is_income: body.is_income,
        comment: body.comment,
    });
    updated.update(&connection)?;

    Ok(Json(updated))
}

/// Handler for deleting one of the caller's transactions.
///
/// # Errors
/// This function will return an error if the ID is malformed, the
/// transaction does not exist, or the caller does not own it.
pub async fn delete(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let id: DatabaseID = id.parse().map_err(|_| Error::InvalidTransactionId)?;

    let connection = state.db_connection().lock().unwrap();

    let transaction = Transaction::select(id, &connection)?.ok_or(Error::TransactionNotFound)?;

    if transaction.user_id() != user.id() {
        return Err(Error::NotOwner);
    }

    Transaction::delete(id, &connection)?;

    Ok(Json(json!({
        "message": "Transaction removed",
    })))
}

/// Handler for listing the caller's transactions for a given month and year.
///
/// # Errors
/// This function will return an error if the month or year cannot be parsed.
pub async fn filter_by_month(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let month: u32 = month.parse().map_err(|_| Error::InvalidMonthOrYear)?;
    let year: i32 = year.parse().map_err(|_| Error::InvalidMonthOrYear)?;

    let connection = state.db_connection().lock().unwrap();

    let transactions = Transaction::select_by_month(user.id(), month, year, &connection)?;

    Ok(Json(transactions))
}

/// Handler for the caller's per-category totals over all transactions.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub async fn category_totals(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
) -> Result<Json<CategorySummary>, Error> {
    let connection = state.db_connection().lock().unwrap();

    let transactions = Transaction::select_by_user(user.id(), &connection)?;

    Ok(Json(aggregation::summarize(&transactions)))
}

/// Handler for the caller's per-category totals scoped to a month and year.
///
/// # Errors
/// This function will return an error if the month or year cannot be parsed.
pub async fn category_totals_by_month(
    State(state): State<AppState>,
    AuthenticatedUser { user, .. }: AuthenticatedUser,
    Path((month, year)): Path<(String, String)>,
) -> Result<Json<CategorySummary>, Error> {
    let month: u32 = month.parse().map_err(|_| Error::InvalidMonthOrYear)?;
    let year: i32 = year.parse().map_err(|_| Error::InvalidMonthOrYear)?;

    let connection = state.db_connection().lock().unwrap();

    let transactions = Transaction::select_by_month(user.id(), month, year, &connection)?;

    Ok(Json(aggregation::summarize(&transactions)))
}
