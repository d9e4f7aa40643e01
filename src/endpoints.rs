//! The API endpoint URIs.

/// The route for registering a new user.
pub const REGISTER: &str = "/users/register";
/// The route for signing in a user.
pub const LOG_IN: &str = "/users/login";
/// The route for exchanging a refresh token for a new token pair.
pub const REFRESH: &str = "/users/refresh";
/// The route for getting the signed-in user's profile.
pub const PROFILE: &str = "/users/profile";
/// The route for logging out the signed-in user.
pub const LOG_OUT: &str = "/users/logout";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/transactions/{id}";
/// The route to list transactions for a month and year.
///
/// The router allows only one parameter name per path position, so the first
/// segment reuses the name of the sibling route. The handler reads it as the
/// month.
pub const TRANSACTIONS_BY_MONTH: &str = "/transactions/{id}/{year}";
/// The route for per-category totals over all transactions.
pub const CATEGORY_TOTALS: &str = "/transactions/categories/totals";
/// The route for per-category totals scoped to a month and year.
pub const CATEGORY_TOTALS_BY_MONTH: &str = "/transactions/categories/{month}/{year}";
