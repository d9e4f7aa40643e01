//! Moneta is a REST API for managing personal income and expenses.
//!
//! Users register and authenticate with JSON Web Tokens, then create, list,
//! filter, update, and delete transactions, and retrieve per-category totals.
//! The API serves and accepts JSON and is backed by a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod aggregation;
mod app_state;
pub mod auth;
pub mod category;
pub mod date;
pub mod db;
mod endpoints;
mod logging;
pub mod models;
mod routes;
mod routing;

pub use app_state::AppState;
pub use routing::build_router;

use crate::auth::AuthError;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The name field was missing or blank during registration.
    #[error("a name is required to register")]
    MissingName,

    /// The string used to create a user was not a valid email address.
    #[error("invalid email address")]
    InvalidEmail,

    /// The password used to create a user was shorter than the minimum length.
    #[error("password is too short")]
    PasswordTooShort,

    /// The email used to create a user is already in use. The client should
    /// try again with a different email address.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The email/password combination did not match a registered user.
    ///
    /// The client is given no indication of which part was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A transaction was created without one of its required fields.
    #[error("a required field is missing")]
    MissingRequiredFields,

    /// A transaction was created with a zero or negative amount.
    #[error("the amount must be a positive number")]
    NonPositiveAmount,

    /// A date string did not match any of the accepted formats.
    #[error("the date does not match an accepted format")]
    InvalidDate,

    /// A category name that is not part of the category catalog.
    #[error("the category is not in the catalog")]
    InvalidCategory,

    /// The transaction ID in the request path could not be parsed.
    #[error("the transaction ID could not be parsed")]
    InvalidTransactionId,

    /// The month or year in the request path could not be parsed.
    #[error("the month or year could not be parsed")]
    InvalidMonthOrYear,

    /// There was no transaction in the database with the given ID.
    #[error("a transaction with the given ID could not be found")]
    TransactionNotFound,

    /// There was no user in the database with the given details.
    #[error("no user found with the given details")]
    UserNotFound,

    /// A transaction was accessed by a user other than its owner.
    #[error("the transaction belongs to another user")]
    NotOwner,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server,
    /// clients get a generic internal error message instead.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An error raised by the authentication layer.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("email") =>
            {
                Error::DuplicateEmail
            }
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            Error::MissingName => (StatusCode::BAD_REQUEST, "Name is required"),
            Error::InvalidEmail => (StatusCode::BAD_REQUEST, "Invalid email format"),
            Error::PasswordTooShort => (
                StatusCode::BAD_REQUEST,
                "Password must be at least 6 characters",
            ),
            Error::DuplicateEmail => (StatusCode::CONFLICT, "Email is already in use"),
            Error::InvalidCredentials => (StatusCode::BAD_REQUEST, "Invalid credentials"),
            Error::MissingRequiredFields => (
                StatusCode::BAD_REQUEST,
                "Please provide all required fields",
            ),
            Error::NonPositiveAmount => (StatusCode::BAD_REQUEST, "The amount must be positive"),
            Error::InvalidDate => (StatusCode::BAD_REQUEST, "Invalid date format"),
            Error::InvalidCategory => (
                StatusCode::BAD_REQUEST,
                "Invalid category provided. Please choose a valid category.",
            ),
            Error::InvalidTransactionId => {
                (StatusCode::BAD_REQUEST, "Invalid transaction ID format")
            }
            Error::InvalidMonthOrYear => (StatusCode::BAD_REQUEST, "Invalid month or year format"),
            Error::TransactionNotFound => (
                StatusCode::NOT_FOUND,
                "Transaction not found or already deleted",
            ),
            Error::UserNotFound => (StatusCode::NOT_FOUND, "No user found"),
            Error::NotOwner => (StatusCode::UNAUTHORIZED, "Not authorized"),
            Error::Auth(auth_error) => return auth_error.into_response(),
            Error::HashingError(_) | Error::SqlError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
