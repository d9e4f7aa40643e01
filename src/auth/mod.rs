//! Request authentication: bearer-token verification, the token blacklist,
//! and the extractor that resolves a token to a user.

use axum::{
    Json, RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use serde_json::json;

use crate::{AppState, models::User};

mod blacklist;
pub mod token;

pub use blacklist::{BLACKLIST_TTL_SECONDS, TokenBlacklist};

/// The ways a request can fail authentication.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AuthError {
    /// The bearer header was missing or the token failed verification.
    #[error("the access token is invalid")]
    InvalidToken,

    /// The access token's expiry time has passed.
    #[error("the access token has expired")]
    ExpiredToken,

    /// The access token was revoked by a logout.
    #[error("the access token has been blacklisted")]
    Blacklisted,

    /// The refresh token failed verification or is not a refresh token.
    #[error("the refresh token is invalid")]
    InvalidRefreshToken,

    /// The user the token was issued to no longer exists.
    #[error("the token does not belong to a known user")]
    UserNotFound,

    /// A token could not be signed.
    #[error("a token could not be created")]
    TokenCreation,

    /// An unexpected error occurred while resolving the user.
    #[error("an internal error occurred during authentication")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid access token"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Access token expired"),
            AuthError::Blacklisted => (StatusCode::UNAUTHORIZED, "Access token blacklisted"),
            AuthError::InvalidRefreshToken => {
                (StatusCode::UNAUTHORIZED, "Invalid refresh token")
            }
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, "No user found"),
            AuthError::TokenCreation => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error")
            }
            AuthError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// The user resolved from the request's bearer token.
///
/// Using this extractor in a handler makes the route require authentication:
/// the token is verified, the user it was issued to is loaded, and the
/// blacklist is consulted. `token` is the raw bearer token, kept around so
/// the logout handler can blacklist it.
pub struct AuthenticatedUser {
    /// The user the access token was issued to.
    pub user: User,
    /// The raw access token from the request header.
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let state = AppState::from_ref(state);
        let claims = token::decode_access_token(bearer.token(), state.decoding_key())?;

        let connection = state.db_connection().lock().unwrap();

        let user = User::select_by_id(claims.id, &connection)
            .map_err(|error| {
                tracing::error!("Error resolving user from token: {error}");
                AuthError::Internal
            })?
            .ok_or(AuthError::UserNotFound)?;

        if TokenBlacklist::contains(bearer.token(), &connection).map_err(|error| {
            tracing::error!("Error checking the token blacklist: {error}");
            AuthError::Internal
        })? {
            return Err(AuthError::Blacklisted);
        }

        Ok(AuthenticatedUser {
            user,
            token: bearer.token().to_owned(),
        })
    }
}
