//! Route handlers for registration, sign-in, and the token lifecycle.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    AppState, Error,
    auth::{AuthError, AuthenticatedUser, TokenBlacklist, token, token::TokenPair},
    models::{PasswordHash, User, ValidatedPassword},
};

/// The request body for registering a new user.
#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

/// The request body for signing in.
#[derive(Debug, Deserialize)]
pub struct LogInBody {
    email: Option<String>,
    password: Option<String>,
}

/// The request body for refreshing a token pair.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshBody {
    refresh_token: Option<String>,
}

/// The public view of a user, as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
    /// The display name the user registered with.
    pub name: String,
    /// The user's email address.
    pub email: String,
}

/// The response to a successful registration or sign-in.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The short-lived token used to authenticate requests.
    pub access_token: String,
    /// The long-lived token used to obtain a new token pair.
    pub refresh_token: String,
    /// The user the tokens were issued to.
    pub user: UserBody,
}

impl AuthResponse {
    fn new(tokens: TokenPair, user: &User) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: UserBody {
                name: user.name().to_string(),
                email: user.email().to_string(),
            },
        }
    }
}

/// Handler for registering a new user.
///
/// # Errors
/// This function will return an error if the name is blank, the email is
/// invalid or already in use, or the password is too short.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, Error> {
    let name = body
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or(Error::MissingName)?;

    let email: EmailAddress = body
        .email
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| Error::InvalidEmail)?;

    let password = ValidatedPassword::new(body.password.as_deref().unwrap_or_default())?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let connection = state.db_connection().lock().unwrap();

    let mut user = User::build(name, email, password_hash).insert(&connection)?;

    let tokens = token::issue_pair(user.id(), state.encoding_key())?;
    user.set_refresh_token(Some(tokens.refresh_token.clone()), &connection)?;

    Ok((StatusCode::CREATED, Json(AuthResponse::new(tokens, &user))))
}

/// Handler for sign-in requests.
///
/// The client gets the same error whether the email is unknown or the
/// password is wrong.
///
/// # Errors
/// This function will return [Error::InvalidCredentials] on any credential
/// mismatch.
pub async fn log_in(
    State(state): State<AppState>,
    Json(body): Json<LogInBody>,
) -> Result<Json<AuthResponse>, Error> {
    let email: EmailAddress = body
        .email
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| Error::InvalidCredentials)?;
    let password = body.password.ok_or(Error::InvalidCredentials)?;

    let connection = state.db_connection().lock().unwrap();

    let mut user =
        User::select_by_email(&email, &connection)?.ok_or(Error::InvalidCredentials)?;

    let password_is_correct = user
        .password_hash()
        .verify(&password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !password_is_correct {
        return Err(Error::InvalidCredentials);
    }

    let tokens = token::issue_pair(user.id(), state.encoding_key())?;
    user.set_refresh_token(Some(tokens.refresh_token.clone()), &connection)?;

    Ok(Json(AuthResponse::new(tokens, &user)))
}

/// Handler for exchanging a refresh token for a new token pair.
///
/// The presented token must verify, carry the refresh type tag, not be
/// blacklisted, and belong to an existing user. The new refresh token
/// replaces the one stored on the user record.
///
/// # Errors
/// This function will return an error if any of the above checks fail.
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<TokenPair>, Error> {
    let refresh_token = body.refresh_token.ok_or(AuthError::InvalidRefreshToken)?;

    let claims = token::decode_refresh_token(&refresh_token, state.decoding_key())?;

    let connection = state.db_connection().lock().unwrap();

    if TokenBlacklist::contains(&refresh_token, &connection)? {
        return Err(Error::Auth(AuthError::Blacklisted));
    }

    let mut user = User::select_by_id(claims.id, &connection)?.ok_or(AuthError::UserNotFound)?;

    let tokens = token::issue_pair(user.id(), state.encoding_key())?;
    user.set_refresh_token(Some(tokens.refresh_token.clone()), &connection)?;

    Ok(Json(tokens))
}

/// Handler for getting the signed-in user's profile.
pub async fn profile(authenticated: AuthenticatedUser) -> Json<UserBody> {
    Json(UserBody {
        name: authenticated.user.name().to_string(),
        email: authenticated.user.email().to_string(),
    })
}

/// Handler for logging out the signed-in user.
///
/// The current access token is blacklisted so it cannot be used again, even
/// before its natural expiry.
///
/// # Errors
/// This function will return an error if the blacklist cannot be updated.
pub async fn log_out(
    State(state): State<AppState>,
    authenticated: AuthenticatedUser,
) -> Result<impl IntoResponse, Error> {
    let connection = state.db_connection().lock().unwrap();

    TokenBlacklist::insert(&authenticated.token, &connection)?;

    Ok(Json(json!({
        "message": "User logged out successfully",
    })))
}
