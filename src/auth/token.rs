//! Issuing and verification of the signed access and refresh tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{auth::AuthError, models::UserID};

/// How long an access token stays valid after being issued.
pub const ACCESS_TOKEN_MINUTES: i64 = 15;

/// How long a refresh token stays valid after being issued.
pub const REFRESH_TOKEN_DAYS: i64 = 7;

/// The type tag carried in a token's payload.
///
/// Access tokens carry no type tag, only refresh tokens are tagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// The token is a refresh token.
    Refresh,
}

/// The contents of a JSON Web Token.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub id: UserID,
    /// The time the token was issued.
    pub iat: usize,
    /// The expiry time of the token.
    pub exp: usize,
    /// The type tag, present only on refresh tokens.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<TokenType>,
}

/// An access token and a refresh token issued together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// The short-lived token used to authenticate requests.
    pub access_token: String,
    /// The long-lived token used to obtain a new pair.
    pub refresh_token: String,
}

/// Issue a signed access token for `user_id`.
///
/// # Errors
/// Returns [AuthError::TokenCreation] if the token could not be signed.
pub fn issue_access_token(
    user_id: UserID,
    encoding_key: &EncodingKey,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        id: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(ACCESS_TOKEN_MINUTES)).timestamp() as usize,
        token_type: None,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::TokenCreation)
}

/// Issue a signed refresh token for `user_id`, tagged with the refresh type.
///
/// # Errors
/// Returns [AuthError::TokenCreation] if the token could not be signed.
pub fn issue_refresh_token(
    user_id: UserID,
    encoding_key: &EncodingKey,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = Claims {
        id: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(REFRESH_TOKEN_DAYS)).timestamp() as usize,
        token_type: Some(TokenType::Refresh),
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::TokenCreation)
}

/// Issue an access/refresh token pair for `user_id`.
///
/// # Errors
/// Returns [AuthError::TokenCreation] if either token could not be signed.
pub fn issue_pair(user_id: UserID, encoding_key: &EncodingKey) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: issue_access_token(user_id, encoding_key)?,
        refresh_token: issue_refresh_token(user_id, encoding_key)?,
    })
}

/// Verify the signature and expiry of an access token and return its claims.
///
/// # Errors
/// Returns [AuthError::ExpiredToken] if the token's expiry has passed, or
/// [AuthError::InvalidToken] for any other verification failure.
pub fn decode_access_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, AuthError> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|error| match error.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
}

/// Verify a refresh token and return its claims.
///
/// On top of the signature and expiry checks, the token's type tag must mark
/// it as a refresh token. Access tokens are rejected here.
///
/// # Errors
/// Returns [AuthError::InvalidRefreshToken] for any verification failure.
pub fn decode_refresh_token(
    token: &str,
    decoding_key: &DecodingKey,
) -> Result<Claims, AuthError> {
    let claims = decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|token_data| token_data.claims)
        .map_err(|_| AuthError::InvalidRefreshToken)?;

    if claims.token_type != Some(TokenType::Refresh) {
        return Err(AuthError::InvalidRefreshToken);
    }

    Ok(claims)
}
