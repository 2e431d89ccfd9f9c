use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;

/// Returned in place of a rotated token until refresh semantics exist.
pub const PLACEHOLDER_TOKEN: &str = "new_token_here";

// TODO: issue a rotated token via auth::Authenticator once refresh/revocation rules are defined.
pub async fn refresh_token(
    payload: Result<Json<RefreshTokenRequest>, JsonRejection>,
) -> Result<ApiSuccess<RefreshTokenResponseData>, ApiError> {
    payload
        .ok()
        .and_then(|Json(body)| body.token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Token must not be empty".to_string()))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        RefreshTokenResponseData {
            message: "Token refreshed".to_string(),
            token: PLACEHOLDER_TOKEN.to_string(),
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshTokenRequest {
    token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshTokenResponseData {
    pub message: String,
    pub token: String,
}
