use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::register::SessionResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::Field;
use super::ValidationErrors;
use super::INVALID_CREDENTIALS_MESSAGE;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

pub async fn login<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .auth_service
        .login_user(body.try_into_command()?)
        .await
        .map_err(|e| match e {
            // Unknown email and wrong password are indistinguishable to the caller
            UserError::NotFound(_) | UserError::InvalidCredentials => {
                ApiError::BadRequest(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            _ => ApiError::from(e),
        })
        .map(|ref session| {
            ApiSuccess::new(
                StatusCode::OK,
                SessionResponseData::new("Login successful", session),
            )
        })
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    email: Field,
    password: Field,
}

impl LoginRequest {
    fn try_into_command(self) -> Result<LoginCommand, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = errors.required("email", self.email, EmailAddress::new);
        let password = errors.required("password", self.password, Ok::<_, Infallible>);

        match (email, password) {
            (Some(email), Some(password)) => Ok(LoginCommand { email, password }),
            _ => Err(errors),
        }
    }
}
