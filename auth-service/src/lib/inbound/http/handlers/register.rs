use std::convert::Infallible;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::Field;
use super::UserData;
use super::ValidationErrors;
use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Name;
use crate::domain::user::models::Password;
use crate::domain::user::models::Role;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .auth_service
        .create_user(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref session| {
            ApiSuccess::new(
                StatusCode::CREATED,
                SessionResponseData::new("Registration successful", session),
            )
        })
}

/// HTTP request body for registration (raw JSON)
///
/// Fields stay untyped at the serde level so that missing fields and type
/// mismatches are reported alongside format errors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    email: Field,
    password: Field,
    name: Field,
    phone: Field,
    role: Field,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<CreateUserCommand, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = errors.required("email", self.email, EmailAddress::new);
        let password = errors.required("password", self.password, Password::new);
        let name = errors.required("name", self.name, Name::new);
        let role = errors.required("role", self.role, |raw| raw.parse::<Role>());
        let phone = errors.optional("phone", self.phone, Ok::<_, Infallible>);

        match (email, password, name, role) {
            (Some(email), Some(password), Some(name), Some(role)) if errors.is_empty() => {
                Ok(CreateUserCommand {
                    email,
                    password,
                    name,
                    phone,
                    role,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Response data for endpoints that issue a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub message: String,
    pub user: UserData,
    pub token: String,
}

impl SessionResponseData {
    pub fn new(message: &str, session: &AuthenticatedSession) -> Self {
        Self {
            message: message.to_string(),
            user: (&session.user).into(),
            token: session.token.clone(),
        }
    }
}
