use std::collections::BTreeMap;
use std::fmt;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use crate::domain::user::models::Role;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;

pub mod get_profile;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod update_profile;

pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Internal server error, please try again later";
pub(crate) const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<ApiResponseBody<T>>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(ApiResponseBody::new(status, data)))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Validation(ValidationErrors),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    MethodNotAllowed(String),
}

/// Underlying cause of a 500, carried in response extensions so a
/// development-only layer can surface it.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::InternalServerError(e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::InternalServerError(detail) => {
                tracing::error!(error = %detail, "Unhandled error");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiResponseBody::new_error(status, INTERNAL_ERROR_MESSAGE.to_string());
                let mut response = (status, Json(body)).into_response();
                response.extensions_mut().insert(InternalErrorDetail(detail));
                response
            }
            ApiError::Validation(errors) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiResponseBody::new_validation_error(status, errors);
                (status, Json(body)).into_response()
            }
            ApiError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => error_response(StatusCode::NOT_FOUND, message),
            ApiError::Unauthorized(message) => error_response(StatusCode::UNAUTHORIZED, message),
            ApiError::Forbidden(message) => error_response(StatusCode::FORBIDDEN, message),
            ApiError::MethodNotAllowed(message) => {
                error_response(StatusCode::METHOD_NOT_ALLOWED, message)
            }
        }
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ApiResponseBody::new_error(status, message))).into_response()
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => ApiError::NotFound("User does not exist".to_string()),
            UserError::EmailAlreadyExists(_) => {
                ApiError::BadRequest("Email is already registered".to_string())
            }
            UserError::InvalidCredentials => {
                ApiError::BadRequest(INVALID_CREDENTIALS_MESSAGE.to_string())
            }
            UserError::Credential(_) | UserError::DatabaseError(_) => {
                ApiError::InternalServerError(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponseBody<T: Serialize + PartialEq> {
    status_code: u16,
    data: T,
}

impl<T: Serialize + PartialEq> ApiResponseBody<T> {
    pub fn new(status_code: StatusCode, data: T) -> Self {
        Self {
            status_code: status_code.as_u16(),
            data,
        }
    }
}

impl ApiResponseBody<ApiErrorData> {
    pub fn new_error(status_code: StatusCode, message: String) -> Self {
        Self::new(
            status_code,
            ApiErrorData {
                message,
                errors: None,
                error: None,
            },
        )
    }

    pub fn new_validation_error(status_code: StatusCode, errors: ValidationErrors) -> Self {
        Self::new(
            status_code,
            ApiErrorData {
                message: "Input validation failed".to_string(),
                errors: Some(errors),
                error: None,
            },
        )
    }

    pub fn new_error_with_detail(status_code: StatusCode, message: String, detail: String) -> Self {
        Self::new(
            status_code,
            ApiErrorData {
                message,
                errors: None,
                error: Some(detail),
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Field-level validation failures, keyed by request field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// Parse a required field, recording "is required" or the parse error.
    pub fn required<T, E: fmt::Display>(
        &mut self,
        field: &str,
        value: Field,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<T> {
        match value {
            Field::Missing | Field::Null => {
                self.add(field, format!("{} is required", field));
                None
            }
            value => self.optional(field, value, parse),
        }
    }

    /// Parse a field only when present. `null` is not accepted.
    pub fn optional<T, E: fmt::Display>(
        &mut self,
        field: &str,
        value: Field,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<T> {
        match value {
            Field::Missing => None,
            Field::Value(Value::String(raw)) => match parse(raw) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    self.add(field, e.to_string());
                    None
                }
            },
            Field::Null | Field::Value(_) => {
                self.add(field, format!("{} must be a string", field));
                None
            }
        }
    }

    /// Parse a field that may be cleared with `null`.
    ///
    /// `None` means absent, `Some(None)` an explicit `null`.
    pub fn nullable<T, E: fmt::Display>(
        &mut self,
        field: &str,
        value: Field,
        parse: impl FnOnce(String) -> Result<T, E>,
    ) -> Option<Option<T>> {
        match value {
            Field::Null => Some(None),
            value => self.optional(field, value, parse).map(Some),
        }
    }
}

/// Raw JSON request field, kept untyped so that type mismatches are
/// reported per field instead of failing the whole body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field {
    #[default]
    Missing,
    Null,
    Value(Value),
}

impl<'de> Deserialize<'de> for Field {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None => Field::Null,
            Some(value) => Field::Value(value),
        })
    }
}

impl From<&str> for Field {
    fn from(value: &str) -> Self {
        Field::Value(Value::String(value.to_string()))
    }
}

/// Sanitized user as returned by every endpoint. There is no password field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&UserProfile> for UserData {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str().to_string(),
            name: user.name.as_str().to_string(),
            phone: user.phone.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponseData {
    pub message: String,
}

impl MessageResponseData {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

pub async fn welcome() -> ApiSuccess<MessageResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        MessageResponseData::new("Welcome to the pet community API"),
    )
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound("Requested resource not found".to_string())
}
