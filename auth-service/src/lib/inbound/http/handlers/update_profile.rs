use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use std::convert::Infallible;

use serde::Deserialize;

use super::get_profile::ProfileResponseData;
use super::ApiError;
use super::ApiSuccess;
use super::Field;
use super::ValidationErrors;
use crate::domain::user::models::Name;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// HTTP request body for a profile update (raw JSON)
///
/// Unknown keys such as `email` or `password` are ignored. `phone` and
/// `avatar` are cleared by an explicit `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub name: Field,
    pub phone: Field,
    pub avatar: Field,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.optional("name", self.name, Name::new);
        let phone = errors.nullable("phone", self.phone, Ok::<_, Infallible>);
        let avatar = errors.nullable("avatar", self.avatar, Ok::<_, Infallible>);

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UpdateProfileCommand {
            name,
            phone,
            avatar,
        })
    }
}

pub async fn update_profile<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    let Json(body) = payload?;

    state
        .auth_service
        .update_user(&user.id, body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref profile| {
            ApiSuccess::new(
                StatusCode::OK,
                ProfileResponseData::new("Profile updated", profile),
            )
        })
}
