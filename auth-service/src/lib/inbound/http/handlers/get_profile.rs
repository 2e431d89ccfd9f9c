use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::UserProfile;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn get_profile<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    let profile = state
        .auth_service
        .get_user_by_id(&user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User does not exist".to_string()))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ProfileResponseData::new("Profile retrieved", &profile),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileResponseData {
    pub message: String,
    pub user: UserData,
}

impl ProfileResponseData {
    pub fn new(message: &str, profile: &UserProfile) -> Self {
        Self {
            message: message.to_string(),
            user: profile.into(),
        }
    }
}
