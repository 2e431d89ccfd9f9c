use axum::http::StatusCode;
use axum::Extension;

use super::ApiSuccess;
use super::MessageResponseData;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Tokens are stateless; the client discards its copy.
pub async fn logout(
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiSuccess<MessageResponseData> {
    tracing::info!(user_id = %user.id, "User logged out");

    ApiSuccess::new(StatusCode::OK, MessageResponseData::new("Logout successful"))
}
