use axum::extract::Request;
use axum::extract::State;
use axum::http::header::ALLOW;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;

use crate::domain::user::models::Role;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiResponseBody;
use crate::inbound::http::handlers::InternalErrorDetail;
use crate::inbound::http::handlers::INTERNAL_ERROR_MESSAGE;
use crate::inbound::http::router::AppState;

const LOGIN_REQUIRED: &str = "Unauthorized, please log in";
const INVALID_TOKEN: &str = "Token is invalid or expired, please log in again";
const USER_GONE: &str = "User no longer exists, please log in again";

/// Identity of the caller, inserted into request extensions by [`authenticate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

/// Validates the bearer token, confirms the user still exists, and attaches
/// an [`AuthenticatedUser`] to the request.
pub async fn authenticate<S: AuthServicePort>(
    State(state): State<AppState<S>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(req.headers())?;

    let claims = state.authenticator.validate_token(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let user_id = UserId::from_string(&claims.sub).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a user id");
        ApiError::Unauthorized(INVALID_TOKEN.to_string())
    })?;

    let user = state
        .auth_service
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "Token refers to a missing user");
            ApiError::Unauthorized(USER_GONE.to_string())
        })?;

    req.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        email: user.email.to_string(),
        role: user.role,
    });

    Ok(next.run(req).await)
}

/// Rejects callers whose role is not in `allowed_roles`.
///
/// Must run after [`authenticate`]:
/// `middleware::from_fn(|req: Request, next: Next| authorize(&[Role::ServiceProvider], req, next))`
pub async fn authorize(
    allowed_roles: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let role = req
        .extensions()
        .get::<AuthenticatedUser>()
        .map(|user| user.role)
        .ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.to_string()))?;

    if !allowed_roles.contains(&role) {
        return Err(ApiError::Forbidden(
            "Insufficient permissions to access this resource".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Development-only: re-renders 500 responses with the underlying error.
pub async fn expose_error_details(mut response: Response) -> Response {
    let Some(InternalErrorDetail(detail)) =
        response.extensions_mut().remove::<InternalErrorDetail>()
    else {
        return response;
    };

    let status = response.status();
    let body =
        ApiResponseBody::new_error_with_detail(status, INTERNAL_ERROR_MESSAGE.to_string(), detail);
    (status, Json(body)).into_response()
}

/// Wraps axum's bodyless 405 in the JSON envelope, keeping `Allow`.
pub async fn envelope_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(ALLOW).cloned();
    let mut enveloped =
        ApiError::MethodNotAllowed("Method not allowed".to_string()).into_response();
    if let Some(allow) = allow {
        enveloped.headers_mut().insert(ALLOW, allow);
    }
    enveloped
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized(LOGIN_REQUIRED.to_string()))
}
