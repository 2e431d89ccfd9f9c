use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::get_profile::get_profile;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::not_found;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::update_profile::update_profile;
use super::handlers::welcome;
use super::middleware::authenticate;
use super::middleware::envelope_method_not_allowed;
use super::middleware::expose_error_details;
use crate::config::RunMode;
use crate::domain::user::ports::AuthServicePort;

pub struct AppState<S: AuthServicePort> {
    pub auth_service: Arc<S>,
    pub authenticator: Arc<Authenticator>,
}

impl<S: AuthServicePort> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            auth_service: Arc::clone(&self.auth_service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

/// Routes mounted under `/api/auth`.
fn auth_routes<S: AuthServicePort>(state: AppState<S>) -> Router<AppState<S>> {
    let public_routes = Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
        .route("/refresh-token", post(refresh_token));

    let protected_routes = Router::new()
        .route("/logout", post(logout))
        .route("/profile", get(get_profile::<S>).put(update_profile::<S>))
        .route_layer(middleware::from_fn_with_state(state, authenticate::<S>));

    public_routes.merge(protected_routes)
}

pub fn create_router<S: AuthServicePort>(
    auth_service: Arc<S>,
    authenticator: Arc<Authenticator>,
    run_mode: RunMode,
) -> Router {
    let state = AppState {
        auth_service,
        authenticator,
    };

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    let router = Router::new()
        .route("/", get(welcome))
        .nest("/api/auth", auth_routes(state.clone()))
        .fallback(not_found)
        .layer(middleware::map_response(envelope_method_not_allowed))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state);

    if run_mode.exposes_error_details() {
        router.layer(middleware::map_response(expose_error_details))
    } else {
        router
    }
}
