mod common;

use std::sync::Arc;

use auth_service::config::RunMode;
use auth_service::domain::user::models::Role;
use auth_service::domain::user::service::AuthService;
use auth_service::inbound::http::middleware::authenticate;
use auth_service::inbound::http::middleware::authorize;
use auth_service::inbound::http::router::create_router;
use auth_service::inbound::http::router::AppState;
use axum::extract::Request;
use axum::middleware;
use axum::middleware::Next;
use axum::routing::get;
use axum::Router;
use common::InMemoryUserRepository;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

type Service = AuthService<InMemoryUserRepository>;

/// Serves a providers-only route behind `authenticate` + `authorize`.
async fn spawn_provider_route(repository: Arc<InMemoryUserRepository>) -> String {
    let state = AppState {
        auth_service: common::auth_service(repository),
        authenticator: common::authenticator(),
    };

    let router = Router::new()
        .route("/bookings", get(|| async { "provider area" }))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            authorize(&[Role::ServiceProvider], req, next)
        }))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate::<Service>,
        ))
        .with_state(state);

    common::serve(router).await
}

#[tokio::test]
async fn test_role_guard_allows_listed_role() {
    let app = TestApp::spawn().await;
    let body = app
        .register("vet@x.com", "secret1", "SERVICE_PROVIDER")
        .await;
    let token = body["data"]["token"].as_str().unwrap();

    let address = spawn_provider_route(Arc::clone(&app.repository)).await;
    let response = app
        .api_client
        .get(format!("{}/bookings", address))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "provider area");
}

#[tokio::test]
async fn test_role_guard_forbids_other_roles() {
    let app = TestApp::spawn().await;
    let token = app.register_token("owner@x.com").await;

    let address = spawn_provider_route(Arc::clone(&app.repository)).await;
    let response = app
        .api_client
        .get(format!("{}/bookings", address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_role_guard_still_requires_token() {
    let app = TestApp::spawn().await;

    let address = spawn_provider_route(Arc::clone(&app.repository)).await;
    let response = app
        .api_client
        .get(format!("{}/bookings", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

async fn register_against_failing_store(run_mode: RunMode) -> Value {
    let service = common::auth_service(Arc::new(common::FailingUserRepository));
    let address = common::serve(create_router(service, common::authenticator(), run_mode)).await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "email": "a@x.com",
            "password": "secret1",
            "name": "Ann",
            "role": "PET_OWNER"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_internal_error_detail_hidden_outside_development() {
    let body = register_against_failing_store(RunMode::Production).await;

    assert_eq!(
        body["data"]["message"],
        "Internal server error, please try again later"
    );
    assert!(body["data"].get("error").is_none());
    assert!(!body.to_string().contains("connection reset"));
}

#[tokio::test]
async fn test_internal_error_detail_shown_in_development() {
    let body = register_against_failing_store(RunMode::Development).await;

    assert_eq!(
        body["data"]["message"],
        "Internal server error, please try again later"
    );
    assert!(body["data"]["error"]
        .as_str()
        .unwrap()
        .contains("connection reset"));
}
