#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use auth_service::config::RunMode;
use auth_service::domain::user::models::User;
use auth_service::domain::user::models::UserId;
use auth_service::domain::user::ports::UserRepository;
use auth_service::domain::user::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::user::errors::UserError;
use axum::Router;
use serde_json::json;
use serde_json::Value;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Store double with the same uniqueness rule as the `users` table.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn stored(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|user| user.email.as_str() == email)
            .cloned()
    }

    pub fn remove(&self, id: &UserId) {
        self.users.lock().unwrap().remove(id);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self.stored(email))
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| UserError::NotFound(user.id.to_string()))?;

        stored.name = user.name;
        stored.phone = user.phone;
        stored.avatar = user.avatar;
        Ok(stored.clone())
    }
}

/// Store double whose every call fails like a dropped connection.
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn create(&self, _user: User) -> Result<User, UserError> {
        Err(UserError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<User>, UserError> {
        Err(UserError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, UserError> {
        Err(UserError::DatabaseError("connection reset by peer".to_string()))
    }

    async fn update(&self, _user: User) -> Result<User, UserError> {
        Err(UserError::DatabaseError("connection reset by peer".to_string()))
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let repository = Arc::new(InMemoryUserRepository::default());
        let service = auth_service(Arc::clone(&repository));
        let router = create_router(service, authenticator(), RunMode::Test);

        Self {
            address: serve(router).await,
            repository,
            api_client: reqwest::Client::new(),
            jwt_handler: JwtHandler::new(JWT_SECRET),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.put(format!("{}{}", self.address, path))
    }

    /// Register a user and return the response body.
    pub async fn register(&self, email: &str, password: &str, role: &str) -> Value {
        let response = self
            .post("/api/auth/register")
            .json(&json!({
                "email": email,
                "password": password,
                "name": "Ann",
                "role": role
            }))
            .send()
            .await
            .expect("Failed to execute request");

        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    /// Register a user and return its bearer token.
    pub async fn register_token(&self, email: &str) -> String {
        let body = self.register(email, "secret1", "PET_OWNER").await;
        body["data"]["token"]
            .as_str()
            .expect("token missing")
            .to_string()
    }
}

pub fn authenticator() -> Arc<Authenticator> {
    Arc::new(Authenticator::new(JWT_SECRET))
}

pub fn auth_service<R: UserRepository>(repository: Arc<R>) -> Arc<AuthService<R>> {
    Arc::new(AuthService::new(repository, authenticator(), 24))
}

/// Serve `router` on an OS-assigned port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server error");
    });

    format!("http://127.0.0.1:{}", port)
}
