//! Credential primitives for the pet-community API.
//!
//! - Password hashing (Argon2id, salted PHC strings)
//! - Signed bearer tokens (HS256 JWT) carrying a subject, a role and an expiry
//! - An `Authenticator` that verifies a password and mints a token in one step
//!
//! # Examples
//!
//! ```
//! use auth::{Authenticator, Claims};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("secret1").unwrap();
//!
//! // Login: verify and generate token
//! let claims = Claims::for_user("user-1", "PET_OWNER", 24);
//! let result = auth.authenticate("secret1", &hash, &claims).unwrap();
//!
//! // Protected request: validate token
//! let decoded = auth.validate_token(&result.access_token).unwrap();
//! assert_eq!(decoded.role(), Some("PET_OWNER"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
