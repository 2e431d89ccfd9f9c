use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Bearer token payload.
///
/// Carries the user identifier in `sub`, the user's role, and the standard
/// issued-at / expiration timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Role name the token was issued for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    /// Claims for an authenticated user, expiring `expiration_hours` from now.
    pub fn for_user(user_id: impl ToString, role: impl ToString, expiration_hours: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::hours(expiration_hours);

        Self {
            sub: user_id.to_string(),
            role: Some(role.to_string()),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = exp;
        self
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }
}
