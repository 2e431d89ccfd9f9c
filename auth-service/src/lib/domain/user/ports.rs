use async_trait::async_trait;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;

/// Port for authentication and profile operations.
///
/// Every operation returns sanitized users; password hashes never cross
/// this boundary.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user and issue a token for it.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Credential` - Hashing or token signing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(
        &self,
        command: CreateUserCommand,
    ) -> Result<AuthenticatedSession, UserError>;

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    /// * `NotFound` - No user with this email
    /// * `InvalidCredentials` - Password does not match
    /// * `DatabaseError` - Database operation failed
    async fn login_user(&self, command: LoginCommand) -> Result<AuthenticatedSession, UserError>;

    /// Retrieve a user by identifier, `None` if absent.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, UserError>;

    /// Apply a partial profile update.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<UserProfile, UserError>;
}

/// Persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Store rejected the email as a duplicate
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Write back the mutable profile fields (name, phone, avatar).
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;
}
