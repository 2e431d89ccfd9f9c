use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use chrono::SubsecRound;
use chrono::Utc;

use crate::domain::user::models::AuthenticatedSession;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::LoginCommand;
use crate::domain::user::models::UpdateProfileCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserProfile;
use crate::user::errors::UserError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for registration, login and profiles.
///
/// The store handle and the authenticator are injected; nothing is global.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    token_expiration_hours: i64,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token signing
    /// * `token_expiration_hours` - Lifetime of issued tokens
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        token_expiration_hours: i64,
    ) -> Self {
        Self {
            repository,
            authenticator,
            token_expiration_hours,
        }
    }

    fn claims_for(&self, user: &User) -> Claims {
        Claims::for_user(user.id, user.role, self.token_expiration_hours)
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn create_user(
        &self,
        command: CreateUserCommand,
    ) -> Result<AuthenticatedSession, UserError> {
        if self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .authenticator
            .hash_password(command.password.as_str())?;

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            name: command.name,
            phone: command.phone,
            avatar: None,
            role: command.role,
            // Postgres TIMESTAMPTZ keeps microseconds
            created_at: Utc::now().trunc_subsecs(6),
        };

        let created_user = self.repository.create(user).await?;
        let token = self
            .authenticator
            .generate_token(&self.claims_for(&created_user))?;

        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User registered");

        Ok(AuthenticatedSession {
            user: created_user.into(),
            token,
        })
    }

    async fn login_user(&self, command: LoginCommand) -> Result<AuthenticatedSession, UserError> {
        let user = self
            .repository
            .find_by_email(command.email.as_str())
            .await?
            .ok_or_else(|| UserError::NotFound(command.email.to_string()))?;

        let result = self.authenticator.authenticate(
            &command.password,
            &user.password_hash,
            &self.claims_for(&user),
        )?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthenticatedSession {
            user: user.into(),
            token: result.access_token,
        })
    }

    async fn get_user_by_id(&self, id: &UserId) -> Result<Option<UserProfile>, UserError> {
        Ok(self.repository.find_by_id(id).await?.map(UserProfile::from))
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateProfileCommand,
    ) -> Result<UserProfile, UserError> {
        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        if let Some(name) = command.name {
            user.name = name;
        }

        if let Some(phone) = command.phone {
            user.phone = phone;
        }

        if let Some(avatar) = command.avatar {
            user.avatar = avatar;
        }

        let updated_user = self.repository.update(user).await?;

        Ok(updated_user.into())
    }
}

#[cfg(test)]
mod tests {
    use mockall::mock;

    use super::*;
    use crate::domain::user::models::EmailAddress;
    use crate::domain::user::models::Name;
    use crate::domain::user::models::Password;
    use crate::domain::user::models::Role;

    mock! {
        pub TestUserRepository {}

        #[async_trait]
        impl UserRepository for TestUserRepository {
            async fn create(&self, user: User) -> Result<User, UserError>;
            async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
            async fn update(&self, user: User) -> Result<User, UserError>;
        }
    }

    const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(Authenticator::new(SECRET))
    }

    fn service(repository: MockTestUserRepository) -> AuthService<MockTestUserRepository> {
        AuthService::new(Arc::new(repository), authenticator(), 24)
    }

    fn stored_user(password: &str) -> User {
        User {
            id: UserId::new(),
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password_hash: authenticator().hash_password(password).unwrap(),
            name: Name::new("Ann".to_string()).unwrap(),
            phone: None,
            avatar: None,
            role: Role::PetOwner,
            created_at: Utc::now(),
        }
    }

    fn register_command() -> CreateUserCommand {
        CreateUserCommand {
            email: EmailAddress::new("a@x.com".to_string()).unwrap(),
            password: Password::new("secret1".to_string()).unwrap(),
            name: Name::new("Ann".to_string()).unwrap(),
            phone: Some("555-0100".to_string()),
            role: Role::PetOwner,
        }
    }

    #[tokio::test]
    async fn test_create_user_success() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .withf(|email| email == "a@x.com")
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .withf(|user| {
                user.email.as_str() == "a@x.com"
                    && user.password_hash.starts_with("$argon2")
                    && user.password_hash != "secret1"
                    && user.role == Role::PetOwner
            })
            .times(1)
            .returning(Ok);

        let session = service(repository)
            .create_user(register_command())
            .await
            .expect("registration failed");

        assert_eq!(session.user.email.as_str(), "a@x.com");
        assert_eq!(session.user.phone.as_deref(), Some("555-0100"));
        assert_eq!(session.user.created_at.timestamp_subsec_nanos() % 1_000, 0);

        let claims = authenticator().validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
        assert_eq!(claims.role(), Some("PET_OWNER"));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(Some(stored_user("secret1"))));
        repository.expect_create().times(0);

        let result = service(repository).create_user(register_command()).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email_reported_by_store() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|user| Err(UserError::EmailAlreadyExists(user.email.to_string())));

        let result = service(repository).create_user(register_command()).await;

        assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_user_success() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("secret1");
        let user_id = user.id;

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let session = service(repository)
            .login_user(LoginCommand {
                email: EmailAddress::new("a@x.com".to_string()).unwrap(),
                password: "secret1".to_string(),
            })
            .await
            .expect("login failed");

        assert_eq!(session.user.id, user_id);
        let claims = authenticator().validate_token(&session.token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
    }

    #[tokio::test]
    async fn test_login_user_unknown_email() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository)
            .login_user(LoginCommand {
                email: EmailAddress::new("nobody@x.com".to_string()).unwrap(),
                password: "secret1".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_login_user_wrong_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("secret1");

        repository
            .expect_find_by_email()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));

        let result = service(repository)
            .login_user(LoginCommand {
                email: EmailAddress::new("a@x.com".to_string()).unwrap(),
                password: "wrong".to_string(),
            })
            .await;

        assert!(matches!(result, Err(UserError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_get_user_by_id_missing_is_none() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));

        let result = service(repository).get_user_by_id(&UserId::new()).await;

        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_update_user_keeps_email_and_password() {
        let mut repository = MockTestUserRepository::new();
        let user = stored_user("secret1");
        let user_id = user.id;
        let original_hash = user.password_hash.clone();

        repository
            .expect_find_by_id()
            .withf(move |id| *id == user_id)
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .withf(move |user| {
                user.email.as_str() == "a@x.com"
                    && user.password_hash == original_hash
                    && user.name.as_str() == "Annie"
                    && user.phone.is_none()
                    && user.avatar.as_deref() == Some("https://img/cat.png")
            })
            .times(1)
            .returning(Ok);

        let command = UpdateProfileCommand {
            name: Some(Name::new("Annie".to_string()).unwrap()),
            phone: None,
            avatar: Some(Some("https://img/cat.png".to_string())),
        };

        let profile = service(repository)
            .update_user(&user_id, command)
            .await
            .expect("update failed");

        assert_eq!(profile.name.as_str(), "Annie");
        assert_eq!(profile.email.as_str(), "a@x.com");
    }

    #[tokio::test]
    async fn test_update_user_clears_nullable_fields() {
        let mut user = stored_user("secret1");
        user.phone = Some("555-0100".to_string());
        user.avatar = Some("https://img/cat.png".to_string());
        let user_id = user.id;

        let mut repository = MockTestUserRepository::new();
        repository
            .expect_find_by_id()
            .times(1)
            .returning(move |_| Ok(Some(user.clone())));
        repository
            .expect_update()
            .withf(|user| user.avatar.is_none() && user.phone.as_deref() == Some("555-0100"))
            .times(1)
            .returning(Ok);

        let command = UpdateProfileCommand {
            avatar: Some(None),
            ..Default::default()
        };

        let profile = service(repository)
            .update_user(&user_id, command)
            .await
            .expect("update failed");

        assert!(profile.avatar.is_none());
        assert_eq!(profile.phone.as_deref(), Some("555-0100"));
    }

    #[tokio::test]
    async fn test_update_user_not_found() {
        let mut repository = MockTestUserRepository::new();

        repository
            .expect_find_by_id()
            .times(1)
            .returning(|_| Ok(None));
        repository.expect_update().times(0);

        let result = service(repository)
            .update_user(&UserId::new(), UpdateProfileCommand::default())
            .await;

        assert!(matches!(result, Err(UserError::NotFound(_))));
    }
}
