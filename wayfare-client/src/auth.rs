use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::auth::{
    validate_email, validate_name, validate_password, AuthCredentials, AuthUser, ProfileUpdate,
};
use wayfare_core::{CoreError, StorageError};
use wayfare_session::{AuthAction, AuthState, AuthStore};
use wayfare_shared::Masked;
use wayfare_store::{JsonStorage, StorageKey};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("No account found with this email")]
    UnknownEmail,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("User not found")]
    UserNotFound,
    #[error("No user logged in")]
    NotSignedIn,
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for AuthError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StorageError(e) => AuthError::Storage(e),
            other => AuthError::Validation(other.to_string()),
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Demo account store kept in local storage.
///
/// There is no backend: sign-in only checks that the password satisfies the
/// sign-up policy.
#[derive(Clone)]
pub struct AuthService {
    storage: JsonStorage,
}

impl AuthService {
    pub fn new(storage: JsonStorage) -> Self {
        Self { storage }
    }

    async fn users(&self) -> AuthResult<Vec<AuthUser>> {
        Ok(self.storage.get_json(StorageKey::Users).await?.unwrap_or_default())
    }

    async fn start_session(&self, user: &AuthUser) -> AuthResult<()> {
        let token = Masked::new(format!("token-{}", user.id));
        self.storage.set_json(StorageKey::CurrentUser, user).await?;
        self.storage.set_json(StorageKey::AuthToken, &token).await?;
        Ok(())
    }

    pub async fn sign_up(&self, credentials: &AuthCredentials) -> AuthResult<AuthUser> {
        validate_name(credentials.name.as_deref())?;
        validate_email(&credentials.email)?;
        validate_password(credentials.password.expose())?;

        let mut users = self.users().await?;
        if users.iter().any(|u| u.email == credentials.email) {
            return Err(AuthError::EmailTaken);
        }

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email: credentials.email.clone(),
            name: credentials.name.as_deref().unwrap_or_default().trim().to_string(),
            created_at: Utc::now(),
        };
        users.push(user.clone());

        self.storage.set_json(StorageKey::Users, &users).await?;
        self.start_session(&user).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn sign_in(&self, credentials: &AuthCredentials) -> AuthResult<AuthUser> {
        validate_email(&credentials.email)?;

        let user = self
            .users()
            .await?
            .into_iter()
            .find(|u| u.email == credentials.email)
            .ok_or(AuthError::UnknownEmail)?;

        validate_password(credentials.password.expose()).map_err(|_| AuthError::InvalidPassword)?;

        self.start_session(&user).await?;
        info!("Signed in user {}", user.id);
        Ok(user)
    }

    pub async fn sign_out(&self) -> AuthResult<()> {
        self.storage.remove(StorageKey::CurrentUser).await?;
        self.storage.remove(StorageKey::AuthToken).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> AuthResult<Option<AuthUser>> {
        Ok(self.storage.get_json(StorageKey::CurrentUser).await?)
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> AuthResult<AuthUser> {
        let mut users = self.users().await?;
        let slot = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AuthError::UserNotFound)?;

        let updated = slot.apply(update);
        *slot = updated.clone();

        self.storage.set_json(StorageKey::Users, &users).await?;
        self.storage.set_json(StorageKey::CurrentUser, &updated).await?;
        Ok(updated)
    }
}

/// Drives the auth store from the auth service, turning every outcome into a state transition.
pub struct AuthSession {
    service: AuthService,
    store: Arc<AuthStore>,
}

impl AuthSession {
    pub fn new(service: AuthService, store: Arc<AuthStore>) -> Self {
        Self { service, store }
    }

    pub fn state(&self) -> Arc<AuthState> {
        self.store.snapshot()
    }

    async fn run<F>(&self, attempt: F) -> Arc<AuthState>
    where
        F: std::future::Future<Output = AuthResult<AuthUser>>,
    {
        self.store.dispatch(AuthAction::Start);
        match attempt.await {
            Ok(user) => self.store.dispatch(AuthAction::Success(user)),
            Err(e) => self.store.dispatch(AuthAction::Failure(e.to_string())),
        }
        self.store.snapshot()
    }

    pub async fn sign_up(&self, credentials: &AuthCredentials) -> Arc<AuthState> {
        self.run(self.service.sign_up(credentials)).await
    }

    pub async fn sign_in(&self, credentials: &AuthCredentials) -> Arc<AuthState> {
        self.run(self.service.sign_in(credentials)).await
    }

    /// Update the signed-in user. Without one the update is refused and the
    /// session stays signed out.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Arc<AuthState> {
        let Some(user_id) = self.store.snapshot().user.as_ref().map(|u| u.id.clone()) else {
            warn!("Profile update without a signed-in user");
            self.store.dispatch(AuthAction::Failure(AuthError::NotSignedIn.to_string()));
            return self.store.snapshot();
        };

        match self.service.update_profile(&user_id, update).await {
            Ok(user) => self.store.dispatch(AuthAction::Success(user)),
            Err(e) => self.store.dispatch(AuthAction::Failure(e.to_string())),
        }
        self.store.snapshot()
    }

    /// Always ends logged out, even if storage could not be cleared.
    pub async fn sign_out(&self) -> Arc<AuthState> {
        if let Err(e) = self.service.sign_out().await {
            warn!("Failed to clear stored session: {}", e);
        }
        self.store.dispatch(AuthAction::Logout);
        self.store.snapshot()
    }

    /// Restore a previously signed-in user, typically once at start-up.
    pub async fn restore(&self) -> Arc<AuthState> {
        match self.service.current_user().await {
            Ok(Some(user)) => self.store.dispatch(AuthAction::Success(user)),
            Ok(None) => self.store.dispatch(AuthAction::Logout),
            Err(e) => {
                warn!("Failed to restore session: {}", e);
                self.store.dispatch(AuthAction::Logout);
            }
        }
        self.store.snapshot()
    }
}
