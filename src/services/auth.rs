use std::sync::Arc;

use crate::{
    crypto::password::PasswordHasher,
    error::{AppError, AuthFailure, Result},
    models::session::Session,
    repositories::user::UserStore,
    services::{
        access::{authorize, Access},
        session::SessionManager,
    },
    validation::auth::{LoginForm, SignupForm},
};

/// Account creation, login and session-gated access.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    sessions: SessionManager,
    hasher: PasswordHasher,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, sessions: SessionManager, hasher: PasswordHasher) -> Self {
        Self { users, sessions, hasher }
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Authenticates a user and opens a session.
    ///
    /// # Arguments
    ///
    /// * `email` - The submitted email.
    /// * `password` - The submitted password.
    ///
    /// # Returns
    ///
    /// The new session, [`AppError::Validation`] for a malformed email, or
    /// [`AppError::Authentication`] when the account is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let credentials = LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
        .into_credentials()?;
        tracing::debug!("🔐 Authenticating user: {}", credentials.email);

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            self.hasher.verify_decoy(&credentials.password).await?;
            return Err(AppError::Authentication(AuthFailure::UnknownEmail));
        };

        if !self.hasher.verify(&credentials.password, user.password_hash()).await? {
            return Err(AppError::Authentication(AuthFailure::PasswordMismatch));
        }

        let session = self.sessions.issue(&user.email, &user.name).await?;
        tracing::info!("✅ User logged in: {}", user.id);
        Ok(session)
    }

    /// Registers a new account and opens a session for it.
    ///
    /// Nothing is written unless every field passes validation.
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> Result<Session> {
        let credentials = SignupForm {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        }
        .into_credentials()?;
        tracing::debug!("📝 Creating user: {}", credentials.email);

        let password_hash = self.hasher.hash(&credentials.password).await?;
        let user = self
            .users
            .create(&credentials.email, &password_hash, &credentials.name)
            .await?;
        tracing::info!("✅ User created with ID: {}", user.id);

        self.sessions.issue(&user.email, &user.name).await
    }

    /// Ends a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.sessions.destroy(token).await?;
        tracing::info!("👋 Session ended");
        Ok(())
    }

    /// Decides whether the holder of `token` may see protected pages,
    /// renewing the session when allowed.
    pub async fn check_access(&self, token: &str) -> Result<Access> {
        match authorize(self.sessions.resolve(token).await?) {
            Access::Allow(session) => match self.sessions.extend(session).await? {
                Some(session) => Ok(Access::Allow(session)),
                None => Ok(Access::Deny),
            },
            Access::Deny => Ok(Access::Deny),
        }
    }
}
