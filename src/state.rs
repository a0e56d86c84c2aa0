use std::sync::Arc;

use redis::aio::ConnectionManager;
use tower_cookies::Key;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::crypto::password::PasswordHasher;
use crate::error::{AppError, Result};
use crate::repositories::{session::RedisSessionStore, user::PgUserStore};
use crate::services::{auth::AuthService, session::SessionManager};

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The authentication core.
    pub auth: AuthService,
    /// The application's configuration.
    pub config: Arc<Config>,
    /// The key signing the session cookie.
    pub cookie_key: Key,
}

impl AppState {
    /// Creates a new `AppState` backed by PostgreSQL and Redis.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = crate::db::create_pool(&config.database_url)?;
        crate::db::ensure_schema(&db).await?;
        tracing::info!("✅ PostgreSQL Pool initialized");

        let redis_client = redis::Client::open(config.redis_url.as_str())?;
        let redis = ConnectionManager::new(redis_client).await?;
        tracing::info!("✅ Redis Connection Manager initialized");

        let sessions = SessionManager::new(
            Arc::new(RedisSessionStore::new(redis)),
            config,
            Arc::new(SystemClock),
        )?;
        let auth = AuthService::new(
            Arc::new(PgUserStore::new(db)),
            sessions,
            PasswordHasher::new(config.hash_cost),
        );

        Self::from_parts(config, auth)
    }

    /// Creates an `AppState` around an already assembled auth service.
    pub fn from_parts(config: &Config, auth: AuthService) -> Result<Self> {
        let cookie_key = Key::try_from(config.cookie_secret.as_slice())
            .map_err(|e| AppError::Encryption(format!("Invalid cookie secret: {}", e)))?;

        Ok(AppState {
            auth,
            config: Arc::new(config.clone()),
            cookie_key,
        })
    }
}
