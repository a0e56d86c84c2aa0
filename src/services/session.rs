use std::sync::Arc;

use chrono::Duration;

use crate::{
    clock::Clock,
    config::Config,
    crypto::{session_cipher::SessionCipher, token::generate_session_token},
    error::Result,
    models::session::Session,
    repositories::session::SessionStore,
};

/// How long a session lives after issuance or its last renewal.
pub const SESSION_LIFETIME_MS: i64 = 60 * 60 * 1000;

/// Issues, resolves, renews and destroys sessions.
///
/// Sessions are serialized, sealed with the session key and handed to the
/// backing store under their token. Expiry is checked on every read against
/// the stored `expires_at`, whether or not the store has purged the record yet.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    cipher: SessionCipher,
    clock: Arc<dyn Clock>,
    lifetime: Duration,
}

impl SessionManager {
    /// Creates a new `SessionManager`.
    ///
    /// # Arguments
    ///
    /// * `store` - Where sealed sessions are kept.
    /// * `config` - Supplies the session encryption key.
    /// * `clock` - The source of the current time.
    pub fn new(store: Arc<dyn SessionStore>, config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        Ok(Self {
            store,
            cipher: SessionCipher::new(&config.session_key)?,
            clock,
            lifetime: Duration::milliseconds(SESSION_LIFETIME_MS),
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Starts an authenticated session for the given account.
    pub async fn issue(&self, email: &str, name: &str) -> Result<Session> {
        let session = Session {
            token: generate_session_token(),
            authenticated: true,
            email: email.to_string(),
            name: name.to_string(),
            expires_at: self.clock.now() + self.lifetime,
        };
        self.save(&session).await?;
        tracing::debug!("🔑 Session issued, expires at {}", session.expires_at);
        Ok(session)
    }

    /// Looks up a live session.
    ///
    /// Unknown, expired and undecryptable tokens all resolve to `None`.
    pub async fn resolve(&self, token: &str) -> Result<Option<Session>> {
        let Some(sealed) = self.store.get(token).await? else {
            return Ok(None);
        };

        let plaintext = match self.cipher.open(token, &sealed) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                tracing::warn!("❌ Discarding unreadable session: {}", e);
                return Ok(None);
            }
        };

        let mut session: Session = match sonic_rs::from_slice(&plaintext) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("❌ Invalid session JSON: {}", e);
                return Ok(None);
            }
        };
        session.token = token.to_string();

        if session.is_expired_at(self.clock.now()) {
            tracing::debug!("Session expired at {}", session.expires_at);
            if let Err(e) = self.store.delete(token).await {
                tracing::warn!("Failed to purge expired session: {}", e);
            }
            return Ok(None);
        }

        Ok(Some(session))
    }

    /// Pushes the expiry of a live session to a full lifetime from now.
    ///
    /// Returns the renewed session, or `None` if the token is not live.
    pub async fn renew(&self, token: &str) -> Result<Option<Session>> {
        match self.resolve(token).await? {
            Some(session) => self.extend(session).await,
            None => Ok(None),
        }
    }

    /// Renews a session that was already resolved in this request.
    ///
    /// Returns `None` if the record was destroyed after it was resolved; the
    /// store is left untouched in that case.
    pub async fn extend(&self, mut session: Session) -> Result<Option<Session>> {
        session.expires_at = session.expires_at.max(self.clock.now() + self.lifetime);
        let (sealed, ttl) = self.seal(&session)?;
        if !self.store.replace(&session.token, sealed, ttl).await? {
            tracing::debug!("Session vanished before renewal");
            return Ok(None);
        }
        Ok(Some(session))
    }

    /// Removes a session. Destroying an unknown token is not an error.
    pub async fn destroy(&self, token: &str) -> Result<()> {
        self.store.delete(token).await?;
        tracing::debug!("Session destroyed");
        Ok(())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let (sealed, ttl) = self.seal(session)?;
        self.store.put(&session.token, sealed, ttl).await
    }

    fn seal(&self, session: &Session) -> Result<(Vec<u8>, std::time::Duration)> {
        let json = sonic_rs::to_vec(session)?;
        let sealed = self.cipher.seal(&session.token, &json)?;
        let ttl = (session.expires_at - self.clock.now())
            .to_std()
            .unwrap_or_default();
        Ok((sealed, ttl))
    }
}
