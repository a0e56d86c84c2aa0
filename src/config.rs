use std::env;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::password::HashCost;

/// Minimum length of the cookie signing secret in bytes.
pub const MIN_COOKIE_SECRET_LEN: usize = 64;
/// Exact length of the session encryption key in bytes.
pub const SESSION_KEY_LEN: usize = 32;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database holding user records.
    pub database_url: String,
    /// The URL of the Redis server holding sessions.
    pub redis_url: String,
    /// The TCP port to listen on.
    pub port: u16,
    /// Secret used to sign the session cookie.
    pub cookie_secret: Zeroizing<Vec<u8>>,
    /// Key used to encrypt session payloads at rest.
    pub session_key: Zeroizing<Vec<u8>>,
    /// Work factor of the password hash.
    pub hash_cost: HashCost,
    /// Directory served for unmatched paths.
    pub public_dir: String,
    /// Whether cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

/// Decodes a hex-encoded secret and wipes the source string.
fn decode_secret(var: &str) -> Result<Zeroizing<Vec<u8>>> {
    let mut raw = env::var(var).with_context(|| {
        format!("{var} must be set (generate with: openssl rand -hex 64)")
    })?;
    let bytes = hex::decode(raw.trim())
        .with_context(|| format!("{var} must be valid hexadecimal"));
    raw.zeroize();
    Ok(Zeroizing::new(bytes?))
}

fn parse_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("Invalid {var}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let cookie_secret = decode_secret("COOKIE_SECRET")?;
        let session_key = decode_secret("SESSION_ENCRYPTION_KEY")?;

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or("PASSWORD_HASH_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_or("PASSWORD_HASH_ITERATIONS", defaults.iterations)?,
            parallelism: parse_or("PASSWORD_HASH_PARALLELISM", defaults.parallelism)?,
        };

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            port: parse_or("PORT", 8008)?,
            cookie_secret,
            session_key,
            hash_cost,
            public_dir: env::var("PUBLIC_DIR").unwrap_or_else(|_| "public".to_string()),
            secure_cookies: env::var("APP_ENV")
                .unwrap_or_else(|_| "development".to_string()) == "production",
        };
        config.check_secrets()?;
        Ok(config)
    }

    /// Rejects secrets of the wrong size and a session key that reuses the cookie secret.
    pub fn check_secrets(&self) -> Result<()> {
        if self.cookie_secret.len() < MIN_COOKIE_SECRET_LEN {
            anyhow::bail!(
                "COOKIE_SECRET must be at least {MIN_COOKIE_SECRET_LEN} bytes ({} hex characters)",
                MIN_COOKIE_SECRET_LEN * 2
            );
        }
        if self.session_key.len() != SESSION_KEY_LEN {
            anyhow::bail!(
                "SESSION_ENCRYPTION_KEY must be exactly {SESSION_KEY_LEN} bytes ({} hex characters)",
                SESSION_KEY_LEN * 2
            );
        }
        if self
            .cookie_secret
            .windows(SESSION_KEY_LEN)
            .any(|window| window == self.session_key.as_slice())
        {
            anyhow::bail!("SESSION_ENCRYPTION_KEY must be distinct from COOKIE_SECRET");
        }
        Ok(())
    }
}

#[cfg(test)]
impl Config {
    /// A configuration with fixed secrets and a cheap hash.
    pub(crate) fn for_tests() -> Self {
        Self {
            database_url: "postgres://localhost/gatehouse".into(),
            redis_url: "redis://127.0.0.1:6379".into(),
            port: 8008,
            cookie_secret: Zeroizing::new(vec![1; MIN_COOKIE_SECRET_LEN]),
            session_key: Zeroizing::new(vec![2; SESSION_KEY_LEN]),
            hash_cost: HashCost { memory_kib: 64, iterations: 1, parallelism: 1 },
            public_dir: "public".into(),
            secure_cookies: false,
        }
    }
}
