use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// The default memory cost for Argon2 in KiB.
pub const ARGON2_MEMORY_KIB: u32 = 19 * 1024;
/// The default number of iterations for Argon2.
pub const ARGON2_ITERATIONS: u32 = 3;
/// The default parallelism factor for Argon2.
pub const ARGON2_PARALLELISM: u32 = 6;

/// Work factor of the adaptive hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: ARGON2_MEMORY_KIB,
            iterations: ARGON2_ITERATIONS,
            parallelism: ARGON2_PARALLELISM,
        }
    }
}

/// Salted Argon2id hashing of account passwords.
///
/// Both operations run on the blocking pool so a slow hash never stalls the
/// request workers.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: HashCost,
}

impl PasswordHasher {
    pub fn new(cost: HashCost) -> Self {
        Self { cost }
    }

    /// Hashes a password using Argon2id.
    ///
    /// # Arguments
    ///
    /// * `password` - The password to hash.
    ///
    /// # Returns
    ///
    /// A `Result` containing the PHC-formatted hash.
    pub async fn hash(&self, password: &str) -> Result<String> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let cost = self.cost;
        tokio::task::spawn_blocking(move || hash_blocking(&password, cost))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    /// Verifies a password against a stored hash.
    ///
    /// A mismatch is `Ok(false)`; only an unreadable hash is an error.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let password = Zeroizing::new(password.as_bytes().to_vec());
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || verify_blocking(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }

    /// Runs a verification that can never succeed, at the configured cost.
    ///
    /// Used when no account matches so the lookup miss costs as much as a
    /// wrong password.
    pub async fn verify_decoy(&self, password: &str) -> Result<()> {
        self.verify(password, &self.decoy_hash()).await.map(drop)
    }

    fn decoy_hash(&self) -> String {
        format!(
            "$argon2id$v=19$m={},t={},p={}${}${}",
            self.cost.memory_kib,
            self.cost.iterations,
            self.cost.parallelism,
            DECOY_SALT,
            "A".repeat(43),
        )
    }
}

/// Base64 of `somesaltsomesalt`.
const DECOY_SALT: &str = "c29tZXNhbHRzb21lc2FsdA";

fn hash_blocking(password: &[u8], cost: HashCost) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Encryption(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(cost.memory_kib)
            .t_cost(cost.iterations)
            .p_cost(cost.parallelism)
            .build()
            .map_err(|e| AppError::Encryption(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(password, &salt)
        .map_err(|e| AppError::Encryption(format!("Argon2 hash error: {}", e)))?
        .to_string();

    tracing::debug!("Password hashed successfully with Argon2");
    Ok(password_hash)
}

fn verify_blocking(password: &[u8], hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Encryption(format!("Hash parse error: {}", e)))?;
    // Parameters come from the PHC string, not from the configured cost.
    let matches = Argon2::default()
        .verify_password(password, &parsed_hash)
        .is_ok();

    tracing::debug!("Password verification completed");
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::new(HashCost { memory_kib: 64, iterations: 1, parallelism: 1 })
    }

    #[tokio::test]
    async fn hash_verifies_only_the_original_password() {
        let hasher = cheap();
        let hash = hasher.hash("pw123").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("pw123"));
        assert!(hasher.verify("pw123", &hash).await.unwrap());
        assert!(!hasher.verify("wrong", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_salted() {
        let hasher = cheap();
        let first = hasher.hash("same").await.unwrap();
        let second = hasher.hash("same").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn unreadable_hash_is_an_error() {
        let err = cheap().verify("pw", "not-a-phc-string").await.unwrap_err();
        assert!(matches!(err, AppError::Encryption(_)));
    }

    #[tokio::test]
    async fn decoy_hash_parses_with_configured_cost() {
        let hasher = cheap();
        assert!(hasher.decoy_hash().starts_with("$argon2id$v=19$m=64,t=1,p=1$"));
        assert!(hasher.verify_decoy("anything").await.is_ok());
        assert!(!hasher.verify("", &hasher.decoy_hash()).await.unwrap());
    }

    #[test]
    fn default_cost_matches_constants() {
        let cost = HashCost::default();
        assert_eq!(cost.memory_kib, ARGON2_MEMORY_KIB);
        assert_eq!(cost.iterations, ARGON2_ITERATIONS);
        assert_eq!(cost.parallelism, ARGON2_PARALLELISM);
    }
}
