use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use aes_gcm::aead::rand_core::RngCore;
use zeroize::Zeroizing;
use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Encrypts session payloads before they reach the session store.
///
/// Sealed records are laid out as `[ciphertext || nonce]` with the nonce in the
/// last 12 bytes. The session token is bound in as associated data, so a record
/// copied under a different key fails to open.
#[derive(Clone)]
pub struct SessionCipher {
    key: Zeroizing<[u8; KEY_SIZE]>,
}

impl SessionCipher {
    /// Creates a new `SessionCipher`.
    ///
    /// # Arguments
    ///
    /// * `key` - The 32-byte session encryption key.
    pub fn new(key: &[u8]) -> Result<Self> {
        let key: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| AppError::Encryption("Invalid session key size".to_string()))?;
        Ok(Self { key: Zeroizing::new(key) })
    }

    /// Encrypts `plaintext` for storage under `token`.
    pub fn seal(&self, token: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
        let cipher = Aes256Gcm::new((&*self.key).into());

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let mut sealed = cipher
            .encrypt(&nonce, Payload { msg: plaintext, aad: token.as_bytes() })
            .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;
        sealed.extend_from_slice(&nonce_bytes);
        Ok(sealed)
    }

    /// Decrypts a record previously produced by [`SessionCipher::seal`] for `token`.
    pub fn open(&self, token: &str, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if sealed.len() < NONCE_SIZE {
            return Err(AppError::Encryption("Sealed session too short".to_string()));
        }
        let (ciphertext, nonce) = sealed.split_at(sealed.len() - NONCE_SIZE);
        let cipher = Aes256Gcm::new((&*self.key).into());

        cipher
            .decrypt(Nonce::from_slice(nonce), Payload { msg: ciphertext, aad: token.as_bytes() })
            .map(Zeroizing::new)
            .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))
    }
}
