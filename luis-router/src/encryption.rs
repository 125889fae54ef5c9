//! Encryption of the identity claim.
//!
//! The router only needs an opaque ciphertext string, so the capability is a
//! trait. [`AesGcmEncryptor`] is the production cipher: AES-256-GCM with a
//! random 96-bit nonce prepended to the ciphertext, base64 encoded.

use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine, engine::general_purpose::STANDARD};
use rand::RngCore;
use router_common::PlatformError;
use zeroize::Zeroizing;

const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

/// Turns a plaintext into an opaque ciphertext string under a shared key.
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` with `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unusable or the cipher fails.
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, PlatformError>;
}

/// AES-256-GCM encryptor.
///
/// The shared key is taken as UTF-8 bytes and must be exactly 32 bytes long.
#[derive(Debug, Clone, Copy, Default)]
pub struct AesGcmEncryptor;

impl AesGcmEncryptor {
    /// Create a new encryptor.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Reverse [`Encryptor::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not base64, is too short, or fails
    /// authentication under `key`.
    pub fn decrypt(&self, ciphertext: &str, key: &str) -> Result<String, PlatformError> {
        let cipher = cipher_for(key)?;
        let data = STANDARD
            .decode(ciphertext)
            .map_err(|e| PlatformError::encryption(e.to_string()))?;

        if data.len() < NONCE_LEN {
            return Err(PlatformError::encryption("Data too short for decryption"));
        }

        let (nonce_bytes, sealed) = data.split_at(NONCE_LEN);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|e| PlatformError::encryption(e.to_string()))?;

        String::from_utf8(plaintext).map_err(|e| PlatformError::encryption(e.to_string()))
    }
}

impl Encryptor for AesGcmEncryptor {
    fn encrypt(&self, plaintext: &str, key: &str) -> Result<String, PlatformError> {
        let cipher = cipher_for(key)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let sealed = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_bytes())
            .map_err(|e| PlatformError::encryption(e.to_string()))?;

        let mut out = nonce_bytes.to_vec();
        out.extend(sealed);
        Ok(STANDARD.encode(out))
    }
}

fn cipher_for(key: &str) -> Result<Aes256Gcm, PlatformError> {
    if key.is_empty() {
        return Err(PlatformError::encryption("Encryption key is empty"));
    }

    let raw = key.as_bytes();
    if raw.len() != KEY_LEN {
        return Err(PlatformError::encryption(format!(
            "Encryption key must be {KEY_LEN} bytes, got {}",
            raw.len()
        )));
    }

    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    bytes.copy_from_slice(raw);

    Ok(Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(bytes.as_slice())))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_encrypt_decrypt() {
        let encryptor = AesGcmEncryptor::new();
        let plaintext = r#"{"appcode":"APP1","timestamp":"2024-05-01T10:00:00Z"}"#;

        let ciphertext = encryptor.encrypt(plaintext, KEY).unwrap();
        assert_ne!(ciphertext, plaintext);
        assert_eq!(encryptor.decrypt(&ciphertext, KEY).unwrap(), plaintext);
    }

    #[test]
    fn test_nonce_makes_ciphertexts_differ() {
        let encryptor = AesGcmEncryptor::new();
        let a = encryptor.encrypt("same", KEY).unwrap();
        let b = encryptor.encrypt("same", KEY).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_wrong_length_key_rejected() {
        let encryptor = AesGcmEncryptor::new();

        for key in ["key123", "0123456789abcdef0123456789abcdef0", "0123456789abcdef0123456789abcde"] {
            let err = encryptor.encrypt("payload", key).unwrap_err();
            assert!(matches!(err, PlatformError::Encryption(_)), "{key} should be rejected");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let encryptor = AesGcmEncryptor::new();
        let ciphertext = encryptor.encrypt("payload", KEY).unwrap();
        assert!(encryptor.decrypt(&ciphertext, "fedcba9876543210fedcba9876543210").is_err());
    }

    #[test]
    fn test_empty_key_rejected() {
        let err = AesGcmEncryptor::new().encrypt("payload", "").unwrap_err();
        assert!(matches!(err, PlatformError::Encryption(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_truncated_ciphertext_rejected() {
        let encryptor = AesGcmEncryptor::new();
        assert!(encryptor.decrypt("AAAA", KEY).is_err());
        assert!(encryptor.decrypt("not base64!", KEY).is_err());
    }
}
