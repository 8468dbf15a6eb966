//! Credential bridge
//!
//! Decrypts the opaque encrypted token a caller supplies into a
//! request-scoped [`Secret`]. The bridge keeps only its sealing key: it
//! caches nothing and logs neither side of the exchange.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::{Digest, Sha256};

use crate::error::EngineError;

/// A decrypted upstream credential.
///
/// Owned by exactly one in-flight request. The plaintext is overwritten
/// with zeros on drop, so it does not outlive the request on any exit
/// path, including cancellation.
pub struct Secret(Vec<u8>);

impl Secret {
    fn from_plaintext(bytes: Vec<u8>) -> Result<Self, EngineError> {
        if bytes.is_empty() || std::str::from_utf8(&bytes).is_err() {
            return Err(EngineError::InvalidToken);
        }
        Ok(Secret(bytes))
    }

    /// Borrow the plaintext for an upstream request header.
    pub fn expose(&self) -> &str {
        // UTF-8 was validated at construction
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        for byte in self.0.iter_mut() {
            *byte = 0;
        }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(****)")
    }
}

/// Decrypts caller-supplied encrypted tokens.
///
/// Wire format: standard base64 of `nonce || ciphertext || tag` under
/// AES-256-GCM, so tampering is detected rather than silently accepted.
pub struct TokenBridge {
    key: LessSafeKey,
}

impl TokenBridge {
    /// Build a bridge from exact 32-byte key material.
    pub fn new(key_bytes: &[u8; 32]) -> Result<Self, EngineError> {
        let unbound = UnboundKey::new(&AES_256_GCM, key_bytes)
            .map_err(|_| EngineError::Configuration("invalid token key material".to_string()))?;
        Ok(TokenBridge {
            key: LessSafeKey::new(unbound),
        })
    }

    /// Build a bridge from an operator-supplied key string.
    ///
    /// The AES key is the SHA-256 digest of the string, so any non-empty
    /// value yields full-length key material.
    pub fn from_key_material(material: &str) -> Result<Self, EngineError> {
        if material.is_empty() {
            return Err(EngineError::Configuration(
                "token key must not be empty".to_string(),
            ));
        }
        let digest = Sha256::digest(material.as_bytes());
        let mut key_bytes = [0u8; 32];
        key_bytes.copy_from_slice(&digest);
        Self::new(&key_bytes)
    }

    /// Decrypt an encrypted token into a request-scoped secret.
    ///
    /// Every structural defect, from wrong encoding to a flipped bit
    /// anywhere in the buffer, fails with `InvalidToken` and nothing else.
    pub fn decrypt(&self, encrypted: &str) -> Result<Secret, EngineError> {
        if encrypted.is_empty() {
            return Err(EngineError::InvalidToken);
        }
        let raw = BASE64
            .decode(encrypted)
            .map_err(|_| EngineError::InvalidToken)?;
        if raw.len() <= NONCE_LEN {
            return Err(EngineError::InvalidToken);
        }

        let (nonce_bytes, sealed) = raw.split_at(NONCE_LEN);
        let nonce =
            Nonce::try_assume_unique_for_key(nonce_bytes).map_err(|_| EngineError::InvalidToken)?;

        let mut in_out = sealed.to_vec();
        let plaintext = self
            .key
            .open_in_place(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| EngineError::InvalidToken)?;

        let secret = Secret::from_plaintext(plaintext.to_vec());
        // The scratch buffer also saw the plaintext
        in_out.iter_mut().for_each(|byte| *byte = 0);
        secret
    }

    /// Encrypt a plaintext token for transport.
    ///
    /// Lives on the issuing side of the exchange; request handling only
    /// ever decrypts.
    pub fn encrypt(&self, token: &str) -> Result<String, EngineError> {
        let rng = SystemRandom::new();
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rng.fill(&mut nonce_bytes)
            .map_err(|_| EngineError::Configuration("no entropy source available".to_string()))?;

        let nonce = Nonce::assume_unique_for_key(nonce_bytes);
        let mut in_out = token.as_bytes().to_vec();
        self.key
            .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
            .map_err(|_| EngineError::Configuration("encryption failed".to_string()))?;

        Ok(BASE64.encode([nonce_bytes.as_slice(), &in_out].concat()))
    }
}
