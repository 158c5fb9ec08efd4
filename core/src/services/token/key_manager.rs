//! RS256 key management for JWT signing and verification

use std::fs;
use std::path::Path;

use jsonwebtoken::{DecodingKey, EncodingKey};

use vg_shared::config::JwtConfig;

use crate::errors::{DomainError, TokenError};

/// Manager for the RS256 keypair used in JWT operations
///
/// The private key signs, the public key verifies; only the public key
/// needs to be distributed to verifying services.
#[derive(Clone)]
pub struct Rs256KeyManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for Rs256KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rs256KeyManager").finish_non_exhaustive()
    }
}

impl Rs256KeyManager {
    /// Creates a key manager from PEM key files
    pub fn new<P: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, DomainError> {
        let private_key_pem = fs::read(private_key_path.as_ref()).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Failed to read private key: {}", e),
            })
        })?;
        let public_key_pem = fs::read(public_key_path.as_ref()).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Failed to read public key: {}", e),
            })
        })?;

        Self::from_pem_bytes(&private_key_pem, &public_key_pem)
    }

    /// Creates a key manager from the application JWT configuration
    pub fn from_config(config: &JwtConfig) -> Result<Self, DomainError> {
        Self::new(&config.private_key_path, &config.public_key_path)
    }

    /// Creates a key manager from PEM strings (useful for testing or
    /// embedded keys)
    pub fn from_pem_strings(
        private_key_pem: &str,
        public_key_pem: &str,
    ) -> Result<Self, DomainError> {
        Self::from_pem_bytes(private_key_pem.as_bytes(), public_key_pem.as_bytes())
    }

    fn from_pem_bytes(private_key_pem: &[u8], public_key_pem: &[u8]) -> Result<Self, DomainError> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Invalid private key format: {}", e),
            })
        })?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem).map_err(|e| {
            DomainError::Token(TokenError::KeyLoadError {
                message: format!("Invalid public key format: {}", e),
            })
        })?;

        Ok(Self {
            encoding_key,
            decoding_key,
        })
    }

    /// Returns the encoding key for signing JWTs
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Returns the decoding key for verifying JWTs
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}
