//! Signing key loading for HS256 and RS256

use std::fs;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use tg_shared::config::JwtConfig;
use tg_shared::utils::fingerprint;

use crate::errors::DomainError;

/// Minimum HMAC key length in bytes (256 bits)
pub const MIN_HMAC_KEY_BYTES: usize = 32;

/// The single active signing key and its verifying counterpart
#[derive(Clone)]
pub struct SigningKeys {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// HMAC key length in bits; not tracked for RSA
    bits: Option<usize>,
    /// First 16 hex chars of SHA-256 over the key material
    fingerprint: String,
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &self.algorithm)
            .field("bits", &self.bits)
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

impl SigningKeys {
    /// HS256 key from raw bytes
    ///
    /// # Errors
    ///
    /// * `WeakKeyConfigured` - fewer than 256 bits of key material
    pub fn hmac(secret: &[u8]) -> Result<Self, DomainError> {
        if secret.len() < MIN_HMAC_KEY_BYTES {
            return Err(DomainError::WeakKeyConfigured {
                bits: secret.len() * 8,
            });
        }

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            bits: Some(secret.len() * 8),
            fingerprint: fingerprint(secret),
        })
    }

    /// HS256 key from a configured secret string
    ///
    /// Surrounding whitespace and one pair of matching quotes are stripped,
    /// since env files often carry them. With `is_base64` the remainder is
    /// decoded as standard Base64, otherwise its UTF-8 bytes are used.
    pub fn hmac_from_secret(raw: &str, is_base64: bool) -> Result<Self, DomainError> {
        let secret = strip_quotes(raw);

        if is_base64 {
            let bytes = STANDARD
                .decode(secret)
                .map_err(|e| DomainError::Configuration {
                    message: format!("signing secret is not valid Base64: {}", e),
                })?;
            Self::hmac(&bytes)
        } else {
            Self::hmac(secret.as_bytes())
        }
    }

    /// RS256 keys from PEM files
    pub fn rs256_from_files<P: AsRef<Path>>(
        private_key_path: P,
        public_key_path: P,
    ) -> Result<Self, DomainError> {
        let private_key_pem = fs::read(private_key_path.as_ref()).map_err(|e| DomainError::KeyLoad {
            message: format!("Failed to read private key: {}", e),
        })?;
        let public_key_pem = fs::read(public_key_path.as_ref()).map_err(|e| DomainError::KeyLoad {
            message: format!("Failed to read public key: {}", e),
        })?;

        Self::rs256_from_pem(&private_key_pem, &public_key_pem)
    }

    /// RS256 keys from PEM bytes
    pub fn rs256_from_pem(private_key_pem: &[u8], public_key_pem: &[u8]) -> Result<Self, DomainError> {
        let encoding_key =
            EncodingKey::from_rsa_pem(private_key_pem).map_err(|e| DomainError::KeyLoad {
                message: format!("Invalid private key format: {}", e),
            })?;
        let decoding_key =
            DecodingKey::from_rsa_pem(public_key_pem).map_err(|e| DomainError::KeyLoad {
                message: format!("Invalid public key format: {}", e),
            })?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
            bits: None,
            fingerprint: fingerprint(public_key_pem),
        })
    }

    /// Load whatever `config.algorithm` names
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        match super::config::parse_algorithm(&config.algorithm)? {
            Algorithm::RS256 => {
                let (private, public) = match (&config.private_key_path, &config.public_key_path) {
                    (Some(private), Some(public)) => (private, public),
                    _ => {
                        return Err(DomainError::Configuration {
                            message: "RS256 requires private_key_path and public_key_path"
                                .to_string(),
                        })
                    }
                };
                Self::rs256_from_files(private, public)
            }
            _ => Self::hmac_from_secret(&config.secret, config.secret_is_base64),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }

    pub fn bits(&self) -> Option<usize> {
        self.bits
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    for quote in ['"', '\''] {
        if trimmed.len() >= 2 && trimmed.starts_with(quote) && trimmed.ends_with(quote) {
            return trimmed[1..trimmed.len() - 1].trim();
        }
    }
    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("  \"abc\"  "), "abc");
        assert_eq!(strip_quotes("'abc'"), "abc");
        assert_eq!(strip_quotes("\"abc"), "\"abc");
        assert_eq!(strip_quotes("abc"), "abc");
    }
}
