//! Error types for token encoding, decoding and claim validation

use thiserror::Error;

/// Result type for JOSE operations
pub type JoseResult<T> = Result<T, JoseError>;

/// Errors raised while encoding or decoding tokens and while handling keys
#[derive(Debug, Error)]
pub enum JoseError {
    /// No key could be resolved for the signing stage
    #[error("failed to resolve signing key")]
    NoSigningKey,

    /// No key could be resolved for the encryption stage
    #[error("failed to resolve encryption key")]
    NoEncryptionKey,

    /// No key could be resolved to verify the token signature
    #[error("failed to resolve key to verify signature")]
    NoVerificationKey,

    /// No key could be resolved to decrypt the token
    #[error("failed to resolve decryption key")]
    NoDecryptionKey,

    /// The serialized token is malformed
    #[error("invalid jwt/jwe token: {0}")]
    InvalidToken(String),

    /// Signature verification failed
    #[error("invalid token signature")]
    InvalidSignature,

    /// Decryption failed: wrong key, tampered ciphertext or corrupted padding
    #[error("token decryption failed")]
    DecryptionFailed,

    /// The token header names a different algorithm than expected
    #[error("algorithm mismatch: expected {expected}, found {found}")]
    AlgorithmMismatch {
        /// Algorithm the caller or the key expects
        expected: String,
        /// Algorithm found in the token header
        found: String,
    },

    /// The algorithm is a valid JWA name but is not implemented
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The key material cannot be used for the requested operation
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Not a JWA signature algorithm
    #[error("signature algorithm is invalid")]
    InvalidSignatureAlg,

    /// Not a JWA key management algorithm
    #[error("encryption algorithm is invalid")]
    InvalidEncryptionAlg,

    /// Not a JWA content encryption algorithm
    #[error("encryption encoding is invalid")]
    InvalidEncryptionEnc,

    /// JSON (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading a key set failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A claim rule rejected the decoded claims
    #[error(transparent)]
    Claims(#[from] ClaimsError),
}

impl JoseError {
    /// Create an invalid token error
    #[must_use]
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Create an invalid key error
    #[must_use]
    pub fn invalid_key(msg: impl Into<String>) -> Self {
        Self::InvalidKey(msg.into())
    }

    /// Create an unsupported algorithm error
    #[must_use]
    pub fn unsupported_algorithm(alg: impl Into<String>) -> Self {
        Self::UnsupportedAlgorithm(alg.into())
    }

    /// Create an algorithm mismatch error
    #[must_use]
    pub fn algorithm_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::AlgorithmMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Returns `true` if no key could be resolved for one of the stages.
    #[must_use]
    pub fn is_key_resolution_error(&self) -> bool {
        matches!(
            self,
            Self::NoSigningKey
                | Self::NoEncryptionKey
                | Self::NoVerificationKey
                | Self::NoDecryptionKey
        )
    }

    /// Returns `true` if a signature or decryption check failed.
    #[must_use]
    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Self::InvalidSignature | Self::DecryptionFailed)
    }
}

/// Claim rule violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClaimsError {
    /// `jti` is absent or empty
    #[error("jti claim is absent")]
    AbsentJti,

    /// `sub` is absent or not among the allowed subjects
    #[error("sub claim is invalid")]
    InvalidSub,

    /// `aud` does not contain every expected audience
    #[error("aud claim is invalid")]
    InvalidAud,

    /// `iss` is absent or not the expected issuer
    #[error("iss claim is invalid")]
    InvalidIss,

    /// `exp` is in the past beyond the allowed leeway
    #[error("exp claim is invalid because token has expired")]
    ExpExpired,

    /// `iat` is in the future beyond the allowed leeway
    #[error("iat claim is invalid because token is issued in future")]
    IatInFuture,

    /// `nbf` is in the future beyond the allowed leeway
    #[error("nbf claim is invalid because token is used too soon")]
    NbfTooSoon,

    /// `scope` does not grant every required scope
    #[error("insufficient scope")]
    InsufficientScope,

    /// Failure reported by a caller supplied rule
    #[error("claim rule failed: {0}")]
    Custom(String),
}
