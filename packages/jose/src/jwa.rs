//! JSON Web Algorithms (RFC 7518) names and the negotiated algorithm triple
//!
//! The three JWA registries used by this crate are closed enumerations. A
//! string that is not a member of the registry fails to parse, which is the
//! validity check for configuration values.

use crate::error::{JoseError, JoseResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Returns `true` if the algorithm is empty or has the literal value `"none"`.
///
/// Such values are treated as absent: the corresponding stage is skipped.
#[inline]
#[must_use]
pub fn is_none(alg: &str) -> bool {
    alg.is_empty() || alg == "none"
}

macro_rules! jwa_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $invalid:expr, {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every member of the registry.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The registered JWA name.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = JoseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err($invalid),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

jwa_enum! {
    /// JWS signature algorithms
    SignatureAlgorithm, JoseError::InvalidSignatureAlg, {
        /// HMAC using SHA-256
        HS256 => "HS256",
        /// HMAC using SHA-384
        HS384 => "HS384",
        /// HMAC using SHA-512
        HS512 => "HS512",
        /// RSASSA-PKCS1-v1_5 using SHA-256
        RS256 => "RS256",
        /// RSASSA-PKCS1-v1_5 using SHA-384
        RS384 => "RS384",
        /// RSASSA-PKCS1-v1_5 using SHA-512
        RS512 => "RS512",
        /// RSASSA-PSS using SHA-256
        PS256 => "PS256",
        /// RSASSA-PSS using SHA-384
        PS384 => "PS384",
        /// RSASSA-PSS using SHA-512
        PS512 => "PS512",
        /// ECDSA using P-256 and SHA-256
        ES256 => "ES256",
        /// ECDSA using P-384 and SHA-384
        ES384 => "ES384",
        /// ECDSA using P-521 and SHA-512
        ES512 => "ES512",
        /// EdDSA over Ed25519 (RFC 8037)
        EdDSA => "EdDSA",
    }
}

jwa_enum! {
    /// JWE key management algorithms, the "encryption algorithm" of OpenID
    /// Connect client metadata
    KeyAlgorithm, JoseError::InvalidEncryptionAlg, {
        /// Ed25519 (registered by the go-jose family, never usable for JWE)
        Ed25519 => "ED25519",
        /// RSAES-PKCS1-v1_5
        Rsa1_5 => "RSA1_5",
        /// RSAES OAEP using default parameters (SHA-1)
        RsaOaep => "RSA-OAEP",
        /// RSAES OAEP using SHA-256 and MGF1 with SHA-256
        RsaOaep256 => "RSA-OAEP-256",
        /// AES Key Wrap with a 128-bit key
        A128Kw => "A128KW",
        /// AES Key Wrap with a 192-bit key
        A192Kw => "A192KW",
        /// AES Key Wrap with a 256-bit key
        A256Kw => "A256KW",
        /// Direct use of a shared symmetric key as the CEK
        Dir => "dir",
        /// ECDH Ephemeral Static key agreement using Concat KDF
        EcdhEs => "ECDH-ES",
        /// ECDH-ES using Concat KDF and CEK wrapped with A128KW
        EcdhEsA128Kw => "ECDH-ES+A128KW",
        /// ECDH-ES using Concat KDF and CEK wrapped with A192KW
        EcdhEsA192Kw => "ECDH-ES+A192KW",
        /// ECDH-ES using Concat KDF and CEK wrapped with A256KW
        EcdhEsA256Kw => "ECDH-ES+A256KW",
        /// Key wrapping with AES GCM using a 128-bit key
        A128GcmKw => "A128GCMKW",
        /// Key wrapping with AES GCM using a 192-bit key
        A192GcmKw => "A192GCMKW",
        /// Key wrapping with AES GCM using a 256-bit key
        A256GcmKw => "A256GCMKW",
        /// PBES2 with HMAC SHA-256 and A128KW wrapping
        Pbes2Hs256A128Kw => "PBES2-HS256+A128KW",
        /// PBES2 with HMAC SHA-384 and A192KW wrapping
        Pbes2Hs384A192Kw => "PBES2-HS384+A192KW",
        /// PBES2 with HMAC SHA-512 and A256KW wrapping
        Pbes2Hs512A256Kw => "PBES2-HS512+A256KW",
    }
}

jwa_enum! {
    /// JWE content encryption algorithms, the "encryption encoding" of OpenID
    /// Connect client metadata
    ContentEncryption, JoseError::InvalidEncryptionEnc, {
        /// AES_128_CBC_HMAC_SHA_256
        A128CbcHs256 => "A128CBC-HS256",
        /// AES_192_CBC_HMAC_SHA_384
        A192CbcHs384 => "A192CBC-HS384",
        /// AES_256_CBC_HMAC_SHA_512
        A256CbcHs512 => "A256CBC-HS512",
        /// AES GCM using a 128-bit key
        A128Gcm => "A128GCM",
        /// AES GCM using a 192-bit key
        A192Gcm => "A192GCM",
        /// AES GCM using a 256-bit key
        A256Gcm => "A256GCM",
    }
}

impl ContentEncryption {
    /// Length in bytes of the content encryption key.
    #[must_use]
    pub const fn key_len(&self) -> usize {
        match self {
            Self::A128Gcm => 16,
            Self::A192Gcm => 24,
            Self::A256Gcm | Self::A128CbcHs256 => 32,
            Self::A192CbcHs384 => 48,
            Self::A256CbcHs512 => 64,
        }
    }
}

impl KeyAlgorithm {
    /// Key length in bytes of the AES key wrap step, if this algorithm wraps the CEK.
    #[must_use]
    pub const fn wrap_key_len(&self) -> Option<usize> {
        match self {
            Self::A128Kw | Self::EcdhEsA128Kw | Self::Pbes2Hs256A128Kw => Some(16),
            Self::A192Kw | Self::EcdhEsA192Kw | Self::Pbes2Hs384A192Kw => Some(24),
            Self::A256Kw | Self::EcdhEsA256Kw | Self::Pbes2Hs512A256Kw => Some(32),
            _ => None,
        }
    }

    /// Key length in bytes of the AES-GCM key that encrypts the CEK (A*GCMKW).
    #[must_use]
    pub const fn gcm_key_len(&self) -> Option<usize> {
        match self {
            Self::A128GcmKw => Some(16),
            Self::A192GcmKw => Some(24),
            Self::A256GcmKw => Some(32),
            _ => None,
        }
    }
}

/// Parse an optional JWA value: none-strings map to `None`.
fn parse_optional<T: FromStr<Err = JoseError>>(s: &str) -> JoseResult<Option<T>> {
    if is_none(s) { Ok(None) } else { s.parse().map(Some) }
}

/// Checks that `s` is a JWA signature algorithm. Empty and `"none"` are rejected.
///
/// # Errors
/// Returns [`JoseError::InvalidSignatureAlg`] otherwise.
pub fn valid_signature_alg(s: &str) -> JoseResult<()> {
    s.parse::<SignatureAlgorithm>().map(|_| ())
}

/// Like [`valid_signature_alg`] but accepts empty and `"none"`.
///
/// # Errors
/// Returns [`JoseError::InvalidSignatureAlg`] for unknown names.
pub fn valid_optional_signature_alg(s: &str) -> JoseResult<()> {
    parse_optional::<SignatureAlgorithm>(s).map(|_| ())
}

/// Checks that `s` is a JWA key management algorithm. Empty and `"none"` are rejected.
///
/// # Errors
/// Returns [`JoseError::InvalidEncryptionAlg`] otherwise.
pub fn valid_encryption_alg(s: &str) -> JoseResult<()> {
    s.parse::<KeyAlgorithm>().map(|_| ())
}

/// Like [`valid_encryption_alg`] but accepts empty and `"none"`.
///
/// # Errors
/// Returns [`JoseError::InvalidEncryptionAlg`] for unknown names.
pub fn valid_optional_encryption_alg(s: &str) -> JoseResult<()> {
    parse_optional::<KeyAlgorithm>(s).map(|_| ())
}

/// Checks that `s` is a JWA content encryption algorithm. Empty and `"none"` are rejected.
///
/// # Errors
/// Returns [`JoseError::InvalidEncryptionEnc`] otherwise.
pub fn valid_encryption_enc(s: &str) -> JoseResult<()> {
    s.parse::<ContentEncryption>().map(|_| ())
}

/// Like [`valid_encryption_enc`] but accepts empty and `"none"`.
///
/// # Errors
/// Returns [`JoseError::InvalidEncryptionEnc`] for unknown names.
pub fn valid_optional_encryption_enc(s: &str) -> JoseResult<()> {
    parse_optional::<ContentEncryption>(s).map(|_| ())
}

/// The negotiated algorithm triple. `None` in a slot means the stage does not apply.
///
/// As a decoding hint the triple pins the header algorithms. The `*_from_key`
/// flags instead enable a stage whose algorithm is read from the token header
/// and accepted only when the resolved key declares that same algorithm.
/// Encoding ignores the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Algs {
    /// Signature algorithm
    pub sig: Option<SignatureAlgorithm>,
    /// Key management ("encryption") algorithm
    pub encrypt: Option<KeyAlgorithm>,
    /// Content encryption ("encoding") algorithm
    pub encode: Option<ContentEncryption>,
    /// Verify with the algorithm declared by the verification key
    pub sig_from_key: bool,
    /// Decrypt with the key management algorithm declared by the decryption
    /// key; any content encryption algorithm is accepted
    pub encrypt_from_key: bool,
}

impl Algs {
    /// A triple with every stage disabled.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            sig: None,
            encrypt: None,
            encode: None,
            sig_from_key: false,
            encrypt_from_key: false,
        }
    }

    /// A signing-only triple.
    #[must_use]
    pub const fn signed(sig: SignatureAlgorithm) -> Self {
        Self {
            sig: Some(sig),
            ..Self::none()
        }
    }

    /// An encryption-only triple.
    #[must_use]
    pub const fn encrypted(encrypt: KeyAlgorithm, encode: ContentEncryption) -> Self {
        Self {
            encrypt: Some(encrypt),
            encode: Some(encode),
            ..Self::none()
        }
    }

    /// A decoding hint that verifies with whatever algorithm the verification
    /// key declares.
    #[must_use]
    pub const fn signed_by_key() -> Self {
        Self {
            sig_from_key: true,
            ..Self::none()
        }
    }

    /// A decoding hint that decrypts with whatever key management algorithm
    /// the decryption key declares.
    #[must_use]
    pub const fn encrypted_by_key() -> Self {
        Self {
            encrypt_from_key: true,
            ..Self::none()
        }
    }

    /// Adds a key-declared encryption stage to this decoding hint.
    #[must_use]
    pub const fn with_encryption_by_key(mut self) -> Self {
        self.encrypt_from_key = true;
        self
    }

    /// Adds the encryption stage to this triple.
    #[must_use]
    pub const fn with_encryption(mut self, encrypt: KeyAlgorithm, encode: ContentEncryption) -> Self {
        self.encrypt = Some(encrypt);
        self.encode = Some(encode);
        self
    }

    /// Builds a triple from JWA strings, as found in client metadata.
    /// Empty strings and `"none"` disable the slot.
    ///
    /// # Errors
    /// Returns the matching `Invalid*` error when a value is not a JWA name.
    pub fn parse(sig: &str, encrypt: &str, encode: &str) -> JoseResult<Self> {
        Ok(Self {
            sig: parse_optional(sig)?,
            encrypt: parse_optional(encrypt)?,
            encode: parse_optional(encode)?,
            ..Self::none()
        })
    }

    /// `true` when the signature stage applies.
    #[must_use]
    pub const fn signs(&self) -> bool {
        self.sig.is_some() || self.sig_from_key
    }

    /// `true` when both the key management and the content encryption
    /// algorithms are present, or the encryption stage is key-declared.
    #[must_use]
    pub const fn encrypts(&self) -> bool {
        (self.encrypt.is_some() && self.encode.is_some()) || self.encrypt_from_key
    }
}
