//! A single JSON Web Key: identifier, declared usage and algorithm, and material

use super::json::Jwk;
use crate::error::JoseResult;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use zeroize::Zeroizing;

/// Declared usage of a key (`use` member of a JWK)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyUse {
    /// Signing and signature verification
    #[serde(rename = "sig")]
    Sig,
    /// Encryption and decryption
    #[serde(rename = "enc")]
    Enc,
}

impl KeyUse {
    /// The JWK `use` value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sig => "sig",
            Self::Enc => "enc",
        }
    }
}

/// Cryptographic material carried by a [`Key`].
///
/// Symmetric and asymmetric material are distinct variants, so a key is
/// always exactly one of the two.
#[derive(Clone)]
pub enum KeyMaterial {
    /// Raw secret bytes (`kty: "oct"`)
    Symmetric(Zeroizing<Vec<u8>>),
    /// RSA private key (`kty: "RSA"` with `d`)
    RsaPrivate(RsaPrivateKey),
    /// RSA public key
    RsaPublic(RsaPublicKey),
    /// P-256 private key (`kty: "EC"`, `crv: "P-256"` with `d`)
    P256Private(p256::SecretKey),
    /// P-256 public key
    P256Public(p256::PublicKey),
    /// P-384 private key (`kty: "EC"`, `crv: "P-384"` with `d`)
    P384Private(p384::SecretKey),
    /// P-384 public key
    P384Public(p384::PublicKey),
    /// P-521 private key (`kty: "EC"`, `crv: "P-521"` with `d`)
    P521Private(p521::SecretKey),
    /// P-521 public key
    P521Public(p521::PublicKey),
    /// Ed25519 private key (`kty: "OKP"`, `crv: "Ed25519"` with `d`)
    Ed25519Private(ed25519_dalek::SigningKey),
    /// Ed25519 public key
    Ed25519Public(ed25519_dalek::VerifyingKey),
}

impl KeyMaterial {
    /// The JWK `kty` of this material.
    #[must_use]
    pub const fn key_type(&self) -> &'static str {
        match self {
            Self::Symmetric(_) => "oct",
            Self::RsaPrivate(_) | Self::RsaPublic(_) => "RSA",
            Self::P256Private(_)
            | Self::P256Public(_)
            | Self::P384Private(_)
            | Self::P384Public(_)
            | Self::P521Private(_)
            | Self::P521Public(_) => "EC",
            Self::Ed25519Private(_) | Self::Ed25519Public(_) => "OKP",
        }
    }

    /// The public half of asymmetric material; `None` for symmetric secrets.
    #[must_use]
    pub fn public(&self) -> Option<KeyMaterial> {
        match self {
            Self::Symmetric(_) => None,
            Self::RsaPrivate(k) => Some(Self::RsaPublic(k.to_public_key())),
            Self::P256Private(k) => Some(Self::P256Public(k.public_key())),
            Self::P384Private(k) => Some(Self::P384Public(k.public_key())),
            Self::P521Private(k) => Some(Self::P521Public(k.public_key())),
            Self::Ed25519Private(k) => Some(Self::Ed25519Public(k.verifying_key())),
            Self::RsaPublic(_)
            | Self::P256Public(_)
            | Self::P384Public(_)
            | Self::P521Public(_)
            | Self::Ed25519Public(_) => Some(self.clone()),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Symmetric(_) => "Symmetric",
            Self::RsaPrivate(_) => "RsaPrivate",
            Self::RsaPublic(_) => "RsaPublic",
            Self::P256Private(_) => "P256Private",
            Self::P256Public(_) => "P256Public",
            Self::P384Private(_) => "P384Private",
            Self::P384Public(_) => "P384Public",
            Self::P521Private(_) => "P521Private",
            Self::P521Public(_) => "P521Public",
            Self::Ed25519Private(_) => "Ed25519Private",
            Self::Ed25519Public(_) => "Ed25519Public",
        };
        write!(f, "KeyMaterial::{name}(..)")
    }
}

/// An immutable key with its identifier, declared usage and declared algorithm.
///
/// Keys are shared as `Arc<Key>` between key sets, key sources and the codec.
#[derive(Debug, Clone)]
pub struct Key {
    id: String,
    usage: Option<KeyUse>,
    alg: Option<String>,
    material: KeyMaterial,
}

impl Key {
    /// Create a key from its parts.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        usage: Option<KeyUse>,
        alg: Option<String>,
        material: KeyMaterial,
    ) -> Self {
        Self {
            id: id.into(),
            usage,
            alg,
            material,
        }
    }

    /// Create a symmetric key from secret bytes.
    #[must_use]
    pub fn symmetric(id: impl Into<String>, secret: impl Into<Vec<u8>>) -> Self {
        Self::new(id, None, None, KeyMaterial::Symmetric(Zeroizing::new(secret.into())))
    }

    /// Set the key identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the declared usage.
    #[must_use]
    pub fn with_usage(mut self, usage: KeyUse) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Set the declared algorithm.
    #[must_use]
    pub fn with_alg(mut self, alg: impl Into<String>) -> Self {
        self.alg = Some(alg.into());
        self
    }

    /// Key identifier; empty when the key has none.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared usage.
    #[must_use]
    pub fn usage(&self) -> Option<KeyUse> {
        self.usage
    }

    /// Declared JWA algorithm name; empty when the key declares none.
    #[must_use]
    pub fn alg(&self) -> &str {
        self.alg.as_deref().unwrap_or_default()
    }

    /// `true` when the material is a raw secret.
    #[must_use]
    pub fn is_symmetric(&self) -> bool {
        matches!(self.material, KeyMaterial::Symmetric(_))
    }

    /// `true` when asymmetric material only holds the public half.
    ///
    /// The answer for symmetric keys carries no meaning.
    #[must_use]
    pub fn is_public(&self) -> bool {
        matches!(
            self.material,
            KeyMaterial::RsaPublic(_)
                | KeyMaterial::P256Public(_)
                | KeyMaterial::P384Public(_)
                | KeyMaterial::P521Public(_)
                | KeyMaterial::Ed25519Public(_)
        )
    }

    /// The underlying material, for the signer, verifier, encrypter and decrypter.
    #[must_use]
    pub fn raw(&self) -> &KeyMaterial {
        &self.material
    }

    /// The public projection of this key.
    ///
    /// Public and symmetric keys are returned as the same shared key. Private
    /// asymmetric keys produce a new key holding only the public component,
    /// with the same id, usage and algorithm.
    #[must_use]
    pub fn to_public(self: &Arc<Self>) -> Arc<Self> {
        if self.is_public() || self.is_symmetric() {
            return Arc::clone(self);
        }
        match self.material.public() {
            Some(material) => Arc::new(Self {
                id: self.id.clone(),
                usage: self.usage,
                alg: self.alg.clone(),
                material,
            }),
            None => Arc::clone(self),
        }
    }

    /// Build a key from its JWK representation.
    ///
    /// # Errors
    /// Returns [`crate::JoseError::InvalidKey`] if the JWK members do not describe a supported key.
    pub fn from_jwk(jwk: Jwk) -> JoseResult<Self> {
        let material = jwk.material()?;
        Ok(Self {
            id: jwk.kid.unwrap_or_default(),
            usage: jwk.usage,
            alg: jwk.alg,
            material,
        })
    }

    /// The JWK representation of this key, including private members when present.
    #[must_use]
    pub fn to_jwk(&self) -> Jwk {
        let mut jwk = Jwk::from_material(&self.material);
        jwk.kid = (!self.id.is_empty()).then(|| self.id.clone());
        jwk.usage = self.usage;
        jwk.alg = self.alg.clone();
        jwk
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_jwk().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let jwk = Jwk::deserialize(deserializer)?;
        Key::from_jwk(jwk).map_err(serde::de::Error::custom)
    }
}
