//! Key sources: lazily resolve the key and algorithms for one encoding stage

use super::key::{Key, KeyUse};
use super::set::KeySet;
use crate::jwa::{Algs, ContentEncryption, KeyAlgorithm, SignatureAlgorithm};
use std::sync::Arc;

/// A key and the algorithm triple to apply with it.
///
/// `key` is `None` only for sources that skip their stage.
#[derive(Debug, Clone, Default)]
pub struct ResolvedKey {
    /// Key to sign or encrypt with
    pub key: Option<Arc<Key>>,
    /// Algorithms for the stage
    pub algs: Algs,
}

impl ResolvedKey {
    /// A resolution that disables the stage.
    #[must_use]
    pub fn skip() -> Self {
        Self::default()
    }
}

/// Produces the key and algorithms for one encoding stage, or reports that
/// none is available.
///
/// Sources are evaluated when [`crate::encode`] runs, not when they are built.
pub trait KeySource {
    /// Resolve the key; `None` means unavailable.
    fn resolve(&self) -> Option<ResolvedKey>;
}

impl<F> KeySource for F
where
    F: Fn() -> Option<ResolvedKey>,
{
    fn resolve(&self) -> Option<ResolvedKey> {
        self()
    }
}

/// A source that always succeeds with no algorithm, so its stage is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipKeySource;

impl KeySource for SkipKeySource {
    fn resolve(&self) -> Option<ResolvedKey> {
        Some(ResolvedKey::skip())
    }
}

/// Signing key looked up by id. The key's own declared algorithm is used.
#[derive(Debug, Clone)]
pub struct SigningKeyById<'a> {
    kid: String,
    set: &'a KeySet,
}

impl KeySource for SigningKeyById<'_> {
    fn resolve(&self) -> Option<ResolvedKey> {
        let key = self.set.key_by_id(&self.kid)?;
        if key.usage() != Some(KeyUse::Sig) {
            tracing::warn!(kid = %self.kid, "key is not declared for signing");
            return None;
        }
        let Ok(sig) = key.alg().parse::<SignatureAlgorithm>() else {
            tracing::warn!(kid = %self.kid, alg = key.alg(), "key declares no signature algorithm");
            return None;
        };
        Some(ResolvedKey {
            key: Some(key),
            algs: Algs::signed(sig),
        })
    }
}

/// Encryption key looked up by id. The key's declared algorithm is the key
/// management algorithm; the content encryption is supplied by the caller.
#[derive(Debug, Clone)]
pub struct EncryptionKeyById<'a> {
    kid: String,
    encode: ContentEncryption,
    set: &'a KeySet,
}

impl KeySource for EncryptionKeyById<'_> {
    fn resolve(&self) -> Option<ResolvedKey> {
        let key = self.set.key_by_id(&self.kid)?;
        if key.usage() != Some(KeyUse::Enc) {
            tracing::warn!(kid = %self.kid, "key is not declared for encryption");
            return None;
        }
        let Ok(encrypt) = key.alg().parse::<KeyAlgorithm>() else {
            tracing::warn!(kid = %self.kid, alg = key.alg(), "key declares no key management algorithm");
            return None;
        };
        Some(ResolvedKey {
            key: Some(key),
            algs: Algs::encrypted(encrypt, self.encode),
        })
    }
}

/// Signing key selected by algorithm through [`KeySet::key_for_signing`].
#[derive(Debug, Clone)]
pub struct SigningKeyByAlg<'a> {
    alg: SignatureAlgorithm,
    set: &'a KeySet,
}

impl KeySource for SigningKeyByAlg<'_> {
    fn resolve(&self) -> Option<ResolvedKey> {
        let key = self.set.key_for_signing(self.alg.as_str())?;
        Some(ResolvedKey {
            key: Some(key),
            algs: Algs::signed(self.alg),
        })
    }
}

/// Encryption key selected by algorithm through [`KeySet::key_for_encryption`].
#[derive(Debug, Clone)]
pub struct EncryptionKeyByAlg<'a> {
    encrypt: KeyAlgorithm,
    encode: ContentEncryption,
    set: &'a KeySet,
}

impl KeySource for EncryptionKeyByAlg<'_> {
    fn resolve(&self) -> Option<ResolvedKey> {
        let key = self.set.key_for_encryption(self.encrypt.as_str())?;
        Some(ResolvedKey {
            key: Some(key),
            algs: Algs::encrypted(self.encrypt, self.encode),
        })
    }
}

/// Source for the signing key with id `kid` in `set`.
#[must_use]
pub fn signature_key_by_id<'a>(kid: impl Into<String>, set: &'a KeySet) -> Box<dyn KeySource + 'a> {
    Box::new(SigningKeyById {
        kid: kid.into(),
        set,
    })
}

/// Source for the encryption key with id `kid` in `set`, encrypting content with `encode`.
#[must_use]
pub fn encryption_key_by_id<'a>(
    kid: impl Into<String>,
    encode: ContentEncryption,
    set: &'a KeySet,
) -> Box<dyn KeySource + 'a> {
    Box::new(EncryptionKeyById {
        kid: kid.into(),
        encode,
        set,
    })
}

/// Source for a signing key declaring `alg`. A `None` algorithm yields
/// [`SkipKeySource`], disabling the signing stage.
#[must_use]
pub fn signature_key_by_alg<'a>(
    alg: Option<SignatureAlgorithm>,
    set: &'a KeySet,
) -> Box<dyn KeySource + 'a> {
    match alg {
        Some(alg) => Box::new(SigningKeyByAlg { alg, set }),
        None => Box::new(SkipKeySource),
    }
}

/// Source for an encryption key declaring `encrypt`. When either algorithm is
/// `None` the result is [`SkipKeySource`], disabling the encryption stage.
#[must_use]
pub fn encryption_key_by_alg<'a>(
    encrypt: Option<KeyAlgorithm>,
    encode: Option<ContentEncryption>,
    set: &'a KeySet,
) -> Box<dyn KeySource + 'a> {
    match (encrypt, encode) {
        (Some(encrypt), Some(encode)) => Box::new(EncryptionKeyByAlg {
            encrypt,
            encode,
            set,
        }),
        _ => Box::new(SkipKeySource),
    }
}
