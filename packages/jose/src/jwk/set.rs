//! Key sets with id lookup and time-rotated algorithm selection

use super::json::JwkSet;
use super::key::{Key, KeyUse};
use crate::error::JoseResult;
use arc_swap::ArcSwap;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Arc;

/// A set of keys indexed by key id, also known as a JSON Web Key Set.
///
/// Keys are ordered by id, which fixes the candidate order used by the
/// rotation in [`KeySet::key_for_signing`] and [`KeySet::key_for_encryption`].
/// Inserting a key whose id is already present replaces the previous key.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: BTreeMap<String, Arc<Key>>,
}

impl KeySet {
    /// Create a key set from keys. Later keys win on duplicate ids.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Arc<Key>>,
    {
        let mut set = Self::empty();
        for key in keys {
            set.insert(key);
        }
        set
    }

    /// An empty key set.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    /// Add a key, replacing any key with the same id.
    ///
    /// Meant for building a set. Published sets are replaced wholesale through
    /// [`SharedKeySet::replace`] instead of being mutated.
    pub fn insert(&mut self, key: impl Into<Arc<Key>>) {
        let key = key.into();
        self.keys.insert(key.id().to_string(), key);
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    /// Number of keys in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// `true` when the set holds no key.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Key>> {
        self.keys.values()
    }

    /// Find a key by exact id. An empty id never matches.
    #[must_use]
    pub fn key_by_id(&self, kid: &str) -> Option<Arc<Key>> {
        if kid.is_empty() {
            return None;
        }
        self.keys.get(kid).cloned()
    }

    /// Find a signing key (`use: "sig"`) declaring `alg`.
    ///
    /// With several candidates one is picked from the current time, see
    /// [`KeySet::key_for_signing_at`].
    #[must_use]
    pub fn key_for_signing(&self, alg: &str) -> Option<Arc<Key>> {
        self.key_for_signing_at(alg, Utc::now().timestamp())
    }

    /// Find a signing key declaring `alg`, rotating with `unix_seconds`.
    ///
    /// Candidates are ordered by id and the one at
    /// `unix_seconds mod candidates` is returned.
    #[must_use]
    pub fn key_for_signing_at(&self, alg: &str, unix_seconds: i64) -> Option<Arc<Key>> {
        self.select(KeyUse::Sig, alg, unix_seconds)
    }

    /// Find an encryption key (`use: "enc"`) declaring `alg`.
    ///
    /// The returned key may hold private material; callers encrypting with it
    /// must use [`Key::to_public`] first.
    #[must_use]
    pub fn key_for_encryption(&self, alg: &str) -> Option<Arc<Key>> {
        self.key_for_encryption_at(alg, Utc::now().timestamp())
    }

    /// Find an encryption key declaring `alg`, rotating with `unix_seconds`.
    #[must_use]
    pub fn key_for_encryption_at(&self, alg: &str, unix_seconds: i64) -> Option<Arc<Key>> {
        self.select(KeyUse::Enc, alg, unix_seconds)
    }

    fn select(&self, usage: KeyUse, alg: &str, unix_seconds: i64) -> Option<Arc<Key>> {
        let candidates: Vec<&Arc<Key>> = self
            .keys
            .values()
            .filter(|k| k.usage() == Some(usage) && k.alg() == alg)
            .collect();

        let chosen = match candidates.len() {
            0 => None,
            1 => Some(candidates[0]),
            n => {
                let index = unix_seconds.rem_euclid(n as i64) as usize;
                candidates.get(index).copied()
            }
        };

        match chosen {
            Some(key) => tracing::debug!(
                usage = usage.as_str(),
                alg,
                candidates = candidates.len(),
                kid = key.id(),
                "selected key"
            ),
            None => tracing::debug!(usage = usage.as_str(), alg, "no key matches"),
        }
        chosen.cloned()
    }

    /// A new set holding the public projection of every asymmetric key.
    ///
    /// Symmetric keys are left out so the result is safe to publish.
    #[must_use]
    pub fn to_public(&self) -> KeySet {
        KeySet::new(
            self.keys
                .values()
                .filter(|k| !k.is_symmetric())
                .map(Key::to_public),
        )
    }

    /// Parse a JWKS document.
    ///
    /// # Errors
    /// Returns an error when the JSON is malformed or a key is invalid.
    pub fn from_json(json: &str) -> JoseResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JWKS document from a reader.
    ///
    /// # Errors
    /// Returns an error when reading fails, the JSON is malformed or a key is invalid.
    pub fn from_reader<R: Read>(reader: R) -> JoseResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serialize to a JWKS document, private members included.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> JoseResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_jwk_set(doc: JwkSet) -> JoseResult<Self> {
        let mut set = Self::empty();
        for jwk in doc.keys {
            set.insert(Key::from_jwk(jwk)?);
        }
        Ok(set)
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        KeySet::new(iter)
    }
}

impl Serialize for KeySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        JwkSet {
            keys: self.keys.values().map(|k| k.to_jwk()).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for KeySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let doc = JwkSet::deserialize(deserializer)?;
        KeySet::from_jwk_set(doc).map_err(serde::de::Error::custom)
    }
}

/// A key set that can be rotated wholesale while readers keep using the
/// snapshot they loaded.
#[derive(Debug)]
pub struct SharedKeySet {
    current: ArcSwap<KeySet>,
}

impl SharedKeySet {
    /// Publish an initial key set.
    #[must_use]
    pub fn new(set: KeySet) -> Self {
        Self {
            current: ArcSwap::from_pointee(set),
        }
    }

    /// The current snapshot.
    #[must_use]
    pub fn load(&self) -> Arc<KeySet> {
        self.current.load_full()
    }

    /// Atomically replace the whole set; returns the previous snapshot.
    pub fn replace(&self, set: KeySet) -> Arc<KeySet> {
        let previous = self.current.swap(Arc::new(set));
        tracing::debug!(
            previous = previous.count(),
            current = self.current.load().count(),
            "key set rotated"
        );
        previous
    }
}

impl Default for SharedKeySet {
    fn default() -> Self {
        Self::new(KeySet::empty())
    }
}
