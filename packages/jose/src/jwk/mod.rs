//! JSON Web Keys, key sets and key sources

mod json;
mod key;
mod set;
mod source;

pub use json::{Jwk, JwkSet};
pub use key::{Key, KeyMaterial, KeyUse};
pub use set::{KeySet, SharedKeySet};
pub use source::{
    EncryptionKeyByAlg, EncryptionKeyById, KeySource, ResolvedKey, SigningKeyByAlg, SigningKeyById, SkipKeySource,
    encryption_key_by_alg, encryption_key_by_id, signature_key_by_alg, signature_key_by_id,
};
