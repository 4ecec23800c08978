//! Token decoding: decrypt, then verify
//!
//! Keys are found by the header `kid` when there is one, and only then by
//! algorithm. An id that is not in the key set is a failure; there is no
//! fallback to algorithm search.

use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::jwa::Algs;
use crate::jwe::Jwe;
use crate::jwk::{Key, KeySet, KeyUse};
use crate::jws::Jws;
use serde::de::DeserializeOwned;
use std::sync::Arc;

fn resolve_key(set: &KeySet, header: &Header, usage: KeyUse) -> Option<Arc<Key>> {
    if let Some(kid) = header.key_id() {
        return set.key_by_id(kid);
    }
    if header.alg.is_empty() {
        return None;
    }
    match usage {
        KeyUse::Sig => set.key_for_signing(&header.alg),
        KeyUse::Enc => set.key_for_encryption(&header.alg),
    }
}

/// A key that declares an algorithm may only be used with that algorithm.
fn check_key_alg(key: &Key, header: &Header) -> JoseResult<()> {
    if !key.alg().is_empty() && key.alg() != header.alg {
        return Err(JoseError::algorithm_mismatch(key.alg(), header.alg.clone()));
    }
    Ok(())
}

/// With a key-declared stage the header algorithm is only as good as the
/// key's own declaration, so a key declaring nothing is refused.
fn check_declared_alg(key: &Key, header: &Header) -> JoseResult<()> {
    if key.alg().is_empty() {
        return Err(JoseError::invalid_key(format!(
            "key '{}' declares no algorithm to check '{}' against",
            key.id(),
            header.alg
        )));
    }
    check_key_alg(key, header)
}

fn decrypt_stage(token: &str, keys: &KeySet, hint: &Algs) -> JoseResult<Vec<u8>> {
    let jwe = Jwe::parse(token)?;
    let header = jwe.header();

    if !hint.encrypt_from_key {
        let expected_alg = hint.encrypt.map(|a| a.as_str()).unwrap_or_default();
        if header.alg != expected_alg {
            return Err(JoseError::algorithm_mismatch(expected_alg, header.alg.clone()));
        }
        let expected_enc = hint.encode.map(|e| e.as_str()).unwrap_or_default();
        let found_enc = header.enc.as_deref().unwrap_or_default();
        if found_enc != expected_enc {
            return Err(JoseError::algorithm_mismatch(expected_enc, found_enc));
        }
    }

    let Some(key) = resolve_key(keys, header, KeyUse::Enc) else {
        tracing::warn!(kid = header.key_id(), alg = %header.alg, "no decryption key");
        return Err(JoseError::NoDecryptionKey);
    };
    if hint.encrypt_from_key {
        check_declared_alg(&key, header)?;
    } else {
        check_key_alg(&key, header)?;
    }

    jwe.decrypt(&key).inspect_err(|err| {
        tracing::warn!(kid = key.id(), error = %err, "token decryption failed");
    })
}

fn verify_stage(token: &[u8], keys: &KeySet, hint: &Algs) -> JoseResult<Vec<u8>> {
    let token = std::str::from_utf8(token)
        .map_err(|_| JoseError::invalid_token("signed token is not UTF-8"))?;
    let jws = Jws::parse(token)?;
    let header = jws.header();

    if !hint.sig_from_key {
        let expected_alg = hint.sig.map(|a| a.as_str()).unwrap_or_default();
        if header.alg != expected_alg {
            return Err(JoseError::algorithm_mismatch(expected_alg, header.alg.clone()));
        }
    }

    let Some(key) = resolve_key(keys, header, KeyUse::Sig) else {
        tracing::warn!(kid = header.key_id(), alg = %header.alg, "no verification key");
        return Err(JoseError::NoVerificationKey);
    };
    if hint.sig_from_key {
        check_declared_alg(&key, header)?;
    } else {
        check_key_alg(&key, header)?;
    }

    let key = key.to_public();
    match jws.verify(&key) {
        Ok(payload) => Ok(payload.to_vec()),
        Err(err) => {
            tracing::warn!(kid = key.id(), error = %err, "signature verification failed");
            Err(err)
        }
    }
}

/// Undo the encoding stages selected by `hint` and return the payload bytes.
///
/// When `hint` encrypts, `token` must be a compact JWE, decrypted with a key
/// from `decrypt`. When `hint` signs, the (decrypted) token must be a JWS
/// whose signature verifies with a key from `verify`. The header algorithms
/// must equal the hinted ones, or for a key-declared stage
/// ([`Algs::signed_by_key`], [`Algs::encrypted_by_key`]) the algorithm the
/// resolved key declares.
///
/// # Errors
/// - [`JoseError::InvalidToken`] for malformed tokens.
/// - [`JoseError::AlgorithmMismatch`] when the header names other algorithms
///   than `hint`, or the resolved key declares another algorithm.
/// - [`JoseError::InvalidKey`] when a key-declared stage resolves a key that
///   declares no algorithm.
/// - [`JoseError::NoDecryptionKey`] / [`JoseError::NoVerificationKey`] when no
///   key resolves.
/// - [`JoseError::DecryptionFailed`] / [`JoseError::InvalidSignature`] when
///   the cryptographic check fails.
pub fn decode_bytes(token: &str, verify: &KeySet, decrypt: &KeySet, hint: &Algs) -> JoseResult<Vec<u8>> {
    let mut bytes = if hint.encrypts() {
        decrypt_stage(token, decrypt, hint)?
    } else {
        token.as_bytes().to_vec()
    };

    if hint.signs() {
        bytes = verify_stage(&bytes, verify, hint)?;
    }

    tracing::debug!(signed = hint.signs(), encrypted = hint.encrypts(), "token decoded");
    Ok(bytes)
}

/// Decode `token` and deserialize the payload into `T`.
///
/// On any failure no value is produced.
///
/// # Errors
/// The errors of [`decode_bytes`], and [`JoseError::Serialization`] when the
/// payload is not JSON for `T`.
pub fn decode<T: DeserializeOwned>(token: &str, verify: &KeySet, decrypt: &KeySet, hint: &Algs) -> JoseResult<T> {
    let bytes = decode_bytes(token, verify, decrypt, hint)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Decode `token` into a schema-less JSON value.
///
/// # Errors
/// The errors of [`decode`].
pub fn decode_value(token: &str, verify: &KeySet, decrypt: &KeySet, hint: &Algs) -> JoseResult<serde_json::Value> {
    decode(token, verify, decrypt, hint)
}
