//! ECDSA signatures over P-256 (ES256), P-384 (ES384) and P-521 (ES512)
//!
//! Signatures use the fixed-size `R || S` encoding of RFC 7518 §3.4.

use super::verify_encoded;
use crate::error::{JoseError, JoseResult};
use p256::ecdsa::signature::Signer;

fn signing_failed(err: p256::ecdsa::Error) -> JoseError {
    JoseError::invalid_key(format!("ECDSA signing failed: {err}"))
}

pub(super) fn sign_es256(key: &p256::SecretKey, message: &[u8]) -> JoseResult<Vec<u8>> {
    let signing_key = p256::ecdsa::SigningKey::from(key);
    let signature: p256::ecdsa::Signature = signing_key.try_sign(message).map_err(signing_failed)?;
    Ok(signature.to_bytes().to_vec())
}

pub(super) fn verify_es256(key: &p256::PublicKey, message: &[u8], signature: &[u8]) -> JoseResult<()> {
    verify_encoded::<_, p256::ecdsa::Signature>(
        &p256::ecdsa::VerifyingKey::from(key),
        message,
        signature,
    )
}

pub(super) fn sign_es384(key: &p384::SecretKey, message: &[u8]) -> JoseResult<Vec<u8>> {
    let signing_key = p384::ecdsa::SigningKey::from(key);
    let signature: p384::ecdsa::Signature = signing_key.try_sign(message).map_err(signing_failed)?;
    Ok(signature.to_bytes().to_vec())
}

pub(super) fn verify_es384(key: &p384::PublicKey, message: &[u8], signature: &[u8]) -> JoseResult<()> {
    verify_encoded::<_, p384::ecdsa::Signature>(
        &p384::ecdsa::VerifyingKey::from(key),
        message,
        signature,
    )
}

pub(super) fn sign_es512(key: &p521::SecretKey, message: &[u8]) -> JoseResult<Vec<u8>> {
    let signing_key = p521::ecdsa::SigningKey::from_slice(&key.to_bytes()).map_err(signing_failed)?;
    let signature: p521::ecdsa::Signature = signing_key.try_sign(message).map_err(signing_failed)?;
    Ok(signature.to_bytes().to_vec())
}

pub(super) fn verify_es512(key: &p521::PublicKey, message: &[u8], signature: &[u8]) -> JoseResult<()> {
    let verifying_key = p521::ecdsa::VerifyingKey::from_affine(*key.as_affine())
        .map_err(|_| JoseError::invalid_key("invalid P-521 public key"))?;
    verify_encoded::<_, p521::ecdsa::Signature>(&verifying_key, message, signature)
}
