//! Ed25519 signatures (EdDSA, RFC 8037)

use crate::error::{JoseError, JoseResult};
use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

pub(super) fn sign(key: &SigningKey, message: &[u8]) -> JoseResult<Vec<u8>> {
    let signature: Signature = key
        .try_sign(message)
        .map_err(|err| JoseError::invalid_key(format!("Ed25519 signing failed: {err}")))?;
    Ok(signature.to_bytes().to_vec())
}

/// Strict verification: small-order keys and non-canonical signatures fail.
pub(super) fn verify(key: &VerifyingKey, message: &[u8], signature: &[u8]) -> JoseResult<()> {
    let signature = Signature::from_slice(signature).map_err(|_| JoseError::InvalidSignature)?;
    key.verify_strict(message, &signature)
        .map_err(|_| JoseError::InvalidSignature)
}
