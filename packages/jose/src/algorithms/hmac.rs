//! HMAC-SHA2 signatures (HS256, HS384, HS512) and the MAC used by AES-CBC-HMAC

use super::utils::constant_time_eq;
use crate::error::{JoseError, JoseResult};
use crate::jwa::SignatureAlgorithm;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

pub(super) type HmacSha256 = Hmac<Sha256>;
pub(super) type HmacSha384 = Hmac<Sha384>;
pub(super) type HmacSha512 = Hmac<Sha512>;

/// MAC over the concatenation of `parts`.
pub(super) fn mac<M: Mac + KeyInit>(secret: &[u8], parts: &[&[u8]]) -> JoseResult<Vec<u8>> {
    let mut mac = <M as KeyInit>::new_from_slice(secret)
        .map_err(|_| JoseError::invalid_key("invalid HMAC key"))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Minimum secret length: the hash output size.
fn validate_secret(alg: SignatureAlgorithm, secret: &[u8]) -> JoseResult<()> {
    let min_length = match alg {
        SignatureAlgorithm::HS256 => 32,
        SignatureAlgorithm::HS384 => 48,
        SignatureAlgorithm::HS512 => 64,
        other => return Err(JoseError::unsupported_algorithm(other.as_str())),
    };
    if secret.len() < min_length {
        return Err(JoseError::invalid_key(format!(
            "HMAC key for {alg} must be at least {min_length} bytes, got {}",
            secret.len()
        )));
    }
    Ok(())
}

pub(super) fn sign(alg: SignatureAlgorithm, secret: &[u8], message: &[u8]) -> JoseResult<Vec<u8>> {
    validate_secret(alg, secret)?;
    match alg {
        SignatureAlgorithm::HS256 => mac::<HmacSha256>(secret, &[message]),
        SignatureAlgorithm::HS384 => mac::<HmacSha384>(secret, &[message]),
        _ => mac::<HmacSha512>(secret, &[message]),
    }
}

pub(super) fn verify(
    alg: SignatureAlgorithm,
    secret: &[u8],
    message: &[u8],
    signature: &[u8],
) -> JoseResult<()> {
    let expected = sign(alg, secret, message)?;
    if constant_time_eq(signature, &expected) {
        Ok(())
    } else {
        Err(JoseError::InvalidSignature)
    }
}
