//! ECDH-ES key agreement with the Concat KDF (RFC 7518 §4.6)

use crate::error::{JoseError, JoseResult};
use crate::jwk::KeyMaterial;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Single-step KDF of NIST SP 800-56A §5.8.1 with SHA-256 and the JOSE
/// `OtherInfo` layout: `AlgorithmID || PartyUInfo || PartyVInfo || SuppPubInfo`.
pub(crate) fn concat_kdf(
    z: &[u8],
    algorithm_id: &str,
    apu: &[u8],
    apv: &[u8],
    key_len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut other_info = Vec::with_capacity(16 + algorithm_id.len() + apu.len() + apv.len());
    for field in [algorithm_id.as_bytes(), apu, apv] {
        other_info.extend_from_slice(&(field.len() as u32).to_be_bytes());
        other_info.extend_from_slice(field);
    }
    other_info.extend_from_slice(&((key_len * 8) as u32).to_be_bytes());

    let mut derived = Zeroizing::new(Vec::with_capacity(key_len + 32));
    let mut counter: u32 = 1;
    while derived.len() < key_len {
        let mut hasher = Sha256::new();
        hasher.update(counter.to_be_bytes());
        hasher.update(z);
        hasher.update(&other_info);
        derived.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    derived.truncate(key_len);
    derived
}

/// Agree on a shared secret with a fresh ephemeral key.
///
/// Returns the raw secret `Z` and the ephemeral public key to publish as `epk`.
pub(crate) fn agree_ephemeral(recipient: &KeyMaterial) -> JoseResult<(Zeroizing<Vec<u8>>, KeyMaterial)> {
    match recipient {
        KeyMaterial::P256Public(public) => {
            let ephemeral = p256::ecdh::EphemeralSecret::random(&mut OsRng);
            let shared = ephemeral.diffie_hellman(public);
            Ok((
                Zeroizing::new(shared.raw_secret_bytes().to_vec()),
                KeyMaterial::P256Public(ephemeral.public_key()),
            ))
        }
        KeyMaterial::P384Public(public) => {
            let ephemeral = p384::ecdh::EphemeralSecret::random(&mut OsRng);
            let shared = ephemeral.diffie_hellman(public);
            Ok((
                Zeroizing::new(shared.raw_secret_bytes().to_vec()),
                KeyMaterial::P384Public(ephemeral.public_key()),
            ))
        }
        KeyMaterial::P521Public(public) => {
            let ephemeral = p521::ecdh::EphemeralSecret::random(&mut OsRng);
            let shared = ephemeral.diffie_hellman(public);
            Ok((
                Zeroizing::new(shared.raw_secret_bytes().to_vec()),
                KeyMaterial::P521Public(ephemeral.public_key()),
            ))
        }
        other => Err(JoseError::invalid_key(format!(
            "ECDH-ES needs an EC public key, got {}",
            other.key_type()
        ))),
    }
}

/// Recompute the shared secret from the recipient's private key and the
/// sender's ephemeral public key.
pub(crate) fn agree_static(private: &KeyMaterial, ephemeral: &KeyMaterial) -> JoseResult<Zeroizing<Vec<u8>>> {
    match (private, ephemeral) {
        (KeyMaterial::P256Private(secret), KeyMaterial::P256Public(public)) => {
            let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        (KeyMaterial::P384Private(secret), KeyMaterial::P384Public(public)) => {
            let shared = p384::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        (KeyMaterial::P521Private(secret), KeyMaterial::P521Public(public)) => {
            let shared = p521::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
            Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
        }
        (KeyMaterial::P256Private(_) | KeyMaterial::P384Private(_) | KeyMaterial::P521Private(_), _) => {
            Err(JoseError::invalid_token("epk is not on the recipient key's curve"))
        }
        (other, _) => Err(JoseError::invalid_key(format!(
            "ECDH-ES needs an EC private key, got {}",
            other.key_type()
        ))),
    }
}
