//! RSA signatures (RS*, PS*) and RSA key management (RSA1_5, RSA-OAEP, RSA-OAEP-256)

use super::verify_encoded;
use crate::error::{JoseError, JoseResult};
use crate::jwa::{KeyAlgorithm, SignatureAlgorithm};
use rand::rngs::OsRng;
use rsa::sha2::{Sha256, Sha384, Sha512};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Signer};
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey, pkcs1v15, pss};
use zeroize::Zeroizing;

fn signing_failed(err: rsa::signature::Error) -> JoseError {
    JoseError::invalid_key(format!("RSA signing failed: {err}"))
}

/// Sign with RSASSA-PKCS1-v1_5 or RSASSA-PSS.
pub(super) fn sign(alg: SignatureAlgorithm, key: &RsaPrivateKey, message: &[u8]) -> JoseResult<Vec<u8>> {
    let key = key.clone();
    let signature = match alg {
        SignatureAlgorithm::RS256 => pkcs1v15::SigningKey::<Sha256>::new(key)
            .try_sign(message)
            .map_err(signing_failed)?
            .to_vec(),
        SignatureAlgorithm::RS384 => pkcs1v15::SigningKey::<Sha384>::new(key)
            .try_sign(message)
            .map_err(signing_failed)?
            .to_vec(),
        SignatureAlgorithm::RS512 => pkcs1v15::SigningKey::<Sha512>::new(key)
            .try_sign(message)
            .map_err(signing_failed)?
            .to_vec(),
        SignatureAlgorithm::PS256 => pss::BlindedSigningKey::<Sha256>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map_err(signing_failed)?
            .to_vec(),
        SignatureAlgorithm::PS384 => pss::BlindedSigningKey::<Sha384>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map_err(signing_failed)?
            .to_vec(),
        SignatureAlgorithm::PS512 => pss::BlindedSigningKey::<Sha512>::new(key)
            .try_sign_with_rng(&mut OsRng, message)
            .map_err(signing_failed)?
            .to_vec(),
        other => return Err(JoseError::unsupported_algorithm(other.as_str())),
    };
    Ok(signature)
}

/// Verify an RSASSA-PKCS1-v1_5 or RSASSA-PSS signature.
pub(super) fn verify(
    alg: SignatureAlgorithm,
    key: &RsaPublicKey,
    message: &[u8],
    signature: &[u8],
) -> JoseResult<()> {
    let key = key.clone();
    match alg {
        SignatureAlgorithm::RS256 => verify_encoded::<_, pkcs1v15::Signature>(
            &pkcs1v15::VerifyingKey::<Sha256>::new(key),
            message,
            signature,
        ),
        SignatureAlgorithm::RS384 => verify_encoded::<_, pkcs1v15::Signature>(
            &pkcs1v15::VerifyingKey::<Sha384>::new(key),
            message,
            signature,
        ),
        SignatureAlgorithm::RS512 => verify_encoded::<_, pkcs1v15::Signature>(
            &pkcs1v15::VerifyingKey::<Sha512>::new(key),
            message,
            signature,
        ),
        SignatureAlgorithm::PS256 => verify_encoded::<_, pss::Signature>(
            &pss::VerifyingKey::<Sha256>::new(key),
            message,
            signature,
        ),
        SignatureAlgorithm::PS384 => verify_encoded::<_, pss::Signature>(
            &pss::VerifyingKey::<Sha384>::new(key),
            message,
            signature,
        ),
        SignatureAlgorithm::PS512 => verify_encoded::<_, pss::Signature>(
            &pss::VerifyingKey::<Sha512>::new(key),
            message,
            signature,
        ),
        other => Err(JoseError::unsupported_algorithm(other.as_str())),
    }
}

/// Encrypt a content encryption key to an RSA public key.
pub(super) fn encrypt_key(alg: KeyAlgorithm, key: &RsaPublicKey, cek: &[u8]) -> JoseResult<Vec<u8>> {
    let result = match alg {
        KeyAlgorithm::Rsa1_5 => key.encrypt(&mut OsRng, Pkcs1v15Encrypt, cek),
        KeyAlgorithm::RsaOaep => key.encrypt(&mut OsRng, Oaep::new::<sha1::Sha1>(), cek),
        KeyAlgorithm::RsaOaep256 => key.encrypt(&mut OsRng, Oaep::new::<Sha256>(), cek),
        other => return Err(JoseError::unsupported_algorithm(other.as_str())),
    };
    result.map_err(|err| JoseError::invalid_key(format!("RSA key encryption failed: {err}")))
}

/// Recover a content encryption key with an RSA private key.
///
/// RSA1_5 never reports a padding failure: a random key of `cek_len` bytes
/// is returned instead and content decryption fails later (RFC 7516 §11.5).
pub(super) fn decrypt_key(
    alg: KeyAlgorithm,
    key: &RsaPrivateKey,
    encrypted_key: &[u8],
    cek_len: usize,
) -> JoseResult<Zeroizing<Vec<u8>>> {
    match alg {
        KeyAlgorithm::Rsa1_5 => {
            let random = super::utils::random_bytes(cek_len);
            match key.decrypt(Pkcs1v15Encrypt, encrypted_key) {
                Ok(cek) if cek.len() == cek_len => Ok(Zeroizing::new(cek)),
                _ => Ok(random),
            }
        }
        KeyAlgorithm::RsaOaep => key
            .decrypt(Oaep::new::<sha1::Sha1>(), encrypted_key)
            .map(Zeroizing::new)
            .map_err(|_| JoseError::DecryptionFailed),
        KeyAlgorithm::RsaOaep256 => key
            .decrypt(Oaep::new::<Sha256>(), encrypted_key)
            .map(Zeroizing::new)
            .map_err(|_| JoseError::DecryptionFailed),
        other => Err(JoseError::unsupported_algorithm(other.as_str())),
    }
}
