//! JWE key management: produce the content encryption key and its
//! encrypted form for the recipient, and recover it again.

use super::{content, ecdh, key_wrap, rsa, utils::random_bytes};
use super::content::Sealed;
use crate::error::{JoseError, JoseResult};
use crate::jwa::{ContentEncryption, KeyAlgorithm};
use crate::jwk::{Jwk, Key, KeyMaterial};
use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha384, Sha512};
use std::ops::RangeInclusive;
use zeroize::Zeroizing;

/// PBES2 iteration count used when encrypting.
pub(crate) const PBES2_COUNT: u32 = 100_000;
/// Iteration counts accepted when decrypting.
const PBES2_COUNT_RANGE: RangeInclusive<u32> = 1_000..=1_000_000;
const PBES2_SALT_LEN: usize = 16;
const PBES2_MIN_SALT_LEN: usize = 8;

/// A content encryption key together with what the recipient needs to recover it.
#[derive(Default)]
pub(crate) struct KeyDelivery {
    pub cek: Zeroizing<Vec<u8>>,
    pub encrypted_key: Vec<u8>,
    /// Ephemeral public key for the ECDH-ES family
    pub epk: Option<Jwk>,
    /// A*GCMKW initialization vector and tag
    pub iv: Option<Vec<u8>>,
    pub tag: Option<Vec<u8>>,
    /// PBES2 salt input and iteration count
    pub p2s: Option<Vec<u8>>,
    pub p2c: Option<u32>,
}

impl KeyDelivery {
    fn new(cek: Zeroizing<Vec<u8>>, encrypted_key: Vec<u8>) -> Self {
        Self {
            cek,
            encrypted_key,
            ..Self::default()
        }
    }
}

/// Key management parameters carried in the JWE header, decoded.
#[derive(Debug, Default)]
pub(crate) struct KeyParams<'a> {
    pub epk: Option<&'a Jwk>,
    pub apu: &'a [u8],
    pub apv: &'a [u8],
    pub iv: Option<&'a [u8]>,
    pub tag: Option<&'a [u8]>,
    pub p2s: Option<&'a [u8]>,
    pub p2c: Option<u32>,
}

fn symmetric_secret<'k>(key: &'k Key, alg: KeyAlgorithm, len: usize) -> JoseResult<&'k [u8]> {
    match key.raw() {
        KeyMaterial::Symmetric(secret) if secret.len() == len => Ok(secret.as_slice()),
        KeyMaterial::Symmetric(secret) => Err(JoseError::invalid_key(format!(
            "{alg} needs a {len} byte key, got {}",
            secret.len()
        ))),
        other => Err(JoseError::invalid_key(format!(
            "{alg} needs a symmetric key, got {}",
            other.key_type()
        ))),
    }
}

/// Algorithm id and key length fed to the Concat KDF.
fn agreement_target(alg: KeyAlgorithm, enc: ContentEncryption) -> (&'static str, usize) {
    match alg.wrap_key_len() {
        Some(len) => (alg.as_str(), len),
        None => (enc.as_str(), enc.key_len()),
    }
}

fn password<'k>(key: &'k Key, alg: KeyAlgorithm) -> JoseResult<&'k [u8]> {
    match key.raw() {
        KeyMaterial::Symmetric(secret) if !secret.is_empty() => Ok(secret.as_slice()),
        KeyMaterial::Symmetric(_) => Err(JoseError::invalid_key(format!("{alg} needs a non-empty password"))),
        other => Err(JoseError::invalid_key(format!(
            "{alg} needs a symmetric key, got {}",
            other.key_type()
        ))),
    }
}

/// PBKDF2 key derivation of RFC 7518 §4.8: the salt is `alg || 0x00 || p2s`.
fn pbes2_kek(alg: KeyAlgorithm, password: &[u8], p2s: &[u8], p2c: u32) -> JoseResult<Zeroizing<Vec<u8>>> {
    let mut salt = Vec::with_capacity(alg.as_str().len() + 1 + p2s.len());
    salt.extend_from_slice(alg.as_str().as_bytes());
    salt.push(0);
    salt.extend_from_slice(p2s);

    let mut kek = Zeroizing::new(vec![0u8; alg.wrap_key_len().unwrap_or_default()]);
    match alg {
        KeyAlgorithm::Pbes2Hs256A128Kw => pbkdf2_hmac::<Sha256>(password, &salt, p2c, kek.as_mut_slice()),
        KeyAlgorithm::Pbes2Hs384A192Kw => pbkdf2_hmac::<Sha384>(password, &salt, p2c, kek.as_mut_slice()),
        KeyAlgorithm::Pbes2Hs512A256Kw => pbkdf2_hmac::<Sha512>(password, &salt, p2c, kek.as_mut_slice()),
        other => return Err(JoseError::unsupported_algorithm(other.as_str())),
    }
    Ok(kek)
}

/// Create a fresh CEK for `enc` (or agree on one) and deliver it to `key`,
/// which must be the recipient's public or symmetric key.
pub(crate) fn deliver(alg: KeyAlgorithm, enc: ContentEncryption, key: &Key) -> JoseResult<KeyDelivery> {
    match alg {
        KeyAlgorithm::Dir => {
            let secret = symmetric_secret(key, alg, enc.key_len())?;
            Ok(KeyDelivery::new(Zeroizing::new(secret.to_vec()), Vec::new()))
        }
        KeyAlgorithm::A128Kw | KeyAlgorithm::A192Kw | KeyAlgorithm::A256Kw => {
            let kek = symmetric_secret(key, alg, alg.wrap_key_len().unwrap_or_default())?;
            let cek = random_bytes(enc.key_len());
            let encrypted_key = key_wrap::wrap(kek, &cek)?;
            Ok(KeyDelivery::new(cek, encrypted_key))
        }
        KeyAlgorithm::Rsa1_5 | KeyAlgorithm::RsaOaep | KeyAlgorithm::RsaOaep256 => {
            let cek = random_bytes(enc.key_len());
            let encrypted_key = match key.raw() {
                KeyMaterial::RsaPublic(public) => rsa::encrypt_key(alg, public, &cek)?,
                KeyMaterial::RsaPrivate(private) => {
                    rsa::encrypt_key(alg, &private.to_public_key(), &cek)?
                }
                other => {
                    return Err(JoseError::invalid_key(format!(
                        "{alg} needs an RSA key, got {}",
                        other.key_type()
                    )));
                }
            };
            Ok(KeyDelivery::new(cek, encrypted_key))
        }
        KeyAlgorithm::EcdhEs
        | KeyAlgorithm::EcdhEsA128Kw
        | KeyAlgorithm::EcdhEsA192Kw
        | KeyAlgorithm::EcdhEsA256Kw => {
            let recipient = key
                .raw()
                .public()
                .ok_or_else(|| JoseError::invalid_key(format!("{alg} needs an EC key, got oct")))?;
            let (z, ephemeral) = ecdh::agree_ephemeral(&recipient)?;
            let (algorithm_id, len) = agreement_target(alg, enc);
            let derived = ecdh::concat_kdf(&z, algorithm_id, &[], &[], len);
            let epk = Some(Jwk::from_material(&ephemeral));

            if alg == KeyAlgorithm::EcdhEs {
                return Ok(KeyDelivery {
                    epk,
                    ..KeyDelivery::new(derived, Vec::new())
                });
            }
            let cek = random_bytes(enc.key_len());
            let encrypted_key = key_wrap::wrap(&derived, &cek)?;
            Ok(KeyDelivery {
                epk,
                ..KeyDelivery::new(cek, encrypted_key)
            })
        }
        KeyAlgorithm::A128GcmKw | KeyAlgorithm::A192GcmKw | KeyAlgorithm::A256GcmKw => {
            let kek = symmetric_secret(key, alg, alg.gcm_key_len().unwrap_or_default())?;
            let cek = random_bytes(enc.key_len());
            let sealed = content::gcm_seal_key(kek, &cek)?;
            Ok(KeyDelivery {
                iv: Some(sealed.iv),
                tag: Some(sealed.tag),
                ..KeyDelivery::new(cek, sealed.ciphertext)
            })
        }
        KeyAlgorithm::Pbes2Hs256A128Kw | KeyAlgorithm::Pbes2Hs384A192Kw | KeyAlgorithm::Pbes2Hs512A256Kw => {
            let p2s = random_bytes(PBES2_SALT_LEN);
            let kek = pbes2_kek(alg, password(key, alg)?, &p2s, PBES2_COUNT)?;
            let cek = random_bytes(enc.key_len());
            let encrypted_key = key_wrap::wrap(&kek, &cek)?;
            Ok(KeyDelivery {
                p2s: Some(p2s.to_vec()),
                p2c: Some(PBES2_COUNT),
                ..KeyDelivery::new(cek, encrypted_key)
            })
        }
        // ED25519 names a signing key type; it has no key management scheme.
        KeyAlgorithm::Ed25519 => Err(JoseError::unsupported_algorithm(alg.as_str())),
    }
}

/// Recover the CEK from `encrypted_key` with the recipient's private or
/// symmetric key.
pub(crate) fn recover(
    alg: KeyAlgorithm,
    enc: ContentEncryption,
    key: &Key,
    encrypted_key: &[u8],
    params: &KeyParams<'_>,
) -> JoseResult<Zeroizing<Vec<u8>>> {
    match alg {
        KeyAlgorithm::Dir => {
            if !encrypted_key.is_empty() {
                return Err(JoseError::invalid_token("direct encryption carries no encrypted key"));
            }
            let secret = symmetric_secret(key, alg, enc.key_len())?;
            Ok(Zeroizing::new(secret.to_vec()))
        }
        KeyAlgorithm::A128Kw | KeyAlgorithm::A192Kw | KeyAlgorithm::A256Kw => {
            let kek = symmetric_secret(key, alg, alg.wrap_key_len().unwrap_or_default())?;
            key_wrap::unwrap(kek, encrypted_key)
        }
        KeyAlgorithm::Rsa1_5 | KeyAlgorithm::RsaOaep | KeyAlgorithm::RsaOaep256 => match key.raw() {
            KeyMaterial::RsaPrivate(private) => {
                rsa::decrypt_key(alg, private, encrypted_key, enc.key_len())
            }
            other => Err(JoseError::invalid_key(format!(
                "{alg} needs an RSA private key, got {}",
                other.key_type()
            ))),
        },
        KeyAlgorithm::EcdhEs
        | KeyAlgorithm::EcdhEsA128Kw
        | KeyAlgorithm::EcdhEsA192Kw
        | KeyAlgorithm::EcdhEsA256Kw => {
            let epk = params
                .epk
                .ok_or_else(|| JoseError::invalid_token("missing epk header"))?
                .material()
                .map_err(|_| JoseError::invalid_token("invalid epk header"))?;
            let z = ecdh::agree_static(key.raw(), &epk)?;
            let (algorithm_id, len) = agreement_target(alg, enc);
            let derived = ecdh::concat_kdf(&z, algorithm_id, params.apu, params.apv, len);

            if alg == KeyAlgorithm::EcdhEs {
                if !encrypted_key.is_empty() {
                    return Err(JoseError::invalid_token("ECDH-ES carries no encrypted key"));
                }
                return Ok(derived);
            }
            key_wrap::unwrap(&derived, encrypted_key)
        }
        KeyAlgorithm::A128GcmKw | KeyAlgorithm::A192GcmKw | KeyAlgorithm::A256GcmKw => {
            let (Some(iv), Some(tag)) = (params.iv, params.tag) else {
                return Err(JoseError::invalid_token(format!("{alg} needs iv and tag headers")));
            };
            let kek = symmetric_secret(key, alg, alg.gcm_key_len().unwrap_or_default())?;
            let sealed = Sealed {
                iv: iv.to_vec(),
                ciphertext: encrypted_key.to_vec(),
                tag: tag.to_vec(),
            };
            content::gcm_open_key(kek, &sealed).map(Zeroizing::new)
        }
        KeyAlgorithm::Pbes2Hs256A128Kw | KeyAlgorithm::Pbes2Hs384A192Kw | KeyAlgorithm::Pbes2Hs512A256Kw => {
            let (Some(p2s), Some(p2c)) = (params.p2s, params.p2c) else {
                return Err(JoseError::invalid_token(format!("{alg} needs p2s and p2c headers")));
            };
            if p2s.len() < PBES2_MIN_SALT_LEN {
                return Err(JoseError::invalid_token("p2s must be at least 8 bytes"));
            }
            if !PBES2_COUNT_RANGE.contains(&p2c) {
                return Err(JoseError::invalid_token(format!("p2c {p2c} is outside the accepted range")));
            }
            let kek = pbes2_kek(alg, password(key, alg)?, p2s, p2c)?;
            key_wrap::unwrap(&kek, encrypted_key)
        }
        KeyAlgorithm::Ed25519 => Err(JoseError::unsupported_algorithm(alg.as_str())),
    }
}
