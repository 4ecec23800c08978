//! JOSE cryptographic primitives
//!
//! Signature dispatch lives here; key management and content encryption are
//! in their own modules and are driven by [`crate::jwe`].

mod block;
pub(crate) mod content;
mod ecdh;
mod ecdsa;
mod eddsa;
mod hmac;
pub(crate) mod key_management;
pub(crate) mod key_wrap;
mod rsa;
pub(crate) mod utils;

use crate::error::{JoseError, JoseResult};
use crate::jwa::SignatureAlgorithm;
use crate::jwk::{Key, KeyMaterial};
use ::rsa::signature::Verifier;

fn unusable(material: &KeyMaterial, alg: SignatureAlgorithm) -> JoseError {
    JoseError::invalid_key(format!("{} key cannot be used with {alg}", material.key_type()))
}

/// Sign `message` (the JWS signing input) with `key`.
pub(crate) fn sign(alg: SignatureAlgorithm, key: &Key, message: &[u8]) -> JoseResult<Vec<u8>> {
    use SignatureAlgorithm::*;

    match (alg, key.raw()) {
        (HS256 | HS384 | HS512, KeyMaterial::Symmetric(secret)) => hmac::sign(alg, secret, message),
        (RS256 | RS384 | RS512 | PS256 | PS384 | PS512, KeyMaterial::RsaPrivate(private)) => {
            rsa::sign(alg, private, message)
        }
        (ES256, KeyMaterial::P256Private(private)) => ecdsa::sign_es256(private, message),
        (ES384, KeyMaterial::P384Private(private)) => ecdsa::sign_es384(private, message),
        (ES512, KeyMaterial::P521Private(private)) => ecdsa::sign_es512(private, message),
        (EdDSA, KeyMaterial::Ed25519Private(private)) => eddsa::sign(private, message),
        (alg, material) => Err(unusable(material, alg)),
    }
}

/// Verify `signature` over `message`. Private keys verify with their public half.
pub(crate) fn verify(
    alg: SignatureAlgorithm,
    key: &Key,
    message: &[u8],
    signature: &[u8],
) -> JoseResult<()> {
    use SignatureAlgorithm::*;

    match (alg, key.raw()) {
        (HS256 | HS384 | HS512, KeyMaterial::Symmetric(secret)) => {
            hmac::verify(alg, secret, message, signature)
        }
        (RS256 | RS384 | RS512 | PS256 | PS384 | PS512, KeyMaterial::RsaPublic(public)) => {
            rsa::verify(alg, public, message, signature)
        }
        (RS256 | RS384 | RS512 | PS256 | PS384 | PS512, KeyMaterial::RsaPrivate(private)) => {
            rsa::verify(alg, &private.to_public_key(), message, signature)
        }
        (ES256, KeyMaterial::P256Public(public)) => ecdsa::verify_es256(public, message, signature),
        (ES256, KeyMaterial::P256Private(private)) => {
            ecdsa::verify_es256(&private.public_key(), message, signature)
        }
        (ES384, KeyMaterial::P384Public(public)) => ecdsa::verify_es384(public, message, signature),
        (ES384, KeyMaterial::P384Private(private)) => {
            ecdsa::verify_es384(&private.public_key(), message, signature)
        }
        (ES512, KeyMaterial::P521Public(public)) => ecdsa::verify_es512(public, message, signature),
        (ES512, KeyMaterial::P521Private(private)) => {
            ecdsa::verify_es512(&private.public_key(), message, signature)
        }
        (EdDSA, KeyMaterial::Ed25519Public(public)) => eddsa::verify(public, message, signature),
        (EdDSA, KeyMaterial::Ed25519Private(private)) => {
            eddsa::verify(&private.verifying_key(), message, signature)
        }
        (alg, material) => Err(unusable(material, alg)),
    }
}

/// Decode a signature and check it with `verifier`. Malformed encodings
/// count as invalid signatures.
fn verify_encoded<V, S>(verifier: &V, message: &[u8], signature: &[u8]) -> JoseResult<()>
where
    V: Verifier<S>,
    S: for<'a> TryFrom<&'a [u8]>,
{
    let signature = S::try_from(signature).map_err(|_| JoseError::InvalidSignature)?;
    verifier
        .verify(message, &signature)
        .map_err(|_| JoseError::InvalidSignature)
}
