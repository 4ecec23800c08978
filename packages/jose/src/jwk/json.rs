//! JWK and JWK Set JSON representations (RFC 7517)
//!
//! Members are kept as base64url strings here; [`Jwk::material`] turns them
//! into typed key material and [`Jwk::from_material`] goes the other way.

use super::key::{KeyMaterial, KeyUse};
use crate::algorithms::utils::{base64_url_decode, base64_url_encode};
use crate::error::{JoseError, JoseResult};
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// A JSON Web Key as found on the wire. Unknown members are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type: `oct`, `RSA`, `EC` or `OKP`
    pub kty: String,
    /// Intended usage
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub usage: Option<KeyUse>,
    /// Key identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Declared algorithm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Symmetric key value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,
    /// Elliptic curve name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    /// Curve point x coordinate, or the Ed25519 public key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    /// Curve point y coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    /// Private scalar (EC), private exponent (RSA) or Ed25519 seed (OKP)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
    /// RSA modulus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
    /// RSA first prime factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,
    /// RSA second prime factor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// RSA first factor CRT exponent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    /// RSA second factor CRT exponent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    /// RSA first CRT coefficient
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

/// A JSON Web Key Set document: `{"keys": [...]}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Member keys
    #[serde(default)]
    pub keys: Vec<Jwk>,
}

fn member(value: Option<&String>, name: &str, kty: &str) -> JoseResult<Vec<u8>> {
    let value = value.ok_or_else(|| JoseError::invalid_key(format!("{kty} key is missing '{name}'")))?;
    base64_url_decode(value)
        .map_err(|_| JoseError::invalid_key(format!("{kty} key member '{name}' is not base64url")))
}

fn uint(value: Option<&String>, name: &str) -> JoseResult<BigUint> {
    member(value, name, "RSA").map(|bytes| BigUint::from_bytes_be(&bytes))
}

impl Jwk {
    /// Decode the key material described by this JWK.
    ///
    /// # Errors
    /// Returns [`JoseError::InvalidKey`] for unknown key types or curves and
    /// for missing or malformed members.
    pub fn material(&self) -> JoseResult<KeyMaterial> {
        match self.kty.as_str() {
            "oct" => {
                let secret = member(self.k.as_ref(), "k", "oct")?;
                Ok(KeyMaterial::Symmetric(Zeroizing::new(secret)))
            }
            "RSA" => self.rsa_material(),
            "EC" => self.ec_material(),
            "OKP" => self.okp_material(),
            other => Err(JoseError::invalid_key(format!("unsupported key type '{other}'"))),
        }
    }

    fn rsa_material(&self) -> JoseResult<KeyMaterial> {
        let n = uint(self.n.as_ref(), "n")?;
        let e = uint(self.e.as_ref(), "e")?;
        if self.d.is_none() {
            let key = RsaPublicKey::new(n, e)
                .map_err(|err| JoseError::invalid_key(format!("invalid RSA public key: {err}")))?;
            return Ok(KeyMaterial::RsaPublic(key));
        }

        let d = uint(self.d.as_ref(), "d")?;
        let p = uint(self.p.as_ref(), "p")?;
        let q = uint(self.q.as_ref(), "q")?;
        let key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|err| JoseError::invalid_key(format!("invalid RSA private key: {err}")))?;
        Ok(KeyMaterial::RsaPrivate(key))
    }

    fn ec_material(&self) -> JoseResult<KeyMaterial> {
        let crv = self
            .crv
            .as_deref()
            .ok_or_else(|| JoseError::invalid_key("EC key is missing 'crv'"))?;
        match crv {
            "P-256" => {
                if self.d.is_some() {
                    let d = Zeroizing::new(member(self.d.as_ref(), "d", "EC")?);
                    let key = p256::SecretKey::from_slice(&d)
                        .map_err(|_| JoseError::invalid_key("invalid P-256 private scalar"))?;
                    return Ok(KeyMaterial::P256Private(key));
                }
                let (x, y) = self.coordinates(32)?;
                let point = p256::EncodedPoint::from_affine_coordinates(
                    p256::FieldBytes::from_slice(&x),
                    p256::FieldBytes::from_slice(&y),
                    false,
                );
                Option::<p256::PublicKey>::from(p256::PublicKey::from_encoded_point(&point))
                    .map(KeyMaterial::P256Public)
                    .ok_or_else(|| JoseError::invalid_key("P-256 point is not on the curve"))
            }
            "P-384" => {
                if self.d.is_some() {
                    let d = Zeroizing::new(member(self.d.as_ref(), "d", "EC")?);
                    let key = p384::SecretKey::from_slice(&d)
                        .map_err(|_| JoseError::invalid_key("invalid P-384 private scalar"))?;
                    return Ok(KeyMaterial::P384Private(key));
                }
                let (x, y) = self.coordinates(48)?;
                let point = p384::EncodedPoint::from_affine_coordinates(
                    p384::FieldBytes::from_slice(&x),
                    p384::FieldBytes::from_slice(&y),
                    false,
                );
                Option::<p384::PublicKey>::from(p384::PublicKey::from_encoded_point(&point))
                    .map(KeyMaterial::P384Public)
                    .ok_or_else(|| JoseError::invalid_key("P-384 point is not on the curve"))
            }
            "P-521" => {
                if self.d.is_some() {
                    let d = Zeroizing::new(member(self.d.as_ref(), "d", "EC")?);
                    let key = p521::SecretKey::from_slice(&d)
                        .map_err(|_| JoseError::invalid_key("invalid P-521 private scalar"))?;
                    return Ok(KeyMaterial::P521Private(key));
                }
                let (x, y) = self.coordinates(66)?;
                let point = p521::EncodedPoint::from_affine_coordinates(
                    p521::FieldBytes::from_slice(&x),
                    p521::FieldBytes::from_slice(&y),
                    false,
                );
                Option::<p521::PublicKey>::from(p521::PublicKey::from_encoded_point(&point))
                    .map(KeyMaterial::P521Public)
                    .ok_or_else(|| JoseError::invalid_key("P-521 point is not on the curve"))
            }
            other => Err(JoseError::invalid_key(format!("unsupported curve '{other}'"))),
        }
    }

    /// Ed25519 keys only (RFC 8037); `x` is required, also next to `d`.
    fn okp_material(&self) -> JoseResult<KeyMaterial> {
        match self.crv.as_deref() {
            Some("Ed25519") => {}
            Some(other) => return Err(JoseError::invalid_key(format!("unsupported curve '{other}'"))),
            None => return Err(JoseError::invalid_key("OKP key is missing 'crv'")),
        }
        let x = member(self.x.as_ref(), "x", "OKP")?;
        let x: [u8; ed25519_dalek::PUBLIC_KEY_LENGTH] = x
            .as_slice()
            .try_into()
            .map_err(|_| JoseError::invalid_key("Ed25519 public key must be 32 bytes"))?;
        let public = ed25519_dalek::VerifyingKey::from_bytes(&x)
            .map_err(|_| JoseError::invalid_key("invalid Ed25519 public key"))?;
        if self.d.is_none() {
            return Ok(KeyMaterial::Ed25519Public(public));
        }

        let d = Zeroizing::new(member(self.d.as_ref(), "d", "OKP")?);
        let seed: &ed25519_dalek::SecretKey = d
            .as_slice()
            .try_into()
            .map_err(|_| JoseError::invalid_key("Ed25519 private key must be 32 bytes"))?;
        let key = ed25519_dalek::SigningKey::from_bytes(seed);
        if key.verifying_key() != public {
            return Err(JoseError::invalid_key("Ed25519 'x' does not match 'd'"));
        }
        Ok(KeyMaterial::Ed25519Private(key))
    }

    fn coordinates(&self, len: usize) -> JoseResult<(Vec<u8>, Vec<u8>)> {
        let x = member(self.x.as_ref(), "x", "EC")?;
        let y = member(self.y.as_ref(), "y", "EC")?;
        if x.len() != len || y.len() != len {
            return Err(JoseError::invalid_key(format!(
                "EC coordinates must be {len} bytes"
            )));
        }
        Ok((x, y))
    }

    /// Describe key material as a JWK with key type specific members only.
    #[must_use]
    pub fn from_material(material: &KeyMaterial) -> Self {
        let mut jwk = Self {
            kty: material.key_type().to_string(),
            ..Self::default()
        };
        match material {
            KeyMaterial::Symmetric(secret) => {
                jwk.k = Some(base64_url_encode(secret));
            }
            KeyMaterial::RsaPublic(key) => {
                jwk.n = Some(base64_url_encode(&key.n().to_bytes_be()));
                jwk.e = Some(base64_url_encode(&key.e().to_bytes_be()));
            }
            KeyMaterial::RsaPrivate(key) => {
                jwk.n = Some(base64_url_encode(&key.n().to_bytes_be()));
                jwk.e = Some(base64_url_encode(&key.e().to_bytes_be()));
                jwk.d = Some(base64_url_encode(&key.d().to_bytes_be()));
                if let [p, q, ..] = key.primes() {
                    jwk.p = Some(base64_url_encode(&p.to_bytes_be()));
                    jwk.q = Some(base64_url_encode(&q.to_bytes_be()));
                }
                jwk.dp = key.dp().map(|v| base64_url_encode(&v.to_bytes_be()));
                jwk.dq = key.dq().map(|v| base64_url_encode(&v.to_bytes_be()));
                jwk.qi = key.qinv().map(|v| base64_url_encode(&v.to_bytes_be().1));
            }
            KeyMaterial::P256Public(key) => {
                let point = key.to_encoded_point(false);
                jwk.set_point("P-256", point.x(), point.y());
            }
            KeyMaterial::P256Private(key) => {
                let point = key.public_key().to_encoded_point(false);
                jwk.set_point("P-256", point.x(), point.y());
                jwk.d = Some(base64_url_encode(&key.to_bytes()));
            }
            KeyMaterial::P384Public(key) => {
                let point = key.to_encoded_point(false);
                jwk.set_point("P-384", point.x(), point.y());
            }
            KeyMaterial::P384Private(key) => {
                let point = key.public_key().to_encoded_point(false);
                jwk.set_point("P-384", point.x(), point.y());
                jwk.d = Some(base64_url_encode(&key.to_bytes()));
            }
            KeyMaterial::P521Public(key) => {
                let point = key.to_encoded_point(false);
                jwk.set_point("P-521", point.x(), point.y());
            }
            KeyMaterial::P521Private(key) => {
                let point = key.public_key().to_encoded_point(false);
                jwk.set_point("P-521", point.x(), point.y());
                jwk.d = Some(base64_url_encode(&key.to_bytes()));
            }
            KeyMaterial::Ed25519Public(key) => {
                jwk.crv = Some("Ed25519".to_string());
                jwk.x = Some(base64_url_encode(key.as_bytes()));
            }
            KeyMaterial::Ed25519Private(key) => {
                jwk.crv = Some("Ed25519".to_string());
                jwk.x = Some(base64_url_encode(key.verifying_key().as_bytes()));
                jwk.d = Some(base64_url_encode(Zeroizing::new(key.to_bytes()).as_slice()));
            }
        }
        jwk
    }

    fn set_point<T: AsRef<[u8]>>(&mut self, crv: &str, x: Option<&T>, y: Option<&T>) {
        self.crv = Some(crv.to_string());
        self.x = x.map(|v| base64_url_encode(v.as_ref()));
        self.y = y.map(|v| base64_url_encode(v.as_ref()));
    }
}
