//! Token encoding: sign, then encrypt

use crate::claims::{MapClaims, StandardClaims};
use crate::error::{JoseError, JoseResult};
use crate::jwe;
use crate::jwk::KeySource;
use crate::jws;
use serde::Serialize;
use std::borrow::Cow;

/// Content type announced in the JWE header when the plaintext is a signed token.
pub const NESTED_CONTENT_TYPE: &str = "JWT";

/// The bytes a value contributes as token payload.
///
/// Strings and byte buffers are taken verbatim, so an already serialized
/// claim set is not quoted a second time. JSON values and claim sets are
/// serialized; wrap any other [`Serialize`] type in [`Json`].
pub trait Payload {
    /// The payload bytes.
    ///
    /// # Errors
    /// Returns [`JoseError::Serialization`] when the value cannot be serialized.
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>>;
}

/// Serializes the wrapped value to JSON as the token payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Payload for Json<T> {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Owned(serde_json::to_vec(&self.0)?))
    }
}

impl<T: Payload + ?Sized> Payload for &T {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        (**self).payload_bytes()
    }
}

impl Payload for str {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl Payload for String {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl Payload for [u8] {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl<const N: usize> Payload for [u8; N] {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

impl Payload for Vec<u8> {
    fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_slice()))
    }
}

macro_rules! json_payload {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Payload for $ty {
                fn payload_bytes(&self) -> JoseResult<Cow<'_, [u8]>> {
                    Ok(Cow::Owned(serde_json::to_vec(self)?))
                }
            }
        )*
    };
}

json_payload!(
    serde_json::Value,
    serde_json::Map<String, serde_json::Value>,
    MapClaims,
    StandardClaims,
);

/// Turn `payload` into bytes (see [`Payload`]) and run them through
/// [`encode_bytes`].
///
/// # Errors
/// Returns [`JoseError::Serialization`] if the payload cannot be serialized,
/// otherwise the errors of [`encode_bytes`].
pub fn encode<P>(sig: &dyn KeySource, enc: &dyn KeySource, payload: &P) -> JoseResult<Vec<u8>>
where
    P: Payload + ?Sized,
{
    let bytes = payload.payload_bytes()?;
    encode_bytes(sig, enc, &bytes)
}

/// Sign `raw` with the key from `sig`, then encrypt the result with the key
/// from `enc`.
///
/// A source that resolves without an algorithm skips its stage; with both
/// stages skipped the bytes are returned unchanged. Both sources are
/// resolved before any cryptographic work is done.
///
/// # Errors
/// - [`JoseError::NoSigningKey`] / [`JoseError::NoEncryptionKey`] when a
///   source reports no key, or resolves an algorithm without a key.
/// - Key and algorithm errors from the signing and encryption primitives.
pub fn encode_bytes(sig: &dyn KeySource, enc: &dyn KeySource, raw: &[u8]) -> JoseResult<Vec<u8>> {
    let Some(signing) = sig.resolve() else {
        tracing::warn!("signing key source reported no key");
        return Err(JoseError::NoSigningKey);
    };
    let Some(encryption) = enc.resolve() else {
        tracing::warn!("encryption key source reported no key");
        return Err(JoseError::NoEncryptionKey);
    };

    let mut bytes = raw.to_vec();
    let mut signed = false;

    if let Some(alg) = signing.algs.sig {
        let key = signing.key.ok_or(JoseError::NoSigningKey)?;
        bytes = jws::sign_compact(alg, &key, &bytes)?.into_bytes();
        signed = true;
        tracing::debug!(alg = alg.as_str(), kid = key.id(), "payload signed");
    } else {
        tracing::debug!("signing skipped");
    }

    if let (Some(alg), Some(content)) = (encryption.algs.encrypt, encryption.algs.encode) {
        let key = encryption.key.ok_or(JoseError::NoEncryptionKey)?.to_public();
        let cty = signed.then_some(NESTED_CONTENT_TYPE);
        bytes = jwe::encrypt_compact(alg, content, &key, &bytes, cty)?.into_bytes();
        tracing::debug!(
            alg = alg.as_str(),
            enc = content.as_str(),
            kid = key.id(),
            "payload encrypted"
        );
    } else {
        tracing::debug!("encryption skipped");
    }

    Ok(bytes)
}

/// Like [`encode`], returning the token as a string.
///
/// # Errors
/// The errors of [`encode`].
pub fn encode_to_string<P>(sig: &dyn KeySource, enc: &dyn KeySource, payload: &P) -> JoseResult<String>
where
    P: Payload + ?Sized,
{
    let bytes = encode(sig, enc, payload)?;
    String::from_utf8(bytes).map_err(|err| JoseError::invalid_token(err.to_string()))
}
