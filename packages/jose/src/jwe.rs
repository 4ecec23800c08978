//! JSON Web Encryption (RFC 7516), compact serialization with one recipient

use crate::algorithms::content::{self, Sealed};
use crate::algorithms::key_management::{self, KeyParams};
use crate::algorithms::utils::{base64_url_decode, base64_url_encode};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::jwa::{ContentEncryption, KeyAlgorithm};
use crate::jwk::Key;

/// Encrypt `plaintext` to `key` and return the compact serialization.
///
/// `key` is the recipient's public key (or the shared secret for symmetric
/// algorithms). `cty` is copied into the protected header when given.
///
/// # Errors
/// Returns [`JoseError::InvalidKey`] when the key does not fit `alg`, and
/// [`JoseError::UnsupportedAlgorithm`] for algorithms without an implementation.
pub fn encrypt_compact(
    alg: KeyAlgorithm,
    enc: ContentEncryption,
    key: &Key,
    plaintext: &[u8],
    cty: Option<&str>,
) -> JoseResult<String> {
    let delivery = key_management::deliver(alg, enc, key)?;

    let mut header = Header::new(alg.as_str(), key.id());
    header.enc = Some(enc.as_str().to_string());
    header.cty = cty.map(str::to_string);
    header.epk = delivery.epk;
    header.iv = delivery.iv.as_deref().map(base64_url_encode);
    header.tag = delivery.tag.as_deref().map(base64_url_encode);
    header.p2s = delivery.p2s.as_deref().map(base64_url_encode);
    header.p2c = delivery.p2c;
    let protected = header.encode()?;

    let sealed = content::encrypt(enc, &delivery.cek, protected.as_bytes(), plaintext)?;
    Ok(format!(
        "{protected}.{}.{}.{}.{}",
        base64_url_encode(&delivery.encrypted_key),
        base64_url_encode(&sealed.iv),
        base64_url_encode(&sealed.ciphertext),
        base64_url_encode(&sealed.tag),
    ))
}

/// A parsed compact JWE, not yet decrypted.
#[derive(Debug)]
pub struct Jwe {
    header: Header,
    protected: String,
    encrypted_key: Vec<u8>,
    sealed: Sealed,
}

fn segment(value: &str, name: &str) -> JoseResult<Vec<u8>> {
    base64_url_decode(value).map_err(|_| JoseError::invalid_token(format!("{name} is not base64url")))
}

fn optional_segment(value: Option<&str>, name: &str) -> JoseResult<Option<Vec<u8>>> {
    value.map(|v| segment(v, name)).transpose()
}

impl Jwe {
    /// Parse the five-segment compact serialization.
    ///
    /// # Errors
    /// Returns [`JoseError::InvalidToken`] for malformed input.
    pub fn parse(token: &str) -> JoseResult<Self> {
        let mut parts = token.trim().split('.');
        let (Some(protected), Some(encrypted_key), Some(iv), Some(ciphertext), Some(tag), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(JoseError::invalid_token("compact JWE must have five segments"));
        };

        let header = Header::decode(protected)?;
        if header.enc.is_none() {
            return Err(JoseError::invalid_token("JWE header has no enc"));
        }
        Ok(Self {
            header,
            protected: protected.to_string(),
            encrypted_key: segment(encrypted_key, "encrypted key")?,
            sealed: Sealed {
                iv: segment(iv, "iv")?,
                ciphertext: segment(ciphertext, "ciphertext")?,
                tag: segment(tag, "authentication tag")?,
            },
        })
    }

    /// The protected header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Recover the plaintext with the recipient's private or symmetric key.
    ///
    /// # Errors
    /// Returns [`JoseError::DecryptionFailed`] when the key does not open the
    /// token or the ciphertext was modified.
    pub fn decrypt(&self, key: &Key) -> JoseResult<Vec<u8>> {
        let alg: KeyAlgorithm = self
            .header
            .alg
            .parse()
            .map_err(|_| JoseError::unsupported_algorithm(self.header.alg.clone()))?;
        let enc_name = self.header.enc.as_deref().unwrap_or_default();
        let enc: ContentEncryption = enc_name
            .parse()
            .map_err(|_| JoseError::unsupported_algorithm(enc_name))?;

        let apu = optional_segment(self.header.apu.as_deref(), "apu")?;
        let apv = optional_segment(self.header.apv.as_deref(), "apv")?;
        let iv = optional_segment(self.header.iv.as_deref(), "iv")?;
        let tag = optional_segment(self.header.tag.as_deref(), "tag")?;
        let p2s = optional_segment(self.header.p2s.as_deref(), "p2s")?;
        let params = KeyParams {
            epk: self.header.epk.as_ref(),
            apu: apu.as_deref().unwrap_or_default(),
            apv: apv.as_deref().unwrap_or_default(),
            iv: iv.as_deref(),
            tag: tag.as_deref(),
            p2s: p2s.as_deref(),
            p2c: self.header.p2c,
        };

        let cek = key_management::recover(alg, enc, key, &self.encrypted_key, &params)?;
        content::decrypt(enc, &cek, self.protected.as_bytes(), &self.sealed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_encryption_round_trip() {
        let key = Key::symmetric("shared", vec![7u8; 16]);
        let token = encrypt_compact(KeyAlgorithm::Dir, ContentEncryption::A128Gcm, &key, b"secret", None);
        let Ok(token) = token else { panic!("encryption failed") };
        assert_eq!(token.split('.').nth(1), Some(""));
        let plaintext = Jwe::parse(&token).and_then(|jwe| jwe.decrypt(&key));
        assert_eq!(plaintext.ok(), Some(b"secret".to_vec()));
    }

    #[test]
    fn key_wrap_with_wrong_key_fails() {
        let key = Key::symmetric("kw", vec![1u8; 32]);
        let wrong = Key::symmetric("kw", vec![2u8; 32]);
        let Ok(token) = encrypt_compact(KeyAlgorithm::A256Kw, ContentEncryption::A256CbcHs512, &key, b"x", None) else {
            panic!("encryption failed");
        };
        let result = Jwe::parse(&token).and_then(|jwe| jwe.decrypt(&wrong));
        assert!(matches!(result, Err(JoseError::DecryptionFailed)));
    }

    #[test]
    fn header_is_authenticated() {
        let key = Key::symmetric("shared", vec![7u8; 32]);
        let Ok(token) = encrypt_compact(KeyAlgorithm::Dir, ContentEncryption::A128CbcHs256, &key, b"x", None) else {
            panic!("encryption failed");
        };
        let forged_header = Header {
            kid: Some("other".into()),
            ..Jwe::parse(&token).map(|j| j.header().clone()).unwrap_or_default()
        };
        let forged = format!(
            "{}.{}",
            forged_header.encode().unwrap_or_default(),
            token.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
        );
        let result = Jwe::parse(&forged).and_then(|jwe| jwe.decrypt(&key));
        assert!(matches!(result, Err(JoseError::DecryptionFailed)));
    }

    #[test]
    fn ed25519_has_no_key_management() {
        let key = Key::symmetric("p", vec![1u8; 32]);
        let result = encrypt_compact(KeyAlgorithm::Ed25519, ContentEncryption::A128Gcm, &key, b"x", None);
        assert!(matches!(result, Err(JoseError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn gcm_key_wrap_publishes_iv_and_tag() {
        let key = Key::symmetric("gcmkw", vec![5u8; 24]);
        let Ok(token) = encrypt_compact(KeyAlgorithm::A192GcmKw, ContentEncryption::A128CbcHs256, &key, b"x", None)
        else {
            panic!("encryption failed");
        };
        let Ok(jwe) = Jwe::parse(&token) else { panic!("parse failed") };
        let iv = jwe.header().iv.as_deref().map(base64_url_decode).and_then(Result::ok);
        let tag = jwe.header().tag.as_deref().map(base64_url_decode).and_then(Result::ok);
        assert_eq!(iv.map(|v| v.len()), Some(12));
        assert_eq!(tag.map(|v| v.len()), Some(16));
        assert_eq!(jwe.encrypted_key.len(), 32);
        assert_eq!(jwe.decrypt(&key).ok(), Some(b"x".to_vec()));

        let stripped = Header {
            tag: None,
            ..jwe.header().clone()
        };
        let forged = format!(
            "{}.{}",
            stripped.encode().unwrap_or_default(),
            token.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
        );
        let result = Jwe::parse(&forged).and_then(|jwe| jwe.decrypt(&key));
        assert!(matches!(result, Err(JoseError::InvalidToken(_))));
    }

    #[test]
    fn pbes2_rejects_out_of_range_iteration_counts() {
        let key = Key::symmetric("pw", b"correct horse battery staple".to_vec());
        let Ok(token) =
            encrypt_compact(KeyAlgorithm::Pbes2Hs256A128Kw, ContentEncryption::A128Gcm, &key, b"x", None)
        else {
            panic!("encryption failed");
        };
        let Ok(jwe) = Jwe::parse(&token) else { panic!("parse failed") };
        assert_eq!(jwe.header().p2c, Some(key_management::PBES2_COUNT));
        assert_eq!(jwe.header().p2s.as_deref().map(str::len), Some(22));
        assert_eq!(jwe.decrypt(&key).ok(), Some(b"x".to_vec()));

        for p2c in [1, 999, 1_000_001] {
            let tampered = Header {
                p2c: Some(p2c),
                ..jwe.header().clone()
            };
            let forged = format!(
                "{}.{}",
                tampered.encode().unwrap_or_default(),
                token.split_once('.').map(|(_, rest)| rest).unwrap_or_default()
            );
            let result = Jwe::parse(&forged).and_then(|jwe| jwe.decrypt(&key));
            assert!(matches!(result, Err(JoseError::InvalidToken(_))), "p2c {p2c}");
        }
    }
}
