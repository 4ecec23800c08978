//! JSON Web Signature (RFC 7515): compact signing and parsing of the
//! compact and JSON serializations

use crate::algorithms::{
    self,
    utils::{base64_url_decode, base64_url_encode},
};
use crate::error::{JoseError, JoseResult};
use crate::header::Header;
use crate::jwa::SignatureAlgorithm;
use crate::jwk::Key;
use serde::Deserialize;

/// Sign `payload` with `key` and return the compact serialization.
///
/// The header carries `alg` and, when the key has an id, `kid`.
///
/// # Errors
/// Returns [`JoseError::InvalidKey`] or [`JoseError::UnsupportedAlgorithm`]
/// when the key cannot produce `alg` signatures.
pub fn sign_compact(alg: SignatureAlgorithm, key: &Key, payload: &[u8]) -> JoseResult<String> {
    let header = Header::new(alg.as_str(), key.id()).encode()?;
    let signing_input = format!("{header}.{}", base64_url_encode(payload));
    let signature = algorithms::sign(alg, key, signing_input.as_bytes())?;
    Ok(format!("{signing_input}.{}", base64_url_encode(&signature)))
}

/// A parsed JWS with exactly one signature, not yet verified.
#[derive(Debug, Clone)]
pub struct Jws {
    header: Header,
    signing_input: Vec<u8>,
    payload: Vec<u8>,
    signature: Vec<u8>,
}

#[derive(Deserialize)]
struct JsonSignature {
    #[serde(default)]
    protected: Option<String>,
    #[serde(default)]
    header: Option<Header>,
    signature: String,
}

#[derive(Deserialize)]
struct JsonJws {
    payload: String,
    #[serde(default)]
    signatures: Option<Vec<JsonSignature>>,
    #[serde(flatten)]
    flattened: Option<JsonSignature>,
}

impl Jws {
    /// Parse the compact (`header.payload.signature`) or JSON serialization.
    ///
    /// # Errors
    /// Returns [`JoseError::InvalidToken`] for malformed input and for JSON
    /// serializations carrying more or fewer than one signature.
    pub fn parse(token: &str) -> JoseResult<Self> {
        let token = token.trim();
        if token.starts_with('{') {
            Self::parse_json(token)
        } else {
            Self::parse_compact(token)
        }
    }

    fn parse_compact(token: &str) -> JoseResult<Self> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(JoseError::invalid_token("compact JWS must have three segments"));
        };
        Self::from_segments(header, Header::default(), payload, signature)
    }

    fn parse_json(token: &str) -> JoseResult<Self> {
        let doc: JsonJws = serde_json::from_str(token)
            .map_err(|_| JoseError::invalid_token("malformed JWS JSON serialization"))?;
        let signature = match doc.signatures {
            Some(mut signatures) => {
                if signatures.len() != 1 {
                    return Err(JoseError::invalid_token(format!(
                        "expected exactly one signature, found {}",
                        signatures.len()
                    )));
                }
                signatures.remove(0)
            }
            None => doc
                .flattened
                .ok_or_else(|| JoseError::invalid_token("JWS JSON serialization has no signature"))?,
        };
        Self::from_segments(
            signature.protected.as_deref().unwrap_or_default(),
            signature.header.unwrap_or_default(),
            &doc.payload,
            &signature.signature,
        )
    }

    fn from_segments(protected: &str, unprotected: Header, payload: &str, signature: &str) -> JoseResult<Self> {
        let header = if protected.is_empty() {
            unprotected.check_critical()?;
            unprotected
        } else {
            Header::decode(protected)?.merge(unprotected)
        };
        let payload_bytes = base64_url_decode(payload)
            .map_err(|_| JoseError::invalid_token("payload is not base64url"))?;
        let signature = base64_url_decode(signature)
            .map_err(|_| JoseError::invalid_token("signature is not base64url"))?;
        Ok(Self {
            header,
            signing_input: format!("{protected}.{payload}").into_bytes(),
            payload: payload_bytes,
            signature,
        })
    }

    /// The merged header.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Check the signature with `key` under the header's algorithm and return
    /// the payload.
    ///
    /// # Errors
    /// Returns [`JoseError::InvalidSignature`] when the signature does not
    /// verify, or the algorithm errors of [`Jws::parse`] for unknown names.
    pub fn verify(&self, key: &Key) -> JoseResult<&[u8]> {
        let alg: SignatureAlgorithm = self
            .header
            .alg
            .parse()
            .map_err(|_| JoseError::unsupported_algorithm(self.header.alg.clone()))?;
        algorithms::verify(alg, key, &self.signing_input, &self.signature)?;
        Ok(&self.payload)
    }

    /// The payload without any signature check.
    #[must_use]
    pub fn unverified_payload(&self) -> &[u8] {
        &self.payload
    }
}

/// `true` when `bytes` look like a compact JWS: three base64url segments and
/// a JSON header naming `alg`.
#[must_use]
pub fn is_compact_jws(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    let mut parts = text.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(_), Some(_), None) => {
            Header::decode(header).is_ok_and(|h| !h.alg.is_empty())
        }
        _ => false,
    }
}
