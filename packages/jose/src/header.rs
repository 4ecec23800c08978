//! JOSE protected header shared by JWS and JWE

use crate::algorithms::utils::{base64_url_decode, base64_url_encode};
use crate::error::{JoseError, JoseResult};
use crate::jwk::Jwk;
use serde::{Deserialize, Serialize};

/// The JOSE header members this crate reads or writes. Others are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signature or key management algorithm
    #[serde(default)]
    pub alg: String,
    /// Content encryption algorithm (JWE only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enc: Option<String>,
    /// Key identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
    /// Media type of the complete token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Media type of the secured content; `JWT` for nested tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cty: Option<String>,
    /// Ephemeral public key (ECDH-ES)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epk: Option<Jwk>,
    /// Agreement PartyUInfo, base64url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apu: Option<String>,
    /// Agreement PartyVInfo, base64url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apv: Option<String>,
    /// Initialization vector of the key encryption (A*GCMKW), base64url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iv: Option<String>,
    /// Authentication tag of the key encryption (A*GCMKW), base64url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// PBES2 salt input, base64url
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2s: Option<String>,
    /// PBES2 iteration count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p2c: Option<u32>,
    /// Extensions the recipient must understand
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crit: Option<Vec<String>>,
}

impl Header {
    /// A header naming `alg` and, when `kid` is non-empty, the key id.
    #[must_use]
    pub fn new(alg: &str, kid: &str) -> Self {
        Self {
            alg: alg.to_string(),
            kid: (!kid.is_empty()).then(|| kid.to_string()),
            ..Self::default()
        }
    }

    /// The key id, treating an empty value as absent.
    #[must_use]
    pub fn key_id(&self) -> Option<&str> {
        self.kid.as_deref().filter(|kid| !kid.is_empty())
    }

    /// Fill members missing here from an unprotected header.
    #[must_use]
    pub(crate) fn merge(mut self, unprotected: Header) -> Self {
        if self.alg.is_empty() {
            self.alg = unprotected.alg;
        }
        self.enc = self.enc.or(unprotected.enc);
        self.kid = self.kid.or(unprotected.kid);
        self.typ = self.typ.or(unprotected.typ);
        self.cty = self.cty.or(unprotected.cty);
        self.epk = self.epk.or(unprotected.epk);
        self.apu = self.apu.or(unprotected.apu);
        self.apv = self.apv.or(unprotected.apv);
        self.iv = self.iv.or(unprotected.iv);
        self.tag = self.tag.or(unprotected.tag);
        self.p2s = self.p2s.or(unprotected.p2s);
        self.p2c = self.p2c.or(unprotected.p2c);
        self
    }

    pub(crate) fn encode(&self) -> JoseResult<String> {
        Ok(base64_url_encode(&serde_json::to_vec(self)?))
    }

    pub(crate) fn decode(segment: &str) -> JoseResult<Self> {
        let bytes = base64_url_decode(segment)
            .map_err(|_| JoseError::invalid_token("header is not base64url"))?;
        let header: Header = serde_json::from_slice(&bytes)
            .map_err(|_| JoseError::invalid_token("header is not a JSON object"))?;
        header.check_critical()?;
        Ok(header)
    }

    /// No extension is understood, so any `crit` entry is fatal (RFC 7515 §4.1.11).
    pub(crate) fn check_critical(&self) -> JoseResult<()> {
        match self.crit.as_deref() {
            None => Ok(()),
            Some(names) => Err(JoseError::invalid_token(format!(
                "unsupported critical header parameters: {}",
                names.join(", ")
            ))),
        }
    }
}
