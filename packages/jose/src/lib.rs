//! Signed and encrypted compact JOSE tokens
//!
//! This crate provides:
//! - Key sets (JWKS) with id lookup and time-rotated algorithm selection
//! - Key sources that pick the signing and encryption keys for the encoder
//! - Encoding (sign, then encrypt) and decoding (decrypt, then verify)
//! - Claim rules for validating decoded payloads
//!
//! ```no_run
//! use cryypt_jose::{Algs, KeySet, SignatureAlgorithm, SkipKeySource, decode, encode, signature_key_by_alg};
//! # fn main() -> cryypt_jose::JoseResult<()> {
//! let keys = KeySet::from_json(r#"{"keys":[]}"#)?;
//! let token = encode(
//!     signature_key_by_alg(Some(SignatureAlgorithm::RS256), &keys).as_ref(),
//!     &SkipKeySource,
//!     &serde_json::json!({"sub": "alice"}),
//! )?;
//! let token = String::from_utf8_lossy(&token);
//! let claims: serde_json::Value = decode(&token, &keys.to_public(), &KeySet::empty(), &Algs::signed(SignatureAlgorithm::RS256))?;
//! # let _ = claims;
//! # Ok(())
//! # }
//! ```

pub(crate) mod algorithms;
pub mod claims;
mod decode;
mod encode;
mod error;
mod header;
pub mod jwa;
pub mod jwe;
pub mod jwk;
pub mod jws;

pub use claims::{ClaimValue, Claims, ClaimsPolicy, ClaimsValidator, Expect, MapClaims, StandardClaims, validate_claims};
pub use decode::{decode, decode_bytes, decode_value};
pub use encode::{Json, NESTED_CONTENT_TYPE, Payload, encode, encode_bytes, encode_to_string};
pub use error::{ClaimsError, JoseError, JoseResult};
pub use header::Header;
pub use jwa::{Algs, ContentEncryption, KeyAlgorithm, SignatureAlgorithm, is_none};
pub use jwk::{
    Jwk, JwkSet, Key, KeyMaterial, KeySet, KeySource, KeyUse, ResolvedKey, SharedKeySet, SkipKeySource,
    encryption_key_by_alg, encryption_key_by_id, signature_key_by_alg, signature_key_by_id,
};
