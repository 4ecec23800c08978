//! Claim sets and the coercion of standard claim values

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Unique token identifier
pub const CLAIM_JTI: &str = "jti";
/// Subject
pub const CLAIM_SUB: &str = "sub";
/// Issuer
pub const CLAIM_ISS: &str = "iss";
/// Audience
pub const CLAIM_AUD: &str = "aud";
/// Expiry
pub const CLAIM_EXP: &str = "exp";
/// Not before
pub const CLAIM_NBF: &str = "nbf";
/// Issued at
pub const CLAIM_IAT: &str = "iat";
/// Space delimited granted scopes
pub const CLAIM_SCOPE: &str = "scope";

/// A claim value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimValue {
    /// `jti`, `sub` and `iss`
    Str(String),
    /// `aud`, always a list
    Audience(Vec<String>),
    /// `exp`, `nbf` and `iat`
    Time(DateTime<Utc>),
    /// Any other claim, as decoded
    Other(Value),
}

impl ClaimValue {
    /// The string of a [`ClaimValue::Str`] or of a JSON string in [`ClaimValue::Other`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            Self::Other(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The audience list.
    #[must_use]
    pub fn as_audience(&self) -> Option<&[String]> {
        match self {
            Self::Audience(aud) => Some(aud),
            _ => None,
        }
    }

    /// The instant of a time claim.
    #[must_use]
    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Time(t) => Some(*t),
            _ => None,
        }
    }
}

/// Read-only, name-indexed view over a decoded payload.
///
/// Standard claims must come back coerced: `jti`, `sub` and `iss` as
/// [`ClaimValue::Str`], `aud` as [`ClaimValue::Audience`], and `exp`, `nbf`
/// and `iat` as [`ClaimValue::Time`]. A standard claim that cannot be coerced
/// is reported absent. [`coerce_claim`] implements these rules for JSON values.
pub trait Claims {
    /// The claim named `name`, if present.
    fn get(&self, name: &str) -> Option<ClaimValue>;
}

/// Seconds since the epoch, integer or fractional (floored), as an instant.
#[must_use]
pub fn numeric_date(value: &Value) -> Option<DateTime<Utc>> {
    let seconds = match value.as_i64() {
        Some(seconds) => seconds,
        None => {
            let seconds = value.as_f64()?.floor();
            if !seconds.is_finite() || seconds < i64::MIN as f64 || seconds > i64::MAX as f64 {
                return None;
            }
            seconds as i64
        }
    };
    DateTime::from_timestamp(seconds, 0)
}

/// Apply the standard claim coercion to a JSON value.
#[must_use]
pub fn coerce_claim(name: &str, value: &Value) -> Option<ClaimValue> {
    match name {
        CLAIM_JTI | CLAIM_SUB | CLAIM_ISS => value.as_str().map(|s| ClaimValue::Str(s.to_string())),
        CLAIM_AUD => match value {
            Value::String(aud) => Some(ClaimValue::Audience(vec![aud.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(ClaimValue::Audience),
            _ => None,
        },
        CLAIM_EXP | CLAIM_NBF | CLAIM_IAT => numeric_date(value).map(ClaimValue::Time),
        _ if value.is_null() => None,
        _ => Some(ClaimValue::Other(value.clone())),
    }
}

/// Schema-less claims backed by a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MapClaims(Map<String, Value>);

impl MapClaims {
    /// Empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a claim, returning the claim set.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a claim.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    /// The uncoerced JSON value of a claim.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// The underlying JSON object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for MapClaims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl Claims for MapClaims {
    fn get(&self, name: &str) -> Option<ClaimValue> {
        self.0.get(name).and_then(|value| coerce_claim(name, value))
    }
}

/// Registered claims as typed fields; everything else lands in `extra`.
///
/// Times are unix seconds. Fractional times are floored and values that are
/// not numbers are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StandardClaims {
    /// JWT ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
    /// Subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience; a single audience is written as a bare string.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_audience",
        deserialize_with = "deserialize_audience"
    )]
    pub aud: Option<Vec<String>>,
    /// Expiry (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_seconds")]
    pub exp: Option<i64>,
    /// Not before (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_seconds")]
    pub nbf: Option<i64>,
    /// Issued-at (unix seconds).
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "deserialize_seconds")]
    pub iat: Option<i64>,
    /// Granted scopes, space delimited.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Custom data.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

fn serialize_audience<S: Serializer>(aud: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error> {
    match aud.as_deref() {
        Some([single]) => serializer.serialize_str(single),
        Some(many) => many.serialize(serializer),
        None => serializer.serialize_none(),
    }
}

fn deserialize_audience<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<String>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| coerce_claim(CLAIM_AUD, &v))
        .and_then(|v| match v {
            ClaimValue::Audience(aud) => Some(aud),
            _ => None,
        }))
}

fn deserialize_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(numeric_date).map(|t| t.timestamp()))
}

fn seconds(value: Option<i64>) -> Option<ClaimValue> {
    value
        .and_then(|s| DateTime::from_timestamp(s, 0))
        .map(ClaimValue::Time)
}

impl Claims for StandardClaims {
    fn get(&self, name: &str) -> Option<ClaimValue> {
        match name {
            CLAIM_JTI => self.jti.clone().map(ClaimValue::Str),
            CLAIM_SUB => self.sub.clone().map(ClaimValue::Str),
            CLAIM_ISS => self.iss.clone().map(ClaimValue::Str),
            CLAIM_AUD => self.aud.clone().map(ClaimValue::Audience),
            CLAIM_EXP => seconds(self.exp),
            CLAIM_NBF => seconds(self.nbf),
            CLAIM_IAT => seconds(self.iat),
            CLAIM_SCOPE => self.scope.clone().map(|s| ClaimValue::Other(Value::String(s))),
            _ => self.extra.get(name).and_then(|value| coerce_claim(name, value)),
        }
    }
}
