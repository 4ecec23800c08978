//! Claim validation builder and its serde configuration form

use super::expect::{Expect, expect_aud, expect_iss, expect_jti, expect_scopes, expect_sub, expect_time};
use super::value::Claims;
use crate::error::ClaimsError;
use chrono::Duration;
use serde::{Deserialize, Serialize};

type BoxedRule = Box<dyn Expect + Send + Sync>;

/// An ordered list of claim rules, checked first to last.
#[derive(Default)]
pub struct ClaimsValidator {
    rules: Vec<BoxedRule>,
}

impl ClaimsValidator {
    /// A validator without rules; it accepts every claim set.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Require a non-empty `jti`.
    #[must_use]
    pub fn require_jti(self) -> Self {
        self.with_rule(expect_jti())
    }

    /// Require `sub` to be one of `subjects`.
    #[must_use]
    pub fn with_subjects<I, S>(self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_rule(expect_sub(subjects))
    }

    /// Require every audience in `audiences` to be in `aud`.
    #[must_use]
    pub fn with_audience<I, S>(self, audiences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_rule(expect_aud(audiences))
    }

    /// Require `iss` to equal `issuer`.
    #[must_use]
    pub fn with_issuer(self, issuer: impl Into<String>) -> Self {
        self.with_rule(expect_iss(issuer))
    }

    /// Require the `scope` claim to grant every scope in `scopes`.
    #[must_use]
    pub fn with_scopes<I, S>(self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_rule(expect_scopes(scopes))
    }

    /// Check `exp`, `iat` and `nbf` with `leeway` clock skew tolerance.
    #[must_use]
    pub fn with_leeway(self, leeway: Duration) -> Self {
        self.with_rule(expect_time(leeway))
    }

    /// Append a custom rule.
    #[must_use]
    pub fn with_rule<E>(mut self, rule: E) -> Self
    where
        E: Expect + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// `true` when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run the rules in order.
    ///
    /// # Errors
    /// Returns the first violation.
    pub fn validate(&self, claims: &dyn Claims) -> Result<(), ClaimsError> {
        for rule in &self.rules {
            if let Err(err) = rule.check(claims) {
                tracing::debug!(error = %err, "claims rejected");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for ClaimsValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsValidator")
            .field("rules", &self.rules.len())
            .finish()
    }
}

/// Access token claim policy for a protected resource.
///
/// Empty lists and strings switch the corresponding rule off. The time window
/// is always checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsPolicy {
    /// Expected issuer
    pub issuer: String,
    /// Audiences that must all be present in `aud`
    pub audience: Vec<String>,
    /// Expected subject
    pub subject: String,
    /// Scopes that must all be granted
    pub scopes: Vec<String>,
    /// Clock skew tolerance in seconds
    pub leeway: i64,
    /// Require a `jti`
    pub require_jti: bool,
}

impl ClaimsPolicy {
    /// Build the validator: issuer, time window, audience, subject, scopes, then jti.
    #[must_use]
    pub fn into_validator(self) -> ClaimsValidator {
        let mut validator = ClaimsValidator::new();
        if !self.issuer.is_empty() {
            validator = validator.with_issuer(self.issuer);
        }
        let leeway = Duration::try_seconds(self.leeway).unwrap_or(Duration::MAX);
        validator = validator.with_leeway(leeway);
        if !self.audience.is_empty() {
            validator = validator.with_audience(self.audience);
        }
        if !self.subject.is_empty() {
            validator = validator.with_subjects([self.subject]);
        }
        if !self.scopes.is_empty() {
            validator = validator.with_scopes(self.scopes);
        }
        if self.require_jti {
            validator = validator.require_jti();
        }
        validator
    }
}
