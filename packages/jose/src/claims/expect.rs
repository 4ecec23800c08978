//! Composable claim rules

use super::value::{CLAIM_AUD, CLAIM_EXP, CLAIM_IAT, CLAIM_ISS, CLAIM_JTI, CLAIM_NBF, CLAIM_SCOPE, CLAIM_SUB, ClaimValue, Claims};
use crate::error::ClaimsError;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// A rule a claim set must satisfy.
pub trait Expect {
    /// Check `claims` against the rule.
    ///
    /// # Errors
    /// Returns the [`ClaimsError`] naming the violation.
    fn check(&self, claims: &dyn Claims) -> Result<(), ClaimsError>;
}

impl<F> Expect for F
where
    F: Fn(&dyn Claims) -> Result<(), ClaimsError>,
{
    fn check(&self, claims: &dyn Claims) -> Result<(), ClaimsError> {
        self(claims)
    }
}

/// Fixes the closure signature so it is accepted as an [`Expect`].
fn rule<F>(f: F) -> F
where
    F: Fn(&dyn Claims) -> Result<(), ClaimsError> + Send + Sync + 'static,
{
    f
}

/// Run `rules` in order and stop at the first violation.
///
/// # Errors
/// Returns the first violation.
pub fn validate_claims(claims: &dyn Claims, rules: &[&dyn Expect]) -> Result<(), ClaimsError> {
    rules.iter().try_for_each(|rule| rule.check(claims))
}

/// `jti` must be a non-empty string.
#[must_use]
pub fn expect_jti() -> impl Expect + Send + Sync + 'static {
    rule(|claims| match claims.get(CLAIM_JTI) {
        Some(jti) if jti.as_str().is_some_and(|s| !s.is_empty()) => Ok(()),
        _ => Err(ClaimsError::AbsentJti),
    })
}

/// `sub` must be one of `subjects`.
#[must_use]
pub fn expect_sub<I, S>(subjects: I) -> impl Expect + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let subjects: HashSet<String> = subjects.into_iter().map(Into::into).collect();
    rule(move |claims| match claims.get(CLAIM_SUB) {
        Some(sub) if sub.as_str().is_some_and(|s| subjects.contains(s)) => Ok(()),
        _ => Err(ClaimsError::InvalidSub),
    })
}

/// `iss` must equal `issuer`.
#[must_use]
pub fn expect_iss(issuer: impl Into<String>) -> impl Expect + Send + Sync + 'static {
    let issuer = issuer.into();
    rule(move |claims| match claims.get(CLAIM_ISS) {
        Some(iss) if iss.as_str() == Some(issuer.as_str()) => Ok(()),
        _ => Err(ClaimsError::InvalidIss),
    })
}

/// Every expected audience must appear in `aud`. Extra token audiences are fine.
#[must_use]
pub fn expect_aud<I, S>(audiences: I) -> impl Expect + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let expected: HashSet<String> = audiences.into_iter().map(Into::into).collect();
    rule(move |claims| {
        let aud = claims.get(CLAIM_AUD);
        let Some(list) = aud.as_ref().and_then(ClaimValue::as_audience) else {
            return Err(ClaimsError::InvalidAud);
        };
        let granted: HashSet<&str> = list.iter().map(String::as_str).collect();
        if expected.iter().all(|aud| granted.contains(aud.as_str())) {
            Ok(())
        } else {
            Err(ClaimsError::InvalidAud)
        }
    })
}

/// The space delimited `scope` claim must grant every scope in `scopes`.
#[must_use]
pub fn expect_scopes<I, S>(scopes: I) -> impl Expect + Send + Sync + 'static
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let required: Vec<String> = scopes.into_iter().map(Into::into).collect();
    rule(move |claims| {
        let scope = claims.get(CLAIM_SCOPE);
        let granted: HashSet<&str> = scope
            .as_ref()
            .and_then(|s| s.as_str())
            .map(|s| s.split_whitespace().collect())
            .unwrap_or_default();
        if required.iter().all(|s| granted.contains(s.as_str())) {
            Ok(())
        } else {
            Err(ClaimsError::InsufficientScope)
        }
    })
}

/// Check `exp`, `iat` and `nbf` against the current time with `leeway`
/// tolerance either way. The clock is read once per check.
///
/// Missing or non-time claims are skipped.
#[must_use]
pub fn expect_time(leeway: Duration) -> impl Expect + Send + Sync + 'static {
    rule(move |claims| check_time(claims, leeway, Utc::now()))
}

/// Like [`expect_time`] against a fixed `now`.
#[must_use]
pub fn expect_time_at(leeway: Duration, now: DateTime<Utc>) -> impl Expect + Send + Sync + 'static {
    rule(move |claims| check_time(claims, leeway, now))
}

fn check_time(claims: &dyn Claims, leeway: Duration, now: DateTime<Utc>) -> Result<(), ClaimsError> {
    let leeway = leeway.abs();
    let time = |name| claims.get(name).and_then(|v| v.as_time());
    let after = |instant: DateTime<Utc>, base: DateTime<Utc>| {
        base.checked_add_signed(leeway).is_some_and(|limit| instant > limit)
    };

    if let Some(exp) = time(CLAIM_EXP)
        && after(now, exp)
    {
        return Err(ClaimsError::ExpExpired);
    }
    if let Some(iat) = time(CLAIM_IAT)
        && after(iat, now)
    {
        return Err(ClaimsError::IatInFuture);
    }
    if let Some(nbf) = time(CLAIM_NBF)
        && after(nbf, now)
    {
        return Err(ClaimsError::NbfTooSoon);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::MapClaims;

    #[test]
    fn first_violation_wins() {
        let claims = MapClaims::new().with("sub", "alice");
        let sub = expect_sub(["bob"]);
        let jti = expect_jti();
        assert_eq!(validate_claims(&claims, &[&jti, &sub]), Err(ClaimsError::AbsentJti));
        assert_eq!(validate_claims(&claims, &[&sub, &jti]), Err(ClaimsError::InvalidSub));
        assert_eq!(validate_claims(&claims, &[]), Ok(()));
    }

    #[test]
    fn custom_closure_is_a_rule() {
        let claims = MapClaims::new().with("tenant", "acme");
        let tenant = |c: &dyn Claims| match c.get("tenant").and_then(|v| v.as_str().map(str::to_string)) {
            Some(t) if t == "acme" => Ok(()),
            _ => Err(ClaimsError::Custom("wrong tenant".into())),
        };
        assert_eq!(validate_claims(&claims, &[&tenant]), Ok(()));
    }
}
