//! Claims and claim validation rules
//!
//! [`Claims`] is the name-indexed view every rule reads through, so the same
//! rules work on [`MapClaims`], on [`StandardClaims`] and on any application
//! type that implements the trait.

mod expect;
mod validator;
mod value;

pub use expect::{
    Expect, expect_aud, expect_iss, expect_jti, expect_scopes, expect_sub, expect_time, expect_time_at,
    validate_claims,
};
pub use validator::{ClaimsPolicy, ClaimsValidator};
pub use value::{
    CLAIM_AUD, CLAIM_EXP, CLAIM_IAT, CLAIM_ISS, CLAIM_JTI, CLAIM_NBF, CLAIM_SCOPE, CLAIM_SUB, ClaimValue, Claims,
    MapClaims, StandardClaims, coerce_claim, numeric_date,
};
