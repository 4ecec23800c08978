//! End-to-end encoding and decoding across the supported algorithm combinations

mod common;

use common::{ES256_KID, RS256_KID, ed25519_key, fixture_set, p256_key, p384_key, p521_key, rsa_key, secret_key};
use cryypt_jose::jwe::Jwe;
use cryypt_jose::jws::{Jws, is_compact_jws};
use cryypt_jose::{
    Algs, ContentEncryption, JoseError, Json, KeyAlgorithm, KeySet, KeyUse, ResolvedKey, SignatureAlgorithm,
    SkipKeySource, StandardClaims, decode, decode_bytes, decode_value, encode, encode_bytes, encode_to_string,
    encryption_key_by_alg, encryption_key_by_id, signature_key_by_alg, signature_key_by_id,
};
use serde_json::{Value, json};
use std::sync::Arc;

fn payload() -> Value {
    json!({
        "iss": "https://id.example.com",
        "sub": "alice",
        "aud": ["api", "admin"],
        "exp": 4_102_444_800i64,
        "scope": "read write",
    })
}

fn hmac_set() -> KeySet {
    KeySet::new([secret_key("hmac-1", KeyUse::Sig, "HS256", 32, 7)])
}

fn swap_first_char(segment: &str) -> String {
    let mut chars = segment.chars();
    let first = chars.next().map(|c| if c == 'A' { 'B' } else { 'A' });
    first.into_iter().chain(chars).collect()
}

#[test]
fn test_hs256_signed_round_trip() {
    let keys = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    assert_eq!(token.split('.').count(), 3);
    assert!(is_compact_jws(token.as_bytes()));
    let header = Jws::parse(&token).map(|jws| jws.header().clone()).ok();
    assert_eq!(header.as_ref().map(|h| h.alg.as_str()), Some("HS256"));
    assert_eq!(header.as_ref().and_then(|h| h.key_id()), Some("hmac-1"));

    let decoded = decode_value(&token, &keys, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256));
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_fixture_keys_sign_by_id() {
    let keys = fixture_set();
    for (kid, alg) in [(ES256_KID, SignatureAlgorithm::ES256), (RS256_KID, SignatureAlgorithm::RS256)] {
        let token = encode_to_string(signature_key_by_id(kid, keys).as_ref(), &SkipKeySource, &payload())
            .unwrap_or_default();
        let decoded: Option<Value> = decode(&token, &keys.to_public(), &KeySet::empty(), &Algs::signed(alg)).ok();
        assert_eq!(decoded, Some(payload()), "{alg}");
    }
}

#[test]
fn test_ps256_round_trip() {
    let keys = KeySet::new([rsa_key("pss", KeyUse::Sig, "PS256")]);
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::PS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();
    let decoded = decode_value(&token, &keys.to_public(), &KeySet::empty(), &Algs::signed(SignatureAlgorithm::PS256));
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_rs256_with_rsa_oaep_a128gcm() {
    let signing = fixture_set();
    let encryption = KeySet::new([rsa_key("rsa-enc", KeyUse::Enc, "RSA-OAEP")]);
    let hint = Algs::signed(SignatureAlgorithm::RS256)
        .with_encryption(KeyAlgorithm::RsaOaep, ContentEncryption::A128Gcm);

    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::RS256), signing).as_ref(),
        encryption_key_by_alg(Some(KeyAlgorithm::RsaOaep), Some(ContentEncryption::A128Gcm), &encryption).as_ref(),
        &payload(),
    )
    .unwrap_or_default();

    assert_eq!(token.split('.').count(), 5);
    let header = Jwe::parse(&token).map(|jwe| jwe.header().clone()).ok();
    assert_eq!(header.as_ref().map(|h| h.alg.as_str()), Some("RSA-OAEP"));
    assert_eq!(header.as_ref().and_then(|h| h.enc.as_deref()), Some("A128GCM"));
    assert_eq!(header.as_ref().and_then(|h| h.cty.as_deref()), Some("JWT"));
    assert_eq!(header.as_ref().and_then(|h| h.key_id()), Some("rsa-enc"));

    let decoded = decode_value(&token, &signing.to_public(), &encryption, &hint);
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_es256_with_ecdh_es_a256gcm() {
    let signing = KeySet::new([p256_key("ec-sig", KeyUse::Sig, "ES256")]);
    let encryption = KeySet::new([p256_key("ec-enc", KeyUse::Enc, "ECDH-ES")]);
    let hint = Algs::signed(SignatureAlgorithm::ES256)
        .with_encryption(KeyAlgorithm::EcdhEs, ContentEncryption::A256Gcm);

    let token = encode_to_string(
        signature_key_by_id("ec-sig", &signing).as_ref(),
        encryption_key_by_id("ec-enc", ContentEncryption::A256Gcm, &encryption).as_ref(),
        &payload(),
    )
    .unwrap_or_default();

    let header = Jwe::parse(&token).map(|jwe| jwe.header().clone()).ok();
    let epk = header.as_ref().and_then(|h| h.epk.clone());
    assert_eq!(epk.as_ref().and_then(|k| k.crv.as_deref()), Some("P-256"));
    assert!(epk.as_ref().is_some_and(|k| k.d.is_none()));

    let decoded = decode_value(&token, &signing, &encryption, &hint);
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_es384_with_ecdh_es_a128kw() {
    let signing = KeySet::new([p384_key("ec384", KeyUse::Sig, "ES384")]);
    let encryption = KeySet::new([p384_key("ec384-enc", KeyUse::Enc, "ECDH-ES+A128KW")]);
    let hint = Algs::signed(SignatureAlgorithm::ES384)
        .with_encryption(KeyAlgorithm::EcdhEsA128Kw, ContentEncryption::A192CbcHs384);

    let token = encode_to_string(
        signature_key_by_alg(hint.sig, &signing).as_ref(),
        encryption_key_by_alg(hint.encrypt, hint.encode, &encryption).as_ref(),
        &payload(),
    )
    .unwrap_or_default();
    let decoded = decode_value(&token, &signing, &encryption, &hint);
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_es512_with_ecdh_es_p521() {
    let signing = KeySet::new([p521_key("ec521", KeyUse::Sig, "ES512")]);
    let encryption = KeySet::new([p521_key("ec521-enc", KeyUse::Enc, "ECDH-ES+A256KW")]);
    let hint = Algs::signed(SignatureAlgorithm::ES512)
        .with_encryption(KeyAlgorithm::EcdhEsA256Kw, ContentEncryption::A256Gcm);

    let token = encode_to_string(
        signature_key_by_alg(hint.sig, &signing).as_ref(),
        encryption_key_by_alg(hint.encrypt, hint.encode, &encryption).as_ref(),
        &payload(),
    )
    .unwrap_or_default();

    let epk = Jwe::parse(&token).ok().and_then(|jwe| jwe.header().epk.clone());
    assert_eq!(epk.as_ref().and_then(|k| k.crv.as_deref()), Some("P-521"));
    let decoded = decode_value(&token, &signing.to_public(), &encryption, &hint);
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_es512_signature_checks_the_key() {
    let signer = KeySet::new([p521_key("ec521", KeyUse::Sig, "ES512")]);
    let other = KeySet::new([p521_key("ec521", KeyUse::Sig, "ES512")]);
    let hint = Algs::signed(SignatureAlgorithm::ES512);
    let token = encode_to_string(signature_key_by_alg(hint.sig, &signer).as_ref(), &SkipKeySource, &payload())
        .unwrap_or_default();

    // 132 bytes of R || S
    assert_eq!(token.rsplit('.').next().map(str::len), Some(176));
    let result = decode_value(&token, &other.to_public(), &KeySet::empty(), &hint);
    assert!(matches!(result, Err(JoseError::InvalidSignature)));
}

#[test]
fn test_eddsa_round_trip() {
    let keys = KeySet::new([ed25519_key("ed")]);
    let published = KeySet::from_json(&keys.to_public().to_json().unwrap_or_default()).unwrap_or_default();
    let jwk = published.key_by_id("ed").map(|k| k.to_jwk());
    assert_eq!(jwk.as_ref().map(|j| j.kty.as_str()), Some("OKP"));
    assert_eq!(jwk.as_ref().and_then(|j| j.crv.as_deref()), Some("Ed25519"));
    assert!(jwk.as_ref().is_some_and(|j| j.d.is_none()));

    let hint = Algs::signed(SignatureAlgorithm::EdDSA);
    let token = encode_to_string(signature_key_by_id("ed", &keys).as_ref(), &SkipKeySource, &payload())
        .unwrap_or_default();
    let header = Jws::parse(&token).map(|jws| jws.header().alg.clone()).ok();
    assert_eq!(header.as_deref(), Some("EdDSA"));

    let decoded = decode_value(&token, &published, &KeySet::empty(), &hint);
    assert_eq!(decoded.ok(), Some(payload()));

    let stranger = KeySet::new([ed25519_key("ed")]).to_public();
    let result = decode_value(&token, &stranger, &KeySet::empty(), &hint);
    assert!(matches!(result, Err(JoseError::InvalidSignature)));
}

#[test]
fn test_symmetric_key_management() {
    let cases = [
        (KeyAlgorithm::A256Kw, ContentEncryption::A256Gcm, 32),
        (KeyAlgorithm::A128Kw, ContentEncryption::A256CbcHs512, 16),
        (KeyAlgorithm::A128GcmKw, ContentEncryption::A128Gcm, 16),
        (KeyAlgorithm::A192GcmKw, ContentEncryption::A256CbcHs512, 24),
        (KeyAlgorithm::A256GcmKw, ContentEncryption::A192Gcm, 32),
        (KeyAlgorithm::Dir, ContentEncryption::A128CbcHs256, 32),
        (KeyAlgorithm::Dir, ContentEncryption::A192Gcm, 24),
    ];
    for (alg, enc, len) in cases {
        let keys = KeySet::new([secret_key("shared", KeyUse::Enc, alg.as_str(), len, 0x5a)]);
        let hint = Algs::encrypted(alg, enc);
        let token = encode_to_string(
            &SkipKeySource,
            encryption_key_by_alg(Some(alg), Some(enc), &keys).as_ref(),
            &payload(),
        )
        .unwrap_or_default();

        let cty = Jwe::parse(&token).ok().and_then(|jwe| jwe.header().cty.clone());
        assert_eq!(cty, None, "{alg}/{enc}");
        let decoded = decode_value(&token, &KeySet::empty(), &keys, &hint);
        assert_eq!(decoded.ok(), Some(payload()), "{alg}/{enc}");
    }
}

#[test]
fn test_rsa1_5_with_cbc_hmac() {
    let signing = hmac_set();
    let encryption = KeySet::new([rsa_key("legacy", KeyUse::Enc, "RSA1_5")]);
    let hint = Algs::signed(SignatureAlgorithm::HS256)
        .with_encryption(KeyAlgorithm::Rsa1_5, ContentEncryption::A128CbcHs256);

    let token = encode_to_string(
        signature_key_by_alg(hint.sig, &signing).as_ref(),
        encryption_key_by_alg(hint.encrypt, hint.encode, &encryption).as_ref(),
        &payload(),
    )
    .unwrap_or_default();
    let decoded = decode_value(&token, &signing, &encryption, &hint);
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_both_stages_skipped_is_passthrough() {
    let raw = encode_bytes(&SkipKeySource, &SkipKeySource, b"{\"sub\":\"bob\"}").unwrap_or_default();
    assert_eq!(raw, b"{\"sub\":\"bob\"}");

    let json = encode(&SkipKeySource, &SkipKeySource, &payload()).unwrap_or_default();
    let token = String::from_utf8(json).unwrap_or_default();
    let decoded = decode_value(&token, &KeySet::empty(), &KeySet::empty(), &Algs::none());
    assert_eq!(decoded.ok(), Some(payload()));
}

#[test]
fn test_serialized_claims_are_signed_verbatim() {
    let keys = hmac_set();
    let claims = "{\"sub\":\"bob\",\"aud\":\"api\"}";
    let hint = Algs::signed(SignatureAlgorithm::HS256);

    let unsigned = encode(&SkipKeySource, &SkipKeySource, claims).unwrap_or_default();
    assert_eq!(unsigned, claims.as_bytes());

    let token = encode_to_string(
        signature_key_by_alg(hint.sig, &keys).as_ref(),
        &SkipKeySource,
        claims,
    )
    .unwrap_or_default();
    let decoded = decode_bytes(&token, &keys, &KeySet::empty(), &hint);
    assert_eq!(decoded.ok(), Some(claims.as_bytes().to_vec()));
    let value = decode_value(&token, &keys, &KeySet::empty(), &hint);
    assert_eq!(value.ok(), Some(json!({"sub": "bob", "aud": "api"})));

    let from_bytes = encode(signature_key_by_alg(hint.sig, &keys).as_ref(), &SkipKeySource, claims.as_bytes())
        .map(String::from_utf8);
    let decoded = from_bytes.ok().and_then(Result::ok).and_then(|token| {
        decode_bytes(&token, &keys, &KeySet::empty(), &hint).ok()
    });
    assert_eq!(decoded, Some(claims.as_bytes().to_vec()));
}

#[test]
fn test_json_wrapper_serializes_custom_types() {
    #[derive(serde::Serialize)]
    struct Grant<'a> {
        sub: &'a str,
        scope: &'a str,
    }

    let keys = hmac_set();
    let hint = Algs::signed(SignatureAlgorithm::HS256);
    let token = encode_to_string(
        signature_key_by_alg(hint.sig, &keys).as_ref(),
        &SkipKeySource,
        &Json(Grant { sub: "carol", scope: "read" }),
    )
    .unwrap_or_default();
    let decoded = decode_value(&token, &keys, &KeySet::empty(), &hint);
    assert_eq!(decoded.ok(), Some(json!({"sub": "carol", "scope": "read"})));
}

#[test]
fn test_decode_into_standard_claims() {
    let keys = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    let claims: Option<StandardClaims> =
        decode(&token, &keys, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256)).ok();
    let claims = claims.unwrap_or_default();
    assert_eq!(claims.sub.as_deref(), Some("alice"));
    assert_eq!(claims.aud, Some(vec!["api".to_string(), "admin".to_string()]));
    assert_eq!(claims.exp, Some(4_102_444_800));
    assert_eq!(claims.scope.as_deref(), Some("read write"));
}

#[test]
fn test_unknown_kid_does_not_fall_back_to_algorithm() {
    let signer = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &signer).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    // same secret and algorithm, different id
    let verifier = KeySet::new([secret_key("hmac-2", KeyUse::Sig, "HS256", 32, 7)]);
    let result = decode_bytes(&token, &verifier, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256));
    assert!(matches!(result, Err(JoseError::NoVerificationKey)));
}

#[test]
fn test_header_algorithm_must_match_hint() {
    let keys = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    let result = decode_bytes(&token, &keys, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS384));
    assert!(matches!(
        result,
        Err(JoseError::AlgorithmMismatch { ref expected, ref found }) if expected == "HS384" && found == "HS256"
    ));
}

#[test]
fn test_key_declaring_other_algorithm_is_rejected() {
    let signer = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &signer).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    let verifier = KeySet::new([secret_key("hmac-1", KeyUse::Sig, "HS512", 64, 7)]);
    let result = decode_bytes(&token, &verifier, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256));
    assert!(matches!(result, Err(JoseError::AlgorithmMismatch { .. })));
}

#[test]
fn test_tampered_signature_is_rejected() {
    let keys = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    let (signing_input, signature) = token.rsplit_once('.').unwrap_or_default();
    let tampered = format!("{signing_input}.{}", swap_first_char(signature));
    let result = decode_bytes(&tampered, &keys, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256));
    assert!(matches!(result, Err(JoseError::InvalidSignature)));
}

#[test]
fn test_wrong_decryption_key_fails() {
    let sender = KeySet::new([secret_key("wrap", KeyUse::Enc, "A256KW", 32, 1)]);
    let receiver = KeySet::new([secret_key("wrap", KeyUse::Enc, "A256KW", 32, 2)]);
    let hint = Algs::encrypted(KeyAlgorithm::A256Kw, ContentEncryption::A128Gcm);

    let token = encode_to_string(
        &SkipKeySource,
        encryption_key_by_alg(hint.encrypt, hint.encode, &sender).as_ref(),
        &payload(),
    )
    .unwrap_or_default();

    let result = decode_bytes(&token, &KeySet::empty(), &receiver, &hint);
    assert!(matches!(result, Err(JoseError::DecryptionFailed)));
    assert!(result.is_err_and(|err| err.is_crypto_error()));
}

#[test]
fn test_missing_decryption_key() {
    let sender = KeySet::new([secret_key("wrap", KeyUse::Enc, "A256KW", 32, 1)]);
    let hint = Algs::encrypted(KeyAlgorithm::A256Kw, ContentEncryption::A128Gcm);
    let token = encode_to_string(
        &SkipKeySource,
        encryption_key_by_alg(hint.encrypt, hint.encode, &sender).as_ref(),
        &payload(),
    )
    .unwrap_or_default();

    let result = decode_bytes(&token, &KeySet::empty(), &KeySet::empty(), &hint);
    assert!(matches!(result, Err(JoseError::NoDecryptionKey)));
}

#[test]
fn test_plain_token_is_rejected_when_encryption_expected() {
    let keys = hmac_set();
    let token = encode_to_string(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();

    let hint = Algs::signed(SignatureAlgorithm::HS256)
        .with_encryption(KeyAlgorithm::A256Kw, ContentEncryption::A128Gcm);
    let result = decode_bytes(&token, &keys, &keys, &hint);
    assert!(matches!(result, Err(JoseError::InvalidToken(_))));
}

#[test]
fn test_unavailable_sources() {
    let keys = hmac_set();
    let unavailable = || -> Option<ResolvedKey> { None };

    let result = encode(&unavailable, &SkipKeySource, &payload());
    assert!(matches!(result, Err(JoseError::NoSigningKey)));

    let result = encode(
        signature_key_by_alg(Some(SignatureAlgorithm::HS256), &keys).as_ref(),
        &unavailable,
        &payload(),
    );
    assert!(matches!(result, Err(JoseError::NoEncryptionKey)));

    let result = encode(
        signature_key_by_alg(Some(SignatureAlgorithm::ES384), &keys).as_ref(),
        &SkipKeySource,
        &payload(),
    );
    assert!(result.is_err_and(|err| err.is_key_resolution_error()));

    let result = encode(
        &SkipKeySource,
        encryption_key_by_alg(Some(KeyAlgorithm::A128Kw), Some(ContentEncryption::A128Gcm), &keys).as_ref(),
        &payload(),
    );
    assert!(matches!(result, Err(JoseError::NoEncryptionKey)));
}

#[test]
fn test_algorithm_without_key_is_unavailable() {
    let keyless = || {
        Some(ResolvedKey {
            key: None,
            algs: Algs::signed(SignatureAlgorithm::HS256),
        })
    };
    let result = encode(&keyless, &SkipKeySource, &payload());
    assert!(matches!(result, Err(JoseError::NoSigningKey)));
}

#[test]
fn test_by_id_sources_check_declared_usage() {
    let keys = KeySet::new([
        secret_key("enc-only", KeyUse::Enc, "A128KW", 16, 3),
        secret_key("sig-only", KeyUse::Sig, "HS256", 32, 3),
    ]);

    assert!(signature_key_by_id("enc-only", &keys).resolve().is_none());
    assert!(signature_key_by_id("missing", &keys).resolve().is_none());
    assert!(encryption_key_by_id("sig-only", ContentEncryption::A128Gcm, &keys).resolve().is_none());

    let resolved = encryption_key_by_id("enc-only", ContentEncryption::A128Gcm, &keys).resolve();
    assert_eq!(
        resolved.map(|r| r.algs),
        Some(Algs::encrypted(KeyAlgorithm::A128Kw, ContentEncryption::A128Gcm))
    );
}

#[test]
fn test_absent_algorithm_skips_stage() {
    let keys = hmac_set();
    let sig = signature_key_by_alg(None, &keys).resolve();
    assert!(sig.is_some_and(|r| r.key.is_none() && !r.algs.signs()));

    let enc = encryption_key_by_alg(Some(KeyAlgorithm::Dir), None, &keys).resolve();
    assert!(enc.is_some_and(|r| !r.algs.encrypts()));
}

#[test]
fn test_pbes2_key_management() {
    let cases = [
        (KeyAlgorithm::Pbes2Hs256A128Kw, ContentEncryption::A128CbcHs256),
        (KeyAlgorithm::Pbes2Hs384A192Kw, ContentEncryption::A192Gcm),
        (KeyAlgorithm::Pbes2Hs512A256Kw, ContentEncryption::A256CbcHs512),
    ];
    for (alg, enc) in cases {
        let keys = KeySet::new([cryypt_jose::Key::symmetric("pw", b"correct horse battery staple".to_vec())
            .with_usage(KeyUse::Enc)
            .with_alg(alg.as_str())]);
        let hint = Algs::encrypted(alg, enc);
        let token = encode_to_string(
            &SkipKeySource,
            encryption_key_by_alg(Some(alg), Some(enc), &keys).as_ref(),
            &payload(),
        )
        .unwrap_or_default();

        let header = Jwe::parse(&token).map(|jwe| jwe.header().clone()).ok();
        assert_eq!(header.as_ref().and_then(|h| h.p2c), Some(100_000), "{alg}");
        assert!(header.as_ref().is_some_and(|h| h.p2s.is_some()), "{alg}");
        let decoded = decode_value(&token, &KeySet::empty(), &keys, &hint);
        assert_eq!(decoded.ok(), Some(payload()), "{alg}");

        let wrong = KeySet::new([cryypt_jose::Key::symmetric("pw", b"Tr0ub4dor&3".to_vec())
            .with_usage(KeyUse::Enc)
            .with_alg(alg.as_str())]);
        let result = decode_value(&token, &KeySet::empty(), &wrong, &hint);
        assert!(matches!(result, Err(JoseError::DecryptionFailed)), "{alg}");
    }
}

#[test]
fn test_ed25519_key_algorithm_is_reported() {
    let keys = KeySet::new([secret_key("ed", KeyUse::Enc, "ED25519", 32, 4)]);
    let result = encode(
        &SkipKeySource,
        encryption_key_by_alg(Some(KeyAlgorithm::Ed25519), Some(ContentEncryption::A128Gcm), &keys).as_ref(),
        &payload(),
    );
    assert!(matches!(result, Err(JoseError::UnsupportedAlgorithm(_))));
}

#[test]
fn test_key_declared_algorithms() {
    let hmac = secret_key("hmac", KeyUse::Sig, "HS384", 48, 8);
    let verify = KeySet::new([
        Arc::new(rsa_key(RS256_KID, KeyUse::Sig, "RS256")).to_public(),
        Arc::new(hmac.clone()),
    ]);
    let decrypt = KeySet::new([
        secret_key("wrap", KeyUse::Enc, "A256GCMKW", 32, 3),
        secret_key("direct", KeyUse::Enc, "dir", 32, 6),
    ]);
    let hint = Algs::signed_by_key().with_encryption_by_key();

    let cases = [
        (SignatureAlgorithm::RS256, "wrap", ContentEncryption::A128Gcm),
        (SignatureAlgorithm::HS384, "direct", ContentEncryption::A128CbcHs256),
    ];
    for (alg, enc_kid, enc) in cases {
        let signer = KeySet::new([rsa_key(RS256_KID, KeyUse::Sig, "RS256"), hmac.clone()]);
        let token = encode_to_string(
            signature_key_by_alg(Some(alg), &signer).as_ref(),
            encryption_key_by_id(enc_kid, enc, &decrypt).as_ref(),
            &payload(),
        )
        .unwrap_or_default();
        let decoded = decode_value(&token, &verify, &decrypt, &hint);
        assert_eq!(decoded.ok(), Some(payload()), "{alg}/{enc_kid}");
    }
}

#[test]
fn test_key_declared_algorithm_must_match_header() {
    let signer = KeySet::new([secret_key("k", KeyUse::Sig, "HS256", 64, 1)]);
    let token = encode_to_string(
        signature_key_by_id("k", &signer).as_ref(),
        &SkipKeySource,
        &payload(),
    )
    .unwrap_or_default();
    let hint = Algs::signed_by_key();

    assert_eq!(decode_value(&token, &signer, &KeySet::empty(), &hint).ok(), Some(payload()));

    let redeclared = KeySet::new([secret_key("k", KeyUse::Sig, "HS512", 64, 1)]);
    let result = decode_value(&token, &redeclared, &KeySet::empty(), &hint);
    assert!(matches!(result, Err(JoseError::AlgorithmMismatch { .. })));

    let undeclared = KeySet::new([cryypt_jose::Key::symmetric("k", vec![1u8; 64]).with_usage(KeyUse::Sig)]);
    let result = decode_value(&token, &undeclared, &KeySet::empty(), &hint);
    assert!(matches!(result, Err(JoseError::InvalidKey(_))));

    let strict = decode_value(&token, &undeclared, &KeySet::empty(), &Algs::signed(SignatureAlgorithm::HS256));
    assert_eq!(strict.ok(), Some(payload()));
}
