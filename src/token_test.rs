use super::*;
use crate::test_helpers::jwt;
use serde_json::json;

#[test]
fn decodes_subject_and_expiry() {
    let token = jwt(&json!({ "sub": "a@b.com", "exp": 1_900_000_000 }));
    let claims = decode_claims(&token).unwrap();
    assert_eq!(claims.sub.as_deref(), Some("a@b.com"));
    assert_eq!(claims.exp, Some(1_900_000_000));
    assert_eq!(claims.role, None);
}

#[test]
fn tolerates_padded_payload() {
    let token = jwt(&json!({ "sub": "x@y.org" }));
    let mut parts: Vec<String> = token.split('.').map(ToOwned::to_owned).collect();
    parts[1].push_str("==");
    let claims = decode_claims(&parts.join(".")).unwrap();
    assert_eq!(claims.sub.as_deref(), Some("x@y.org"));
}

#[test]
fn expiry_boundary_is_inclusive() {
    let claims = decode_claims(&jwt(&json!({ "exp": 100 }))).unwrap();
    assert!(!claims.is_expired_at(99));
    assert!(claims.is_expired_at(100));
    assert!(claims.is_expired_at(101));
}

#[test]
fn missing_exp_never_expires_locally() {
    let claims = decode_claims(&jwt(&json!({ "sub": "a@b.com" }))).unwrap();
    assert!(!claims.is_expired_at(i64::MAX));
}

#[test]
fn rejects_empty_and_malformed_tokens() {
    assert!(matches!(decode_claims("  "), Err(TokenError::Empty)));
    assert!(matches!(decode_claims("only.two"), Err(TokenError::Malformed)));
    assert!(matches!(decode_claims("a.b.c.d"), Err(TokenError::Malformed)));
    assert!(matches!(decode_claims("a..c"), Err(TokenError::Malformed)));
}

#[test]
fn rejects_non_json_payload() {
    // "ZGVm" is base64url for the bytes "def", which are not JSON.
    assert!(matches!(decode_claims("abc.ZGVm.ghi"), Err(TokenError::Json(_))));
    assert!(matches!(decode_claims("abc.!!!.ghi"), Err(TokenError::Base64(_))));
    assert!(decode_claims("abc.def.ghi").is_err());
}

#[test]
fn to_user_uses_claims_and_placeholders() {
    let claims = decode_claims(&jwt(&json!({ "sub": "nurse@hms.test", "role": "nurse", "user_id": 7 }))).unwrap();
    let user = claims.to_user();
    assert_eq!(user.id, 7);
    assert_eq!(user.email, "nurse@hms.test");
    assert_eq!(user.display_name, "nurse@hms.test");
    assert_eq!(user.role, Role::Nurse);

    let bare = decode_claims(&jwt(&json!({ "sub": "who@hms.test" }))).unwrap().to_user();
    assert_eq!(bare.id, 0);
    assert_eq!(bare.role, Role::Unknown);
}

#[test]
fn peek_expiry_ignores_undecodable_tokens() {
    assert_eq!(peek_expiry("abc.def.ghi"), None);
    assert_eq!(peek_expiry(&jwt(&json!({ "exp": 5 }))), Some(5));
}

#[test]
fn now_secs_is_after_2020() {
    assert!(now_secs() > 1_577_836_800);
}
