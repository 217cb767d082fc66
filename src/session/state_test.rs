use super::*;
use serde_json::json;

fn doctor() -> User {
    User { id: 1, email: "a@b.com".to_owned(), display_name: "A B".to_owned(), role: Role::Doctor }
}

#[test]
fn should_redirect_when_settled_and_user_missing() {
    let session = Session { phase: SessionPhase::Anonymous, ..Session::default() };
    assert!(session.should_redirect_to_login());
}

#[test]
fn should_not_redirect_while_loading() {
    assert!(!Session::default().should_redirect_to_login());
    let loading = Session { phase: SessionPhase::Loading, token: Some("t".to_owned()), ..Session::default() };
    assert!(!loading.should_redirect_to_login());
}

#[test]
fn should_not_redirect_when_user_exists() {
    let session = Session {
        phase: SessionPhase::Authenticated,
        token: Some("t".to_owned()),
        user: Some(doctor()),
        ..Session::default()
    };
    assert!(!session.should_redirect_to_login());
}

#[test]
fn authenticated_requires_unexpired_token() {
    let mut session = Session { token: Some("t".to_owned()), ..Session::default() };
    assert!(session.is_authenticated_at(1_000));

    session.expires_at = Some(1_000);
    assert!(!session.is_authenticated_at(1_000));
    assert!(session.is_authenticated_at(999));

    session.token = None;
    assert!(!session.is_authenticated_at(0));
}

#[test]
fn clear_keeps_generation() {
    let mut session = Session { token: Some("t".to_owned()), user: Some(doctor()), ..Session::default() };
    let generation = session.bump_generation();
    session.clear();
    assert_eq!(session.generation(), generation);
    assert_eq!(session.phase, SessionPhase::Anonymous);
    assert_eq!(session.bearer(), None);
    assert_eq!(session.user, None);
}

#[test]
fn user_accepts_backend_shapes() {
    let user: User = serde_json::from_value(json!({
        "id": 1, "email": "a@b.com", "full_name": "A B", "role": "doctor"
    }))
    .unwrap();
    assert_eq!(user, doctor());

    let aliased: User = serde_json::from_value(json!({
        "user_id": 9, "email": "n@b.com", "full_name": "N", "role": "nurse", "is_active": true
    }))
    .unwrap();
    assert_eq!(aliased.id, 9);
    assert_eq!(aliased.role, Role::Nurse);
}

#[test]
fn unrecognized_or_missing_role_is_unknown() {
    let odd: User = serde_json::from_value(json!({
        "id": 2, "email": "x@b.com", "full_name": "X", "role": "janitor"
    }))
    .unwrap();
    assert_eq!(odd.role, Role::Unknown);

    let bare: User = serde_json::from_value(json!({ "id": 3, "email": "y@b.com" })).unwrap();
    assert_eq!(bare.role, Role::Unknown);
    assert_eq!(bare.display_name, "");
}

#[test]
fn user_serializes_with_backend_field_names() {
    let value = serde_json::to_value(doctor()).unwrap();
    assert_eq!(value, json!({ "id": 1, "email": "a@b.com", "full_name": "A B", "role": "doctor" }));
}
