use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "supersecretjwtsecretforunittesting123";

#[test]
fn test_issue_and_validate_token_roundtrip() {
    let user_id = Uuid::new_v4();

    let token = issue_token(SECRET, 24, user_id, "student", "test@example.com").unwrap();
    let claims = validate_token(SECRET, &token).expect("Valid token should pass");

    assert_eq!(claims.sub, user_id.to_string());
    assert_eq!(claims.role, "student");
    assert_eq!(claims.email, "test@example.com");
}

#[test]
fn test_validate_token_expired() {
    let my_claims = Claims {
        sub: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        role: "student".to_string(),
        email: "test@example.com".to_string(),
        exp: 1, // past
    };

    let token = encode(
        &Header::default(),
        &my_claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let result = validate_token(SECRET, &token);
    assert!(result.is_err());
}

#[test]
fn test_validate_token_invalid_signature() {
    let token = issue_token("wrongsecret", 24, Uuid::new_v4(), "student", "test@example.com")
        .unwrap();

    let result = validate_token(SECRET, &token);
    assert!(result.is_err());
}

#[test]
fn test_password_hash_roundtrip() {
    let hash = hash_password("hunter2-hunter2").unwrap();

    assert_ne!(hash, "hunter2-hunter2");
    assert!(verify_password("hunter2-hunter2", &hash));
    assert!(!verify_password("not-the-password", &hash));
}

#[test]
fn test_verify_password_rejects_malformed_hash() {
    assert!(!verify_password("whatever", "not-a-phc-string"));
}
