use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionRole
// =============================================================================

#[test]
fn role_round_trips_through_text() {
    for role in [SessionRole::Citizen, SessionRole::Employee, SessionRole::Admin] {
        assert_eq!(SessionRole::parse(role.as_str()), Some(role));
    }
    assert_eq!(SessionRole::parse("superuser"), None);
}

#[test]
fn only_employee_and_admin_are_staff() {
    assert!(!SessionRole::Citizen.is_staff());
    assert!(SessionRole::Employee.is_staff());
    assert!(SessionRole::Admin.is_staff());
}

// =============================================================================
// SessionUser
// =============================================================================

#[test]
fn session_user_serializes_role_lowercase() {
    let user = SessionUser {
        id: Uuid::nil(),
        email: "asha@example.com".into(),
        full_name: "Asha".into(),
        role: SessionRole::Employee,
    };
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["role"], "employee");
    assert_eq!(value["full_name"], "Asha");
    assert_eq!(value["email"], "asha@example.com");
}
