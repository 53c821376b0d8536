use super::*;
use time::macros::date;

// =============================================================================
// CardStatus
// =============================================================================

#[test]
fn status_round_trips_through_text() {
    for status in [CardStatus::Active, CardStatus::Locked, CardStatus::Expired] {
        assert_eq!(CardStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(CardStatus::parse("ACTIVE"), None);
}

#[test]
fn status_labels_are_localized() {
    assert_eq!(CardStatus::Locked.label(Locale::En), "Locked");
    assert_eq!(CardStatus::Active.label(Locale::Kn), "ಸಕ್ರಿಯ");
}

#[test]
fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_value(CardStatus::Expired).unwrap(), "expired");
}

// =============================================================================
// effective_status
// =============================================================================

#[test]
fn card_is_valid_on_expiry_day() {
    let expiry = date!(2029 - 05 - 03);
    assert_eq!(effective_status(CardStatus::Active, expiry, expiry), CardStatus::Active);
    assert_eq!(effective_status(CardStatus::Locked, expiry, expiry), CardStatus::Locked);
}

#[test]
fn card_expires_the_day_after() {
    let expiry = date!(2029 - 05 - 03);
    assert_eq!(effective_status(CardStatus::Active, expiry, date!(2029 - 05 - 04)), CardStatus::Expired);
    assert_eq!(effective_status(CardStatus::Locked, expiry, date!(2030 - 01 - 01)), CardStatus::Expired);
}

// =============================================================================
// presentation helpers
// =============================================================================

#[test]
fn mask_keeps_last_four_digits() {
    assert_eq!(mask_number("6012345678901234"), "**** **** **** 1234");
}

#[test]
fn mask_ignores_separators_and_short_input() {
    assert_eq!(mask_number("6012 3456 7890 9876"), "**** **** **** 9876");
    assert_eq!(mask_number("12"), "**** **** **** 12");
}

#[test]
fn expiry_label_is_month_slash_two_digit_year() {
    assert_eq!(expiry_label(date!(2029 - 05 - 03)), "05/29");
    assert_eq!(expiry_label(date!(2100 - 12 - 31)), "12/00");
}

// =============================================================================
// add_years
// =============================================================================

#[test]
fn add_years_keeps_calendar_day() {
    assert_eq!(add_years(date!(2024 - 05 - 03), 5), date!(2029 - 05 - 03));
}

#[test]
fn add_years_from_leap_day_falls_back_to_28th() {
    assert_eq!(add_years(date!(2024 - 02 - 29), 5), date!(2029 - 02 - 28));
    assert_eq!(add_years(date!(2024 - 02 - 29), 4), date!(2028 - 02 - 29));
}

// =============================================================================
// generate_card_number
// =============================================================================

#[test]
fn card_number_is_sixteen_digits_without_leading_zero() {
    for _ in 0..50 {
        let number = generate_card_number();
        assert_eq!(number.len(), 16);
        assert!(number.chars().all(|c| c.is_ascii_digit()));
        assert!(!number.starts_with('0'));
    }
}

#[test]
fn error_codes_are_stable() {
    let id = Uuid::nil();
    assert_eq!(CardError::NotFound(id).error_code(), "E_CARD_NOT_FOUND");
    assert_eq!(CardError::Locked(id).error_code(), "E_CARD_LOCKED");
    assert_eq!(CardError::Expired(id).error_code(), "E_CARD_EXPIRED");
    assert_eq!(CardError::InsufficientBalance(id).error_code(), "E_INSUFFICIENT_BALANCE");
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::db::test_support::integration_pool;
    use crate::services::auth;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn repeating_current_status_does_not_write() {
        let (pool, _guard) = integration_pool().await;
        let (user, issued) = auth::sign_up(&pool, "idem@example.com", "secret1", None, Decimal::ZERO)
            .await
            .expect("sign up");
        let today = issued.issue_date;

        let unchanged = set_status(&pool, user.id, CardStatus::Active, today).await.expect("unlock active");
        assert_eq!(unchanged.status, CardStatus::Active);
        assert_eq!(unchanged.updated_at, issued.updated_at);

        let locked = set_status(&pool, user.id, CardStatus::Locked, today).await.expect("lock");
        assert_eq!(locked.status, CardStatus::Locked);
        let again = set_status(&pool, user.id, CardStatus::Locked, today).await.expect("lock locked");
        assert_eq!(again.status, CardStatus::Locked);
        assert_eq!(again.updated_at, locked.updated_at);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn expired_card_cannot_be_locked_or_unlocked() {
        let (pool, _guard) = integration_pool().await;
        let (user, issued) = auth::sign_up(&pool, "old@example.com", "secret1", None, Decimal::ZERO)
            .await
            .expect("sign up");
        let after_expiry = issued.expiry_date.next_day().expect("date in range");

        for target in [CardStatus::Locked, CardStatus::Active] {
            let result = set_status(&pool, user.id, target, after_expiry).await;
            assert!(matches!(result, Err(CardError::Expired(id)) if id == issued.id), "{target:?}");
        }
        let stored = find_by_user(&pool, user.id).await.expect("card");
        assert_eq!(stored.status, CardStatus::Active);
        assert_eq!(stored.updated_at, issued.updated_at);
    }
}
