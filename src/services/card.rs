//! Transport card service: issuance, lookup, lock/unlock.
//!
//! DESIGN
//! ======
//! Each citizen owns exactly one card (`transport_cards.user_id` is unique),
//! issued in the same database transaction that creates the account. The
//! stored status only ever holds `active` or `locked` as set by the owner;
//! expiry is derived from `expiry_date` at read time so a card silently
//! rolls over to expired without a background job.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use time::{Date, Month, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::locale::{IST, Locale};

const CARD_NUMBER_LEN: usize = 16;
const CARD_VALIDITY_YEARS: i32 = 5;

pub(crate) const CARD_COLUMNS: &str =
    "id, user_id, card_number, balance, status, issue_date, expiry_date, created_at, updated_at";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CardError {
    #[error("no transport card for user {0}")]
    NotFound(Uuid),
    #[error("card {0} is locked")]
    Locked(Uuid),
    #[error("card {0} has expired")]
    Expired(Uuid),
    #[error("insufficient balance on card {0}")]
    InsufficientBalance(Uuid),
    #[error("invalid amount: {0}")]
    InvalidAmount(Decimal),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ErrorCode for CardError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_CARD_NOT_FOUND",
            Self::Locked(_) => "E_CARD_LOCKED",
            Self::Expired(_) => "E_CARD_EXPIRED",
            Self::InsufficientBalance(_) => "E_INSUFFICIENT_BALANCE",
            Self::InvalidAmount(_) => "E_INVALID_AMOUNT",
            Self::Database(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardStatus {
    Active,
    Locked,
    Expired,
}

impl CardStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
            Self::Expired => "expired",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "locked" => Some(Self::Locked),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::Active => locale.pick("Active", "ಸಕ್ರಿಯ"),
            Self::Locked => locale.pick("Locked", "ಲಾಕ್ ಆಗಿದೆ"),
            Self::Expired => locale.pick("Expired", "ಅವಧಿ ಮುಗಿದಿದೆ"),
        }
    }
}

/// Mirrors a `transport_cards` row.
#[derive(Debug, Clone)]
pub struct TransportCard {
    pub id: Uuid,
    pub user_id: Uuid,
    pub card_number: String,
    pub balance: Decimal,
    pub status: CardStatus,
    pub issue_date: Date,
    pub expiry_date: Date,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TransportCard {
    /// Status as the owner sees it today.
    #[must_use]
    pub fn effective_status(&self, today: Date) -> CardStatus {
        effective_status(self.status, self.expiry_date, today)
    }
}

pub(crate) fn card_from_row(row: &PgRow) -> TransportCard {
    // Unknown text is treated as locked; the schema CHECK rules it out anyway.
    let status = CardStatus::parse(row.get::<&str, _>("status")).unwrap_or(CardStatus::Locked);
    TransportCard {
        id: row.get("id"),
        user_id: row.get("user_id"),
        card_number: row.get("card_number"),
        balance: row.get("balance"),
        status,
        issue_date: row.get("issue_date"),
        expiry_date: row.get("expiry_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

// =============================================================================
// PURE HELPERS
// =============================================================================

/// Today's calendar date in India.
#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_utc().to_offset(IST).date()
}

/// A card is valid through its expiry date and expired from the day after.
#[must_use]
pub fn effective_status(stored: CardStatus, expiry: Date, today: Date) -> CardStatus {
    if today > expiry { CardStatus::Expired } else { stored }
}

/// `**** **** **** 1234`
#[must_use]
pub fn mask_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(char::is_ascii_digit).collect();
    let last4: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("**** **** **** {last4}")
}

/// `MM/YY`, as printed on the card.
#[must_use]
pub fn expiry_label(expiry: Date) -> String {
    format!("{:02}/{:02}", u8::from(expiry.month()), expiry.year().rem_euclid(100))
}

/// Same calendar day `years` later; 29 February falls back to the 28th.
#[must_use]
pub fn add_years(date: Date, years: i32) -> Date {
    let year = date.year() + years;
    Date::from_calendar_date(year, date.month(), date.day())
        .or_else(|_| Date::from_calendar_date(year, Month::February, 28))
        .unwrap_or(date)
}

/// Random 16-digit card number without a leading zero.
#[must_use]
pub fn generate_card_number() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let mut number = String::with_capacity(CARD_NUMBER_LEN);
    number.push(char::from(b'0' + rng.random_range(1..=9u8)));
    for _ in 1..CARD_NUMBER_LEN {
        number.push(char::from(b'0' + rng.random_range(0..=9u8)));
    }
    number
}

// =============================================================================
// QUERIES
// =============================================================================

/// Issue a new active card for `user_id`. Runs on the caller's connection so
/// sign-up can create the user and the card atomically.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn issue_card(
    conn: &mut PgConnection,
    user_id: Uuid,
    opening_balance: Decimal,
    today: Date,
) -> Result<TransportCard, CardError> {
    let sql = format!(
        "INSERT INTO transport_cards (user_id, card_number, balance, status, issue_date, expiry_date)
         VALUES ($1, $2, $3, 'active', $4, $5)
         RETURNING {CARD_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(generate_card_number())
        .bind(opening_balance.max(Decimal::ZERO))
        .bind(today)
        .bind(add_years(today, CARD_VALIDITY_YEARS))
        .fetch_one(conn)
        .await?;

    let card = card_from_row(&row);
    info!(%user_id, card_id = %card.id, "transport card issued");
    Ok(card)
}

/// Load the card owned by `user_id`.
///
/// # Errors
///
/// Returns `NotFound` when the user has no card.
pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<TransportCard, CardError> {
    let sql = format!("SELECT {CARD_COLUMNS} FROM transport_cards WHERE user_id = $1");
    let row = sqlx::query(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(CardError::NotFound(user_id))?;
    Ok(card_from_row(&row))
}

/// Lock or unlock the user's card. Setting the status it already has is a
/// no-op that still returns the card.
///
/// # Errors
///
/// Returns `Expired` for expired cards and `NotFound` when there is no card.
pub async fn set_status(
    pool: &PgPool,
    user_id: Uuid,
    target: CardStatus,
    today: Date,
) -> Result<TransportCard, CardError> {
    let card = find_by_user(pool, user_id).await?;
    let current = card.effective_status(today);
    if current == CardStatus::Expired || target == CardStatus::Expired {
        return Err(CardError::Expired(card.id));
    }
    if current == target {
        return Ok(card);
    }

    let sql = format!(
        "UPDATE transport_cards SET status = $2, updated_at = now()
         WHERE id = $1
         RETURNING {CARD_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(card.id)
        .bind(target.as_str())
        .fetch_one(pool)
        .await?;

    info!(card_id = %card.id, status = target.as_str(), "card status changed");
    Ok(card_from_row(&row))
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
