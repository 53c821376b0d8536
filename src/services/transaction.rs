//! Card transactions: history, fare payment and recharge.
//!
//! DESIGN
//! ======
//! Balance changes and their ledger rows are written in one database
//! transaction. The debit is a single conditional `UPDATE` (active, unexpired,
//! sufficient balance) so two concurrent payments can never overdraw a card;
//! when it matches no row the card is re-read to report why.
//!
//! TRADE-OFFS
//! ==========
//! Transaction kinds are stored as their English display text, which keeps
//! the table readable in `psql` at the cost of translating on the way out.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, PgPool, Row};
use time::macros::datetime;
use time::{Date, OffsetDateTime};
use tracing::info;
use uuid::Uuid;

use crate::locale::{self, IST, Locale};
use crate::services::card::{self, CardError, CardStatus};

pub const RECHARGE_SERVICE: &str = "Online Payment";
pub const RECHARGE_ROUTE: &str = "UPI Transaction";
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;
pub const MAX_HISTORY_LIMIT: i64 = 100;

const TRANSACTION_COLUMNS: &str = "id, card_id, type, amount, service, route, transaction_date, created_at";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    BusFare,
    MetroTicket,
    AutoFare,
    CardRecharge,
}

impl TransactionKind {
    /// Stored text.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BusFare => "Bus Fare",
            Self::MetroTicket => "Metro Ticket",
            Self::AutoFare => "Auto Fare",
            Self::CardRecharge => "Card Recharge",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Bus Fare" => Some(Self::BusFare),
            "Metro Ticket" => Some(Self::MetroTicket),
            "Auto Fare" => Some(Self::AutoFare),
            "Card Recharge" => Some(Self::CardRecharge),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self, locale: Locale) -> &'static str {
        match self {
            Self::BusFare => locale.pick("Bus Fare", "ಬಸ್ ದರ"),
            Self::MetroTicket => locale.pick("Metro Ticket", "ಮೆಟ್ರೋ ಟಿಕೆಟ್"),
            Self::AutoFare => locale.pick("Auto Fare", "ಆಟೋ ದರ"),
            Self::CardRecharge => locale.pick("Card Recharge", "ಕಾರ್ಡ್ ರೀಚಾರ್ಜ್"),
        }
    }

    #[must_use]
    pub fn is_credit(self) -> bool {
        self == Self::CardRecharge
    }
}

/// Mirrors a `transactions` row.
#[derive(Debug, Clone)]
pub struct TransactionRow {
    pub id: Uuid,
    pub card_id: Uuid,
    /// Raw stored kind; rows written by other tools may hold unknown text.
    pub kind: String,
    pub amount: Decimal,
    pub service: String,
    pub route: Option<String>,
    pub transaction_date: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

fn transaction_from_row(row: &PgRow) -> TransactionRow {
    TransactionRow {
        id: row.get("id"),
        card_id: row.get("card_id"),
        kind: row.get("type"),
        amount: row.get("amount"),
        service: row.get("service"),
        route: row.get("route"),
        transaction_date: row.get("transaction_date"),
        created_at: row.get("created_at"),
    }
}

/// One line of the history widget, fully formatted for `locale`.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: String,
    pub kind: String,
    pub label: String,
    pub service: String,
    pub route: Option<String>,
    pub amount: Decimal,
    /// `+ ₹500` or `- ₹25`.
    pub signed_amount: String,
    pub is_credit: bool,
    pub date: String,
    pub time: String,
    pub transaction_date: OffsetDateTime,
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Positive, at most two decimal places and, when given, at most `max`.
///
/// # Errors
///
/// `InvalidAmount` when any rule is broken.
pub fn validate_amount(amount: Decimal, max: Option<Decimal>) -> Result<Decimal, CardError> {
    let amount = amount.normalize();
    let within_max = max.is_none_or(|max| amount <= max);
    if amount <= Decimal::ZERO || amount.scale() > 2 || !within_max {
        return Err(CardError::InvalidAmount(amount));
    }
    Ok(amount)
}

/// Why a conditional debit matched no row.
#[must_use]
pub fn debit_failure(card_id: Uuid, status: CardStatus, expiry: Date, today: Date) -> CardError {
    match card::effective_status(status, expiry, today) {
        CardStatus::Expired => CardError::Expired(card_id),
        CardStatus::Locked => CardError::Locked(card_id),
        CardStatus::Active => CardError::InsufficientBalance(card_id),
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// Newest first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_for_card(pool: &PgPool, card_id: Uuid, limit: i64) -> Result<Vec<TransactionRow>, sqlx::Error> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM transactions
         WHERE card_id = $1
         ORDER BY transaction_date DESC, created_at DESC
         LIMIT $2"
    );
    let rows = sqlx::query(&sql)
        .bind(card_id)
        .bind(limit.clamp(1, MAX_HISTORY_LIMIT))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().map(transaction_from_row).collect())
}

async fn insert_transaction(
    conn: &mut PgConnection,
    card_id: Uuid,
    kind: TransactionKind,
    amount: Decimal,
    service: &str,
    route: Option<&str>,
) -> Result<TransactionRow, sqlx::Error> {
    let sql = format!(
        "INSERT INTO transactions (card_id, type, amount, service, route)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING {TRANSACTION_COLUMNS}"
    );
    let row = sqlx::query(&sql)
        .bind(card_id)
        .bind(kind.as_str())
        .bind(amount)
        .bind(service)
        .bind(route)
        .fetch_one(conn)
        .await?;
    Ok(transaction_from_row(&row))
}

/// Debit a fare and record it. Returns the ledger row and the new balance.
///
/// # Errors
///
/// `InvalidAmount`, `Locked`, `Expired`, `InsufficientBalance`, `NotFound`
/// or a database error. Nothing is written on error.
pub async fn pay_fare(
    pool: &PgPool,
    card_id: Uuid,
    kind: TransactionKind,
    amount: Decimal,
    service: &str,
    route: Option<&str>,
    today: Date,
) -> Result<(TransactionRow, Decimal), CardError> {
    if kind.is_credit() {
        return Err(CardError::InvalidAmount(amount));
    }
    let amount = validate_amount(amount, None)?;

    let mut tx = pool.begin().await?;
    let debited = sqlx::query(
        r"UPDATE transport_cards
          SET balance = balance - $2, updated_at = now()
          WHERE id = $1 AND status = 'active' AND expiry_date >= $3 AND balance >= $2
          RETURNING balance",
    )
    .bind(card_id)
    .bind(amount)
    .bind(today)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(debited) = debited else {
        let row = sqlx::query("SELECT status, expiry_date FROM transport_cards WHERE id = $1")
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CardError::NotFound(card_id))?;
        let status = CardStatus::parse(row.get::<&str, _>("status")).unwrap_or(CardStatus::Locked);
        return Err(debit_failure(card_id, status, row.get("expiry_date"), today));
    };
    let balance: Decimal = debited.get("balance");

    let entry = insert_transaction(&mut *tx, card_id, kind, amount, service, route).await?;
    tx.commit().await?;

    info!(%card_id, kind = kind.as_str(), %amount, "fare paid");
    Ok((entry, balance))
}

/// Credit the card and record a `Card Recharge`. Locked cards may be
/// recharged; expired cards may not.
///
/// # Errors
///
/// `InvalidAmount`, `Expired`, `NotFound` or a database error.
pub async fn recharge(
    pool: &PgPool,
    card_id: Uuid,
    amount: Decimal,
    max: Decimal,
    today: Date,
) -> Result<(TransactionRow, Decimal), CardError> {
    let amount = validate_amount(amount, Some(max))?;

    let mut tx = pool.begin().await?;
    let credited = sqlx::query(
        r"UPDATE transport_cards
          SET balance = balance + $2, updated_at = now()
          WHERE id = $1 AND status <> 'expired' AND expiry_date >= $3
          RETURNING balance",
    )
    .bind(card_id)
    .bind(amount)
    .bind(today)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(credited) = credited else {
        let exists = sqlx::query("SELECT 1 FROM transport_cards WHERE id = $1")
            .bind(card_id)
            .fetch_optional(&mut *tx)
            .await?
            .is_some();
        return Err(if exists { CardError::Expired(card_id) } else { CardError::NotFound(card_id) });
    };
    let balance: Decimal = credited.get("balance");

    let entry = insert_transaction(
        &mut *tx,
        card_id,
        TransactionKind::CardRecharge,
        amount,
        RECHARGE_SERVICE,
        Some(RECHARGE_ROUTE),
    )
    .await?;
    tx.commit().await?;

    info!(%card_id, %amount, "card recharged");
    Ok((entry, balance))
}

// =============================================================================
// PRESENTATION
// =============================================================================

/// Whole rupees print without decimals, anything else with two.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let digits = if amount.fract().is_zero() { 0 } else { 2 };
    locale::format_inr(amount, digits)
}

fn signed(amount: Decimal, is_credit: bool) -> String {
    format!("{} {}", if is_credit { "+" } else { "-" }, format_amount(amount))
}

#[must_use]
pub fn present(row: &TransactionRow, locale: Locale) -> TransactionView {
    let kind = TransactionKind::parse(&row.kind);
    let is_credit = kind.is_some_and(TransactionKind::is_credit);
    let label = kind.map_or_else(|| row.kind.clone(), |k| k.label(locale).to_owned());
    let route = match (row.route.as_deref(), locale) {
        (Some(RECHARGE_ROUTE), Locale::Kn) => Some("ಯುಪಿಐ ವಹಿವಾಟು".to_owned()),
        (route, _) => route.map(str::to_owned),
    };
    let local = row.transaction_date.to_offset(IST);

    TransactionView {
        id: row.id.to_string(),
        kind: row.kind.clone(),
        label,
        service: row.service.clone(),
        route,
        amount: row.amount,
        signed_amount: signed(row.amount, is_credit),
        is_credit,
        date: locale::format_short_date(local.date(), locale),
        time: locale::format_time_12h(local.time(), locale),
        transaction_date: row.transaction_date,
    }
}

// =============================================================================
// DEMO HISTORY
// =============================================================================

struct DemoEntry {
    kind: TransactionKind,
    amount: i64,
    at: OffsetDateTime,
    service: &'static str,
    route: (&'static str, &'static str),
}

const DEMO_HISTORY: [DemoEntry; 5] = [
    DemoEntry {
        kind: TransactionKind::BusFare,
        amount: 25,
        at: datetime!(2025-05-03 8:35 +5:30),
        service: "BMTC-300K",
        route: ("Majestic to Whitefield", "ಮೆಜೆಸ್ಟಿಕ್‌ನಿಂದ ವೈಟ್‌ಫೀಲ್ಡ್"),
    },
    DemoEntry {
        kind: TransactionKind::MetroTicket,
        amount: 35,
        at: datetime!(2025-05-02 18:22 +5:30),
        service: "Purple Line",
        route: ("MG Road to Indiranagar", "ಎಂಜಿ ರಸ್ತೆಯಿಂದ ಇಂದಿರಾನಗರ"),
    },
    DemoEntry {
        kind: TransactionKind::CardRecharge,
        amount: 500,
        at: datetime!(2025-05-01 14:15 +5:30),
        service: RECHARGE_SERVICE,
        route: (RECHARGE_ROUTE, "ಯುಪಿಐ ವಹಿವಾಟು"),
    },
    DemoEntry {
        kind: TransactionKind::BusFare,
        amount: 55,
        at: datetime!(2025-04-30 9:45 +5:30),
        service: "KSRTC-Super Deluxe",
        route: ("Bangalore to Mysore", "ಬೆಂಗಳೂರಿನಿಂದ ಮೈಸೂರು"),
    },
    DemoEntry {
        kind: TransactionKind::AutoFare,
        amount: 120,
        at: datetime!(2025-04-29 20:10 +5:30),
        service: "Namma Yatri",
        route: ("Koramangala to HSR Layout", "ಕೊರಮಂಗಲದಿಂದ ಎಚ್‌ಎಸ್‌ಆರ್ ಲೇಔಟ್"),
    },
];

/// Fixed sample history shown for cards without real transactions.
#[must_use]
pub fn demo_history(locale: Locale) -> Vec<TransactionView> {
    DEMO_HISTORY
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let amount = Decimal::from(entry.amount);
            TransactionView {
                id: format!("demo-{}", i + 1),
                kind: entry.kind.as_str().to_owned(),
                label: entry.kind.label(locale).to_owned(),
                service: entry.service.to_owned(),
                route: Some(locale.pick(entry.route.0, entry.route.1).to_owned()),
                amount,
                signed_amount: signed(amount, entry.kind.is_credit()),
                is_credit: entry.kind.is_credit(),
                date: locale::format_short_date(entry.at.date(), locale),
                time: locale::format_time_12h(entry.at.time(), locale),
                transaction_date: entry.at,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
