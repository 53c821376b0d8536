//! Transport card routes: summary, PIN and biometric gates, history, fares.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;
use tracing::{error, info};
use uuid::Uuid;

use super::Lang;
use super::auth::AuthUser;
use crate::error::{ApiError, ErrorCode};
use crate::locale::{self, Locale, Msg};
use crate::services::card::{self as card_svc, CardError, CardStatus, TransportCard};
use crate::services::pin::{self, PinAction, PinError, PinPrompt};
use crate::services::transaction::{self, DEFAULT_HISTORY_LIMIT, TransactionKind, TransactionView};
use crate::state::AppState;

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn card_error_to_api(err: &CardError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        CardError::NotFound(_) => ApiError::from_msg(StatusCode::NOT_FOUND, code, Msg::CardNotFound, locale),
        CardError::Locked(_) => ApiError::from_msg(StatusCode::FORBIDDEN, code, Msg::CardLocked, locale),
        CardError::Expired(_) => ApiError::from_msg(StatusCode::CONFLICT, code, Msg::CardExpired, locale),
        CardError::InsufficientBalance(_) => {
            ApiError::from_msg(StatusCode::UNPROCESSABLE_ENTITY, code, Msg::InsufficientBalance, locale)
        }
        CardError::InvalidAmount(_) => ApiError::from_msg(StatusCode::BAD_REQUEST, code, Msg::InvalidAmount, locale),
        CardError::Database(e) => {
            error!(error = %e, "card query failed");
            ApiError::internal(locale)
        }
    }
}

pub(crate) fn pin_error_to_api(err: &PinError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        PinError::Malformed => ApiError::from_msg(StatusCode::BAD_REQUEST, code, Msg::InvalidPin, locale),
        PinError::Incorrect => ApiError::from_msg(StatusCode::UNAUTHORIZED, code, Msg::IncorrectPin, locale),
        PinError::TooManyAttempts { .. } => {
            ApiError::from_msg(StatusCode::TOO_MANY_REQUESTS, code, Msg::TooManyAttempts, locale)
        }
        PinError::BiometricFailed => ApiError::from_msg(StatusCode::UNAUTHORIZED, code, Msg::BiometricFailed, locale),
    }
}

// =============================================================================
// PAYLOADS
// =============================================================================

/// Card as shown before the PIN gate: number masked, balance hidden.
#[derive(Debug, Serialize)]
pub struct CardSummary {
    pub id: Uuid,
    /// `**** **** **** 1234`
    pub masked_number: String,
    pub status: CardStatus,
    pub status_label: &'static str,
    pub issue_date: Date,
    pub expiry_date: Date,
    /// `MM/YY`
    pub expiry_label: String,
}

impl CardSummary {
    fn new(card: &TransportCard, today: Date, locale: Locale) -> Self {
        let status = card.effective_status(today);
        Self {
            id: card.id,
            masked_number: card_svc::mask_number(&card.card_number),
            status,
            status_label: status.label(locale),
            issue_date: card.issue_date,
            expiry_date: card.expiry_date,
            expiry_label: card_svc::expiry_label(card.expiry_date),
        }
    }
}

#[derive(Deserialize)]
pub struct PinBody {
    pin: String,
}

#[derive(Deserialize)]
pub struct PromptQuery {
    action: String,
}

#[derive(Deserialize)]
pub struct BiometricBody {
    action: PinAction,
}

#[derive(Debug, Serialize)]
pub struct BalanceReveal {
    pub balance: Decimal,
    /// `₹250.00`
    pub balance_label: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatusChange {
    pub card: CardSummary,
    pub message: &'static str,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub transactions: Vec<TransactionView>,
    /// Fixed sample entries rather than the card's own history.
    pub demo: bool,
    /// Locked cards show their history greyed out.
    pub dimmed: bool,
}

#[derive(Deserialize)]
pub struct PayBody {
    kind: TransactionKind,
    amount: Decimal,
    service: String,
    route: Option<String>,
}

#[derive(Deserialize)]
pub struct RechargeBody {
    amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceUpdate {
    pub transaction: TransactionView,
    pub balance: Decimal,
    pub balance_label: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

async fn load_card(state: &AppState, auth: &AuthUser, locale: Locale) -> Result<TransportCard, ApiError> {
    card_svc::find_by_user(&state.pool, auth.user.id)
        .await
        .map_err(|e| card_error_to_api(&e, locale))
}

fn check_pin(state: &AppState, auth: &AuthUser, pin: &str, locale: Locale) -> Result<(), ApiError> {
    pin::verify(&state.pin_attempts, &state.config.card_pin, auth.user.id, pin).map_err(|e| {
        match e {
            PinError::Incorrect => {
                info!(user_id = %auth.user.id, failures = state.pin_attempts.failures(auth.user.id), "incorrect PIN");
            }
            PinError::TooManyAttempts { retry_after_secs } => {
                info!(user_id = %auth.user.id, retry_after_secs, "PIN attempts exhausted");
            }
            PinError::Malformed | PinError::BiometricFailed => {}
        }
        pin_error_to_api(&e, locale)
    })
}

async fn change_status(
    state: &AppState,
    auth: &AuthUser,
    target: CardStatus,
    locale: Locale,
) -> Result<Json<StatusChange>, ApiError> {
    let today = card_svc::today();
    let card = card_svc::set_status(&state.pool, auth.user.id, target, today)
        .await
        .map_err(|e| card_error_to_api(&e, locale))?;
    let message = if target == CardStatus::Locked { Msg::CardLockedOk } else { Msg::CardUnlockedOk };
    Ok(Json(StatusChange { card: CardSummary::new(&card, today, locale), message: message.text(locale) }))
}

/// `GET /api/card`
pub async fn summary(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
) -> Result<Json<CardSummary>, ApiError> {
    let card = load_card(&state, &auth, locale).await?;
    Ok(Json(CardSummary::new(&card, card_svc::today(), locale)))
}

/// `GET /api/card/pin-prompt?action=lock`
pub async fn pin_prompt(
    State(state): State<AppState>,
    Lang(locale): Lang,
    _auth: AuthUser,
    Query(query): Query<PromptQuery>,
) -> Result<Json<PinPrompt>, ApiError> {
    let action = PinAction::parse(&query.action).ok_or_else(|| ApiError::bad_request(locale))?;
    Ok(Json(pin::prompt(action, locale, &state.config.card_pin)))
}

/// `POST /api/card/balance`
pub async fn reveal_balance(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<PinBody>,
) -> Result<Json<BalanceReveal>, ApiError> {
    check_pin(&state, &auth, &body.pin, locale)?;
    let card = load_card(&state, &auth, locale).await?;
    Ok(Json(BalanceReveal {
        balance: card.balance,
        balance_label: locale::format_inr(card.balance, 2),
        message: Msg::PinVerified.text(locale),
    }))
}

/// `POST /api/card/lock`
pub async fn lock(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<PinBody>,
) -> Result<Json<StatusChange>, ApiError> {
    check_pin(&state, &auth, &body.pin, locale)?;
    change_status(&state, &auth, CardStatus::Locked, locale).await
}

/// `POST /api/card/unlock`
pub async fn unlock(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<PinBody>,
) -> Result<Json<StatusChange>, ApiError> {
    check_pin(&state, &auth, &body.pin, locale)?;
    change_status(&state, &auth, CardStatus::Active, locale).await
}

/// `POST /api/card/biometric` — lock or unlock behind the simulated sensor.
pub async fn biometric(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<BiometricBody>,
) -> Result<Json<StatusChange>, ApiError> {
    let target = match body.action {
        PinAction::Lock => CardStatus::Locked,
        PinAction::Unlock => CardStatus::Active,
        PinAction::ViewBalance => return Err(ApiError::bad_request(locale)),
    };
    pin::verify_biometric(state.config.biometric_success_rate).map_err(|e| pin_error_to_api(&e, locale))?;
    change_status(&state, &auth, target, locale).await
}

/// `GET /api/card/transactions?limit=`
pub async fn transactions(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<History>, ApiError> {
    let card = load_card(&state, &auth, locale).await?;
    let rows = transaction::list_for_card(&state.pool, card.id, query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
        .await
        .map_err(|e| {
            error!(error = %e, card_id = %card.id, "transaction history query failed");
            ApiError::internal(locale)
        })?;

    let dimmed = card.effective_status(card_svc::today()) == CardStatus::Locked;
    let history = if rows.is_empty() && state.config.demo_history {
        History { transactions: transaction::demo_history(locale), demo: true, dimmed }
    } else {
        let transactions = rows.iter().map(|r| transaction::present(r, locale)).collect();
        History { transactions, demo: false, dimmed }
    };
    Ok(Json(history))
}

/// `POST /api/card/pay`
pub async fn pay(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<PayBody>,
) -> Result<Json<BalanceUpdate>, ApiError> {
    let card = load_card(&state, &auth, locale).await?;
    let service = body.service.trim();
    if service.is_empty() {
        return Err(ApiError::bad_request(locale));
    }
    let (row, balance) = transaction::pay_fare(
        &state.pool,
        card.id,
        body.kind,
        body.amount,
        service,
        body.route.as_deref().map(str::trim).filter(|r| !r.is_empty()),
        card_svc::today(),
    )
    .await
    .map_err(|e| card_error_to_api(&e, locale))?;

    Ok(Json(BalanceUpdate {
        transaction: transaction::present(&row, locale),
        balance,
        balance_label: locale::format_inr(balance, 2),
    }))
}

/// `POST /api/card/recharge`
pub async fn recharge(
    State(state): State<AppState>,
    Lang(locale): Lang,
    auth: AuthUser,
    Json(body): Json<RechargeBody>,
) -> Result<Json<BalanceUpdate>, ApiError> {
    let card = load_card(&state, &auth, locale).await?;
    let (row, balance) =
        transaction::recharge(&state.pool, card.id, body.amount, state.config.max_recharge, card_svc::today())
            .await
            .map_err(|e| card_error_to_api(&e, locale))?;

    Ok(Json(BalanceUpdate {
        transaction: transaction::present(&row, locale),
        balance,
        balance_label: locale::format_inr(balance, 2),
    }))
}

#[cfg(test)]
#[path = "card_test.rs"]
mod tests;
