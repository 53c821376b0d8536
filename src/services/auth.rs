//! Email + password credentials.
//!
//! DESIGN
//! ======
//! Passwords are stored as a per-user random salt plus an iterated SHA-256
//! digest. Sign-up creates the user and issues the transport card in one
//! database transaction, so a citizen never exists without a card.
//!
//! Sign-in returns the same error for an unknown email and a wrong password.

use rand::Rng;
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use subtle::ConstantTimeEq;
use tracing::info;
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::services::card::{self, CardError, TransportCard};
use crate::services::session::bytes_to_hex;

const MIN_PASSWORD_LEN: usize = 6;
const HASH_ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;

/// Fixed row that owns admin sessions in the employee portal.
pub const ADMIN_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_ad01);
/// Contains a space, so [`normalize_email`] never lets a citizen claim it.
const ADMIN_EMAIL: &str = "portal admin@employee-portal.local";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email")]
    InvalidEmail,
    #[error("password too short")]
    WeakPassword,
    #[error("user already registered")]
    AlreadyRegistered,
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Card(#[from] CardError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ErrorCode for AuthError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "E_INVALID_EMAIL",
            Self::WeakPassword => "E_WEAK_PASSWORD",
            Self::AlreadyRegistered => "E_ALREADY_REGISTERED",
            Self::InvalidCredentials => "E_INVALID_CREDENTIALS",
            Self::Card(e) => e.error_code(),
            Self::Db(_) => "E_DATABASE",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
}

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    let (local, domain) = normalized.split_once('@')?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || normalized.contains(char::is_whitespace)
    {
        return None;
    }
    Some(normalized)
}

/// # Errors
///
/// Returns `WeakPassword` when shorter than six characters.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}

#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; SALT_LEN] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    for _ in 1..HASH_ROUNDS {
        digest = Sha256::new()
            .chain_update(digest)
            .chain_update(salt.as_bytes())
            .chain_update(password.as_bytes())
            .finalize();
    }
    bytes_to_hex(&digest)
}

fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    hash_password(password, salt).as_bytes().ct_eq(expected_hash.as_bytes()).into()
}

fn name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("user")
        .to_owned()
}

/// Register a citizen and issue their transport card.
///
/// # Errors
///
/// Validation errors, `AlreadyRegistered` for a taken email, or a database
/// failure (in which case neither the user nor the card exist).
pub async fn sign_up(
    pool: &PgPool,
    email: &str,
    password: &str,
    full_name: Option<&str>,
    opening_balance: Decimal,
) -> Result<(UserAccount, TransportCard), AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidEmail)?;
    validate_password(password)?;
    let full_name = full_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map_or_else(|| name_from_email(&email), str::to_owned);
    let salt = generate_salt();
    let password_hash = hash_password(password, &salt);

    let mut tx = pool.begin().await?;
    let row = sqlx::query(
        r"INSERT INTO users (email, full_name, password_salt, password_hash)
          VALUES ($1, $2, $3, $4)
          ON CONFLICT (email) DO NOTHING
          RETURNING id",
    )
    .bind(&email)
    .bind(&full_name)
    .bind(&salt)
    .bind(&password_hash)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(row) = row else {
        return Err(AuthError::AlreadyRegistered);
    };
    let user_id: Uuid = row.get("id");
    let card = card::issue_card(&mut *tx, user_id, opening_balance, card::today()).await?;
    tx.commit().await?;

    info!(%user_id, "citizen registered");
    Ok((UserAccount { id: user_id, email, full_name }, card))
}

/// Check email and password.
///
/// # Errors
///
/// `InvalidCredentials` for any mismatch, including an unknown email.
pub async fn sign_in(pool: &PgPool, email: &str, password: &str) -> Result<UserAccount, AuthError> {
    let email = normalize_email(email).ok_or(AuthError::InvalidCredentials)?;
    let row = sqlx::query("SELECT id, email, full_name, password_salt, password_hash FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let salt: String = row.get("password_salt");
    let stored: String = row.get("password_hash");
    if !verify_password(password, &salt, &stored) {
        return Err(AuthError::InvalidCredentials);
    }

    Ok(UserAccount { id: row.get("id"), email: row.get("email"), full_name: row.get("full_name") })
}

/// Ensure the admin user row exists. Its hash is not a hex digest, so the
/// row can never be used through [`sign_in`].
///
/// # Errors
///
/// Returns a database error if the upsert fails.
pub async fn upsert_admin_user(pool: &PgPool, display_name: &str) -> Result<Uuid, sqlx::Error> {
    let row = sqlx::query(
        r"INSERT INTO users (id, email, full_name, password_salt, password_hash)
          VALUES ($1, $2, $3, '', '!')
          ON CONFLICT (id) DO UPDATE SET full_name = EXCLUDED.full_name, updated_at = now()
          RETURNING id",
    )
    .bind(ADMIN_USER_ID)
    .bind(ADMIN_EMAIL)
    .bind(display_name)
    .fetch_one(pool)
    .await?;
    Ok(row.get("id"))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
