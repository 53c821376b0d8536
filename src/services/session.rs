//! Session management.
//!
//! ARCHITECTURE
//! ============
//! Every login (citizen, employee, admin) produces a long-lived random token
//! stored in `sessions` together with the role it was issued for. The HTTP
//! layer keeps citizen and staff tokens in separate cookies, so signing in to
//! the employee portal never replaces a citizen session in the same browser.

use std::fmt::Write;

use rand::Rng;
use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRole {
    Citizen,
    Employee,
    Admin,
}

impl SessionRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Employee => "employee",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "citizen" => Some(Self::Citizen),
            "employee" => Some(Self::Employee),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Whether a session of this role may use the employee portal.
    #[must_use]
    pub fn is_staff(self) -> bool {
        matches!(self, Self::Employee | Self::Admin)
    }
}

/// User row returned from session validation.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    /// Unique user identifier.
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    /// Role the session was issued for.
    pub role: SessionRole,
}

/// Create a session for the given user, returning the token.
pub async fn create_session(pool: &PgPool, user_id: Uuid, role: SessionRole) -> Result<String, sqlx::Error> {
    let token = generate_token();
    sqlx::query("INSERT INTO sessions (token, user_id, role) VALUES ($1, $2, $3)")
        .bind(&token)
        .bind(user_id)
        .bind(role.as_str())
        .execute(pool)
        .await?;
    Ok(token)
}

/// Validate a session token and return the associated user.
pub async fn validate_session(pool: &PgPool, token: &str) -> Result<Option<SessionUser>, sqlx::Error> {
    let row = sqlx::query(
        r"SELECT u.id, u.email, u.full_name, s.role
          FROM sessions s
          JOIN users u ON u.id = s.user_id
          WHERE s.token = $1 AND s.expires_at > now()",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(row.and_then(|r| {
        let role = SessionRole::parse(r.get::<&str, _>("role"))?;
        Some(SessionUser { id: r.get("id"), email: r.get("email"), full_name: r.get("full_name"), role })
    }))
}

/// Delete a session by token.
pub async fn delete_session(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
