//! Employee HR portal: staff login, profile and salary history.
//!
//! DESIGN
//! ======
//! Staff sign in with their citizen credentials plus the employee id on
//! their `bus_employees` row; both must belong to the same user. Admin login
//! is a separate path checked against credentials from the environment and
//! owns no employee row, so admins only see the roster.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use subtle::ConstantTimeEq;
use time::Date;
use uuid::Uuid;

use crate::config::AdminCredentials;
use crate::error::ErrorCode;
use crate::locale::{self, Locale};
use crate::services::auth::{self, AuthError, UserAccount};
use crate::services::catalog;

const EMPLOYEE_COLUMNS: &str =
    "id, user_id, employee_id, full_name, gender, phone_number, address, department, experience_years, remarks";

#[derive(Debug, thiserror::Error)]
pub enum EmployeeError {
    #[error("employee id does not match this account")]
    InvalidEmployeeId,
    #[error("invalid admin credentials")]
    InvalidAdmin,
    #[error("admin login is not configured")]
    AdminDisabled,
    #[error("employee {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ErrorCode for EmployeeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEmployeeId => "E_INVALID_EMPLOYEE_ID",
            Self::InvalidAdmin => "E_INVALID_ADMIN",
            Self::AdminDisabled => "E_ADMIN_DISABLED",
            Self::NotFound(_) => "E_EMPLOYEE_NOT_FOUND",
            Self::Auth(e) => e.error_code(),
            Self::Db(_) => "E_DATABASE",
        }
    }
}

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub employee_id: String,
    pub full_name: String,
    pub gender: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub department: String,
    pub experience_years: Option<i32>,
    pub remarks: Option<String>,
}

fn employee_from_row(row: &PgRow) -> Employee {
    Employee {
        id: row.get("id"),
        user_id: row.get("user_id"),
        employee_id: row.get("employee_id"),
        full_name: row.get("full_name"),
        gender: row.get("gender"),
        phone_number: row.get("phone_number"),
        address: row.get("address"),
        department: row.get("department"),
        experience_years: row.get("experience_years"),
        remarks: row.get("remarks"),
    }
}

#[derive(Debug, Clone)]
pub struct SalaryRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub effective_date: Date,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SalaryView {
    pub id: Uuid,
    pub amount: Decimal,
    /// `₹45,000`
    pub amount_label: String,
    pub effective_date: Date,
    /// `1 April 2024`
    pub effective_date_label: String,
    pub remarks: Option<String>,
}

#[must_use]
pub fn present_salary(record: &SalaryRecord, locale: Locale) -> SalaryView {
    SalaryView {
        id: record.id,
        amount: record.amount,
        amount_label: locale::format_inr(record.amount, 0),
        effective_date: record.effective_date,
        effective_date_label: locale::format_long_date(record.effective_date, locale),
        remarks: record.remarks.clone(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EmployeeProfile {
    #[serde(flatten)]
    pub employee: Employee,
    /// `5 years`, or "Not specified".
    pub experience_label: String,
    pub salary_history: Vec<SalaryView>,
}

#[must_use]
pub fn experience_label(years: Option<i32>, locale: Locale) -> String {
    match years {
        Some(years) => format!("{years} {}", locale.pick("years", "ವರ್ಷಗಳು")),
        None => locale.pick("Not specified", "ನಮೂದಿಸಿಲ್ಲ").to_owned(),
    }
}

#[must_use]
pub fn present_profile(employee: Employee, salary: &[SalaryRecord], locale: Locale) -> EmployeeProfile {
    EmployeeProfile {
        experience_label: experience_label(employee.experience_years, locale),
        salary_history: salary.iter().map(|s| present_salary(s, locale)).collect(),
        employee,
    }
}

// =============================================================================
// LOGIN
// =============================================================================

/// Citizen credentials plus a matching employee id.
///
/// # Errors
///
/// `Auth(InvalidCredentials)` for a bad email or password,
/// `InvalidEmployeeId` when the id is not this user's.
pub async fn login(
    pool: &PgPool,
    email: &str,
    password: &str,
    employee_id: &str,
) -> Result<(UserAccount, Employee), EmployeeError> {
    let user = auth::sign_in(pool, email, password).await?;
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM bus_employees WHERE user_id = $1 AND employee_id = $2");
    let row = sqlx::query(&sql)
        .bind(user.id)
        .bind(employee_id.trim())
        .fetch_optional(pool)
        .await?
        .ok_or(EmployeeError::InvalidEmployeeId)?;
    Ok((user, employee_from_row(&row)))
}

/// # Errors
///
/// `AdminDisabled` when no admin credentials are configured, otherwise
/// `InvalidAdmin` on mismatch.
pub fn check_admin(configured: Option<&AdminCredentials>, username: &str, password: &str) -> Result<(), EmployeeError> {
    let creds = configured.ok_or(EmployeeError::AdminDisabled)?;
    let user_ok = username.trim().as_bytes().ct_eq(creds.username.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(creds.password.as_bytes());
    if bool::from(user_ok & pass_ok) { Ok(()) } else { Err(EmployeeError::InvalidAdmin) }
}

// =============================================================================
// QUERIES
// =============================================================================

/// # Errors
///
/// `NotFound` when the user has no employee row.
pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Employee, EmployeeError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM bus_employees WHERE user_id = $1");
    let row = sqlx::query(&sql)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(EmployeeError::NotFound(user_id))?;
    Ok(employee_from_row(&row))
}

/// # Errors
///
/// `NotFound` for unknown ids.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Employee, EmployeeError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM bus_employees WHERE id = $1");
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(EmployeeError::NotFound(id))?;
    Ok(employee_from_row(&row))
}

/// Newest effective date first.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn salary_history(pool: &PgPool, employee_pk: Uuid) -> Result<Vec<SalaryRecord>, sqlx::Error> {
    let rows = sqlx::query(
        r"SELECT id, amount, effective_date, remarks
          FROM salary_history
          WHERE employee_id = $1
          ORDER BY effective_date DESC, created_at DESC",
    )
    .bind(employee_pk)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| SalaryRecord {
            id: r.get("id"),
            amount: r.get("amount"),
            effective_date: r.get("effective_date"),
            remarks: r.get("remarks"),
        })
        .collect())
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn roster(pool: &PgPool) -> Result<Vec<Employee>, sqlx::Error> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM bus_employees ORDER BY full_name, employee_id");
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(employee_from_row).collect())
}

/// Keep employees whose name, department or employee id matches `query`.
#[must_use]
pub fn filter_roster(employees: Vec<Employee>, query: &str) -> Vec<Employee> {
    employees
        .into_iter()
        .filter(|e| {
            catalog::matches(&e.full_name, query)
                || catalog::matches(&e.department, query)
                || catalog::matches(&e.employee_id, query)
        })
        .collect()
}

#[cfg(test)]
#[path = "employee_test.rs"]
mod tests;
