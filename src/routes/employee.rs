//! Employee HR portal routes.
//!
//! Staff sessions use the `employee_session` cookie. Employees see their own
//! profile; the admin session sees the roster only.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::Lang;
use super::auth::{STAFF_COOKIE, StaffUser, auth_error_to_api, clear_cookie, session_cookie};
use crate::error::{ApiError, ErrorCode};
use crate::locale::{Locale, Msg};
use crate::services::auth as auth_svc;
use crate::services::employee::{self as employee_svc, Employee, EmployeeError, EmployeeProfile};
use crate::services::session::{self, SessionRole, SessionUser};
use crate::state::AppState;

const ADMIN_DISPLAY_NAME: &str = "Portal Admin";

fn employee_error_to_api(err: &EmployeeError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        EmployeeError::Auth(inner) => auth_error_to_api(inner, locale),
        EmployeeError::InvalidEmployeeId => {
            ApiError::from_msg(StatusCode::UNAUTHORIZED, code, Msg::InvalidEmployeeId, locale)
        }
        EmployeeError::InvalidAdmin => ApiError::from_msg(StatusCode::UNAUTHORIZED, code, Msg::InvalidAdmin, locale),
        EmployeeError::AdminDisabled => {
            ApiError::from_msg(StatusCode::SERVICE_UNAVAILABLE, code, Msg::AdminDisabled, locale)
        }
        EmployeeError::NotFound(_) => ApiError::from_msg(StatusCode::NOT_FOUND, code, Msg::EmployeeNotFound, locale),
        EmployeeError::Db(e) => {
            error!(error = %e, "employee query failed");
            ApiError::internal(locale)
        }
    }
}

fn db_error(e: &sqlx::Error, locale: Locale) -> ApiError {
    error!(error = %e, "employee portal database error");
    ApiError::internal(locale)
}

#[derive(Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
    employee_id: String,
}

#[derive(Deserialize)]
pub struct AdminLoginBody {
    username: String,
    password: String,
}

#[derive(Serialize)]
pub struct StaffLogin {
    pub user: SessionUser,
    pub employee: Option<Employee>,
}

#[derive(Deserialize, Default)]
pub struct RosterQuery {
    #[serde(default)]
    q: String,
}

async fn start_staff_session(
    state: &AppState,
    jar: CookieJar,
    login: StaffLogin,
    locale: Locale,
) -> Result<Response, ApiError> {
    let token = session::create_session(&state.pool, login.user.id, login.user.role)
        .await
        .map_err(|e| db_error(&e, locale))?;
    let jar = jar.add(session_cookie(STAFF_COOKIE, token, state.config.cookie_secure));
    Ok((jar, Json(login)).into_response())
}

/// `POST /api/employee/login`
pub async fn login(
    State(state): State<AppState>,
    Lang(locale): Lang,
    jar: CookieJar,
    Json(body): Json<LoginBody>,
) -> Result<Response, ApiError> {
    let (account, employee) = employee_svc::login(&state.pool, &body.email, &body.password, &body.employee_id)
        .await
        .map_err(|e| employee_error_to_api(&e, locale))?;

    info!(user_id = %account.id, employee_id = %employee.employee_id, "employee signed in");
    let user = SessionUser {
        id: account.id,
        email: account.email,
        full_name: account.full_name,
        role: SessionRole::Employee,
    };
    start_staff_session(&state, jar, StaffLogin { user, employee: Some(employee) }, locale).await
}

/// `POST /api/employee/admin-login`
pub async fn admin_login(
    State(state): State<AppState>,
    Lang(locale): Lang,
    jar: CookieJar,
    Json(body): Json<AdminLoginBody>,
) -> Result<Response, ApiError> {
    if let Err(e) = employee_svc::check_admin(state.config.admin.as_ref(), &body.username, &body.password) {
        if matches!(e, EmployeeError::InvalidAdmin) {
            warn!("rejected admin login");
        }
        return Err(employee_error_to_api(&e, locale));
    }

    let admin_id = auth_svc::upsert_admin_user(&state.pool, ADMIN_DISPLAY_NAME)
        .await
        .map_err(|e| db_error(&e, locale))?;
    info!("admin signed in");
    let user = SessionUser {
        id: admin_id,
        email: body.username.trim().to_owned(),
        full_name: ADMIN_DISPLAY_NAME.to_owned(),
        role: SessionRole::Admin,
    };
    start_staff_session(&state, jar, StaffLogin { user, employee: None }, locale).await
}

/// `POST /api/employee/logout`
pub async fn logout(State(state): State<AppState>, staff: StaffUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &staff.token).await {
        error!(error = %e, "session delete failed");
    }
    let jar = CookieJar::new().add(clear_cookie(STAFF_COOKIE, state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

async fn load_profile(state: &AppState, employee: Employee, locale: Locale) -> Result<EmployeeProfile, ApiError> {
    let salary = employee_svc::salary_history(&state.pool, employee.id)
        .await
        .map_err(|e| db_error(&e, locale))?;
    Ok(employee_svc::present_profile(employee, &salary, locale))
}

/// `GET /api/employee/me` — own profile and salary history.
pub async fn me(
    State(state): State<AppState>,
    Lang(locale): Lang,
    staff: StaffUser,
) -> Result<Json<EmployeeProfile>, ApiError> {
    if staff.is_admin() {
        return Err(ApiError::forbidden(locale));
    }
    let employee = employee_svc::find_by_user(&state.pool, staff.user.id)
        .await
        .map_err(|e| employee_error_to_api(&e, locale))?;
    Ok(Json(load_profile(&state, employee, locale).await?))
}

/// `GET /api/employee/roster?q=` (admin)
pub async fn roster(
    State(state): State<AppState>,
    Lang(locale): Lang,
    staff: StaffUser,
    Query(query): Query<RosterQuery>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    if !staff.is_admin() {
        return Err(ApiError::forbidden(locale));
    }
    let all = employee_svc::roster(&state.pool).await.map_err(|e| db_error(&e, locale))?;
    Ok(Json(employee_svc::filter_roster(all, &query.q)))
}

/// `GET /api/employee/roster/{id}` (admin)
pub async fn roster_entry(
    State(state): State<AppState>,
    Lang(locale): Lang,
    staff: StaffUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeProfile>, ApiError> {
    if !staff.is_admin() {
        return Err(ApiError::forbidden(locale));
    }
    let employee = employee_svc::find_by_id(&state.pool, id)
        .await
        .map_err(|e| employee_error_to_api(&e, locale))?;
    Ok(Json(load_profile(&state, employee, locale).await?))
}

#[cfg(test)]
#[path = "employee_test.rs"]
mod tests;
