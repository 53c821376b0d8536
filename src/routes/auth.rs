//! Citizen auth routes, session cookies and the session extractors.
//!
//! Citizens and staff use separate cookies (`session_token` and
//! `employee_session`), each holding an opaque token from `sessions`.

use axum::extract::{FromRef, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;
use tracing::{error, info};

use super::{Lang, locale_from_parts};
use crate::error::{ApiError, ErrorCode};
use crate::locale::{Locale, Msg};
use crate::services::auth::{self as auth_svc, AuthError};
use crate::services::session::{self, SessionRole, SessionUser};
use crate::state::AppState;

pub const CITIZEN_COOKIE: &str = "session_token";
pub const STAFF_COOKIE: &str = "employee_session";

// =============================================================================
// COOKIES
// =============================================================================

pub(crate) fn session_cookie(name: &'static str, token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub(crate) fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Resolve the session behind `cookie_name`, if any.
pub(crate) async fn session_from_jar(
    state: &AppState,
    jar: &CookieJar,
    cookie_name: &str,
) -> Result<Option<(SessionUser, String)>, sqlx::Error> {
    let token = jar.get(cookie_name).map(Cookie::value).unwrap_or_default();
    if token.is_empty() {
        return Ok(None);
    }
    let user = session::validate_session(&state.pool, token).await?;
    Ok(user.map(|u| (u, token.to_owned())))
}

// =============================================================================
// EXTRACTORS
// =============================================================================

async fn extract_session<S>(
    parts: &Parts,
    state: &S,
    cookie_name: &str,
    allowed: fn(SessionRole) -> bool,
) -> Result<(SessionUser, String), ApiError>
where
    AppState: FromRef<S>,
{
    let locale = locale_from_parts(parts);
    let jar = CookieJar::from_headers(&parts.headers);
    let app_state = AppState::from_ref(state);
    match session_from_jar(&app_state, &jar, cookie_name).await {
        Ok(Some((user, token))) if allowed(user.role) => Ok((user, token)),
        Ok(_) => Err(ApiError::unauthorized(locale)),
        Err(e) => {
            error!(error = %e, "session lookup failed");
            Err(ApiError::internal(locale))
        }
    }
}

/// Signed-in citizen. Use as a handler parameter to require a citizen session.
pub struct AuthUser {
    pub user: SessionUser,
    pub token: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (user, token) =
            extract_session(parts, state, CITIZEN_COOKIE, |role| role == SessionRole::Citizen).await?;
        Ok(Self { user, token })
    }
}

/// Signed-in employee or admin of the employee portal.
pub struct StaffUser {
    pub user: SessionUser,
    pub token: String,
}

impl StaffUser {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == SessionRole::Admin
    }
}

impl<S> FromRequestParts<S> for StaffUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let (user, token) = extract_session(parts, state, STAFF_COOKIE, SessionRole::is_staff).await?;
        Ok(Self { user, token })
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn auth_error_to_api(err: &AuthError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        AuthError::InvalidEmail => ApiError::from_msg(StatusCode::BAD_REQUEST, code, Msg::InvalidEmail, locale),
        AuthError::WeakPassword => ApiError::from_msg(StatusCode::BAD_REQUEST, code, Msg::WeakPassword, locale),
        AuthError::AlreadyRegistered => ApiError::from_msg(StatusCode::CONFLICT, code, Msg::AlreadyRegistered, locale),
        AuthError::InvalidCredentials => {
            ApiError::from_msg(StatusCode::UNAUTHORIZED, code, Msg::InvalidCredentials, locale)
        }
        AuthError::Card(_) | AuthError::Db(_) => {
            error!(error = %err, "auth request failed");
            ApiError::internal(locale)
        }
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

#[derive(Deserialize)]
pub struct SignUpBody {
    email: String,
    password: String,
    full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct SignInBody {
    email: String,
    password: String,
}

async fn start_session(
    state: &AppState,
    jar: CookieJar,
    user: SessionUser,
    locale: Locale,
) -> Result<(CookieJar, Json<SessionUser>), ApiError> {
    let token = session::create_session(&state.pool, user.id, user.role)
        .await
        .map_err(|e| {
            error!(error = %e, "session creation failed");
            ApiError::internal(locale)
        })?;
    let jar = jar.add(session_cookie(CITIZEN_COOKIE, token, state.config.cookie_secure));
    Ok((jar, Json(user)))
}

/// `POST /api/auth/signup` — register, issue a card and sign in.
pub async fn signup(
    State(state): State<AppState>,
    Lang(locale): Lang,
    jar: CookieJar,
    Json(body): Json<SignUpBody>,
) -> Result<Response, ApiError> {
    let (account, card) = auth_svc::sign_up(
        &state.pool,
        &body.email,
        &body.password,
        body.full_name.as_deref(),
        state.config.opening_balance,
    )
    .await
    .map_err(|e| auth_error_to_api(&e, locale))?;

    info!(user_id = %account.id, card_id = %card.id, "signup complete");
    let user = SessionUser {
        id: account.id,
        email: account.email,
        full_name: account.full_name,
        role: SessionRole::Citizen,
    };
    let (jar, body) = start_session(&state, jar, user, locale).await?;
    Ok((StatusCode::CREATED, jar, body).into_response())
}

/// `POST /api/auth/signin`
pub async fn signin(
    State(state): State<AppState>,
    Lang(locale): Lang,
    jar: CookieJar,
    Json(body): Json<SignInBody>,
) -> Result<Response, ApiError> {
    let account = auth_svc::sign_in(&state.pool, &body.email, &body.password)
        .await
        .map_err(|e| auth_error_to_api(&e, locale))?;

    let user = SessionUser {
        id: account.id,
        email: account.email,
        full_name: account.full_name,
        role: SessionRole::Citizen,
    };
    Ok(start_session(&state, jar, user, locale).await?.into_response())
}

/// `GET /api/auth/me` — return current user.
pub async fn me(auth: AuthUser) -> Json<SessionUser> {
    Json(auth.user)
}

/// `POST /api/auth/logout` — delete session, clear cookie.
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(e) = session::delete_session(&state.pool, &auth.token).await {
        error!(error = %e, "session delete failed");
    }
    let jar = CookieJar::new().add(clear_cookie(CITIZEN_COOKIE, state.config.cookie_secure));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
