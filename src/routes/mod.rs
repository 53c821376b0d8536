//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! JSON API under `/api`, a page gate in front of the two signed-in pages,
//! and the static front-end from `WEB_DIR` for everything else. Unknown
//! front-end paths fall back to `index.html` so client-side routes load.

pub mod auth;
pub mod card;
pub mod employee;
pub mod portals;

#[cfg(test)]
pub(crate) mod test_client;

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::locale::{Locale, Msg};
use crate::services::live_status::{self, StatusView};
use crate::services::session::SessionRole;
use crate::state::AppState;

// =============================================================================
// LOCALE EXTRACTOR
// =============================================================================

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

/// `?lang=` wins over `Accept-Language`; English otherwise.
pub(crate) fn locale_from_parts(parts: &Parts) -> Locale {
    let from_query = Query::<LangQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(q)| q.lang)
        .and_then(|tag| Locale::from_tag(&tag));
    if let Some(locale) = from_query {
        return locale;
    }
    parts
        .headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(Locale::from_accept_language)
        .unwrap_or_default()
}

/// Caller's display language.
pub struct Lang(pub Locale);

impl<S: Send + Sync> FromRequestParts<S> for Lang {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(locale_from_parts(parts)))
    }
}

// =============================================================================
// ROUTER
// =============================================================================

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/card", get(card::summary))
        .route("/api/card/pin-prompt", get(card::pin_prompt))
        .route("/api/card/balance", post(card::reveal_balance))
        .route("/api/card/lock", post(card::lock))
        .route("/api/card/unlock", post(card::unlock))
        .route("/api/card/biometric", post(card::biometric))
        .route("/api/card/transactions", get(card::transactions))
        .route("/api/card/pay", post(card::pay))
        .route("/api/card/recharge", post(card::recharge))
        .route("/api/bmtc/routes", get(portals::bmtc_routes))
        .route("/api/bmtc/routes/{key}", get(portals::bmtc_route))
        .route("/api/ksrtc/routes", get(portals::ksrtc_routes))
        .route("/api/ksrtc/routes/{id}", get(portals::ksrtc_route))
        .route("/api/ksrtc/student-pass", get(portals::student_pass))
        .route("/api/ksrtc/tracker/stops", get(portals::tracker_stops))
        .route("/api/ksrtc/tracker/search", post(portals::tracker_search))
        .route("/api/tracker/routes", get(portals::tracked_routes))
        .route("/api/tracker/routes/{key}", get(portals::tracked_route))
        .route("/api/metro/lines", get(portals::metro_lines))
        .route("/api/metro/lines/{key}", get(portals::metro_line))
        .route("/api/taxi/services", get(portals::taxi_services))
        .route("/api/taxi/estimate", post(portals::taxi_estimate))
        .route("/api/employee/login", post(employee::login))
        .route("/api/employee/admin-login", post(employee::admin_login))
        .route("/api/employee/logout", post(employee::logout))
        .route("/api/employee/me", get(employee::me))
        .route("/api/employee/roster", get(employee::roster))
        .route("/api/employee/roster/{id}", get(employee::roster_entry))
        .route("/api/live-status", get(live_status))
        .route("/api/emergency", post(emergency))
        .route("/healthz", get(healthz))
}

/// Full application router: API, page gate and static front-end.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let web_dir = &state.config.web_dir;
    let front_end = ServeDir::new(web_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(web_dir.join("index.html")));

    api_routes()
        .fallback_service(front_end)
        .layer(middleware::from_fn_with_state(state.clone(), page_gate))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// PAGE GATE
// =============================================================================

fn is_citizen(role: SessionRole) -> bool {
    role == SessionRole::Citizen
}

/// Signed-in pages redirect to their login page without a valid session.
async fn page_gate(State(state): State<AppState>, jar: CookieJar, req: Request, next: Next) -> Response {
    let gate: Option<(&str, &str, fn(SessionRole) -> bool)> = match req.uri().path() {
        "/card" => Some((auth::CITIZEN_COOKIE, "/auth", is_citizen)),
        "/employee-portal" => Some((auth::STAFF_COOKIE, "/employee-login", SessionRole::is_staff)),
        _ => None,
    };
    let Some((cookie, login_path, allowed)) = gate else {
        return next.run(req).await;
    };

    match auth::session_from_jar(&state, &jar, cookie).await {
        Ok(Some((user, _))) if allowed(user.role) => next.run(req).await,
        Ok(_) => Redirect::temporary(login_path).into_response(),
        Err(e) => {
            error!(error = %e, path = req.uri().path(), "page gate session lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

// =============================================================================
// MISC HANDLERS
// =============================================================================

async fn live_status(Lang(locale): Lang) -> Json<Vec<StatusView>> {
    Json(live_status::badges(locale))
}

#[derive(Deserialize, Default)]
pub struct EmergencyBody {
    location: Option<String>,
}

#[derive(Serialize)]
pub struct Acknowledgement {
    pub message: &'static str,
}

/// `POST /api/emergency`. Logged only; nothing is dispatched.
async fn emergency(Lang(locale): Lang, body: Option<Json<EmergencyBody>>) -> Json<Acknowledgement> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    warn!(
        location = body.location.as_deref().unwrap_or("unknown"),
        locale = locale.tag(),
        "emergency assistance requested"
    );
    Json(Acknowledgement { message: Msg::EmergencyInitiated.text(locale) })
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
