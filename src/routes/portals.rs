//! Public portal routes: BMTC, KSRTC (routes, student pass, stop tracker),
//! tracked routes, Namma Metro and auto/taxi fares.
//!
//! Everything here except the stop tracker is served from static tables.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use super::Lang;
use crate::error::{ApiError, ErrorCode};
use crate::locale::{Locale, Msg};
use crate::services::catalog::{
    self, BMTC_NEXT_ARRIVALS_MINS, BmtcRouteView, BusClass, CatalogError, FareEstimate, KSRTC_DEPARTURES,
    KsrtcRouteView, METRO_NEXT_TRAINS_MINS, MetroLine, StudentPassInfo, TaxiServiceView,
};
use crate::services::tracker::{self, BusStop, BusView, TrackedRouteView, TrackerError};
use crate::state::AppState;

fn catalog_error_to_api(err: &CatalogError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        CatalogError::NotFound(_) => ApiError::not_found(locale),
        CatalogError::UnderConstruction(_) => {
            ApiError::from_msg(StatusCode::CONFLICT, code, Msg::LineUnderConstruction, locale)
        }
        CatalogError::NotMetered(_) => {
            ApiError::from_msg(StatusCode::UNPROCESSABLE_ENTITY, code, Msg::NotMetered, locale)
        }
        CatalogError::InvalidInput(_) => ApiError::from_msg(StatusCode::BAD_REQUEST, code, Msg::BadRequest, locale),
    }
}

fn tracker_error_to_api(err: &TrackerError, locale: Locale) -> ApiError {
    let code = err.error_code();
    match err {
        TrackerError::StopNotFound(_) | TrackerError::RouteNotFound(_) => {
            ApiError::from_msg(StatusCode::NOT_FOUND, code, Msg::NotFound, locale)
        }
        TrackerError::Db(e) => {
            error!(error = %e, "tracker query failed");
            ApiError::internal(locale)
        }
    }
}

fn minutes(values: &[u32]) -> Vec<String> {
    values.iter().map(|m| format!("{m} mins")).collect()
}

// =============================================================================
// BMTC
// =============================================================================

#[derive(Deserialize, Default)]
pub struct RouteSearch {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: String,
    class: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectedBmtcRoute {
    pub route: BmtcRouteView,
    pub next_arrivals: Vec<String>,
}

/// `GET /api/bmtc/routes?from=&to=`
pub async fn bmtc_routes(Query(search): Query<RouteSearch>) -> Json<Vec<BmtcRouteView>> {
    Json(catalog::search_bmtc(&search.from, &search.to).into_iter().map(BmtcRouteView::from).collect())
}

/// `GET /api/bmtc/routes/{key}` — by id or route number.
pub async fn bmtc_route(Lang(locale): Lang, Path(key): Path<String>) -> Result<Json<SelectedBmtcRoute>, ApiError> {
    let route = catalog::find_bmtc(&key).map_err(|e| catalog_error_to_api(&e, locale))?;
    Ok(Json(SelectedBmtcRoute { route: route.into(), next_arrivals: minutes(&BMTC_NEXT_ARRIVALS_MINS) }))
}

// =============================================================================
// KSRTC
// =============================================================================

#[derive(Debug, Serialize)]
pub struct SelectedKsrtcRoute {
    pub route: KsrtcRouteView,
    pub departures: [&'static str; 4],
}

/// `GET /api/ksrtc/routes?from=&to=&class=`
pub async fn ksrtc_routes(
    Lang(locale): Lang,
    Query(search): Query<RouteSearch>,
) -> Result<Json<Vec<KsrtcRouteView>>, ApiError> {
    let class = match search.class.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => Some(BusClass::parse(raw).ok_or_else(|| ApiError::bad_request(locale))?),
        None => None,
    };
    let routes = catalog::search_ksrtc(&search.from, &search.to, class);
    Ok(Json(routes.into_iter().map(KsrtcRouteView::from).collect()))
}

/// `GET /api/ksrtc/routes/{id}`
pub async fn ksrtc_route(Lang(locale): Lang, Path(id): Path<u32>) -> Result<Json<SelectedKsrtcRoute>, ApiError> {
    let route = catalog::find_ksrtc(id).map_err(|e| catalog_error_to_api(&e, locale))?;
    Ok(Json(SelectedKsrtcRoute { route: route.into(), departures: KSRTC_DEPARTURES }))
}

/// `GET /api/ksrtc/student-pass`
pub async fn student_pass(Lang(locale): Lang) -> Json<StudentPassInfo> {
    Json(catalog::student_pass(locale))
}

// =============================================================================
// TRACKER
// =============================================================================

#[derive(Deserialize)]
pub struct TrackerSearch {
    stop_id: Uuid,
}

/// `GET /api/ksrtc/tracker/stops`
pub async fn tracker_stops(State(state): State<AppState>, Lang(locale): Lang) -> Result<Json<Vec<BusStop>>, ApiError> {
    let stops = tracker::list_stops(&state.pool)
        .await
        .map_err(|e| tracker_error_to_api(&e, locale))?;
    Ok(Json(stops))
}

/// `POST /api/ksrtc/tracker/search`
pub async fn tracker_search(
    State(state): State<AppState>,
    Lang(locale): Lang,
    Json(body): Json<TrackerSearch>,
) -> Result<Json<Vec<BusView>>, ApiError> {
    let buses = tracker::search_buses(&state.pool, body.stop_id)
        .await
        .map_err(|e| tracker_error_to_api(&e, locale))?;
    Ok(Json(buses.into_iter().map(|b| tracker::present_bus(b, locale)).collect()))
}

/// `GET /api/tracker/routes`
pub async fn tracked_routes() -> Json<Vec<TrackedRouteView>> {
    Json(tracker::tracked_routes().iter().map(TrackedRouteView::from).collect())
}

/// `GET /api/tracker/routes/{key}` — by route id or bus number.
pub async fn tracked_route(Lang(locale): Lang, Path(key): Path<String>) -> Result<Json<TrackedRouteView>, ApiError> {
    let route = tracker::find_tracked(&key).map_err(|e| tracker_error_to_api(&e, locale))?;
    Ok(Json(route.into()))
}

// =============================================================================
// METRO
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MetroLineView {
    #[serde(flatten)]
    pub line: MetroLine,
    pub frequency: String,
}

impl From<&MetroLine> for MetroLineView {
    fn from(line: &MetroLine) -> Self {
        Self { line: *line, frequency: line.frequency_label() }
    }
}

#[derive(Debug, Serialize)]
pub struct SelectedMetroLine {
    pub line: MetroLineView,
    pub next_trains: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct StationSearch {
    #[serde(default)]
    q: String,
}

/// `GET /api/metro/lines?q=`
pub async fn metro_lines(Query(search): Query<StationSearch>) -> Json<Vec<MetroLineView>> {
    Json(catalog::find_stations(&search.q).into_iter().map(MetroLineView::from).collect())
}

/// `GET /api/metro/lines/{key}`
pub async fn metro_line(Lang(locale): Lang, Path(key): Path<String>) -> Result<Json<SelectedMetroLine>, ApiError> {
    let line = catalog::select_metro(&key).map_err(|e| catalog_error_to_api(&e, locale))?;
    Ok(Json(SelectedMetroLine { line: line.into(), next_trains: minutes(&METRO_NEXT_TRAINS_MINS) }))
}

// =============================================================================
// AUTO / TAXI
// =============================================================================

#[derive(Deserialize)]
pub struct EstimateBody {
    service_id: u32,
    distance_km: Decimal,
    #[serde(default)]
    waiting_mins: u32,
}

/// `GET /api/taxi/services`
pub async fn taxi_services() -> Json<Vec<TaxiServiceView>> {
    Json(catalog::taxi_services().iter().map(TaxiServiceView::from).collect())
}

/// `POST /api/taxi/estimate`
pub async fn taxi_estimate(Lang(locale): Lang, Json(body): Json<EstimateBody>) -> Result<Json<FareEstimate>, ApiError> {
    catalog::estimate_fare(body.service_id, body.distance_km, body.waiting_mins)
        .map(Json)
        .map_err(|e| catalog_error_to_api(&e, locale))
}

#[cfg(test)]
#[path = "portals_test.rs"]
mod tests;
