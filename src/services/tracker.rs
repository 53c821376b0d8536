//! Bus tracking: stop/bus lookup from the database and two fixed tracked
//! routes with stop times and coordinates.

use serde::Serialize;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::ErrorCode;
use crate::locale::Locale;

const MAX_BUSES_PER_SEARCH: i64 = 5;
const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("bus stop {0} not found")]
    StopNotFound(Uuid),
    #[error("tracked route {0} not found")]
    RouteNotFound(String),
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl ErrorCode for TrackerError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StopNotFound(_) => "E_STOP_NOT_FOUND",
            Self::RouteNotFound(_) => "E_ROUTE_NOT_FOUND",
            Self::Db(_) => "E_DATABASE",
        }
    }
}

// =============================================================================
// STOPS AND BUSES
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct BusStop {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BusInfo {
    pub id: Uuid,
    pub bus_number: String,
    #[serde(rename = "type")]
    pub bus_type: String,
    pub capacity: i32,
    pub route: Option<String>,
    pub status: String,
}

/// A bus as shown in the tracker list.
#[derive(Debug, Clone, Serialize)]
pub struct BusView {
    #[serde(flatten)]
    pub bus: BusInfo,
    pub route_label: String,
    pub status_label: &'static str,
}

#[must_use]
pub fn present_bus(bus: BusInfo, locale: Locale) -> BusView {
    let route_label = bus
        .route
        .clone()
        .unwrap_or_else(|| locale.pick("Route info not available", "ಮಾರ್ಗ ಮಾಹಿತಿ ಲಭ್ಯವಿಲ್ಲ").to_owned());
    let status_label = if bus.status == "active" {
        locale.pick("Active", "ಸಕ್ರಿಯ")
    } else {
        locale.pick("Inactive", "ನಿಷ್ಕ್ರಿಯ")
    };
    BusView { bus, route_label, status_label }
}

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_stops(pool: &PgPool) -> Result<Vec<BusStop>, TrackerError> {
    let rows = sqlx::query("SELECT id, name, location FROM bus_stops ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .iter()
        .map(|r| BusStop { id: r.get("id"), name: r.get("name"), location: r.get("location") })
        .collect())
}

/// Active buses for a stop. Buses are not linked to stops, so any known stop
/// returns the same first five active buses.
///
/// # Errors
///
/// `StopNotFound` for unknown stops, or a database error.
pub async fn search_buses(pool: &PgPool, stop_id: Uuid) -> Result<Vec<BusInfo>, TrackerError> {
    let stop = sqlx::query("SELECT 1 FROM bus_stops WHERE id = $1")
        .bind(stop_id)
        .fetch_optional(pool)
        .await?;
    if stop.is_none() {
        return Err(TrackerError::StopNotFound(stop_id));
    }

    let rows = sqlx::query(
        r"SELECT id, bus_number, type, capacity, route, status
          FROM buses
          WHERE status = 'active'
          ORDER BY bus_number
          LIMIT $1",
    )
    .bind(MAX_BUSES_PER_SEARCH)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|r| BusInfo {
            id: r.get("id"),
            bus_number: r.get("bus_number"),
            bus_type: r.get("type"),
            capacity: r.get("capacity"),
            route: r.get("route"),
            status: r.get("status"),
        })
        .collect())
}

// =============================================================================
// TRACKED ROUTES
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackedStop {
    pub name: &'static str,
    /// `HH:MM`, 24-hour.
    pub time: &'static str,
    /// `[longitude, latitude]`
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TrackedRoute {
    pub id: &'static str,
    pub bus_number: &'static str,
    pub capacity: u32,
    pub seats_filled: u32,
    #[serde(rename = "type")]
    pub bus_type: &'static str,
    pub category: &'static str,
    pub stops: &'static [TrackedStop],
    pub travel_guide: &'static str,
}

const TRACKED_ROUTES: [TrackedRoute; 2] = [
    TrackedRoute {
        id: "route-1",
        bus_number: "KA-01-F-1234",
        capacity: 36,
        seats_filled: 22,
        bus_type: "AC Sleeper",
        category: "Express",
        stops: &[
            TrackedStop { name: "Majestic", time: "08:00", coordinates: [77.5732, 12.9766] },
            TrackedStop { name: "Silk Board", time: "08:45", coordinates: [77.6226, 12.9173] },
            TrackedStop { name: "Electronic City", time: "09:30", coordinates: [77.6702, 12.8455] },
        ],
        travel_guide: "Student discount available with valid ID.",
    },
    TrackedRoute {
        id: "route-2",
        bus_number: "KA-01-F-5678",
        capacity: 42,
        seats_filled: 28,
        bus_type: "Non-AC Seater",
        category: "Ordinary",
        stops: &[
            TrackedStop { name: "Majestic", time: "09:15", coordinates: [77.5732, 12.9766] },
            TrackedStop { name: "Hebbal", time: "10:00", coordinates: [77.5952, 13.0355] },
            TrackedStop { name: "Airport", time: "10:45", coordinates: [77.7085, 13.1989] },
        ],
        travel_guide: "Government employee concession available.",
    },
];

#[must_use]
pub fn tracked_routes() -> &'static [TrackedRoute] {
    &TRACKED_ROUTES
}

/// Look up by route id or bus number.
///
/// # Errors
///
/// `RouteNotFound` for unknown keys.
pub fn find_tracked(key: &str) -> Result<&'static TrackedRoute, TrackerError> {
    let key = key.trim();
    TRACKED_ROUTES
        .iter()
        .find(|r| r.id == key || r.bus_number.eq_ignore_ascii_case(key))
        .ok_or_else(|| TrackerError::RouteNotFound(key.to_owned()))
}

/// Minutes since midnight for `HH:MM`.
#[must_use]
pub fn parse_hhmm(raw: &str) -> Option<u32> {
    let (h, m) = raw.trim().split_once(':')?;
    let (h, m): (u32, u32) = (h.parse().ok()?, m.parse().ok()?);
    (h < 24 && m < 60).then_some(h * 60 + m)
}

/// Minutes from the first to the last stop; a negative span crossed midnight.
#[must_use]
pub fn trip_minutes(stops: &[TrackedStop]) -> Option<u32> {
    let (first, last) = (stops.first()?, stops.last()?);
    if stops.len() < 2 {
        return None;
    }
    let (start, end) = (parse_hhmm(first.time)?, parse_hhmm(last.time)?);
    Some((end + MINUTES_PER_DAY - start) % MINUTES_PER_DAY)
}

/// `1h 30m`; minutes are always printed.
#[must_use]
pub fn format_duration(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Rounded to the nearest whole percent; zero capacity reads as full.
#[must_use]
pub fn occupancy_percent(seats_filled: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 100;
    }
    (seats_filled * 100 + capacity / 2) / capacity
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedRouteView {
    #[serde(flatten)]
    pub route: TrackedRoute,
    pub seats_available: u32,
    pub occupancy_percent: u32,
    /// `N/A` when the route has fewer than two stops.
    pub travel_time: String,
}

impl From<&TrackedRoute> for TrackedRouteView {
    fn from(route: &TrackedRoute) -> Self {
        Self {
            route: *route,
            seats_available: route.capacity.saturating_sub(route.seats_filled),
            occupancy_percent: occupancy_percent(route.seats_filled, route.capacity),
            travel_time: trip_minutes(route.stops).map_or_else(|| "N/A".to_owned(), format_duration),
        }
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
