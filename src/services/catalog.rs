//! Static portal data: BMTC, KSRTC, Namma Metro and auto/taxi.
//!
//! DESIGN
//! ======
//! Routes, lines and tariffs are compile-time tables. Searches are pure
//! functions over those tables, so the portal handlers never touch the
//! database. Display strings (`₹75`, `10 mins`) are derived from the numeric
//! fields, keeping arithmetic such as fare estimates on real numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::locale::{Locale, format_inr};

/// Minutes until the next three buses on a selected BMTC route.
pub const BMTC_NEXT_ARRIVALS_MINS: [u32; 3] = [5, 15, 25];
/// Today's departures for a selected KSRTC route.
pub const KSRTC_DEPARTURES: [&str; 4] = ["10:30 AM", "12:45 PM", "3:00 PM", "7:30 PM"];
/// Minutes until the next three trains on a running metro line.
pub const METRO_NEXT_TRAINS_MINS: [u32; 3] = [3, 10, 17];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error("line {0} is under construction")]
    UnderConstruction(&'static str),
    #[error("service {0} is not metered")]
    NotMetered(&'static str),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
}

impl ErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::UnderConstruction(_) => "E_LINE_UNDER_CONSTRUCTION",
            Self::NotMetered(_) => "E_NOT_METERED",
            Self::InvalidInput(_) => "E_INVALID_INPUT",
        }
    }
}

// =============================================================================
// SEARCH HELPERS
// =============================================================================

/// Trimmed, case-insensitive substring match. An empty query matches all.
#[must_use]
pub fn matches(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Split `"Majestic to Whitefield"` into its two ends.
#[must_use]
pub fn split_route(name: &str) -> Option<(&str, &str)> {
    name.split_once(" to ")
}

/// Match start and destination independently against each end of a route.
#[must_use]
pub fn route_matches(name: &str, from: &str, to: &str) -> bool {
    match split_route(name) {
        Some((start, end)) => matches(start, from) && matches(end, to),
        None => matches(name, from) && matches(name, to),
    }
}

fn rupees(amount: u32) -> String {
    format_inr(Decimal::from(amount), 0)
}

// =============================================================================
// BMTC
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BmtcRoute {
    pub id: u32,
    pub number: &'static str,
    pub name: &'static str,
    pub frequency_mins: u32,
    pub fare: u32,
}

const BMTC_ROUTES: [BmtcRoute; 4] = [
    BmtcRoute { id: 1, number: "500D", name: "Majestic to Whitefield", frequency_mins: 10, fare: 75 },
    BmtcRoute { id: 2, number: "368", name: "KR Market to HSR Layout", frequency_mins: 15, fare: 60 },
    BmtcRoute { id: 3, number: "356CW", name: "Shivajinagar to Electronic City", frequency_mins: 12, fare: 85 },
    BmtcRoute { id: 4, number: "501D", name: "Banashankari to ITPL", frequency_mins: 20, fare: 90 },
];

#[derive(Debug, Clone, Serialize)]
pub struct BmtcRouteView {
    #[serde(flatten)]
    pub route: BmtcRoute,
    pub frequency: String,
    pub fare_label: String,
}

impl From<&BmtcRoute> for BmtcRouteView {
    fn from(route: &BmtcRoute) -> Self {
        Self { route: *route, frequency: format!("{} mins", route.frequency_mins), fare_label: rupees(route.fare) }
    }
}

#[must_use]
pub fn bmtc_routes() -> &'static [BmtcRoute] {
    &BMTC_ROUTES
}

#[must_use]
pub fn search_bmtc(from: &str, to: &str) -> Vec<&'static BmtcRoute> {
    bmtc_routes().iter().filter(|r| route_matches(r.name, from, to)).collect()
}

/// Look up by numeric id or route number (`500d` matches `500D`).
///
/// # Errors
///
/// `NotFound` for unknown keys.
pub fn find_bmtc(key: &str) -> Result<&'static BmtcRoute, CatalogError> {
    let key = key.trim();
    BMTC_ROUTES
        .iter()
        .find(|r| r.id.to_string() == key || r.number.eq_ignore_ascii_case(key))
        .ok_or_else(|| CatalogError::NotFound(key.to_owned()))
}

// =============================================================================
// KSRTC
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusClass {
    Ac,
    NonAc,
    Sleeper,
    Luxury,
}

impl BusClass {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ac" => Some(Self::Ac),
            "nonac" | "non-ac" => Some(Self::NonAc),
            "sleeper" => Some(Self::Sleeper),
            "luxury" => Some(Self::Luxury),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct KsrtcRoute {
    pub id: u32,
    pub name: &'static str,
    pub bus_type: &'static str,
    pub fare: u32,
    pub duration: &'static str,
    pub classes: &'static [BusClass],
}

const KSRTC_ROUTES: [KsrtcRoute; 4] = [
    KsrtcRoute {
        id: 1,
        name: "Bangalore to Mysore",
        bus_type: "Airavat Club Class",
        fare: 320,
        duration: "3h 30m",
        classes: &[BusClass::Ac, BusClass::Luxury],
    },
    KsrtcRoute {
        id: 2,
        name: "Bangalore to Mangalore",
        bus_type: "Airavat Sleeper",
        fare: 950,
        duration: "8h",
        classes: &[BusClass::Ac, BusClass::Sleeper, BusClass::Luxury],
    },
    KsrtcRoute {
        id: 3,
        name: "Bangalore to Hubli",
        bus_type: "Non-AC Sleeper",
        fare: 780,
        duration: "7h 30m",
        classes: &[BusClass::NonAc, BusClass::Sleeper],
    },
    KsrtcRoute {
        id: 4,
        name: "Bangalore to Belgaum",
        bus_type: "Karnataka Sarige",
        fare: 650,
        duration: "10h",
        classes: &[BusClass::NonAc],
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct KsrtcRouteView {
    #[serde(flatten)]
    pub route: KsrtcRoute,
    pub fare_label: String,
}

impl From<&KsrtcRoute> for KsrtcRouteView {
    fn from(route: &KsrtcRoute) -> Self {
        Self { route: *route, fare_label: rupees(route.fare) }
    }
}

#[must_use]
pub fn ksrtc_routes() -> &'static [KsrtcRoute] {
    &KSRTC_ROUTES
}

#[must_use]
pub fn search_ksrtc(from: &str, to: &str, class: Option<BusClass>) -> Vec<&'static KsrtcRoute> {
    ksrtc_routes()
        .iter()
        .filter(|r| route_matches(r.name, from, to))
        .filter(|r| class.is_none_or(|c| r.classes.contains(&c)))
        .collect()
}

/// # Errors
///
/// `NotFound` for unknown ids.
pub fn find_ksrtc(id: u32) -> Result<&'static KsrtcRoute, CatalogError> {
    KSRTC_ROUTES
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| CatalogError::NotFound(id.to_string()))
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentPassInfo {
    pub title: &'static str,
    pub eligibility: &'static [&'static str],
    pub documents: &'static [&'static str],
    pub process: &'static [&'static str],
    pub benefits: &'static [&'static str],
    pub note: &'static str,
}

#[must_use]
pub fn student_pass(locale: Locale) -> StudentPassInfo {
    match locale {
        Locale::En => StudentPassInfo {
            title: "Student Bus Pass Information",
            eligibility: &[
                "Residents of Karnataka State",
                "Students of recognized educational institutions",
                "From 10th standard to graduation level",
                "Age between 15 to 25 years",
            ],
            documents: &[
                "School/College Identity Card",
                "Student Certificate",
                "Aadhar Card",
                "Residence Certificate",
                "Passport size photos (2 copies)",
            ],
            process: &[
                "Submit online application",
                "Upload required documents",
                "Make payment",
                "Wait for verification",
                "Collect the pass",
            ],
            benefits: &[
                "50% discount on all KSRTC buses",
                "Monthly pass or annual pass option",
                "Easy renewal process",
                "Valid on all routes",
            ],
            note: "For more information, visit the official KSRTC website or visit the nearest KSRTC office.",
        },
        Locale::Kn => StudentPassInfo {
            title: "ವಿದ್ಯಾರ್ಥಿ ಬಸ್ ಪಾಸ್ ಮಾಹಿತಿ",
            eligibility: &[
                "ಕರ್ನಾಟಕ ರಾಜ್ಯದ ನಿವಾಸಿಗಳು",
                "ಮಾನ್ಯತೆ ಪ್ರಾಪ್ತ ಶಿಕ್ಷಣ ಸಂಸ್ಥೆಯಲ್ಲಿ ಅಧ್ಯಯನ ಮಾಡುತ್ತಿರುವವರು",
                "10ನೇ ತರಗತಿಯಿಂದ ಪದವಿ ಮಟ್ಟದವರೆಗೆ",
                "ವಯಸ್ಸು 15 ರಿಂದ 25 ವರ್ಷಗಳವರೆಗೆ",
            ],
            documents: &[
                "ಶಾಲೆ/ಕಾಲೇಜು ಗುರುತಿನ ಚೀಟಿ",
                "ವಿದ್ಯಾರ್ಥಿ ಪ್ರಮಾಣಪತ್ರ",
                "ಆಧಾರ್ ಕಾರ್ಡ್",
                "ನಿವಾಸ ಪ್ರಮಾಣಪತ್ರ",
                "ಪಾಸ್‌ಪೋರ್ಟ್ ಗಾತ್ರದ ಫೋಟೋ (2 ಪ್ರತಿಗಳು)",
            ],
            process: &[
                "ಆನ್‌ಲೈನ್ ಅರ್ಜಿ ಸಲ್ಲಿಸಿ",
                "ಅಗತ್ಯ ದಾಖಲೆಗಳನ್ನು ಅಪ್‌ಲೋಡ್ ಮಾಡಿ",
                "ಶುಲ್ಕ ಪಾವತಿ ಮಾಡಿ",
                "ದೃಢೀಕರಣಕ್ಕಾಗಿ ಕಾಯಿರಿ",
                "ಪಾಸ್ ಸಂಗ್ರಹಿಸಿ",
            ],
            benefits: &[
                "50% ರಿಯಾಯಿತಿ ಎಲ್ಲಾ KSRTC ಬಸ್‌ಗಳಲ್ಲಿ",
                "ಮಾಸಿಕ ಪಾಸ್ ಅಥವಾ ವಾರ್ಷಿಕ ಪಾಸ್ ಆಯ್ಕೆ",
                "ಸುಲಭ ನವೀಕರಣ ಪ್ರಕ್ರಿಯೆ",
                "ಎಲ್ಲಾ ಮಾರ್ಗಗಳಲ್ಲಿ ಮಾನ್ಯ",
            ],
            note: "ಹೆಚ್ಚಿನ ಮಾಹಿತಿಗಾಗಿ KSRTC ಅಧಿಕೃತ ವೆಬ್‌ಸೈಟ್ ಭೇಟಿ ನೀಡಿ ಅಥವಾ ಹತ್ತಿರದ KSRTC ಕಛೇರಿಗೆ ಭೇಟಿ ನೀಡಿ।",
        },
    }
}

// =============================================================================
// NAMMA METRO
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStatus {
    Normal,
    #[serde(rename = "Minor Delay")]
    MinorDelay,
    #[serde(rename = "Under Construction")]
    UnderConstruction,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetroLine {
    pub id: u32,
    pub name: &'static str,
    pub stations: &'static str,
    pub status: LineStatus,
    pub frequency_mins: Option<u32>,
}

impl MetroLine {
    #[must_use]
    pub fn frequency_label(&self) -> String {
        self.frequency_mins.map_or_else(|| "N/A".to_owned(), |m| format!("{m} mins"))
    }
}

const METRO_LINES: [MetroLine; 4] = [
    MetroLine {
        id: 1,
        name: "Purple Line",
        stations: "Baiyappanahalli to Kengeri",
        status: LineStatus::Normal,
        frequency_mins: Some(7),
    },
    MetroLine {
        id: 2,
        name: "Green Line",
        stations: "Nagasandra to Silk Institute",
        status: LineStatus::Normal,
        frequency_mins: Some(8),
    },
    MetroLine {
        id: 3,
        name: "Yellow Line",
        stations: "RV Road to Bommasandra",
        status: LineStatus::UnderConstruction,
        frequency_mins: None,
    },
    MetroLine {
        id: 4,
        name: "Pink Line",
        stations: "Kalena Agrahara to Nagawara",
        status: LineStatus::UnderConstruction,
        frequency_mins: None,
    },
];

#[must_use]
pub fn metro_lines() -> &'static [MetroLine] {
    &METRO_LINES
}

/// Lines whose name or either terminus matches `query`.
#[must_use]
pub fn find_stations(query: &str) -> Vec<&'static MetroLine> {
    metro_lines()
        .iter()
        .filter(|line| {
            let (a, b) = split_route(line.stations).unwrap_or((line.stations, line.stations));
            matches(line.name, query) || matches(a, query) || matches(b, query)
        })
        .collect()
}

/// Select a line by id or name (`purple`, `Purple Line`).
///
/// # Errors
///
/// `NotFound` for unknown lines, `UnderConstruction` for lines not running.
pub fn select_metro(key: &str) -> Result<&'static MetroLine, CatalogError> {
    let key = key.trim().to_lowercase();
    let line = METRO_LINES
        .iter()
        .find(|l| {
            let name = l.name.to_lowercase();
            l.id.to_string() == key || name == key || name.strip_suffix(" line") == Some(key.as_str())
        })
        .ok_or_else(|| CatalogError::NotFound(key.clone()))?;
    if line.status == LineStatus::UnderConstruction {
        return Err(CatalogError::UnderConstruction(line.name));
    }
    Ok(line)
}

// =============================================================================
// AUTO / TAXI
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Tariff {
    Metered { base: u32, per_km: u32, per_waiting_min: u32 },
    DayRate { min: u32, max: u32 },
    Custom,
}

impl Tariff {
    #[must_use]
    pub fn base_label(&self) -> String {
        match *self {
            Self::Metered { base, per_km, .. } => format!("{} + {}/km", rupees(base), rupees(per_km)),
            Self::DayRate { min, max } => format!("{}-{}/day", rupees(min), rupees(max)),
            Self::Custom => "Custom packages".to_owned(),
        }
    }

    #[must_use]
    pub fn waiting_label(&self) -> String {
        match *self {
            Self::Metered { per_waiting_min, .. } => format!("{}/min", rupees(per_waiting_min)),
            Self::DayRate { .. } | Self::Custom => "N/A".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TaxiService {
    pub id: u32,
    pub name: &'static str,
    pub icon: &'static str,
    pub tariff: Tariff,
}

const TAXI_SERVICES: [TaxiService; 4] = [
    TaxiService {
        id: 1,
        name: "City Rides",
        icon: "🏙️",
        tariff: Tariff::Metered { base: 30, per_km: 15, per_waiting_min: 1 },
    },
    TaxiService {
        id: 2,
        name: "Airport Transfers",
        icon: "✈️",
        tariff: Tariff::Metered { base: 300, per_km: 20, per_waiting_min: 2 },
    },
    TaxiService { id: 3, name: "Outstation Trips", icon: "🚗", tariff: Tariff::DayRate { min: 2000, max: 4000 } },
    TaxiService { id: 4, name: "Package Tours", icon: "🏞️", tariff: Tariff::Custom },
];

#[derive(Debug, Clone, Serialize)]
pub struct TaxiServiceView {
    #[serde(flatten)]
    pub service: TaxiService,
    pub base_price: String,
    pub waiting_time: String,
}

impl From<&TaxiService> for TaxiServiceView {
    fn from(service: &TaxiService) -> Self {
        Self {
            service: *service,
            base_price: service.tariff.base_label(),
            waiting_time: service.tariff.waiting_label(),
        }
    }
}

#[must_use]
pub fn taxi_services() -> &'static [TaxiService] {
    &TAXI_SERVICES
}

#[derive(Debug, Clone, Serialize)]
pub struct FareEstimate {
    pub service_id: u32,
    pub distance_km: Decimal,
    pub waiting_mins: u32,
    pub total: Decimal,
    pub total_label: String,
}

/// `base + per_km × km + per_waiting_min × minutes`, rounded to paise.
///
/// # Errors
///
/// `NotFound` for unknown services, `NotMetered` for day-rate and custom
/// tariffs, `InvalidInput` for a negative distance or one too large to price.
pub fn estimate_fare(service_id: u32, distance_km: Decimal, waiting_mins: u32) -> Result<FareEstimate, CatalogError> {
    if distance_km.is_sign_negative() && !distance_km.is_zero() {
        return Err(CatalogError::InvalidInput("distance_km"));
    }
    let service = TAXI_SERVICES
        .iter()
        .find(|s| s.id == service_id)
        .ok_or_else(|| CatalogError::NotFound(service_id.to_string()))?;
    let Tariff::Metered { base, per_km, per_waiting_min } = service.tariff else {
        return Err(CatalogError::NotMetered(service.name));
    };

    let total = Decimal::from(per_km)
        .checked_mul(distance_km)
        .and_then(|d| d.checked_add(Decimal::from(base)))
        .and_then(|d| d.checked_add(Decimal::from(per_waiting_min) * Decimal::from(waiting_mins)))
        .ok_or(CatalogError::InvalidInput("distance_km"))?
        .round_dp(2);
    let digits = if total.fract().is_zero() { 0 } else { 2 };

    Ok(FareEstimate { service_id, distance_km, waiting_mins, total, total_label: format_inr(total, digits) })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
