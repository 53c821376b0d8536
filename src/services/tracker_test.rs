use super::*;

// =============================================================================
// time arithmetic
// =============================================================================

#[test]
fn parse_hhmm_accepts_24h_clock() {
    assert_eq!(parse_hhmm("08:45"), Some(525));
    assert_eq!(parse_hhmm("00:00"), Some(0));
    assert_eq!(parse_hhmm("23:59"), Some(1439));
}

#[test]
fn parse_hhmm_rejects_garbage() {
    for bad in ["", "8", "24:00", "12:60", "ab:cd", "-1:30"] {
        assert_eq!(parse_hhmm(bad), None, "{bad:?}");
    }
}

fn stops(times: &'static [&'static str]) -> Vec<TrackedStop> {
    times.iter().map(|&t| TrackedStop { name: "x", time: t, coordinates: [0.0, 0.0] }).collect()
}

#[test]
fn trip_minutes_same_day() {
    assert_eq!(trip_minutes(&stops(&["08:00", "08:45", "09:30"])), Some(90));
}

#[test]
fn trip_minutes_crossing_midnight_adds_a_day() {
    assert_eq!(trip_minutes(&stops(&["23:30", "00:15"])), Some(45));
}

#[test]
fn trip_minutes_needs_two_stops() {
    assert_eq!(trip_minutes(&stops(&["08:00"])), None);
    assert_eq!(trip_minutes(&[]), None);
}

#[test]
fn duration_always_prints_minutes() {
    assert_eq!(format_duration(90), "1h 30m");
    assert_eq!(format_duration(45), "0h 45m");
    assert_eq!(format_duration(120), "2h 0m");
}

#[test]
fn occupancy_rounds_to_nearest_percent() {
    assert_eq!(occupancy_percent(22, 36), 61);
    assert_eq!(occupancy_percent(28, 42), 67);
    assert_eq!(occupancy_percent(0, 0), 100);
}

// =============================================================================
// tracked routes
// =============================================================================

#[test]
fn lookup_by_id_or_bus_number() {
    assert_eq!(find_tracked("route-2").unwrap().bus_number, "KA-01-F-5678");
    assert_eq!(find_tracked("ka-01-f-1234").unwrap().id, "route-1");
    assert!(matches!(find_tracked("route-9"), Err(TrackerError::RouteNotFound(_))));
}

#[test]
fn tracked_route_view_derives_figures() {
    let view = TrackedRouteView::from(find_tracked("route-1").unwrap());
    assert_eq!(view.seats_available, 14);
    assert_eq!(view.travel_time, "1h 30m");

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["type"], "AC Sleeper");
    assert_eq!(json["stops"][1]["name"], "Silk Board");
    assert_eq!(json["stops"][2]["coordinates"][0], 77.6702);
}

#[test]
fn both_routes_take_ninety_minutes() {
    for route in tracked_routes() {
        assert_eq!(TrackedRouteView::from(route).travel_time, "1h 30m", "{}", route.id);
    }
}

// =============================================================================
// bus presentation
// =============================================================================

fn bus(route: Option<&str>, status: &str) -> BusInfo {
    BusInfo {
        id: Uuid::nil(),
        bus_number: "KA-09-F-4410".into(),
        bus_type: "Rajahamsa Executive".into(),
        capacity: 39,
        route: route.map(str::to_owned),
        status: status.into(),
    }
}

#[test]
fn missing_route_gets_localized_placeholder() {
    assert_eq!(present_bus(bus(None, "active"), Locale::En).route_label, "Route info not available");
    assert_eq!(present_bus(bus(None, "active"), Locale::Kn).route_label, "ಮಾರ್ಗ ಮಾಹಿತಿ ಲಭ್ಯವಿಲ್ಲ");
    assert_eq!(present_bus(bus(Some("Bangalore to Mysore"), "active"), Locale::En).route_label, "Bangalore to Mysore");
}

#[test]
fn status_label_follows_status() {
    assert_eq!(present_bus(bus(None, "active"), Locale::Kn).status_label, "ಸಕ್ರಿಯ");
    assert_eq!(present_bus(bus(None, "inactive"), Locale::En).status_label, "Inactive");
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::db::test_support::integration_pool;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn stops_are_sorted_and_search_returns_active_buses() {
        let (pool, _guard) = integration_pool().await;
        let stops = list_stops(&pool).await.expect("stops");
        assert!(stops.len() >= 6);
        assert!(stops.windows(2).all(|w| w[0].name <= w[1].name));

        let buses = search_buses(&pool, stops[0].id).await.expect("buses");
        assert_eq!(buses.len(), 5);
        assert!(buses.iter().all(|b| b.status == "active"));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn unknown_stop_is_not_found() {
        let (pool, _guard) = integration_pool().await;
        let result = search_buses(&pool, Uuid::new_v4()).await;
        assert!(matches!(result, Err(TrackerError::StopNotFound(_))));
    }
}
