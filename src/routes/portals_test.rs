use super::*;
use crate::routes::test_client::{get, json_body, post_json, router, send};
use serde_json::json;

// =============================================================================
// BMTC
// =============================================================================

#[tokio::test]
async fn bmtc_search_matches_each_end() {
    let (status, body) = json_body(send(router(), get("/api/bmtc/routes?from=majestic&to=white")).await).await;
    assert_eq!(status, StatusCode::OK);
    let routes = body.as_array().expect("array");
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["number"], "500D");
    assert_eq!(routes[0]["fare_label"], "₹75");
    assert_eq!(routes[0]["frequency"], "10 mins");
}

#[tokio::test]
async fn bmtc_listing_without_filters_returns_all() {
    let (_, body) = json_body(send(router(), get("/api/bmtc/routes")).await).await;
    assert_eq!(body.as_array().map(Vec::len), Some(catalog::bmtc_routes().len()));
}

#[tokio::test]
async fn bmtc_selection_lists_next_arrivals() {
    let (status, body) = json_body(send(router(), get("/api/bmtc/routes/500d")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["route"]["name"], "Majestic to Whitefield");
    assert_eq!(body["next_arrivals"], json!(["5 mins", "15 mins", "25 mins"]));
}

#[tokio::test]
async fn unknown_bmtc_route_is_not_found() {
    let (status, body) = json_body(send(router(), get("/api/bmtc/routes/999Z")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "E_NOT_FOUND");
}

// =============================================================================
// KSRTC
// =============================================================================

#[tokio::test]
async fn ksrtc_class_filter() {
    let (status, body) = json_body(send(router(), get("/api/ksrtc/routes?class=nonac")).await).await;
    assert_eq!(status, StatusCode::OK);
    let routes = body.as_array().expect("array");
    assert!(!routes.is_empty());
    assert!(routes.iter().all(|r| r["classes"].as_array().is_some_and(|c| c.contains(&json!("nonac")))));
}

#[tokio::test]
async fn ksrtc_unknown_class_is_bad_request() {
    let (status, _) = json_body(send(router(), get("/api/ksrtc/routes?class=helicopter")).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn ksrtc_selection_lists_departures() {
    let (status, body) = json_body(send(router(), get("/api/ksrtc/routes/1")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["departures"], json!(["10:30 AM", "12:45 PM", "3:00 PM", "7:30 PM"]));
}

#[tokio::test]
async fn student_pass_follows_language() {
    let (_, en) = json_body(send(router(), get("/api/ksrtc/student-pass")).await).await;
    assert_eq!(en["title"], "Student Bus Pass Information");
    let (_, kn) = json_body(send(router(), get("/api/ksrtc/student-pass?lang=kn")).await).await;
    assert_eq!(kn["title"], catalog::student_pass(Locale::Kn).title);
}

// =============================================================================
// tracker
// =============================================================================

#[tokio::test]
async fn tracked_routes_report_occupancy_and_duration() {
    let (status, body) = json_body(send(router(), get("/api/tracker/routes")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["seats_available"], 14);
    assert_eq!(body[0]["travel_time"], "1h 30m");
}

#[tokio::test]
async fn tracked_route_by_bus_number() {
    let (status, body) = json_body(send(router(), get("/api/tracker/routes/ka-01-f-5678")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "route-2");

    let (status, body) = json_body(send(router(), get("/api/tracker/routes/route-9")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "E_ROUTE_NOT_FOUND");
}

#[tokio::test]
async fn tracker_search_rejects_non_uuid_stop() {
    let resp = send(router(), post_json("/api/ksrtc/tracker/search", &json!({ "stop_id": "majestic" }))).await;
    assert!(resp.status().is_client_error());
}

// =============================================================================
// metro
// =============================================================================

#[tokio::test]
async fn station_finder_matches_termini() {
    let (_, body) = json_body(send(router(), get("/api/metro/lines?q=kengeri")).await).await;
    let lines = body.as_array().expect("array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["name"], "Purple Line");
    assert_eq!(lines[0]["frequency"], "7 mins");
}

#[tokio::test]
async fn running_line_lists_next_trains() {
    let (status, body) = json_body(send(router(), get("/api/metro/lines/purple")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_trains"], json!(["3 mins", "10 mins", "17 mins"]));
}

#[tokio::test]
async fn line_under_construction_conflicts() {
    let (status, body) = json_body(send(router(), get("/api/metro/lines/yellow")).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "E_LINE_UNDER_CONSTRUCTION");
}

// =============================================================================
// taxi
// =============================================================================

#[tokio::test]
async fn taxi_services_carry_tariff_labels() {
    let (_, body) = json_body(send(router(), get("/api/taxi/services")).await).await;
    assert_eq!(body[0]["base_price"], "₹30 + ₹15/km");
    assert_eq!(body[0]["waiting_time"], "₹1/min");
    assert_eq!(body[3]["waiting_time"], "N/A");
}

#[tokio::test]
async fn metered_estimate() {
    let req = post_json("/api/taxi/estimate", &json!({ "service_id": 1, "distance_km": "10", "waiting_mins": 5 }));
    let (status, body) = json_body(send(router(), req).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_label"], "₹185");
}

#[tokio::test]
async fn non_metered_estimate_is_unprocessable() {
    let req = post_json("/api/taxi/estimate", &json!({ "service_id": 3, "distance_km": 120 }));
    let (status, body) = json_body(send(router(), req).await).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "E_NOT_METERED");
}

#[tokio::test]
async fn oversized_distance_is_bad_request() {
    let body = json!({ "service_id": 1, "distance_km": "70000000000000000000000000000", "waiting_mins": 0 });
    let (status, body) = json_body(send(router(), post_json("/api/taxi/estimate", &body)).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "E_INVALID_INPUT");
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::config::Config;
    use crate::db::test_support::integration_pool;
    use crate::routes::test_client::router_with;

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn stop_tracker_lists_stops_and_buses() {
        let (pool, _guard) = integration_pool().await;
        let state = AppState::new(pool, Config::for_tests());

        let (status, stops) = json_body(send(router_with(state.clone()), get("/api/ksrtc/tracker/stops")).await).await;
        assert_eq!(status, StatusCode::OK);
        let stop_id = stops[0]["id"].clone();

        let req = post_json("/api/ksrtc/tracker/search", &json!({ "stop_id": stop_id }));
        let (status, buses) = json_body(send(router_with(state.clone()), req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(buses.as_array().map(Vec::len), Some(5));

        let missing = post_json("/api/ksrtc/tracker/search", &json!({ "stop_id": Uuid::nil() }));
        let (status, _) = json_body(send(router_with(state), missing).await).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
