use super::*;
use super::test_client::{get, json_body, post_json, router, send};
use axum::body::Body;
use axum::http::header::LOCATION;
use serde_json::json;

fn parts(uri: &str, accept_language: Option<&str>) -> Parts {
    let mut builder = axum::http::Request::builder().uri(uri);
    if let Some(value) = accept_language {
        builder = builder.header(ACCEPT_LANGUAGE, value);
    }
    builder.body(()).expect("request").into_parts().0
}

// =============================================================================
// locale_from_parts
// =============================================================================

#[test]
fn query_param_wins_over_header() {
    assert_eq!(locale_from_parts(&parts("/api/live-status?lang=kn", Some("en-IN"))), Locale::Kn);
    assert_eq!(locale_from_parts(&parts("/api/live-status?lang=en", Some("kn-IN"))), Locale::En);
}

#[test]
fn header_used_when_query_missing_or_unknown() {
    assert_eq!(locale_from_parts(&parts("/", Some("kn-IN,kn;q=0.9,en;q=0.8"))), Locale::Kn);
    assert_eq!(locale_from_parts(&parts("/?lang=fr", Some("kn"))), Locale::Kn);
}

#[test]
fn defaults_to_english() {
    assert_eq!(locale_from_parts(&parts("/", None)), Locale::En);
    assert_eq!(locale_from_parts(&parts("/?lang=", Some("fr-FR"))), Locale::En);
}

// =============================================================================
// router
// =============================================================================

#[tokio::test]
async fn healthz_returns_ok() {
    let resp = send(router(), get("/healthz")).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn live_status_lists_four_services() {
    let (status, body) = json_body(send(router(), get("/api/live-status")).await).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().expect("array");
    assert_eq!(items.len(), 4);
    assert_eq!(items[2]["name"], "KSRTC Buses");
    assert_eq!(items[2]["status"], "delayed");
}

#[tokio::test]
async fn live_status_in_kannada() {
    let (_, body) = json_body(send(router(), get("/api/live-status?lang=kn")).await).await;
    assert_eq!(body[1]["name"], "ನಮ್ಮ ಮೆಟ್ರೋ");
}

#[tokio::test]
async fn emergency_acknowledges_with_or_without_location() {
    let (status, body) =
        json_body(send(router(), post_json("/api/emergency", &json!({ "location": "Majestic" }))).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Emergency services will contact you shortly");

    let bare = axum::http::Request::builder()
        .method("POST")
        .uri("/api/emergency")
        .body(Body::empty())
        .expect("request");
    let resp = send(router(), bare).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn card_page_redirects_to_sign_in_without_session() {
    let resp = send(router(), get("/card")).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/auth");
}

#[tokio::test]
async fn employee_portal_redirects_to_staff_login() {
    let resp = send(router(), get("/employee-portal")).await;
    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(resp.headers()[LOCATION], "/employee-login");
}

#[tokio::test]
async fn unknown_api_method_is_rejected() {
    let resp = send(router(), get("/api/emergency")).await;
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
