use super::*;

async fn body_json(resp: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be json")
}

#[tokio::test]
async fn api_error_renders_code_and_message() {
    let resp = ApiError::new(StatusCode::CONFLICT, "E_CARD_EXPIRED", "Your card has expired.").into_response();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "E_CARD_EXPIRED");
    assert_eq!(body["message"], "Your card has expired.");
}

#[tokio::test]
async fn unauthorized_is_localized() {
    let resp = ApiError::unauthorized(Locale::Kn).into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["error"], "E_UNAUTHORIZED");
    assert_eq!(body["message"], Msg::Unauthorized.text(Locale::Kn));
}

#[test]
fn helper_constructors_map_statuses() {
    assert_eq!(ApiError::forbidden(Locale::En).status, StatusCode::FORBIDDEN);
    assert_eq!(ApiError::not_found(Locale::En).status, StatusCode::NOT_FOUND);
    assert_eq!(ApiError::bad_request(Locale::En).status, StatusCode::BAD_REQUEST);
    assert_eq!(ApiError::internal(Locale::En).code, "E_INTERNAL");
}
