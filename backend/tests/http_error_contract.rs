//! Contract tests for the HTTP error payload and status-code mapping.
//!
//! Every failure must produce the JSON envelope `{code, message, traceId,
//! details}` with a stable machine-readable code, and the trace id must match
//! the `trace-id` response header set by the middleware.

use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use backend::test_support::{fixture_app, login_cookie, seeded_store};
use rstest::rstest;
use serde_json::{Value, json};

#[actix_web::test]
async fn unauthenticated_writes_are_unauthorized() {
    let (store, _) = seeded_store(&["ada"]);
    let app = actix_test::init_service(fixture_app(&store)).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/events")
        .set_json(json!({
            "title": "No session",
            "startTime": "2030-06-01T18:00:00Z",
            "endTime": "2030-06-01T20:00:00Z",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "unauthorized");
    assert_eq!(body["message"], "login required");
}

#[rstest]
#[case("/api/v1/events/not-a-uuid", StatusCode::BAD_REQUEST, "invalid_request")]
#[case(
    "/api/v1/events/00000000-0000-4000-8000-000000000000",
    StatusCode::NOT_FOUND,
    "not_found"
)]
#[actix_web::test]
async fn event_lookup_failures_map_to_stable_codes(
    #[case] uri: &str,
    #[case] status: StatusCode,
    #[case] code: &str,
) {
    let (store, _) = seeded_store(&["ada"]);
    let app = actix_test::init_service(fixture_app(&store)).await;
    let cookie = login_cookie(&app, "ada", "password").await;

    let request = actix_test::TestRequest::get()
        .uri(uri)
        .cookie(cookie)
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), status);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], code);
}

#[actix_web::test]
async fn error_trace_id_matches_the_response_header() {
    let (store, _) = seeded_store(&["ada"]);
    let app = actix_test::init_service(fixture_app(&store)).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/me")
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let header = response
        .headers()
        .get("trace-id")
        .expect("trace header present")
        .to_str()
        .expect("ascii header")
        .to_owned();
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["traceId"], Value::String(header));
}

#[actix_web::test]
async fn validation_failures_carry_field_details() {
    let (store, _) = seeded_store(&["ada"]);
    let app = actix_test::init_service(fixture_app(&store)).await;
    let cookie = login_cookie(&app, "ada", "password").await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/events")
        .cookie(cookie)
        .set_json(json!({
            "title": "Bad clock",
            "startTime": "2030-06-01T20:00:00Z",
            "endTime": "yesterday",
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["details"]["field"], "endTime");
    assert_eq!(body["details"]["code"], "invalid_timestamp");
}
