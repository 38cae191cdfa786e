use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::{harness, FakeTransport};
use crate::email::domain::EmailPreferences;
use crate::email::router::email_router;

async fn post_json(router: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::post(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn endpoints_report_email_id() {
    let harness = harness(FakeTransport::default());
    let router = email_router(harness.service.clone());

    let (status, body) = post_json(
        router.clone(),
        "/send-order-confirmation",
        json!({"orderId": "order-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "skipped": false, "emailId": "re_1"}));

    let (status, body) = post_json(
        router,
        "/send-listing-status-email",
        json!({"submissionId": "sub-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emailId"], "re_2");
}

#[tokio::test]
async fn skipped_send_is_still_a_success() {
    let harness = harness(FakeTransport::default());
    harness.preferences.set(
        "seller-1",
        EmailPreferences {
            order_updates: false,
            listing_updates: false,
        },
    );

    let (status, body) = post_json(
        email_router(harness.service.clone()),
        "/send-seller-order-notification",
        json!({"orderId": "order-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "skipped": true}));
}

#[tokio::test]
async fn failures_map_to_status_codes() {
    let harness = harness(FakeTransport::failing(503));
    let router = email_router(harness.service.clone());

    let (status, body) = post_json(
        router.clone(),
        "/send-order-confirmation",
        json!({"orderId": "order-1"}),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "resend is temporarily unavailable");

    let (status, _) = post_json(
        router.clone(),
        "/send-order-confirmation",
        json!({"orderId": "order-404"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post_json(router, "/send-listing-status-email", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "submissionId is required");
}
