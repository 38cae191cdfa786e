use crate::infra::{AppState, InMemoryNotificationRepository, InMemoryOrderRepository, InMemorySubmissionRepository};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use charity_market::assistant::{assistant_router, ListingAssistant};
use charity_market::email::{email_router, EmailNotificationService};
use charity_market::http::cors_layer;
use charity_market::listing::{moderation_router, SubmissionModerationService};
use charity_market::payments::{payments_router, PaymentService};
use charity_market::telemetry::http_trace_layer;
use charity_market::vision::{vision_router, ProductImageAnalyzer};
use serde_json::json;
use std::sync::Arc;

pub(crate) type ModerationService =
    SubmissionModerationService<InMemorySubmissionRepository, InMemoryNotificationRepository>;

/// Everything the HTTP surface dispatches to.
pub(crate) struct AppServices {
    pub(crate) moderation: Arc<ModerationService>,
    pub(crate) assistant: Arc<ListingAssistant>,
    pub(crate) vision_openai: Arc<ProductImageAnalyzer>,
    pub(crate) vision_gemini: Arc<ProductImageAnalyzer>,
    pub(crate) payments: Arc<PaymentService<InMemoryOrderRepository>>,
    pub(crate) email: Arc<EmailNotificationService>,
}

pub(crate) fn application_router(services: AppServices, state: AppState) -> Router {
    moderation_router(services.moderation)
        .merge(assistant_router(services.assistant))
        .merge(vision_router(services.vision_openai, services.vision_gemini))
        .merge(payments_router(services.payments))
        .merge(email_router(services.email))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .layer(cors_layer())
        .layer(http_trace_layer())
        .layer(Extension(state))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
