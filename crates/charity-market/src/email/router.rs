use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::domain::EmailDispatchResponse;
use super::service::{EmailNotificationService, ListingEmailRequest, OrderEmailRequest};
use crate::error::AppError;
use crate::http::json_body;

pub fn email_router(service: Arc<EmailNotificationService>) -> Router {
    Router::new()
        .route("/send-order-confirmation", post(order_confirmation_handler))
        .route(
            "/send-seller-order-notification",
            post(seller_notification_handler),
        )
        .route("/send-listing-status-email", post(listing_status_handler))
        .with_state(service)
}

async fn order_confirmation_handler(
    State(service): State<Arc<EmailNotificationService>>,
    payload: Result<Json<OrderEmailRequest>, JsonRejection>,
) -> Result<Json<EmailDispatchResponse>, AppError> {
    let outcome = service.order_confirmation(json_body(payload)?).await?;
    Ok(Json(outcome.into()))
}

async fn seller_notification_handler(
    State(service): State<Arc<EmailNotificationService>>,
    payload: Result<Json<OrderEmailRequest>, JsonRejection>,
) -> Result<Json<EmailDispatchResponse>, AppError> {
    let outcome = service.seller_notification(json_body(payload)?).await?;
    Ok(Json(outcome.into()))
}

async fn listing_status_handler(
    State(service): State<Arc<EmailNotificationService>>,
    payload: Result<Json<ListingEmailRequest>, JsonRejection>,
) -> Result<Json<EmailDispatchResponse>, AppError> {
    let outcome = service.listing_status(json_body(payload)?).await?;
    Ok(Json(outcome.into()))
}
