use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::domain::{CreatedPaymentIntent, OrderRepository, PaymentRequest};
use super::service::PaymentService;
use crate::error::AppError;
use crate::http::json_body;

pub fn payments_router<O>(service: Arc<PaymentService<O>>) -> Router
where
    O: OrderRepository + 'static,
{
    Router::new()
        .route("/create-payment-intent", post(create_intent_handler::<O>))
        .with_state(service)
}

async fn create_intent_handler<O>(
    State(service): State<Arc<PaymentService<O>>>,
    payload: Result<Json<PaymentRequest>, JsonRejection>,
) -> Result<Json<CreatedPaymentIntent>, AppError>
where
    O: OrderRepository + 'static,
{
    let request = service.validate(json_body(payload)?)?;
    Ok(Json(service.create_intent(request).await?))
}
