use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::service::{AssistantReply, AssistantRequest, AssistantTurn, ListingAssistant};
use crate::error::AppError;
use crate::http::json_body;

pub fn assistant_router(assistant: Arc<ListingAssistant>) -> Router {
    Router::new()
        .route("/listing-assistant", post(assistant_handler))
        .with_state(assistant)
}

async fn assistant_handler(
    State(assistant): State<Arc<ListingAssistant>>,
    payload: Result<Json<AssistantRequest>, JsonRejection>,
) -> Result<Json<AssistantReply>, AppError> {
    let turn = AssistantTurn::from_request(json_body(payload)?)?;
    Ok(Json(assistant.reply(turn).await?))
}
