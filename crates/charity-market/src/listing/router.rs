use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::domain::{ModerationOutcome, ModerationRequest};
use super::repository::{NotificationRepository, SubmissionRepository};
use super::service::SubmissionModerationService;
use crate::error::AppError;
use crate::http::json_body;

/// Router builder exposing the submission moderation endpoint.
pub fn moderation_router<R, N>(service: Arc<SubmissionModerationService<R, N>>) -> Router
where
    R: SubmissionRepository + 'static,
    N: NotificationRepository + 'static,
{
    Router::new()
        .route("/moderate-submission", post(moderate_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn moderate_handler<R, N>(
    State(service): State<Arc<SubmissionModerationService<R, N>>>,
    payload: Result<Json<ModerationRequest>, JsonRejection>,
) -> Result<Json<ModerationOutcome>, AppError>
where
    R: SubmissionRepository + 'static,
    N: NotificationRepository + 'static,
{
    let request = json_body(payload)?;
    let draft = SubmissionModerationService::<R, N>::validate(request)?;
    let outcome = service.moderate(draft).await?;
    Ok(Json(outcome))
}
