use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use super::analysis::{AnalysisResponse, ImageAnalysisRequest, ProductImageAnalyzer};
use crate::error::AppError;
use crate::http::json_body;

/// Routes for the OpenAI-backed and Gemini-backed analyzers.
pub fn vision_router(
    openai: Arc<ProductImageAnalyzer>,
    gemini: Arc<ProductImageAnalyzer>,
) -> Router {
    Router::new()
        .route(
            "/analyze-product-image",
            post(analyze_handler).with_state(openai),
        )
        .route(
            "/analyze-product-image-gemini",
            post(analyze_handler).with_state(gemini),
        )
}

async fn analyze_handler(
    State(analyzer): State<Arc<ProductImageAnalyzer>>,
    payload: Result<Json<ImageAnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let source = json_body(payload)?.into_source()?;
    let analysis = analyzer.analyze(source).await?;
    Ok(Json(AnalysisResponse { analysis }))
}
