//! Product photo analysis backed by a vision model.
//!
//! Two routes share one pipeline: the OpenAI-backed `/analyze-product-image`
//! and the Gemini-backed `/analyze-product-image-gemini`.

pub mod analysis;
pub mod router;

pub use analysis::{
    parse_analysis, AnalysisResponse, ImageAnalysisRequest, ProductImageAnalysis,
    ProductImageAnalyzer, DEFAULT_IMAGE_MIME,
};
pub use router::vision_router;
