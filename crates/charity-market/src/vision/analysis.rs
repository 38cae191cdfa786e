use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use mime_guess::mime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::AppError;
use crate::providers::{ImageSource, VisionModel};

pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

const ANALYSIS_PROMPT: &str = "You are helping a charity shop list a donated item. \
Look at the photo and answer with a single JSON object using exactly these keys: \
productName (string), description (string, two or three sentences), features (array of strings), \
material (string), targetAudience (string), suggestedCategories (array of strings), \
colors (array of strings), brandInfo (string, \"Unknown\" when no brand is visible), \
tags (array of short lowercase strings). Do not add any other text.";

/// Body of both image-analysis routes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysisRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl ImageAnalysisRequest {
    /// Resolve the request into exactly one image source with an `image/*` type.
    pub fn into_source(self) -> Result<ImageSource, AppError> {
        let explicit_mime = match self.mime_type.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(image_mime(value)?),
        };
        let url = self.image_url.filter(|value| !value.trim().is_empty());
        let inline = self.image_base64.filter(|value| !value.trim().is_empty());

        match (url, inline) {
            (None, None) => Err(AppError::validation(
                "one of imageUrl or imageBase64 is required",
            )),
            (Some(_), Some(_)) => Err(AppError::validation(
                "provide either imageUrl or imageBase64, not both",
            )),
            (Some(url), None) => {
                let url = url.trim().to_string();
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(AppError::validation("imageUrl must be an http(s) URL"));
                }
                let mime_type = explicit_mime
                    .or_else(|| guess_from_url(&url))
                    .unwrap_or_else(|| DEFAULT_IMAGE_MIME.to_string());
                Ok(ImageSource::Url { url, mime_type })
            }
            (None, Some(encoded)) => {
                let (uri_mime, payload) = split_data_uri(encoded.trim());
                let data = STANDARD
                    .decode(payload)
                    .map_err(|_| AppError::validation("imageBase64 is not valid base64"))?;
                let mime_type = match (explicit_mime, uri_mime) {
                    (Some(mime_type), _) => mime_type,
                    (None, Some(from_uri)) => image_mime(from_uri)?,
                    (None, None) => DEFAULT_IMAGE_MIME.to_string(),
                };
                Ok(ImageSource::Inline { data, mime_type })
            }
        }
    }
}

fn image_mime(value: &str) -> Result<String, AppError> {
    let parsed: mime::Mime = value
        .trim()
        .parse()
        .map_err(|_| AppError::validation(format!("mimeType '{value}' is not a valid media type")))?;
    if parsed.type_() != mime::IMAGE {
        return Err(AppError::validation(format!(
            "mimeType '{value}' is not an image type"
        )));
    }
    Ok(parsed.essence_str().to_string())
}

fn guess_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    mime_guess::from_path(path)
        .first()
        .filter(|guess| guess.type_() == mime::IMAGE)
        .map(|guess| guess.essence_str().to_string())
}

/// Splits `data:image/png;base64,AAAA` into its media type and payload.
fn split_data_uri(value: &str) -> (Option<&str>, &str) {
    value
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .map(|(header, payload)| (header.split(';').next(), payload))
        .unwrap_or((None, value))
}

/// What the vision model saw in a product photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImageAnalysis {
    pub product_name: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub material: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub suggested_categories: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub brand_info: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductImageAnalysis {
    /// Placeholder returned when the model answer cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            product_name: "Unidentified item".to_string(),
            description: "We could not analyse this photo automatically. Please describe the item yourself."
                .to_string(),
            features: Vec::new(),
            material: "Unknown".to_string(),
            target_audience: "General".to_string(),
            suggested_categories: vec!["Other".to_string()],
            colors: Vec::new(),
            brand_info: "Unknown".to_string(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub analysis: ProductImageAnalysis,
}

/// Parse a model answer, tolerating a surrounding Markdown code fence.
pub fn parse_analysis(raw: &str) -> Result<ProductImageAnalysis, serde_json::Error> {
    let trimmed = raw.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
}

pub struct ProductImageAnalyzer {
    model: Arc<dyn VisionModel>,
}

impl ProductImageAnalyzer {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    pub async fn analyze(&self, image: ImageSource) -> Result<ProductImageAnalysis, AppError> {
        let raw = self.model.describe(&image, ANALYSIS_PROMPT).await?;
        match parse_analysis(&raw) {
            Ok(analysis) => Ok(analysis),
            Err(err) => {
                warn!(
                    provider = self.model.provider(),
                    error = %err,
                    "unparsable image analysis, using fallback"
                );
                Ok(ProductImageAnalysis::fallback())
            }
        }
    }
}
