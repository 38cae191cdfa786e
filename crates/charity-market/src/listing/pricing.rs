use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::domain::SubmissionDraft;
use crate::providers::{ChatCompletion, ChatMessage, ChatModel, ChatRole, ProviderError};

pub const DEFAULT_FALLBACK_PRICE: f64 = 10.0;

const FALLBACK_REASONING: &str =
    "Automatic pricing was unavailable; using the submitted price or the marketplace default.";

const PRICING_INSTRUCTIONS: &str = "You price second-hand items for a charity marketplace. \
Respond with a single JSON object and nothing else, shaped as \
{\"suggested_price\": number, \"reasoning\": string, \"confidence\": \"low\" | \"medium\" | \"high\"}. \
Prices are in the store currency, must be positive, and should favour a quick sale.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingConfidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriceSuggestion {
    pub suggested_price: f64,
    pub reasoning: String,
    pub confidence: PricingConfidence,
}

impl PriceSuggestion {
    /// `user_price` when it is a usable price, otherwise `default_price`, at low confidence.
    pub fn fallback(user_price: Option<f64>, default_price: f64) -> Self {
        let suggested_price = user_price
            .filter(|price| price.is_finite() && *price >= 0.0)
            .unwrap_or(default_price);
        Self {
            suggested_price,
            reasoning: FALLBACK_REASONING.to_string(),
            confidence: PricingConfidence::Low,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("pricing response rejected: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait PricingAssistant: Send + Sync {
    async fn suggest(&self, draft: &SubmissionDraft) -> Result<PriceSuggestion, PricingError>;
}

/// Strict parser for the model's JSON answer.
pub fn parse_price_suggestion(raw: &str) -> Result<PriceSuggestion, PricingError> {
    let suggestion: PriceSuggestion = serde_json::from_str(raw.trim())
        .map_err(|err| PricingError::Malformed(err.to_string()))?;

    if !suggestion.suggested_price.is_finite() || suggestion.suggested_price <= 0.0 {
        return Err(PricingError::Malformed(format!(
            "suggested_price must be positive, got {}",
            suggestion.suggested_price
        )));
    }
    if suggestion.reasoning.trim().is_empty() {
        return Err(PricingError::Malformed("reasoning is empty".to_string()));
    }
    Ok(suggestion)
}

/// Pricing backed by any chat model in JSON mode.
pub struct ModelPricingAssistant {
    model: Arc<dyn ChatModel>,
}

impl ModelPricingAssistant {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    fn prompt(draft: &SubmissionDraft) -> String {
        let user_price = draft
            .user_price
            .map(|price| format!("{price:.2}"))
            .unwrap_or_else(|| "not provided".to_string());
        let category = match draft.category.as_str() {
            "" => "unspecified",
            category => category,
        };
        let description = match draft.description.as_str() {
            "" => "none",
            description => description,
        };
        format!(
            "Title: {}\nCategory: {}\nDescription: {}\nPhotos: {}\nSubmitter's price: {}",
            draft.title,
            category,
            description,
            draft.images.len(),
            user_price,
        )
    }
}

#[async_trait]
impl PricingAssistant for ModelPricingAssistant {
    async fn suggest(&self, draft: &SubmissionDraft) -> Result<PriceSuggestion, PricingError> {
        let request = ChatCompletion::new(
            PRICING_INSTRUCTIONS,
            vec![ChatMessage {
                role: ChatRole::User,
                content: Self::prompt(draft),
            }],
        )
        .json();

        let raw = self.model.complete(&request).await?;
        parse_price_suggestion(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_answers() {
        let suggestion = parse_price_suggestion(
            r#" {"suggested_price": 12.5, "reasoning": "Similar chairs sell for 10-15", "confidence": "medium"} "#,
        )
        .expect("valid suggestion");
        assert_eq!(suggestion.suggested_price, 12.5);
        assert_eq!(suggestion.confidence, PricingConfidence::Medium);
    }

    #[test]
    fn rejects_free_text_and_bad_shapes() {
        for raw in [
            "Suggested price: $12 because it is nice",
            r#"{"suggested_price": "12", "reasoning": "x", "confidence": "high"}"#,
            r#"{"suggested_price": 12, "reasoning": "x", "confidence": "certain"}"#,
            r#"{"suggested_price": -3, "reasoning": "x", "confidence": "high"}"#,
            r#"{"suggested_price": 0, "reasoning": "x", "confidence": "high"}"#,
            r#"{"suggested_price": 4, "reasoning": "  ", "confidence": "high"}"#,
            r#"{"suggested_price": 4, "reasoning": "x", "confidence": "high", "currency": "usd"}"#,
            "```json\n{\"suggested_price\": 4, \"reasoning\": \"x\", \"confidence\": \"high\"}\n```",
        ] {
            assert!(
                matches!(parse_price_suggestion(raw), Err(PricingError::Malformed(_))),
                "expected rejection for {raw}"
            );
        }
    }

    #[test]
    fn fallback_prefers_user_price() {
        let fallback = PriceSuggestion::fallback(Some(7.0), DEFAULT_FALLBACK_PRICE);
        assert_eq!(fallback.suggested_price, 7.0);
        assert_eq!(fallback.confidence, PricingConfidence::Low);

        let fallback = PriceSuggestion::fallback(None, DEFAULT_FALLBACK_PRICE);
        assert_eq!(fallback.suggested_price, 10.0);

        let fallback = PriceSuggestion::fallback(Some(f64::NAN), DEFAULT_FALLBACK_PRICE);
        assert_eq!(fallback.suggested_price, 10.0);
    }

    #[test]
    fn fallback_keeps_free_items_free() {
        let fallback = PriceSuggestion::fallback(Some(0.0), DEFAULT_FALLBACK_PRICE);
        assert_eq!(fallback.suggested_price, 0.0);

        let fallback = PriceSuggestion::fallback(Some(-3.0), DEFAULT_FALLBACK_PRICE);
        assert_eq!(fallback.suggested_price, 10.0);
    }
}
