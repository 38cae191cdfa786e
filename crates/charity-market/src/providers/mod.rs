//! Outbound clients for the AI, payment, and e-mail providers.
//!
//! Domain modules only see the [`ChatModel`] and [`VisionModel`] traits (and the
//! payment/e-mail ports defined next to their services), so tests swap in fakes
//! without touching the network.

pub mod gemini;
pub mod openai;
pub mod resend;
pub mod stripe;

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

pub use gemini::GeminiClient;
pub use openai::OpenAiCompatibleClient;
pub use resend::ResendClient;
pub use stripe::StripeClient;

/// Speaker of a conversation turn forwarded to a chat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Provider-neutral completion request.
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    pub system: String,
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a bare JSON object.
    pub json_mode: bool,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatCompletion {
    pub fn new(system: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            system: system.into(),
            messages,
            json_mode: false,
            temperature: 0.7,
            max_tokens: 800,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self.temperature = 0.2;
        self
    }
}

/// Image handed to a vision model, either by reference or inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url { url: String, mime_type: String },
    Inline { data: Vec<u8>, mime_type: String },
}

impl ImageSource {
    pub fn mime_type(&self) -> &str {
        match self {
            ImageSource::Url { mime_type, .. } | ImageSource::Inline { mime_type, .. } => {
                mime_type
            }
        }
    }

    /// URL form accepted by OpenAI-style `image_url` parts.
    pub fn as_image_url(&self) -> String {
        match self {
            ImageSource::Url { url, .. } => url.clone(),
            ImageSource::Inline { data, mime_type } => {
                format!("data:{mime_type};base64,{}", STANDARD.encode(data))
            }
        }
    }
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn complete(&self, request: &ChatCompletion) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait VisionModel: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn describe(
        &self,
        image: &ImageSource,
        instructions: &str,
    ) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{provider} request failed: {source}")]
    Http {
        provider: &'static str,
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} response was malformed: {detail}")]
    Malformed {
        provider: &'static str,
        detail: String,
    },
}

impl ProviderError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message safe to show to end users.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::Config(err) => format!("service misconfigured: {err}"),
            ProviderError::Status { provider, status, .. } => match *status {
                401 | 403 => format!("{provider} service credentials were rejected"),
                402 => format!("{provider} quota is exhausted"),
                429 => "too many requests, please try again shortly".to_string(),
                500..=599 => format!("{provider} is temporarily unavailable"),
                _ => format!("{provider} rejected the request (HTTP {status})"),
            },
            ProviderError::Http { provider, .. } => format!("could not reach {provider}"),
            ProviderError::Malformed { provider, .. } => {
                format!("{provider} returned an unexpected response")
            }
        }
    }
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|source| ProviderError::Http {
            provider: "http client",
            source,
        })
}

/// Turns a non-2xx response into [`ProviderError::Status`].
pub(crate) async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::error!(provider, status = status.as_u16(), "provider request failed");
    Err(ProviderError::Status {
        provider,
        status: status.as_u16(),
        body,
    })
}

pub(crate) fn transport(provider: &'static str) -> impl FnOnce(reqwest::Error) -> ProviderError {
    move |source| ProviderError::Http { provider, source }
}
