use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ensure_success, transport, ChatCompletion, ChatModel, ImageSource, ProviderError, VisionModel,
};
use crate::config::ProviderConfig;

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Chat-completions client for OpenAI and OpenAI-compatible hosts (Groq).
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    provider: &'static str,
    key_var: &'static str,
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    vision_model: String,
}

impl OpenAiCompatibleClient {
    pub fn openai(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            provider: "openai",
            key_var: "OPENAI_API_KEY",
            http,
            base_url: config.openai_base_url.clone(),
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            vision_model: config.openai_vision_model.clone(),
        }
    }

    pub fn groq(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            provider: "groq",
            key_var: "GROQ_API_KEY",
            http,
            base_url: GROQ_BASE_URL.to_string(),
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
            vision_model: config.groq_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    async fn send(&self, body: &WireRequest<'_>) -> Result<String, ProviderError> {
        let api_key = ProviderConfig::require(&self.api_key, self.key_var)?;

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(transport(self.provider))?;

        let response = ensure_success(self.provider, response).await?;
        let payload: WireResponse = response.json().await.map_err(transport(self.provider))?;
        first_choice(self.provider, payload)
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatibleClient {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn complete(&self, request: &ChatCompletion) -> Result<String, ProviderError> {
        let body = chat_body(&self.model, request);
        self.send(&body).await
    }
}

#[async_trait]
impl VisionModel for OpenAiCompatibleClient {
    fn provider(&self) -> &'static str {
        self.provider
    }

    async fn describe(
        &self,
        image: &ImageSource,
        instructions: &str,
    ) -> Result<String, ProviderError> {
        let body = vision_body(&self.vision_model, image, instructions);
        self.send(&body).await
    }
}

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: WireContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WireContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn json_format(enabled: bool) -> Option<ResponseFormat> {
    enabled.then_some(ResponseFormat {
        kind: "json_object",
    })
}

fn chat_body<'a>(model: &'a str, request: &'a ChatCompletion) -> WireRequest<'a> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(WireMessage {
        role: "system",
        content: WireContent::Text(&request.system),
    });
    messages.extend(request.messages.iter().map(|message| WireMessage {
        role: message.role.as_str(),
        content: WireContent::Text(&message.content),
    }));

    WireRequest {
        model,
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: json_format(request.json_mode),
    }
}

fn vision_body<'a>(model: &'a str, image: &ImageSource, instructions: &'a str) -> WireRequest<'a> {
    WireRequest {
        model,
        messages: vec![WireMessage {
            role: "user",
            content: WireContent::Parts(vec![
                ContentPart::Text { text: instructions },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.as_image_url(),
                    },
                },
            ]),
        }],
        temperature: 0.2,
        max_tokens: 1000,
        response_format: json_format(true),
    }
}

fn first_choice(provider: &'static str, payload: WireResponse) -> Result<String, ProviderError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| ProviderError::Malformed {
            provider,
            detail: "completion contained no message content".to_string(),
        })
}
