// Gemini `generateContent` client.
//
// Differences from the OpenAI-style clients: the key travels as a `?key=`
// query parameter, the system prompt is a top-level `systemInstruction`,
// assistant turns use the role "model", and images must be sent inline as
// base64 `inlineData` parts.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::{
    ensure_success, transport, ChatCompletion, ChatModel, ChatRole, ImageSource, ProviderError,
    VisionModel,
};
use crate::config::ProviderConfig;

const PROVIDER: &str = "gemini";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const IMAGE_HOST: &str = "image host";

/// Largest remote image forwarded inline. Gemini rejects inline requests over 20 MB.
pub const MAX_INLINE_IMAGE_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
        }
    }

    async fn generate(&self, body: &GenerateRequest) -> Result<String, ProviderError> {
        let api_key = ProviderConfig::require(&self.api_key, "GEMINI_API_KEY")?;
        let url = format!("{API_BASE}/{}:generateContent", self.model);

        let response = self
            .http
            .post(url)
            .query(&[("key", api_key)])
            .json(body)
            .send()
            .await
            .map_err(transport(PROVIDER))?;

        let response = ensure_success(PROVIDER, response).await?;
        let payload: GenerateResponse = response.json().await.map_err(transport(PROVIDER))?;
        candidate_text(payload)
    }

    /// Gemini cannot dereference URLs for inline parts, so remote images are downloaded first.
    async fn inline_bytes(&self, image: &ImageSource) -> Result<(Vec<u8>, String), ProviderError> {
        match image {
            ImageSource::Inline { data, mime_type } => Ok((data.clone(), mime_type.clone())),
            ImageSource::Url { url, mime_type } => {
                let response = self
                    .http
                    .get(url)
                    .send()
                    .await
                    .map_err(transport(IMAGE_HOST))?;
                let response = ensure_success(IMAGE_HOST, response).await?;
                let header_mime = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|value| value.to_str().ok())
                    .filter(|value| value.starts_with("image/"))
                    .map(|value| value.to_string());
                let bytes = read_capped(response, MAX_INLINE_IMAGE_BYTES).await?;
                Ok((bytes, header_mime.unwrap_or_else(|| mime_type.clone())))
            }
        }
    }
}

/// Reads the body, refusing anything declared or streamed past `limit` bytes.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ProviderError> {
    let too_large = || ProviderError::Malformed {
        provider: IMAGE_HOST,
        detail: format!("image is larger than {limit} bytes"),
    };

    if response
        .content_length()
        .is_some_and(|declared| declared > limit as u64)
    {
        return Err(too_large());
    }

    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport(IMAGE_HOST))? {
        if bytes.len() + chunk.len() > limit {
            return Err(too_large());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

#[async_trait]
impl ChatModel for GeminiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn complete(&self, request: &ChatCompletion) -> Result<String, ProviderError> {
        self.generate(&chat_body(request)).await
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn describe(
        &self,
        image: &ImageSource,
        instructions: &str,
    ) -> Result<String, ProviderError> {
        let (data, mime_type) = self.inline_bytes(image).await?;
        self.generate(&vision_body(&data, &mime_type, instructions))
            .await
    }
}

#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

fn text_part(text: &str) -> Part {
    Part {
        text: Some(text.to_string()),
        ..Part::default()
    }
}

fn json_mime(enabled: bool) -> Option<&'static str> {
    enabled.then_some("application/json")
}

fn chat_body(request: &ChatCompletion) -> GenerateRequest {
    let contents = request
        .messages
        .iter()
        .map(|message| Content {
            role: Some(match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            }),
            parts: vec![text_part(&message.content)],
        })
        .collect();

    GenerateRequest {
        contents,
        system_instruction: Some(Content {
            role: None,
            parts: vec![text_part(&request.system)],
        }),
        generation_config: GenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
            response_mime_type: json_mime(request.json_mode),
        },
    }
}

fn vision_body(data: &[u8], mime_type: &str, instructions: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![
                text_part(instructions),
                Part {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: mime_type.to_string(),
                        data: STANDARD.encode(data),
                    }),
                },
            ],
        }],
        system_instruction: None,
        generation_config: GenerationConfig {
            temperature: 0.2,
            max_output_tokens: 1000,
            response_mime_type: json_mime(true),
        },
    }
}

fn candidate_text(payload: GenerateResponse) -> Result<String, ProviderError> {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::Malformed {
            provider: PROVIDER,
            detail: "no candidate text returned".to_string(),
        });
    }
    Ok(text)
}
