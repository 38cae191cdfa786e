use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::http::required;
use crate::listing::wizard::{next_step, WizardStep};
use crate::providers::{ChatCompletion, ChatMessage, ChatModel, ChatRole};

/// Conversation turns forwarded to the model, newest last.
pub const MAX_HISTORY_TURNS: usize = 10;

const ASSISTANT_PERSONA: &str = "You are the listing assistant of a charity marketplace where \
people sell or donate second-hand items and the proceeds support local causes. \
Keep answers short and friendly, ask one question at a time, and never invent details \
about the user's item.";

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryTurn {
    pub role: String,
    pub content: String,
}

/// Body of `POST /listing-assistant`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryTurn>,
    #[serde(default)]
    pub current_step: Option<String>,
    #[serde(default)]
    pub product_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantReply {
    pub response: String,
    pub suggestions: Vec<String>,
    pub next_step: WizardStep,
}

/// Validated assistant turn.
#[derive(Debug, Clone)]
pub struct AssistantTurn {
    pub message: String,
    pub history: Vec<ChatMessage>,
    pub current_step: WizardStep,
    pub product_data: Option<serde_json::Value>,
}

impl AssistantTurn {
    pub fn from_request(request: AssistantRequest) -> Result<Self, AppError> {
        let message = required("message", request.message.as_deref())?.to_string();

        let current_step = match request.current_step.as_deref().map(str::trim) {
            None | Some("") => WizardStep::Start,
            Some(raw) => raw
                .parse::<WizardStep>()
                .map_err(|err| AppError::validation(err.to_string()))?,
        };

        let history = request
            .conversation_history
            .into_iter()
            .map(|turn| {
                let role = match turn.role.trim().to_ascii_lowercase().as_str() {
                    "user" => ChatRole::User,
                    "assistant" => ChatRole::Assistant,
                    other => {
                        return Err(AppError::validation(format!(
                            "unsupported conversation role '{other}'"
                        )))
                    }
                };
                Ok(ChatMessage {
                    role,
                    content: turn.content,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            message,
            history,
            current_step,
            product_data: request.product_data,
        })
    }
}

pub struct ListingAssistant {
    model: Arc<dyn ChatModel>,
}

impl ListingAssistant {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn reply(&self, turn: AssistantTurn) -> Result<AssistantReply, AppError> {
        let upcoming = next_step(turn.current_step, &turn.message);
        let completion = completion_for(&turn, upcoming);

        tracing::debug!(
            provider = self.model.provider(),
            current = %turn.current_step,
            next = %upcoming,
            "listing assistant turn"
        );
        let response = self.model.complete(&completion).await?;

        Ok(AssistantReply {
            response: response.trim().to_string(),
            suggestions: upcoming
                .suggestions()
                .iter()
                .map(|suggestion| suggestion.to_string())
                .collect(),
            next_step: upcoming,
        })
    }
}

fn system_prompt(upcoming: WizardStep, product_data: Option<&serde_json::Value>) -> String {
    let mut prompt = format!(
        "{ASSISTANT_PERSONA}\n\nCurrent step: {upcoming}. {}",
        upcoming.prompt_hint()
    );
    if let Some(data) = product_data.filter(|data| !data.is_null()) {
        prompt.push_str("\n\nDetails collected so far (JSON): ");
        prompt.push_str(&data.to_string());
    }
    prompt
}

fn completion_for(turn: &AssistantTurn, upcoming: WizardStep) -> ChatCompletion {
    let skip = turn.history.len().saturating_sub(MAX_HISTORY_TURNS);
    let mut messages: Vec<ChatMessage> = turn.history.iter().skip(skip).cloned().collect();
    messages.push(ChatMessage {
        role: ChatRole::User,
        content: turn.message.clone(),
    });

    let mut completion =
        ChatCompletion::new(system_prompt(upcoming, turn.product_data.as_ref()), messages);
    completion.max_tokens = 400;
    completion
}
