use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ensure_success, transport, ProviderError};
use crate::config::ProviderConfig;
use crate::email::{EmailMessage, EmailTransport};

const PROVIDER: &str = "resend";
const API_BASE: &str = "https://api.resend.com";

#[derive(Debug, Clone)]
pub struct ResendClient {
    http: reqwest::Client,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: String,
}

impl ResendClient {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_key: config.resend_api_key.clone(),
            from: config.email_from.clone(),
        }
    }

    fn body<'a>(&'a self, message: &'a EmailMessage) -> SendRequest<'a> {
        SendRequest {
            from: &self.from,
            to: [message.to.as_str()],
            subject: &message.subject,
            html: &message.html,
            text: &message.text,
        }
    }
}

#[async_trait]
impl EmailTransport for ResendClient {
    async fn deliver(&self, message: &EmailMessage) -> Result<String, ProviderError> {
        let api_key = ProviderConfig::require(&self.api_key, "RESEND_API_KEY")?;

        let response = self
            .http
            .post(format!("{API_BASE}/emails"))
            .bearer_auth(api_key)
            .json(&self.body(message))
            .send()
            .await
            .map_err(transport(PROVIDER))?;

        let response = ensure_success(PROVIDER, response).await?;
        let sent: SendResponse = response.json().await.map_err(transport(PROVIDER))?;
        Ok(sent.id)
    }
}
