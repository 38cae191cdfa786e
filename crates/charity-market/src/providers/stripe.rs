use async_trait::async_trait;
use serde::Deserialize;

use super::{ensure_success, transport, ProviderError};
use crate::config::ProviderConfig;
use crate::payments::{CreatedPaymentIntent, PaymentGateway, PaymentIntentRequest};

const PROVIDER: &str = "stripe";
const API_BASE: &str = "https://api.stripe.com/v1";

/// Payment intents over Stripe's form-encoded REST API.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: Option<String>,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    client_secret: Option<String>,
}

impl StripeClient {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            secret_key: config.stripe_secret_key.clone(),
            base_url: API_BASE.to_string(),
        }
    }
}

fn intent_form(request: &PaymentIntentRequest) -> Vec<(&'static str, String)> {
    vec![
        ("amount", request.amount_minor.to_string()),
        ("currency", request.currency.clone()),
        ("metadata[order_id]", request.order_id.0.clone()),
        ("automatic_payment_methods[enabled]", "true".to_string()),
    ]
}

#[async_trait]
impl PaymentGateway for StripeClient {
    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<CreatedPaymentIntent, ProviderError> {
        let secret_key = ProviderConfig::require(&self.secret_key, "STRIPE_SECRET_KEY")?;

        let response = self
            .http
            .post(format!("{}/payment_intents", self.base_url))
            .bearer_auth(secret_key)
            .form(&intent_form(request))
            .send()
            .await
            .map_err(transport(PROVIDER))?;

        let response = ensure_success(PROVIDER, response).await?;
        let intent: IntentResponse = response.json().await.map_err(transport(PROVIDER))?;
        let client_secret = intent.client_secret.ok_or_else(|| ProviderError::Malformed {
            provider: PROVIDER,
            detail: format!("payment intent {} has no client_secret", intent.id),
        })?;

        Ok(CreatedPaymentIntent {
            client_secret,
            payment_intent_id: intent.id,
        })
    }
}
