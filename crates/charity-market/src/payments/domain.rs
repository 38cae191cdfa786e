use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::providers::ProviderError;
use crate::repository::RepositoryError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

/// Order row joined with the buyer, seller, and item it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub buyer_id: String,
    pub buyer_name: String,
    pub buyer_email: String,
    pub seller_id: String,
    pub seller_name: String,
    pub seller_email: String,
    pub item_title: String,
    /// Major currency units.
    pub amount: f64,
    pub is_donation: bool,
    pub payment_intent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub trait OrderRepository: Send + Sync {
    fn fetch(&self, id: &OrderId) -> Result<Option<OrderRecord>, RepositoryError>;
    /// Records the provider intent against an existing order; `NotFound` otherwise.
    fn attach_payment_intent(&self, id: &OrderId, intent_id: &str)
        -> Result<(), RepositoryError>;
}

/// Body of `POST /create-payment-intent`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub order_id: Option<String>,
}

/// What the gateway is asked to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentIntentRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub order_id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_intent(
        &self,
        request: &PaymentIntentRequest,
    ) -> Result<CreatedPaymentIntent, ProviderError>;
}

/// Major units to minor units, rounding half away from zero.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_to_the_nearest_cent() {
        assert_eq!(to_minor_units(12.5), 1250);
        assert_eq!(to_minor_units(19.99), 1999);
        assert_eq!(to_minor_units(1.0), 100);
    }
}
