use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::providers::ProviderError;
use crate::repository::RepositoryError;

/// Opt-out groups a recipient can switch off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    OrderUpdates,
    ListingUpdates,
}

impl NotificationCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationCategory::OrderUpdates => "order_updates",
            NotificationCategory::ListingUpdates => "listing_updates",
        }
    }
}

/// Per-user email switches; users without a stored row get everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailPreferences {
    pub order_updates: bool,
    pub listing_updates: bool,
}

impl Default for EmailPreferences {
    fn default() -> Self {
        Self {
            order_updates: true,
            listing_updates: true,
        }
    }
}

impl EmailPreferences {
    pub fn allows(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::OrderUpdates => self.order_updates,
            NotificationCategory::ListingUpdates => self.listing_updates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    Pending,
    Sent,
    Failed,
}

/// Audit row for every email handed to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailLogEntry {
    pub id: Uuid,
    pub recipient_id: String,
    pub recipient_email: String,
    pub template: String,
    pub subject: String,
    pub status: EmailStatus,
    pub provider_id: Option<String>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmailLogEntry {
    pub fn pending(message: &EmailMessage) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            recipient_id: message.recipient_id.clone(),
            recipient_email: message.to.clone(),
            template: message.template.to_string(),
            subject: message.subject.clone(),
            status: EmailStatus::Pending,
            provider_id: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub recipient_id: String,
    pub to: String,
    pub category: NotificationCategory,
    pub template: &'static str,
    pub subject: String,
    pub html: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { log_id: Uuid, provider_id: String },
    Skipped,
}

/// Response shared by the email endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailDispatchResponse {
    pub success: bool,
    pub skipped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
}

impl From<SendOutcome> for EmailDispatchResponse {
    fn from(outcome: SendOutcome) -> Self {
        match outcome {
            SendOutcome::Sent { provider_id, .. } => Self {
                success: true,
                skipped: false,
                email_id: Some(provider_id),
            },
            SendOutcome::Skipped => Self {
                success: true,
                skipped: true,
                email_id: None,
            },
        }
    }
}

pub trait PreferenceRepository: Send + Sync {
    fn fetch(&self, user_id: &str) -> Result<Option<EmailPreferences>, RepositoryError>;
}

pub trait EmailLogRepository: Send + Sync {
    fn insert(&self, entry: EmailLogEntry) -> Result<(), RepositoryError>;
    fn update(&self, entry: EmailLogEntry) -> Result<(), RepositoryError>;
}

/// Outbound delivery; returns the provider's message id.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    async fn deliver(&self, message: &EmailMessage) -> Result<String, ProviderError>;
}
