use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use super::domain::{
    EmailLogEntry, EmailLogRepository, EmailMessage, EmailStatus, EmailTransport,
    PreferenceRepository, SendOutcome,
};
use crate::error::AppError;

/// Preference check, audit log, and delivery for a single email.
pub struct EmailDispatcher {
    transport: Arc<dyn EmailTransport>,
    preferences: Arc<dyn PreferenceRepository>,
    log: Arc<dyn EmailLogRepository>,
}

impl EmailDispatcher {
    pub fn new(
        transport: Arc<dyn EmailTransport>,
        preferences: Arc<dyn PreferenceRepository>,
        log: Arc<dyn EmailLogRepository>,
    ) -> Self {
        Self {
            transport,
            preferences,
            log,
        }
    }

    pub async fn send(&self, message: EmailMessage) -> Result<SendOutcome, AppError> {
        let preferences = self
            .preferences
            .fetch(&message.recipient_id)?
            .unwrap_or_default();
        if !preferences.allows(message.category) {
            info!(
                recipient_id = %message.recipient_id,
                category = message.category.as_str(),
                template = message.template,
                "email skipped by recipient preference"
            );
            return Ok(SendOutcome::Skipped);
        }

        let mut entry = EmailLogEntry::pending(&message);
        self.log.insert(entry.clone())?;

        match self.transport.deliver(&message).await {
            Ok(provider_id) => {
                entry.status = EmailStatus::Sent;
                entry.provider_id = Some(provider_id.clone());
                entry.updated_at = Utc::now();
                self.log.update(entry.clone())?;
                info!(
                    log_id = %entry.id,
                    provider_id = %provider_id,
                    template = message.template,
                    "email sent"
                );
                Ok(SendOutcome::Sent {
                    log_id: entry.id,
                    provider_id,
                })
            }
            Err(err) => {
                entry.status = EmailStatus::Failed;
                entry.error = Some(err.to_string());
                entry.updated_at = Utc::now();
                self.log.update(entry.clone())?;
                error!(
                    log_id = %entry.id,
                    template = message.template,
                    error = %err,
                    "email delivery failed"
                );
                Err(err.into())
            }
        }
    }
}
