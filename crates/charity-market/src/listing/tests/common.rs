use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::listing::domain::{SubmissionDraft, SubmissionId, SubmissionRecord};
use crate::listing::moderation::ModerationGate;
use crate::listing::pricing::{
    parse_price_suggestion, PriceSuggestion, PricingAssistant, PricingError,
};
use crate::listing::repository::{Notification, NotificationRepository, SubmissionRepository};
use crate::listing::service::SubmissionModerationService;
use crate::providers::ProviderError;
use crate::repository::RepositoryError;

pub(super) fn record(id: &str) -> SubmissionRecord {
    let mut record = SubmissionRecord::pending(id, "user-42", "Placeholder");
    record.submitter_email = Some("donor@example.org".to_string());
    record
}

pub(super) fn draft(id: &str, title: &str, description: &str, category: &str) -> SubmissionDraft {
    SubmissionDraft {
        submission_id: SubmissionId(id.to_string()),
        title: title.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        images: vec!["https://cdn.example.org/1.jpg".to_string()],
        user_price: None,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySubmissions {
    pub(super) records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl MemorySubmissions {
    pub(super) fn with(records: Vec<SubmissionRecord>) -> Self {
        let store = Self::default();
        {
            let mut guard = store.records.lock().expect("repository mutex poisoned");
            for record in records {
                guard.insert(record.id.clone(), record);
            }
        }
        store
    }

    pub(super) fn get(&self, id: &str) -> SubmissionRecord {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(&SubmissionId(id.to_string()))
            .cloned()
            .expect("record present")
    }
}

impl SubmissionRepository for MemorySubmissions {
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, record: SubmissionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
        Ok(())
    }
}

pub(super) struct UnavailableSubmissions;

impl SubmissionRepository for UnavailableSubmissions {
    fn fetch(&self, _id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: SubmissionRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifications {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifications {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notification mutex poisoned").clone()
    }
}

impl NotificationRepository for MemoryNotifications {
    fn insert(&self, notification: Notification) -> Result<(), RepositoryError> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Pricing fake answering with a canned model reply.
pub(super) struct ScriptedPricing {
    pub(super) reply: Result<String, u16>,
    pub(super) calls: Mutex<usize>,
}

impl ScriptedPricing {
    pub(super) fn answering(raw: &str) -> Self {
        Self {
            reply: Ok(raw.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub(super) fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: Mutex::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        *self.calls.lock().expect("calls mutex poisoned")
    }
}

#[async_trait]
impl PricingAssistant for ScriptedPricing {
    async fn suggest(&self, _draft: &SubmissionDraft) -> Result<PriceSuggestion, PricingError> {
        *self.calls.lock().expect("calls mutex poisoned") += 1;
        match &self.reply {
            Ok(raw) => parse_price_suggestion(raw),
            Err(status) => Err(PricingError::Provider(ProviderError::Status {
                provider: "groq",
                status: *status,
                body: "upstream failure".to_string(),
            })),
        }
    }
}

pub(super) const PRICED: &str =
    r#"{"suggested_price": 18.0, "reasoning": "Solid oak, good condition", "confidence": "high"}"#;

pub(super) fn build_service(
    records: Vec<SubmissionRecord>,
    pricing: Arc<ScriptedPricing>,
) -> (
    SubmissionModerationService<MemorySubmissions, MemoryNotifications>,
    MemorySubmissions,
    MemoryNotifications,
) {
    let submissions = MemorySubmissions::with(records);
    let notifications = MemoryNotifications::default();
    let service = SubmissionModerationService::new(
        Arc::new(ModerationGate::default()),
        pricing,
        Arc::new(submissions.clone()),
        Arc::new(notifications.clone()),
    );
    (service, submissions, notifications)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
