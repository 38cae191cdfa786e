use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::email::dispatcher::EmailDispatcher;
use crate::email::domain::{
    EmailLogEntry, EmailLogRepository, EmailMessage, EmailPreferences, EmailTransport,
    PreferenceRepository,
};
use crate::email::service::EmailNotificationService;
use crate::listing::{SubmissionId, SubmissionRecord, SubmissionRepository, SubmissionStatus};
use crate::payments::{OrderId, OrderRecord, OrderRepository};
use crate::providers::ProviderError;
use crate::repository::RepositoryError;

pub(super) fn order(id: &str, is_donation: bool) -> OrderRecord {
    OrderRecord {
        id: OrderId(id.to_string()),
        buyer_id: "buyer-1".to_string(),
        buyer_name: "Ada".to_string(),
        buyer_email: "ada@example.org".to_string(),
        seller_id: "seller-1".to_string(),
        seller_name: "Grace".to_string(),
        seller_email: "grace@example.org".to_string(),
        item_title: "Oak side table".to_string(),
        amount: 18.0,
        is_donation,
        payment_intent_id: Some("pi_1".to_string()),
        created_at: Utc::now(),
    }
}

pub(super) fn approved_submission(id: &str) -> SubmissionRecord {
    let mut record = SubmissionRecord::pending(id, "seller-1", "Oak side table");
    record.submitter_email = Some("grace@example.org".to_string());
    record.status = SubmissionStatus::Approved;
    record.suggested_price = Some(18.0);
    record
}

#[derive(Default)]
pub(super) struct MemoryOrders(Mutex<HashMap<OrderId, OrderRecord>>);

impl MemoryOrders {
    pub(super) fn with(orders: Vec<OrderRecord>) -> Self {
        Self(Mutex::new(
            orders
                .into_iter()
                .map(|order| (order.id.clone(), order))
                .collect(),
        ))
    }
}

impl OrderRepository for MemoryOrders {
    fn fetch(&self, id: &OrderId) -> Result<Option<OrderRecord>, RepositoryError> {
        Ok(self.0.lock().expect("orders mutex poisoned").get(id).cloned())
    }

    fn attach_payment_intent(&self, id: &OrderId, _intent_id: &str) -> Result<(), RepositoryError> {
        Err(RepositoryError::NotFound(format!("order {}", id.0)))
    }
}

#[derive(Default)]
pub(super) struct MemorySubmissions(Mutex<HashMap<SubmissionId, SubmissionRecord>>);

impl MemorySubmissions {
    pub(super) fn with(records: Vec<SubmissionRecord>) -> Self {
        Self(Mutex::new(
            records
                .into_iter()
                .map(|record| (record.id.clone(), record))
                .collect(),
        ))
    }
}

impl SubmissionRepository for MemorySubmissions {
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        Ok(self.0.lock().expect("submissions mutex poisoned").get(id).cloned())
    }

    fn update(&self, record: SubmissionRecord) -> Result<(), RepositoryError> {
        self.0
            .lock()
            .expect("submissions mutex poisoned")
            .insert(record.id.clone(), record);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryPreferences(Mutex<HashMap<String, EmailPreferences>>);

impl MemoryPreferences {
    pub(super) fn set(&self, user_id: &str, preferences: EmailPreferences) {
        self.0
            .lock()
            .expect("preferences mutex poisoned")
            .insert(user_id.to_string(), preferences);
    }
}

impl PreferenceRepository for MemoryPreferences {
    fn fetch(&self, user_id: &str) -> Result<Option<EmailPreferences>, RepositoryError> {
        Ok(self
            .0
            .lock()
            .expect("preferences mutex poisoned")
            .get(user_id)
            .copied())
    }
}

/// Keeps every version of each log row, oldest first.
#[derive(Default)]
pub(super) struct MemoryEmailLog(Mutex<Vec<EmailLogEntry>>);

impl MemoryEmailLog {
    pub(super) fn history(&self) -> Vec<EmailLogEntry> {
        self.0.lock().expect("log mutex poisoned").clone()
    }
}

impl EmailLogRepository for MemoryEmailLog {
    fn insert(&self, entry: EmailLogEntry) -> Result<(), RepositoryError> {
        self.0.lock().expect("log mutex poisoned").push(entry);
        Ok(())
    }

    fn update(&self, entry: EmailLogEntry) -> Result<(), RepositoryError> {
        let mut rows = self.0.lock().expect("log mutex poisoned");
        if !rows.iter().any(|row| row.id == entry.id) {
            return Err(RepositoryError::NotFound(format!("email log {}", entry.id)));
        }
        rows.push(entry);
        Ok(())
    }
}

/// Transport that records deliveries, or fails with the given HTTP status.
#[derive(Default)]
pub(super) struct FakeTransport {
    pub(super) fail_with: Option<u16>,
    delivered: Mutex<Vec<EmailMessage>>,
}

impl FakeTransport {
    pub(super) fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            delivered: Mutex::default(),
        }
    }

    pub(super) fn delivered(&self) -> Vec<EmailMessage> {
        self.delivered.lock().expect("transport mutex poisoned").clone()
    }
}

#[async_trait]
impl EmailTransport for FakeTransport {
    async fn deliver(&self, message: &EmailMessage) -> Result<String, ProviderError> {
        if let Some(status) = self.fail_with {
            return Err(ProviderError::Status {
                provider: "resend",
                status,
                body: "{\"message\":\"nope\"}".to_string(),
            });
        }
        let mut delivered = self.delivered.lock().expect("transport mutex poisoned");
        delivered.push(message.clone());
        Ok(format!("re_{}", delivered.len()))
    }
}

pub(super) struct Harness {
    pub(super) transport: Arc<FakeTransport>,
    pub(super) preferences: Arc<MemoryPreferences>,
    pub(super) log: Arc<MemoryEmailLog>,
    pub(super) service: Arc<EmailNotificationService>,
}

pub(super) fn harness(transport: FakeTransport) -> Harness {
    let transport = Arc::new(transport);
    let preferences = Arc::new(MemoryPreferences::default());
    let log = Arc::new(MemoryEmailLog::default());
    let dispatcher = EmailDispatcher::new(transport.clone(), preferences.clone(), log.clone());
    let service = Arc::new(EmailNotificationService::new(
        dispatcher,
        Arc::new(MemoryOrders::with(vec![
            order("order-1", false),
            order("order-2", true),
        ])),
        Arc::new(MemorySubmissions::with(vec![
            approved_submission("sub-1"),
            SubmissionRecord::pending("sub-no-email", "seller-1", "Lamp"),
        ])),
        "usd",
    ));

    Harness {
        transport,
        preferences,
        log,
        service,
    }
}
