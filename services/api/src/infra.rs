use async_trait::async_trait;
use charity_market::email::{
    EmailLogEntry, EmailLogRepository, EmailPreferences, PreferenceRepository,
};
use charity_market::listing::{
    Notification, NotificationRepository, PriceSuggestion, PricingAssistant, PricingError,
    SubmissionDraft, SubmissionId, SubmissionRecord, SubmissionRepository,
};
use charity_market::payments::{OrderId, OrderRecord, OrderRepository};
use charity_market::repository::RepositoryError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionRepository {
    records: Arc<Mutex<HashMap<SubmissionId, SubmissionRecord>>>,
}

impl InMemorySubmissionRepository {
    pub(crate) fn seed(&self, record: SubmissionRecord) {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard.insert(record.id.clone(), record);
    }
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn update(&self, record: SubmissionRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound(format!("submission {}", record.id.0)))
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryNotificationRepository {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationRepository for InMemoryNotificationRepository {
    fn insert(&self, notification: Notification) -> Result<(), RepositoryError> {
        let mut guard = self.events.lock().expect("notification mutex poisoned");
        guard.push(notification);
        Ok(())
    }
}

impl InMemoryNotificationRepository {
    pub(crate) fn events(&self) -> Vec<Notification> {
        self.events
            .lock()
            .expect("notification mutex poisoned")
            .clone()
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryOrderRepository {
    orders: Arc<Mutex<HashMap<OrderId, OrderRecord>>>,
}

impl InMemoryOrderRepository {
    pub(crate) fn seed(&self, order: OrderRecord) {
        let mut guard = self.orders.lock().expect("order mutex poisoned");
        guard.insert(order.id.clone(), order);
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn fetch(&self, id: &OrderId) -> Result<Option<OrderRecord>, RepositoryError> {
        let guard = self.orders.lock().expect("order mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn attach_payment_intent(&self, id: &OrderId, intent_id: &str) -> Result<(), RepositoryError> {
        let mut guard = self.orders.lock().expect("order mutex poisoned");
        let order = guard
            .get_mut(id)
            .ok_or_else(|| RepositoryError::NotFound(format!("order {}", id.0)))?;
        order.payment_intent_id = Some(intent_id.to_string());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPreferenceRepository {
    preferences: Arc<Mutex<HashMap<String, EmailPreferences>>>,
}

impl InMemoryPreferenceRepository {
    pub(crate) fn seed(&self, user_id: impl Into<String>, preferences: EmailPreferences) {
        let mut guard = self.preferences.lock().expect("preference mutex poisoned");
        guard.insert(user_id.into(), preferences);
    }
}

impl PreferenceRepository for InMemoryPreferenceRepository {
    fn fetch(&self, user_id: &str) -> Result<Option<EmailPreferences>, RepositoryError> {
        let guard = self.preferences.lock().expect("preference mutex poisoned");
        Ok(guard.get(user_id).copied())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryEmailLog {
    entries: Arc<Mutex<HashMap<String, EmailLogEntry>>>,
}

#[cfg(test)]
impl InMemoryEmailLog {
    pub(crate) fn entries(&self) -> Vec<EmailLogEntry> {
        let guard = self.entries.lock().expect("email log mutex poisoned");
        guard.values().cloned().collect()
    }
}

impl EmailLogRepository for InMemoryEmailLog {
    fn insert(&self, entry: EmailLogEntry) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("email log mutex poisoned");
        let key = entry.id.to_string();
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, entry);
        Ok(())
    }

    fn update(&self, entry: EmailLogEntry) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("email log mutex poisoned");
        let key = entry.id.to_string();
        if !guard.contains_key(&key) {
            return Err(RepositoryError::NotFound(format!("email log {key}")));
        }
        guard.insert(key, entry);
        Ok(())
    }
}

/// Pricing used when no model is wired in; the service falls back to the
/// submitted price or the configured default.
pub(crate) struct OfflinePricing;

#[async_trait]
impl PricingAssistant for OfflinePricing {
    async fn suggest(&self, _draft: &SubmissionDraft) -> Result<PriceSuggestion, PricingError> {
        Err(PricingError::Malformed(
            "offline mode, no pricing model configured".to_string(),
        ))
    }
}
