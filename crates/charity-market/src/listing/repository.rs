use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{SubmissionId, SubmissionRecord};
use crate::repository::RepositoryError;

/// Storage abstraction for submission rows.
pub trait SubmissionRepository: Send + Sync {
    fn fetch(&self, id: &SubmissionId) -> Result<Option<SubmissionRecord>, RepositoryError>;
    fn update(&self, record: SubmissionRecord) -> Result<(), RepositoryError>;
}

/// Who an in-app notification is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "audience", content = "user_id", rename_all = "snake_case")]
pub enum NotificationAudience {
    Admins,
    User(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SubmissionFlagged,
    SubmissionApproved,
}

/// In-app notification row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub audience: NotificationAudience,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub submission_id: SubmissionId,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        audience: NotificationAudience,
        kind: NotificationKind,
        submission_id: &SubmissionId,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            audience,
            kind,
            title: title.into(),
            message: message.into(),
            submission_id: submission_id.clone(),
            created_at: Utc::now(),
        }
    }
}

pub trait NotificationRepository: Send + Sync {
    fn insert(&self, notification: Notification) -> Result<(), RepositoryError>;
}
