use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::PricingConfidence;

/// Identifier wrapper for product submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Moderation state of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Flagged,
    Approved,
}

impl SubmissionStatus {
    pub fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Flagged => "flagged",
            SubmissionStatus::Approved => "approved",
        }
    }
}

/// Storefront visibility of the listing backed by a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    Pending,
    Published,
}

/// Submission row owned by the database collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: SubmissionId,
    pub submitter_id: String,
    pub submitter_email: Option<String>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub user_price: Option<f64>,
    pub status: SubmissionStatus,
    pub listing_status: ListingStatus,
    pub requires_manual_review: bool,
    pub moderation_notes: Option<String>,
    pub suggested_price: Option<f64>,
    pub pricing_confidence: Option<PricingConfidence>,
    pub updated_at: DateTime<Utc>,
}

impl SubmissionRecord {
    /// Fresh pending submission, as written by the listing form.
    pub fn pending(
        id: impl Into<String>,
        submitter_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: SubmissionId(id.into()),
            submitter_id: submitter_id.into(),
            submitter_email: None,
            title: title.into(),
            description: String::new(),
            category: String::new(),
            images: Vec::new(),
            user_price: None,
            status: SubmissionStatus::Pending,
            listing_status: ListingStatus::Pending,
            requires_manual_review: false,
            moderation_notes: None,
            suggested_price: None,
            pricing_confidence: None,
            updated_at: Utc::now(),
        }
    }
}

/// Body of `POST /moderate-submission`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationRequest {
    #[serde(default)]
    pub submission_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub user_price: Option<f64>,
}

/// Validated moderation input.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionDraft {
    pub submission_id: SubmissionId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub user_price: Option<f64>,
}

/// Response of `POST /moderate-submission`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModerationOutcome {
    Rejected {
        approved: bool,
        requires_manual_review: bool,
        reason: String,
        flagged_keywords: BTreeSet<String>,
    },
    Approved {
        approved: bool,
        suggested_price: f64,
        pricing_reasoning: String,
        pricing_confidence: PricingConfidence,
    },
}

impl ModerationOutcome {
    pub fn is_approved(&self) -> bool {
        matches!(self, ModerationOutcome::Approved { .. })
    }
}
