use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ListingStatus, ModerationOutcome, ModerationRequest, SubmissionDraft, SubmissionId,
    SubmissionRecord, SubmissionStatus,
};
use super::moderation::{ModerationGate, ModerationVerdict};
use super::pricing::{PriceSuggestion, PricingAssistant, DEFAULT_FALLBACK_PRICE};
use super::repository::{
    Notification, NotificationAudience, NotificationKind, NotificationRepository,
    SubmissionRepository,
};
use crate::error::AppError;
use crate::http::required;
use crate::repository::RepositoryError;

/// Service composing the moderation gate, pricing assistant, and storage ports.
pub struct SubmissionModerationService<R, N> {
    gate: Arc<ModerationGate>,
    pricing: Arc<dyn PricingAssistant>,
    submissions: Arc<R>,
    notifications: Arc<N>,
    fallback_price: f64,
}

impl<R, N> SubmissionModerationService<R, N>
where
    R: SubmissionRepository + 'static,
    N: NotificationRepository + 'static,
{
    pub fn new(
        gate: Arc<ModerationGate>,
        pricing: Arc<dyn PricingAssistant>,
        submissions: Arc<R>,
        notifications: Arc<N>,
    ) -> Self {
        Self {
            gate,
            pricing,
            submissions,
            notifications,
            fallback_price: DEFAULT_FALLBACK_PRICE,
        }
    }

    pub fn with_fallback_price(mut self, fallback_price: f64) -> Self {
        self.fallback_price = fallback_price;
        self
    }

    pub fn validate(request: ModerationRequest) -> Result<SubmissionDraft, AppError> {
        let submission_id = required("submission_id", request.submission_id.as_deref())?;
        let title = required("title", request.title.as_deref())?;
        Ok(SubmissionDraft {
            submission_id: SubmissionId(submission_id.to_string()),
            title: title.to_string(),
            description: request.description.trim().to_string(),
            category: request.category.trim().to_string(),
            images: request.images,
            user_price: request.user_price,
        })
    }

    /// Screen a submission, price it when it passes, and record the result.
    pub async fn moderate(&self, draft: SubmissionDraft) -> Result<ModerationOutcome, AppError> {
        let record = self
            .submissions
            .fetch(&draft.submission_id)?
            .ok_or_else(|| {
                RepositoryError::NotFound(format!("submission {}", draft.submission_id.0))
            })?;

        let verdict = self
            .gate
            .screen(&draft.title, &draft.description, &draft.category);

        if verdict.approved {
            self.approve(record, &draft).await
        } else {
            self.flag(record, verdict)
        }
    }

    fn flag(
        &self,
        mut record: SubmissionRecord,
        verdict: ModerationVerdict,
    ) -> Result<ModerationOutcome, AppError> {
        let reason = verdict.reason().unwrap_or_default();
        info!(
            submission_id = %record.id.0,
            flagged = ?verdict.flagged_keywords,
            "submission flagged for manual review"
        );

        record.status = SubmissionStatus::Flagged;
        record.listing_status = ListingStatus::Pending;
        record.requires_manual_review = true;
        record.moderation_notes = Some(reason.clone());
        record.updated_at = Utc::now();
        self.submissions.update(record.clone())?;

        self.notifications.insert(Notification::new(
            NotificationAudience::Admins,
            NotificationKind::SubmissionFlagged,
            &record.id,
            "Submission needs review",
            format!("\"{}\" was flagged. {}", record.title, reason),
        ))?;
        self.notifications.insert(Notification::new(
            NotificationAudience::User(record.submitter_id.clone()),
            NotificationKind::SubmissionFlagged,
            &record.id,
            "Your submission is under review",
            format!(
                "\"{}\" needs a manual check by our team before it can be listed.",
                record.title
            ),
        ))?;

        Ok(ModerationOutcome::Rejected {
            approved: false,
            requires_manual_review: true,
            reason,
            flagged_keywords: verdict.flagged_keywords,
        })
    }

    async fn approve(
        &self,
        mut record: SubmissionRecord,
        draft: &SubmissionDraft,
    ) -> Result<ModerationOutcome, AppError> {
        let suggestion = match self.pricing.suggest(draft).await {
            Ok(suggestion) => suggestion,
            Err(err) => {
                warn!(
                    submission_id = %draft.submission_id.0,
                    error = %err,
                    "price suggestion unavailable, using fallback"
                );
                PriceSuggestion::fallback(draft.user_price, self.fallback_price)
            }
        };

        record.status = SubmissionStatus::Approved;
        record.listing_status = ListingStatus::Published;
        record.requires_manual_review = false;
        record.moderation_notes = None;
        record.suggested_price = Some(suggestion.suggested_price);
        record.pricing_confidence = Some(suggestion.confidence);
        record.updated_at = Utc::now();
        self.submissions.update(record.clone())?;

        info!(
            submission_id = %record.id.0,
            suggested_price = suggestion.suggested_price,
            confidence = ?suggestion.confidence,
            "submission approved and published"
        );

        self.notifications.insert(Notification::new(
            NotificationAudience::Admins,
            NotificationKind::SubmissionApproved,
            &record.id,
            "Submission published",
            format!(
                "\"{}\" passed moderation at {:.2}.",
                record.title, suggestion.suggested_price
            ),
        ))?;
        self.notifications.insert(Notification::new(
            NotificationAudience::User(record.submitter_id.clone()),
            NotificationKind::SubmissionApproved,
            &record.id,
            "Your item is live",
            format!(
                "\"{}\" is now listed. Suggested price: {:.2}.",
                record.title, suggestion.suggested_price
            ),
        ))?;

        Ok(ModerationOutcome::Approved {
            approved: true,
            suggested_price: suggestion.suggested_price,
            pricing_reasoning: suggestion.reasoning,
            pricing_confidence: suggestion.confidence,
        })
    }
}
