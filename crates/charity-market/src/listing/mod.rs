//! Listing intake: the keyword moderation gate, AI-assisted pricing, and the
//! guided listing wizard.
//!
//! A submission runs through [`ModerationGate`] first. Flagged submissions are
//! parked for manual review; clean ones are priced (falling back to the
//! submitter's price when the model misbehaves) and published. The wizard step
//! sequencer drives the conversational listing flow in [`crate::assistant`].

pub mod domain;
pub mod moderation;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod service;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use domain::{
    ListingStatus, ModerationOutcome, ModerationRequest, SubmissionDraft, SubmissionId,
    SubmissionRecord, SubmissionStatus,
};
pub use moderation::{ModerationGate, ModerationVerdict, DEFAULT_DENYLIST};
pub use pricing::{
    parse_price_suggestion, ModelPricingAssistant, PriceSuggestion, PricingAssistant,
    PricingConfidence, PricingError, DEFAULT_FALLBACK_PRICE,
};
pub use repository::{
    Notification, NotificationAudience, NotificationKind, NotificationRepository,
    SubmissionRepository,
};
pub use router::moderation_router;
pub use service::SubmissionModerationService;
pub use wizard::{next_step, signals_donation, UnknownStep, WizardStep};
