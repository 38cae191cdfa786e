//! Transactional email: order receipts, seller notices, and listing status.
//!
//! Every send goes through [`EmailDispatcher::send`], which honours the
//! recipient's [`EmailPreferences`] and keeps an [`EmailLogEntry`] audit trail
//! (`pending` then `sent` or `failed`).

pub mod dispatcher;
pub mod domain;
pub mod router;
pub mod service;
pub mod templates;

#[cfg(test)]
mod tests;

pub use dispatcher::EmailDispatcher;
pub use domain::{
    EmailDispatchResponse, EmailLogEntry, EmailLogRepository, EmailMessage, EmailPreferences,
    EmailStatus, EmailTransport, NotificationCategory, PreferenceRepository, SendOutcome,
};
pub use router::email_router;
pub use service::{EmailNotificationService, ListingEmailRequest, OrderEmailRequest};
pub use templates::escape_html;
