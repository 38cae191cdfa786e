//! Conversational listing assistant.
//!
//! Each turn advances the wizard with [`crate::listing::next_step`] and asks the
//! configured chat model for a reply tailored to the step the user lands on.

pub mod router;
pub mod service;

pub use router::assistant_router;
pub use service::{
    AssistantReply, AssistantRequest, AssistantTurn, HistoryTurn, ListingAssistant,
    MAX_HISTORY_TURNS,
};
