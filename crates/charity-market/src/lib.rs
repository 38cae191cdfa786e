//! Charity marketplace backend: listing moderation and the guided listing
//! wizard, plus the AI, payment, and email integrations around them.

pub mod assistant;
pub mod config;
pub mod email;
pub mod error;
pub mod http;
pub mod listing;
pub mod payments;
pub mod providers;
pub mod repository;
pub mod telemetry;
pub mod vision;

pub use error::AppError;
