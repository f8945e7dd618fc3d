//! Social media relay bot: takes a user-submitted URL, asks an external
//! extraction API what media hides behind it, downloads the result and
//! re-delivers it through Telegram.
//!
//! The pipeline lives in [`orchestrator`]; everything around it is a
//! collaborator behind a narrow seam: the chat transport ([`delivery`]),
//! the extraction API ([`upstream`]) and the per-platform response
//! interpretation ([`platforms`]).

/// Telegram command surface and dispatcher wiring
pub mod bot;
/// Settings loaded from environment and config files
pub mod config;
/// Per-user command cooldown gate
pub mod cooldown;
/// Abstract chat-transport port and its Telegram implementation
pub mod delivery;
/// Pipeline error taxonomy
pub mod error;
/// Media download with size ceilings
pub mod fetcher;
/// Ephemeral "processing" spinner lifecycle
pub mod indicator;
/// End-to-end request drive
pub mod orchestrator;
/// Per-platform extraction-result interpretation
pub mod platforms;
/// Process-wide usage counters
pub mod stats;
/// Small text helpers
pub mod text;
/// Extraction API client
pub mod upstream;

pub use error::PipelineError;
