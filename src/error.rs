//! Error taxonomy for the request-relay pipeline.
//!
//! Every variant resolves to a user-visible message; nothing here is ever
//! allowed to terminate the process. Oversized or undeliverable media is not
//! an error at all; it is an expected [`crate::fetcher::DeliveryOutcome`].

use thiserror::Error;

/// Failures a single relay request can end in.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The upstream API reported a failure (`success != true`), or was
    /// unreachable. Carries the upstream-provided message when there is one.
    #[error("{0}")]
    Upstream(String),

    /// The upstream reported success but the payload does not have the shape
    /// the platform adapter expects.
    #[error("{0}")]
    Structural(String),
}

impl PipelineError {
    /// Default message when the upstream signals failure without saying why.
    pub const GENERIC_UPSTREAM: &'static str = "The download service returned an error";

    /// True for adapter-side shape mismatches, false for upstream failures.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::Structural(_))
    }
}
