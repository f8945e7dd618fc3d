//! Drives one relay request end to end.
//!
//! gate → status message → spinner → upstream call → adapter interpretation
//! → per-candidate fetch-and-deliver → fallback assembly → accounting.
//!
//! Every path through [`Orchestrator::handle`] stops the spinner exactly
//! once and records usage exactly once (rate-limited requests are turned
//! away before any state changes and are not counted). No error escapes
//! this boundary.

use crate::cooldown::CooldownGate;
use crate::delivery::{Delivery, MessageRef};
use crate::error::PipelineError;
use crate::fetcher::{DeliveryOutcome, MediaFetcher};
use crate::indicator::ProgressIndicator;
use crate::platforms::{self, FormatHint, Interpretation, Platform};
use crate::stats::UsageStats;
use crate::upstream::{ExtractionResult, UpstreamClient};
use std::sync::Arc;
use tracing::{info, warn};

/// One command invocation, discarded after the request completes.
#[derive(Clone, Debug)]
pub struct ExtractionRequest {
    pub platform: Platform,
    pub source_url: String,
    pub format_hint: Option<FormatHint>,
}

impl ExtractionRequest {
    fn extra_params(&self) -> Vec<(String, String)> {
        self.format_hint
            .map(|hint| vec![("format".to_string(), hint.as_param().to_string())])
            .unwrap_or_default()
    }
}

/// What a request produced before the final user-facing step.
enum RequestOutput {
    Media { outcomes: Vec<DeliveryOutcome> },
    Text(String),
    StatusOnly(String),
}

/// Owns the pipeline collaborators for the process lifetime.
pub struct Orchestrator {
    gate: CooldownGate,
    upstream: UpstreamClient,
    fetcher: MediaFetcher,
    stats: Arc<UsageStats>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        gate: CooldownGate,
        upstream: UpstreamClient,
        fetcher: MediaFetcher,
        stats: Arc<UsageStats>,
    ) -> Self {
        Self {
            gate,
            upstream,
            fetcher,
            stats,
        }
    }

    /// Runs one request to completion. Infallible: every failure resolves
    /// into a user-visible message and an accounting update.
    pub async fn handle(
        &self,
        delivery: Arc<dyn Delivery>,
        user_id: i64,
        request: ExtractionRequest,
    ) {
        let decision = self.gate.check(user_id);
        if !decision.allowed {
            let text = format!(
                "⏳ Please wait {:.1}s before the next command.",
                decision.wait_secs
            );
            if let Err(e) = delivery.send_text(&text).await {
                warn!(user_id, error = %e, "failed to send cooldown notice");
            }
            return;
        }

        let command = request.platform.command_name();
        let status = match delivery.send_text("⏳ Processing...").await {
            Ok(message) => message,
            Err(e) => {
                warn!(user_id, command, error = %e, "failed to send status message");
                self.stats.record(user_id, command, false);
                return;
            }
        };

        let indicator = ProgressIndicator::start(delivery.clone(), status);
        let result = self.run(delivery.as_ref(), status, &request).await;
        // Stopped before the terminal edit so a late frame cannot overwrite it
        indicator.stop().await;

        let success = conclude(delivery.as_ref(), status, result).await;
        self.stats.record(user_id, command, success);
        info!(user_id, command, success, "request completed");
    }

    async fn run(
        &self,
        delivery: &dyn Delivery,
        status: MessageRef,
        request: &ExtractionRequest,
    ) -> Result<RequestOutput, PipelineError> {
        let extraction = self
            .upstream
            .extract(
                request.platform.endpoint(),
                &request.source_url,
                &request.extra_params(),
            )
            .await;

        let payload = match extraction {
            ExtractionResult::Success(payload) => payload,
            ExtractionResult::Failure(message) => return Err(PipelineError::Upstream(message)),
        };

        match platforms::interpret(request.platform, &payload)? {
            Interpretation::Media(candidates) => {
                let total = candidates.len();
                let mut outcomes = Vec::with_capacity(total);
                for (index, candidate) in candidates.iter().enumerate() {
                    let progress = format!("⬇️ Downloading {}/{}...", index + 1, total);
                    let _ = delivery.edit_text(status, &progress).await;
                    outcomes
                        .push(self.fetcher.fetch_and_deliver(delivery, candidate).await);
                }
                debug_assert_eq!(outcomes.len(), candidates.len());
                Ok(RequestOutput::Media { outcomes })
            }
            Interpretation::Text(text) => Ok(RequestOutput::Text(text)),
            Interpretation::StatusOnly(message) => Ok(RequestOutput::StatusOnly(message)),
        }
    }
}

/// Terminal user-facing step; returns whether the request counts as a
/// success. Partial multi-item delivery counts as success when at least one
/// candidate was delivered.
async fn conclude(
    delivery: &dyn Delivery,
    status: MessageRef,
    result: Result<RequestOutput, PipelineError>,
) -> bool {
    match result {
        Err(error) => {
            let text = format!("❌ {}", html_escape::encode_text(&error.to_string()));
            if let Err(e) = delivery.edit_text(status, &text).await {
                warn!(error = %e, "failed to surface pipeline error");
            }
            false
        }
        Ok(RequestOutput::Text(text)) => {
            // Already HTML-escaped and bounded by the transcript adapter
            if let Err(e) = delivery.edit_text(status, &text).await {
                warn!(error = %e, "failed to deliver transcript");
                return false;
            }
            true
        }
        Ok(RequestOutput::StatusOnly(message)) => {
            let text = format!("✅ {}", html_escape::encode_text(&message));
            let _ = delivery.edit_text(status, &text).await;
            true
        }
        Ok(RequestOutput::Media { outcomes }) => {
            if outcomes.iter().all(DeliveryOutcome::is_delivered) {
                // Clean success: the status message simply disappears
                let _ = delivery.delete_message(status).await;
                return true;
            }

            // Sent as a new message, not an edit, so link formatting is not
            // subject to edit-size constraints
            let fallback = fallback_message(&outcomes);
            if let Err(e) = delivery.send_text(&fallback).await {
                warn!(error = %e, "failed to send fallback links");
            }
            let _ = delivery.delete_message(status).await;

            outcomes.iter().any(DeliveryOutcome::is_delivered)
        }
    }
}

/// One message listing the originating URLs of every non-delivered item.
fn fallback_message(outcomes: &[DeliveryOutcome]) -> String {
    let mut lines =
        vec!["⚠️ Some items were too large or failed to send. Direct links:".to_string()];
    for url in outcomes.iter().filter_map(DeliveryOutcome::failed_url) {
        lines.push(format!("• {}", html_escape::encode_text(url)));
    }
    lines.join("\n")
}
