//! Ephemeral "processing" spinner shown while a request is in flight.
//!
//! The spinner is a spawned task that edits the status message on a fixed
//! interval until its owner cancels it. Cancellation lands at the next tick,
//! so one extra frame after logical completion is expected. Edit failures
//! are absorbed: the status message may already have been deleted.

use crate::delivery::{Delivery, MessageRef};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const FRAME_INTERVAL: Duration = Duration::from_millis(300);

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Handle to a running spinner. Must be stopped by the owning request;
/// dropping it without `stop` still cancels the task.
pub struct ProgressIndicator {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl ProgressIndicator {
    /// Spawns the animation task editing `status` until cancelled.
    #[must_use]
    pub fn start(delivery: Arc<dyn Delivery>, status: MessageRef) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();
        let task = tokio::spawn(async move {
            let mut frame = 0usize;
            loop {
                let text = format!("{} Processing...", FRAMES[frame % FRAMES.len()]);
                // Absorbed on purpose: the status message may be gone already
                let _ = delivery.edit_text(status, &text).await;
                frame += 1;

                tokio::select! {
                    () = child.cancelled() => break,
                    () = tokio::time::sleep(FRAME_INTERVAL) => {}
                }
            }
            debug!("progress indicator stopped");
        });

        Self { token, task }
    }

    /// Cancels the animation and waits for the task to wind down.
    pub async fn stop(mut self) {
        self.token.cancel();
        // JoinHandle is Unpin, awaiting by &mut leaves `self` intact for Drop
        let _ = (&mut self.task).await;
    }
}

// Fallback cancellation for early-return and panic paths: the guard may be
// dropped without an explicit stop, but the task must never outlive it.
impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
