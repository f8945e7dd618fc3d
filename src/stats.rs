//! Process-wide usage counters.
//!
//! Explicitly owned and injected into the orchestrator rather than ambient
//! global state, so tests can assert on accounting in isolation. Mutations
//! are single lock-guarded read-modify-write sequences; the guard is never
//! held across an await point.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Usage counters accumulated over the process lifetime. Never persisted,
/// never reset.
pub struct UsageStats {
    started_at: DateTime<Utc>,
    inner: Mutex<Counters>,
}

#[derive(Default)]
struct Counters {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    users: HashSet<i64>,
    commands: HashMap<String, u64>,
}

/// Point-in-time copy of the counters, for rendering.
#[derive(Clone, Debug)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub unique_users: usize,
    /// Command invocation counts, most used first.
    pub top_commands: Vec<(String, u64)>,
    /// Every user id seen so far, for broadcast fan-out.
    pub user_ids: Vec<i64>,
}

impl StatsSnapshot {
    /// Success rate in percent, rounded to one decimal. Zero when no
    /// requests have been made yet.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.successful_requests as f64 / self.total_requests as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

impl UsageStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            inner: Mutex::new(Counters::default()),
        }
    }

    /// Records one completed request. Called exactly once per request,
    /// regardless of the path it took.
    pub fn record(&self, user_id: i64, command: &str, success: bool) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.total_requests += 1;
        inner.users.insert(user_id);
        if success {
            inner.successful_requests += 1;
        } else {
            inner.failed_requests += 1;
        }
        *inner.commands.entry(command.to_string()).or_insert(0) += 1;
    }

    /// Copies the current counters out for rendering.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let mut top_commands: Vec<(String, u64)> = inner
            .commands
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        top_commands.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        StatsSnapshot {
            started_at: self.started_at,
            total_requests: inner.total_requests,
            successful_requests: inner.successful_requests,
            failed_requests: inner.failed_requests,
            unique_users: inner.users.len(),
            top_commands,
            user_ids: inner.users.iter().copied().collect(),
        }
    }
}

impl Default for UsageStats {
    fn default() -> Self {
        Self::new()
    }
}
