//! Per-user command cooldown gate.
//!
//! A rejected check never refreshes the user's timestamp, so hammering the
//! bot reports a wait that shrinks toward zero instead of resetting.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of a single gate check.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GateDecision {
    /// Whether the command may proceed.
    pub allowed: bool,
    /// Remaining wait in seconds (0.0 when allowed), rounded to one decimal.
    pub wait_secs: f64,
}

impl GateDecision {
    const ALLOWED: Self = Self {
        allowed: true,
        wait_secs: 0.0,
    };
}

/// Per-user cooldown state. Privileged users always pass.
///
/// The check is a single lock-guarded read-modify-write: two concurrent
/// commands from the same user cannot both pass the gate. The guard is never
/// held across an await point.
pub struct CooldownGate {
    window: Duration,
    privileged: HashSet<i64>,
    last_allowed: Mutex<HashMap<i64, Instant>>,
}

impl CooldownGate {
    #[must_use]
    pub fn new(window: Duration, privileged: HashSet<i64>) -> Self {
        Self {
            window,
            privileged,
            last_allowed: Mutex::new(HashMap::new()),
        }
    }

    /// Checks whether `user_id` may run a command now.
    ///
    /// Allowed checks record the current time as the user's last command;
    /// rejected checks leave the stored timestamp untouched.
    pub fn check(&self, user_id: i64) -> GateDecision {
        self.check_at(user_id, Instant::now())
    }

    fn check_at(&self, user_id: i64, now: Instant) -> GateDecision {
        if self.privileged.contains(&user_id) {
            return GateDecision::ALLOWED;
        }

        let mut last = self
            .last_allowed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(&prev) = last.get(&user_id) {
            let elapsed = now.saturating_duration_since(prev);
            if elapsed < self.window {
                let remaining = (self.window - elapsed).as_secs_f64();
                let wait_secs = (remaining * 10.0).round() / 10.0;
                debug!(user_id, wait_secs, "command rejected by cooldown gate");
                return GateDecision {
                    allowed: false,
                    wait_secs,
                };
            }
        }

        last.insert(user_id, now);
        GateDecision::ALLOWED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(window_secs: u64, privileged: &[i64]) -> CooldownGate {
        CooldownGate::new(
            Duration::from_secs(window_secs),
            privileged.iter().copied().collect(),
        )
    }

    #[test]
    fn first_check_is_allowed() {
        let gate = gate(7, &[]);
        assert!(gate.check_at(1, Instant::now()).allowed);
    }

    #[test]
    fn second_check_within_window_is_rejected() {
        let gate = gate(7, &[]);
        let t0 = Instant::now();
        assert!(gate.check_at(1, t0).allowed);

        let decision = gate.check_at(1, t0 + Duration::from_secs(3));
        assert!(!decision.allowed);
        assert!((decision.wait_secs - 4.0).abs() < 0.11);
    }

    #[test]
    fn rejection_does_not_refresh_the_window() {
        let gate = gate(7, &[]);
        let t0 = Instant::now();
        assert!(gate.check_at(1, t0).allowed);

        // Repeated rejected checks report a non-increasing wait
        let w1 = gate.check_at(1, t0 + Duration::from_secs(2)).wait_secs;
        let w2 = gate.check_at(1, t0 + Duration::from_secs(4)).wait_secs;
        let w3 = gate.check_at(1, t0 + Duration::from_secs(6)).wait_secs;
        assert!(w1 >= w2 && w2 >= w3);

        // The window still expires relative to the original allowed check
        assert!(gate.check_at(1, t0 + Duration::from_secs(7)).allowed);
    }

    #[test]
    fn privileged_users_always_pass() {
        let gate = gate(7, &[42]);
        let t0 = Instant::now();
        for i in 0..5 {
            let decision = gate.check_at(42, t0 + Duration::from_millis(i * 10));
            assert!(decision.allowed);
            assert_eq!(decision.wait_secs, 0.0);
        }
    }

    #[test]
    fn users_are_gated_independently() {
        let gate = gate(7, &[]);
        let t0 = Instant::now();
        assert!(gate.check_at(1, t0).allowed);
        assert!(gate.check_at(2, t0 + Duration::from_secs(1)).allowed);
        assert!(!gate.check_at(1, t0 + Duration::from_secs(1)).allowed);
    }
}
