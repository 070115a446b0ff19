use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Default bounded wait for one poll of the queue.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);
/// Default number of consecutive empty polls before a run is declared stalled.
pub const DEFAULT_STALL_LIMIT: u32 = 1000;

/// How updates parked behind a running tile are drained when it finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoalescePolicy {
    /// One parked update per resubmission, oldest first.
    #[default]
    OneSidePerPass,
    /// The oldest parked update of every side in one resubmission.
    MergeBySide,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub poll_timeout: Duration,
    /// Consecutive empty polls tolerated before giving up; zero counts as one.
    pub stall_limit: u32,
    pub coalesce: CoalescePolicy,
    /// Stops the loop from outside; in-flight tasks are abandoned.
    pub cancel: Option<CancellationToken>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            stall_limit: DEFAULT_STALL_LIMIT,
            coalesce: CoalescePolicy::default(),
            cancel: None,
        }
    }
}

impl SchedulerConfig {
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Clamped to at least one poll.
    pub fn with_stall_limit(mut self, limit: u32) -> Self {
        self.stall_limit = limit.max(1);
        self
    }

    pub fn with_coalesce(mut self, policy: CoalescePolicy) -> Self {
        self.coalesce = policy;
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Wall-clock time without any completion before a stall is declared.
    pub fn stall_window(&self) -> Duration {
        self.poll_timeout.saturating_mul(self.stall_limit.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_stall_limit_is_clamped_to_one_poll() {
        let cfg = SchedulerConfig::default()
            .with_poll_timeout(Duration::from_millis(250))
            .with_stall_limit(0);
        assert_eq!(cfg.stall_limit, 1);
        assert_eq!(cfg.stall_window(), Duration::from_millis(250));
    }

    #[test]
    fn stall_window_scales_with_limit() {
        let cfg = SchedulerConfig::default()
            .with_poll_timeout(Duration::from_millis(10))
            .with_stall_limit(5);
        assert_eq!(cfg.stall_window(), Duration::from_millis(50));
    }
}
