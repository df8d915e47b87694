//! Periodic snapshots driven by TUI ticks

use std::time::{Duration, Instant};

use super::manager::SnapshotManager;

/// Decides when the next periodic snapshot is due
pub struct SnapshotScheduler {
    interval: Option<Duration>,
    last_run: Instant,
}

impl SnapshotScheduler {
    /// `interval_minutes == 0` disables periodic snapshots
    pub fn new(interval_minutes: u32) -> Self {
        Self::with_interval(
            (interval_minutes > 0).then(|| Duration::from_secs(u64::from(interval_minutes) * 60)),
            Instant::now(),
        )
    }

    pub fn with_interval(interval: Option<Duration>, started: Instant) -> Self {
        Self {
            interval,
            last_run: started,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.interval
            .is_some_and(|interval| now.saturating_duration_since(self.last_run) >= interval)
    }

    /// Take a snapshot when due. Failures are logged and swallowed; the
    /// next attempt waits a full interval either way.
    pub fn tick(&mut self, manager: &SnapshotManager, now: Instant) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_run = now;

        match manager.create_with_retention() {
            Ok((path, pruned)) => {
                tracing::debug!(path = %path.display(), pruned = pruned.len(), "periodic snapshot");
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "periodic snapshot failed");
                false
            }
        }
    }
}
