//! Snapshots of the data directory
//!
//! A snapshot is a single JSON archive holding every data file plus the
//! settings. Snapshots are taken on demand from the CLI and periodically
//! while the TUI runs, and pruned by the retention policy in settings.

mod manager;
mod restore;
mod scheduler;

pub use manager::{SnapshotArchive, SnapshotInfo, SnapshotManager};
pub use restore::{RestoreManager, RestoreReport};
pub use scheduler::SnapshotScheduler;
