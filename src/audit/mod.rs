//! Audit trail for MoneyNote
//!
//! Every create, update and delete performed through the services appends
//! one JSON line to `audit.log` with the record's before/after state.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
