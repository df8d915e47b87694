//! Append-only JSONL audit log

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::error::{MoneyNoteError, MoneyNoteResult};

use super::entry::{AuditEntry, EntityType};

/// Writes and reads `audit.log`
pub struct AuditLogger {
    log_path: PathBuf,
}

impl AuditLogger {
    pub fn new(log_path: PathBuf) -> Self {
        Self { log_path }
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    /// Append entries and flush once
    pub fn log_batch(&self, entries: &[AuditEntry]) -> MoneyNoteResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(|e| MoneyNoteError::Io(format!("Failed to open audit log: {}", e)))?;

        for entry in entries {
            let line = serde_json::to_string(entry).map_err(|e| {
                MoneyNoteError::Json(format!("Failed to serialize audit entry: {}", e))
            })?;
            writeln!(file, "{}", line)
                .map_err(|e| MoneyNoteError::Io(format!("Failed to write audit entry: {}", e)))?;
        }

        file.flush()
            .map_err(|e| MoneyNoteError::Io(format!("Failed to flush audit log: {}", e)))
    }

    pub fn log(&self, entry: &AuditEntry) -> MoneyNoteResult<()> {
        self.log_batch(std::slice::from_ref(entry))
    }

    /// All entries, oldest first. Lines that fail to parse are skipped with
    /// a warning so one damaged line does not hide the rest of the trail.
    pub fn read_all(&self) -> MoneyNoteResult<Vec<AuditEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.log_path)
            .map_err(|e| MoneyNoteError::Io(format!("Failed to open audit log: {}", e)))?;

        let mut entries = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| {
                MoneyNoteError::Io(format!("Failed to read audit log line {}: {}", index + 1, e))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AuditEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::warn!(line = index + 1, error = %e, "skipping malformed audit entry"),
            }
        }

        Ok(entries)
    }

    /// The most recent `count` entries, optionally for one entity type,
    /// oldest first
    pub fn read_recent(
        &self,
        count: usize,
        entity_type: Option<EntityType>,
    ) -> MoneyNoteResult<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        if let Some(kind) = entity_type {
            entries.retain(|e| e.entity_type == kind);
        }
        let start = entries.len().saturating_sub(count);
        Ok(entries.split_off(start))
    }
}
