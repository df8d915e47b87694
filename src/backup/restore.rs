//! Restoring a snapshot over the data directory

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::config::paths::MoneyNotePaths;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::storage::file_io::{write_collection, write_json_atomic};

use super::manager::{SnapshotArchive, SNAPSHOT_SCHEMA_VERSION};

pub struct RestoreManager {
    paths: MoneyNotePaths,
}

/// What a restore wrote
#[derive(Debug)]
pub struct RestoreReport {
    pub snapshot_date: DateTime<Utc>,
    pub restored: Vec<&'static str>,
    /// Collections absent from the snapshot; their files were emptied
    pub missing: Vec<&'static str>,
    pub settings_restored: bool,
}

impl RestoreReport {
    pub fn summary(&self) -> String {
        let mut summary = format!("Restored: {}", self.restored.join(", "));
        if self.settings_restored {
            summary.push_str(", settings");
        }
        if !self.missing.is_empty() {
            summary.push_str(&format!(" (empty in snapshot: {})", self.missing.join(", ")));
        }
        summary
    }
}

impl RestoreManager {
    pub fn new(paths: MoneyNotePaths) -> Self {
        Self { paths }
    }

    /// Read and check a snapshot file without touching the data directory
    pub fn read_archive(&self, path: &Path) -> MoneyNoteResult<SnapshotArchive> {
        let contents = fs::read_to_string(path)
            .map_err(|e| MoneyNoteError::Io(format!("Failed to read snapshot: {}", e)))?;
        let archive: SnapshotArchive = serde_json::from_str(&contents)
            .map_err(|e| MoneyNoteError::Json(format!("Failed to parse snapshot: {}", e)))?;

        if archive.schema_version > SNAPSHOT_SCHEMA_VERSION {
            return Err(MoneyNoteError::Storage(format!(
                "Snapshot schema version {} is newer than supported version {}",
                archive.schema_version, SNAPSHOT_SCHEMA_VERSION
            )));
        }
        Ok(archive)
    }

    pub fn restore_from_file(&self, path: &Path) -> MoneyNoteResult<RestoreReport> {
        let archive = self.read_archive(path)?;
        self.restore_archive(&archive)
    }

    /// Replace every data file with the snapshot's contents
    pub fn restore_archive(&self, archive: &SnapshotArchive) -> MoneyNoteResult<RestoreReport> {
        self.paths.ensure_directories()?;

        let mut report = RestoreReport {
            snapshot_date: archive.created_at,
            restored: Vec::new(),
            missing: Vec::new(),
            settings_restored: false,
        };

        for (name, path) in self.paths.data_files() {
            match archive.collections.get(name) {
                Some(value) => {
                    write_json_atomic(&path, value)?;
                    report.restored.push(name);
                }
                None => {
                    write_collection::<serde_json::Value, _>(&path, name, &[])?;
                    report.missing.push(name);
                }
            }
        }

        if let Some(settings) = &archive.settings {
            write_json_atomic(self.paths.settings_file(), settings)?;
            report.settings_restored = true;
        }

        tracing::info!(
            snapshot = %archive.created_at,
            restored = report.restored.len(),
            "snapshot restored"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::SnapshotManager;
    use crate::config::settings::BackupRetention;
    use crate::models::{Category, Tag};
    use crate::storage::file_io::read_collection;
    use tempfile::TempDir;

    fn setup() -> (MoneyNotePaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        (paths, temp_dir)
    }

    #[test]
    fn test_snapshot_then_restore() {
        let (paths, _temp) = setup();
        write_collection(paths.categories_file(), "categories", &[Category::new("Food")]).unwrap();

        let manager = SnapshotManager::new(paths.clone(), BackupRetention::default());
        let snapshot = manager.create_snapshot().unwrap();

        write_collection(
            paths.categories_file(),
            "categories",
            &[Category::new("Changed"), Category::new("Again")],
        )
        .unwrap();
        write_collection(paths.tags_file(), "tags", &[Tag::new("later")]).unwrap();

        let report = RestoreManager::new(paths.clone())
            .restore_from_file(&snapshot)
            .unwrap();
        assert!(report.restored.contains(&"categories"));
        assert!(report.missing.contains(&"tags"));

        let categories: Vec<Category> = read_collection(paths.categories_file(), "categories").unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Food");

        let tags: Vec<Tag> = read_collection(paths.tags_file(), "tags").unwrap();
        assert!(tags.is_empty());
    }

    #[test]
    fn test_rejects_newer_schema() {
        let (paths, temp) = setup();
        let path = temp.path().join("future.json");
        fs::write(
            &path,
            r#"{"schema_version": 99, "created_at": "2025-01-01T00:00:00Z", "collections": {}}"#,
        )
        .unwrap();

        let result = RestoreManager::new(paths).restore_from_file(&path);
        assert!(matches!(result, Err(MoneyNoteError::Storage(_))));
    }

    #[test]
    fn test_rejects_garbage() {
        let (paths, temp) = setup();
        let path = temp.path().join("bad.json");
        fs::write(&path, "nope").unwrap();
        assert!(RestoreManager::new(paths).read_archive(&path).is_err());
    }
}
