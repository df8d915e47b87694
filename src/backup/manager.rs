//! Snapshot creation, listing and retention

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::paths::MoneyNotePaths;
use crate::config::settings::BackupRetention;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::storage::file_io::write_json_atomic;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;
const FILENAME_PREFIX: &str = "snapshot-";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S-%3f";

/// Metadata about a snapshot file
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotInfo {
    pub filename: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
    /// First snapshot of its calendar month; kept under the monthly quota
    pub is_monthly: bool,
}

/// On-disk snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotArchive {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub app_version: String,
    /// Contents of `config.json`, if it existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<serde_json::Value>,
    /// Data file contents keyed by collection name
    #[serde(default)]
    pub collections: BTreeMap<String, serde_json::Value>,
}

impl SnapshotArchive {
    /// Number of records per collection
    pub fn record_counts(&self) -> BTreeMap<String, usize> {
        self.collections
            .iter()
            .map(|(name, value)| {
                let count = value
                    .get(name)
                    .and_then(|list| list.as_array())
                    .map_or(0, |list| list.len());
                (name.clone(), count)
            })
            .collect()
    }
}

pub struct SnapshotManager {
    paths: MoneyNotePaths,
    retention: BackupRetention,
}

impl SnapshotManager {
    pub fn new(paths: MoneyNotePaths, retention: BackupRetention) -> Self {
        Self { paths, retention }
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.paths.backup_dir()
    }

    /// Build an archive from the files currently on disk
    pub fn build_archive(&self, created_at: DateTime<Utc>) -> MoneyNoteResult<SnapshotArchive> {
        let mut collections = BTreeMap::new();
        for (name, path) in self.paths.data_files() {
            if let Some(value) = read_json_value(&path)? {
                collections.insert(name.to_string(), value);
            }
        }

        Ok(SnapshotArchive {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            created_at,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            settings: read_json_value(&self.paths.settings_file())?,
            collections,
        })
    }

    /// Write a new snapshot; returns its path
    pub fn create_snapshot(&self) -> MoneyNoteResult<PathBuf> {
        let now = Utc::now();
        let filename = format!("{}{}.json", FILENAME_PREFIX, now.format(TIMESTAMP_FORMAT));
        let path = self.backup_dir().join(filename);

        let archive = self.build_archive(now)?;
        write_json_atomic(&path, &archive)?;

        tracing::info!(path = %path.display(), "snapshot written");
        Ok(path)
    }

    /// Snapshot then prune; returns the new path and the pruned paths
    pub fn create_with_retention(&self) -> MoneyNoteResult<(PathBuf, Vec<PathBuf>)> {
        let path = self.create_snapshot()?;
        let pruned = self.enforce_retention()?;
        Ok((path, pruned))
    }

    /// All snapshots, newest first
    pub fn list_snapshots(&self) -> MoneyNoteResult<Vec<SnapshotInfo>> {
        let dir = self.backup_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();
        let entries = fs::read_dir(&dir)
            .map_err(|e| MoneyNoteError::Io(format!("Failed to read backup directory: {}", e)))?;
        for entry in entries {
            let entry = entry
                .map_err(|e| MoneyNoteError::Io(format!("Failed to read directory entry: {}", e)))?;
            if let Some(info) = parse_snapshot_info(&entry.path()) {
                snapshots.push(info);
            }
        }

        snapshots.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let mut seen_months = HashSet::new();
        for info in &mut snapshots {
            info.is_monthly = seen_months.insert((info.created_at.year(), info.created_at.month()));
        }
        snapshots.reverse();

        Ok(snapshots)
    }

    /// Delete snapshots beyond the retention quotas; returns deleted paths
    pub fn enforce_retention(&self) -> MoneyNoteResult<Vec<PathBuf>> {
        let (monthly, regular): (Vec<_>, Vec<_>) =
            self.list_snapshots()?.into_iter().partition(|s| s.is_monthly);

        let expired = regular
            .into_iter()
            .skip(self.retention.daily_count as usize)
            .chain(monthly.into_iter().skip(self.retention.monthly_count as usize));

        let mut deleted = Vec::new();
        for snapshot in expired {
            fs::remove_file(&snapshot.path)
                .map_err(|e| MoneyNoteError::Io(format!("Failed to delete old snapshot: {}", e)))?;
            deleted.push(snapshot.path);
        }

        if !deleted.is_empty() {
            tracing::debug!(count = deleted.len(), "pruned old snapshots");
        }
        Ok(deleted)
    }

    /// Look up a snapshot by file name
    pub fn get_snapshot(&self, filename: &str) -> MoneyNoteResult<Option<SnapshotInfo>> {
        Ok(self
            .list_snapshots()?
            .into_iter()
            .find(|s| s.filename == filename))
    }

    pub fn latest(&self) -> MoneyNoteResult<Option<SnapshotInfo>> {
        Ok(self.list_snapshots()?.into_iter().next())
    }
}

/// Read a JSON file as a Value; None when the file does not exist
fn read_json_value(path: &Path) -> MoneyNoteResult<Option<serde_json::Value>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| MoneyNoteError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| MoneyNoteError::Json(format!("Failed to parse {}: {}", path.display(), e)))
}

fn parse_snapshot_info(path: &Path) -> Option<SnapshotInfo> {
    let filename = path.file_name()?.to_str()?.to_string();
    let stamp = filename.strip_prefix(FILENAME_PREFIX)?.strip_suffix(".json")?;
    let created_at = parse_snapshot_timestamp(stamp)?;
    let size_bytes = fs::metadata(path).ok()?.len();

    Some(SnapshotInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
        is_monthly: false,
    })
}

fn parse_snapshot_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::storage::file_io::write_collection;
    use tempfile::TempDir;

    fn create_test_manager(daily: u32, monthly: u32) -> (SnapshotManager, MoneyNotePaths, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        let manager = SnapshotManager::new(
            paths.clone(),
            BackupRetention {
                daily_count: daily,
                monthly_count: monthly,
            },
        );
        (manager, paths, temp_dir)
    }

    fn touch_snapshot(paths: &MoneyNotePaths, stamp: &str) {
        fs::write(
            paths.backup_dir().join(format!("snapshot-{}.json", stamp)),
            "{}",
        )
        .unwrap();
    }

    #[test]
    fn test_create_snapshot_contains_collections() {
        let (manager, paths, _temp) = create_test_manager(3, 2);
        write_collection(paths.categories_file(), "categories", &[Category::new("Food")]).unwrap();

        let path = manager.create_snapshot().unwrap();
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("snapshot-"));

        let archive: SnapshotArchive =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(archive.schema_version, SNAPSHOT_SCHEMA_VERSION);
        assert_eq!(archive.record_counts().get("categories"), Some(&1));
        assert!(!archive.collections.contains_key("expenses"));
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_snapshot_timestamp("20251127-143022-456").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 11, 27));
        assert!(parse_snapshot_timestamp("20251127-143022").is_none());
        assert!(parse_snapshot_timestamp("garbage").is_none());
    }

    #[test]
    fn test_list_marks_first_of_month() {
        let (manager, paths, _temp) = create_test_manager(10, 10);
        touch_snapshot(&paths, "20250105-100000-000");
        touch_snapshot(&paths, "20250120-100000-000");
        touch_snapshot(&paths, "20250203-100000-000");
        fs::write(paths.backup_dir().join("notes.txt"), "ignored").unwrap();

        let list = manager.list_snapshots().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list[0].filename.contains("20250203"));
        assert!(list[0].is_monthly);
        assert!(!list[1].is_monthly);
        assert!(list[2].is_monthly);
    }

    #[test]
    fn test_retention_policy() {
        let (manager, paths, _temp) = create_test_manager(2, 1);
        touch_snapshot(&paths, "20250101-100000-000");
        touch_snapshot(&paths, "20250110-100000-000");
        touch_snapshot(&paths, "20250111-100000-000");
        touch_snapshot(&paths, "20250112-100000-000");
        touch_snapshot(&paths, "20250201-100000-000");

        let deleted = manager.enforce_retention().unwrap();
        let deleted_names: Vec<_> = deleted
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(deleted_names.len(), 2);
        assert!(deleted_names.contains(&"snapshot-20250110-100000-000.json".to_string()));
        assert!(deleted_names.contains(&"snapshot-20250101-100000-000.json".to_string()));

        assert_eq!(manager.list_snapshots().unwrap().len(), 3);
    }

    #[test]
    fn test_latest_and_lookup() {
        let (manager, _paths, _temp) = create_test_manager(3, 2);
        assert!(manager.latest().unwrap().is_none());

        let path = manager.create_snapshot().unwrap();
        let latest = manager.latest().unwrap().unwrap();
        assert_eq!(latest.path, path);
        assert!(manager.get_snapshot(&latest.filename).unwrap().is_some());
        assert!(manager.get_snapshot("snapshot-nope.json").unwrap().is_none());
    }
}
