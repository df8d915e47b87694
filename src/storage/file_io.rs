//! File I/O helpers
//!
//! Every write goes through a sibling temp file that is synced and renamed
//! over the target, so a crash leaves either the old or the new contents.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::MoneyNoteError;

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read JSON from a file, returning the default value if the file doesn't exist
pub fn read_json<T, P>(path: P) -> Result<T, MoneyNoteError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| MoneyNoteError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| MoneyNoteError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write a file atomically using the given writer callback
pub fn write_atomic<P, F>(path: P, write: F) -> Result<(), MoneyNoteError>
where
    P: AsRef<Path>,
    F: FnOnce(&mut BufWriter<File>) -> Result<(), MoneyNoteError>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MoneyNoteError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    let temp_path = temp_path_for(path);
    let result = (|| {
        let file = File::create(&temp_path)
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to create temp file: {}", e)))?;
        let mut writer = BufWriter::new(file);
        write(&mut writer)?;
        writer
            .flush()
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to flush data: {}", e)))?;
        writer
            .get_ref()
            .sync_all()
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to sync data: {}", e)))?;
        fs::rename(&temp_path, path)
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to rename temp file: {}", e)))
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Write pretty-printed JSON atomically
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), MoneyNoteError>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    write_atomic(path, |writer| {
        serde_json::to_writer_pretty(writer, data)
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to serialize data: {}", e)))
    })
}

/// Read a data file shaped `{ "<key>": [ ... ] }`
///
/// A missing file or missing key yields an empty list.
pub fn read_collection<T, P>(path: P, key: &str) -> Result<Vec<T>, MoneyNoteError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let mut file: BTreeMap<String, Vec<T>> = read_json(path)?;
    Ok(file.remove(key).unwrap_or_default())
}

/// Write a data file shaped `{ "<key>": [ ... ] }`
pub fn write_collection<T, P>(path: P, key: &str, items: &[T]) -> Result<(), MoneyNoteError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let mut file = BTreeMap::new();
    file.insert(key, items);
    write_json_atomic(path, &file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Sample {
        name: String,
        value: i32,
    }

    fn sample() -> Sample {
        Sample {
            name: "groceries".to_string(),
            value: 42,
        }
    }

    #[test]
    fn test_read_missing_file_returns_default() {
        let temp_dir = TempDir::new().unwrap();
        let data: Sample = read_json(temp_dir.path().join("missing.json")).unwrap();
        assert_eq!(data, Sample::default());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("sample.json");

        write_json_atomic(&path, &sample()).unwrap();
        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!temp_dir.path().join("nested").join("sample.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "not json").unwrap();

        let err = read_json::<Sample, _>(&path).unwrap_err();
        assert!(matches!(err, MoneyNoteError::Storage(_)));
    }

    #[test]
    fn test_failed_write_keeps_old_contents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.json");
        write_json_atomic(&path, &sample()).unwrap();

        let result = write_atomic(&path, |_| Err(MoneyNoteError::Storage("boom".into())));
        assert!(result.is_err());

        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
        assert!(!temp_dir.path().join("sample.json.tmp").exists());
    }

    #[test]
    fn test_collection_shape() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("items.json");

        write_collection(&path, "items", &[sample()]).unwrap();
        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["items"][0]["name"], "groceries");

        let items: Vec<Sample> = read_collection(&path, "items").unwrap();
        assert_eq!(items, vec![sample()]);

        let other: Vec<Sample> = read_collection(&path, "other").unwrap();
        assert!(other.is_empty());
    }
}
