//! YAML Export functionality
//!
//! Same document as the JSON export, in a human-readable form.

use std::io::Write;

use crate::config::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::export::json::{FullExport, RecordCounts};
use crate::storage::Storage;

/// Export the full data set to YAML
pub fn export_full_yaml<W: Write>(
    storage: &Storage,
    settings: &Settings,
    writer: &mut W,
) -> MoneyNoteResult<RecordCounts> {
    let export = FullExport::from_storage(storage, settings)?;
    let export_err = |e: std::io::Error| MoneyNoteError::Export(e.to_string());

    writeln!(writer, "# MoneyNote Full Export").map_err(export_err)?;
    writeln!(writer, "# Generated: {}", export.metadata.exported_at).map_err(export_err)?;
    writeln!(writer, "# App Version: {}", export.metadata.app_version).map_err(export_err)?;
    writeln!(writer, "# Records: {}", export.metadata.counts.total()).map_err(export_err)?;
    writeln!(writer).map_err(export_err)?;

    serde_yaml::to_writer(writer, &export).map_err(|e| MoneyNoteError::Export(e.to_string()))?;

    Ok(export.metadata.counts)
}

/// Parse and validate a YAML export
pub fn import_from_yaml(yaml_str: &str) -> MoneyNoteResult<FullExport> {
    let export: FullExport =
        serde_yaml::from_str(yaml_str).map_err(|e| MoneyNoteError::Import(e.to_string()))?;

    export.validate().map_err(MoneyNoteError::Import)?;

    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Income, Money, Tag};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_yaml_export_and_import() {
        let (_temp_dir, storage) = create_test_storage();
        storage.categories.upsert(Category::new("Groceries")).unwrap();
        storage.tags.upsert(Tag::new("weekly")).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        storage
            .incomes
            .upsert(Income::new(Money::from_cents(250000), date, "Employer"))
            .unwrap();

        let mut output = Vec::new();
        let counts = export_full_yaml(&storage, &Settings::default(), &mut output).unwrap();
        assert_eq!(counts.total(), 3);

        let yaml = String::from_utf8(output).unwrap();
        assert!(yaml.starts_with("# MoneyNote Full Export"));
        assert!(yaml.contains("Groceries"));

        let imported = import_from_yaml(&yaml).unwrap();
        assert_eq!(imported.incomes[0].source, "Employer");
        assert_eq!(imported.tags[0].name, "weekly");
    }

    #[test]
    fn test_yaml_import_rejects_garbage() {
        assert!(import_from_yaml("just: [a, list").is_err());
    }
}
