//! CLI commands for data import
//!
//! Full imports read a JSON or YAML export and either merge it into the
//! current data or replace it. CSV imports bring in expenses, detecting the
//! column mapping from the header row unless columns are given explicitly.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::backup::SnapshotManager;
use crate::config::{MoneyNotePaths, Settings};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::export::{apply_import, import_from_json, import_from_yaml, FullExport, ImportMode};
use crate::models::CategoryKind;
use crate::services::{CategoryService, ColumnMapping, ImportOptions, ImportService, ImportStatus};
use crate::storage::Storage;

fn parse_mode(s: &str) -> Result<ImportMode, String> {
    s.parse()
}

/// Import subcommands
#[derive(Subcommand)]
pub enum ImportCommands {
    /// Import a JSON export
    Json {
        /// Export file
        file: PathBuf,
        /// merge (keep current data) or replace (discard it)
        #[arg(short, long, value_parser = parse_mode, default_value = "merge")]
        mode: ImportMode,
        /// Required for replace mode
        #[arg(short, long)]
        force: bool,
    },

    /// Import a YAML export
    Yaml {
        file: PathBuf,
        #[arg(short, long, value_parser = parse_mode, default_value = "merge")]
        mode: ImportMode,
        #[arg(short, long)]
        force: bool,
    },

    /// Import expenses from a CSV file
    Csv(CsvImportArgs),
}

/// Options for `import csv`
#[derive(Args)]
pub struct CsvImportArgs {
    /// CSV file
    file: PathBuf,
    /// Date column (0-based)
    #[arg(long)]
    date_col: Option<usize>,
    /// Amount column (0-based)
    #[arg(long)]
    amount_col: Option<usize>,
    /// Description column (0-based)
    #[arg(long)]
    description_col: Option<usize>,
    /// Category name column (0-based)
    #[arg(long)]
    category_col: Option<usize>,
    /// chrono date format, e.g. %m/%d/%Y
    #[arg(long)]
    date_format: Option<String>,
    /// Field delimiter
    #[arg(long, default_value = ",")]
    delimiter: char,
    /// The file has no header row
    #[arg(long)]
    no_header: bool,
    /// Category for rows without a known one (defaults to "Other")
    #[arg(short, long)]
    category: Option<String>,
    /// Create categories named in the file that don't exist
    #[arg(long)]
    create_categories: bool,
    /// Import rows that look like duplicates
    #[arg(long)]
    allow_duplicates: bool,
    /// Show the preview without importing
    #[arg(long)]
    dry_run: bool,
}

impl CsvImportArgs {
    fn explicit_mapping(&self) -> Option<ColumnMapping> {
        let explicit = self.date_col.is_some()
            || self.amount_col.is_some()
            || self.description_col.is_some()
            || self.category_col.is_some()
            || self.no_header
            || self.delimiter != ',';
        if !explicit {
            return None;
        }

        let mut mapping = ColumnMapping::new()
            .with_header(!self.no_header)
            .with_delimiter(self.delimiter);
        if let Some(col) = self.date_col {
            mapping.date_column = col;
        }
        if let Some(col) = self.amount_col {
            mapping.amount_column = col;
        }
        if self.description_col.is_some() {
            mapping.description_column = self.description_col;
        }
        if self.category_col.is_some() {
            mapping.category_column = self.category_col;
        }
        Some(mapping)
    }
}

/// Handle an import command
pub fn handle_import_command(
    storage: &Storage,
    paths: &MoneyNotePaths,
    settings: &mut Settings,
    cmd: ImportCommands,
) -> MoneyNoteResult<()> {
    match cmd {
        ImportCommands::Json { file, mode, force } => {
            let export = import_from_json(&read_file(&file)?)?;
            apply_full(storage, paths, settings, export, mode, force)
        }
        ImportCommands::Yaml { file, mode, force } => {
            let export = import_from_yaml(&read_file(&file)?)?;
            apply_full(storage, paths, settings, export, mode, force)
        }
        ImportCommands::Csv(args) => import_csv(storage, settings, args),
    }
}

fn read_file(path: &Path) -> MoneyNoteResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| MoneyNoteError::Import(format!("Cannot read {}: {}", path.display(), e)))
}

fn apply_full(
    storage: &Storage,
    paths: &MoneyNotePaths,
    settings: &mut Settings,
    export: FullExport,
    mode: ImportMode,
    force: bool,
) -> MoneyNoteResult<()> {
    let counts = &export.metadata.counts;
    println!(
        "Export from {} (schema {}): {} records",
        export.metadata.exported_at.format("%Y-%m-%d %H:%M UTC"),
        export.metadata.schema_version,
        counts.total()
    );

    if mode == ImportMode::Replace {
        if !force {
            println!("WARNING: replace mode discards ALL current data!");
            println!("To proceed, run again with --force flag.");
            return Ok(());
        }
        let snapshot = SnapshotManager::new(paths.clone(), settings.backup_retention.clone())
            .create_snapshot()?;
        println!("Pre-import snapshot saved: {}", snapshot.display());
    }

    let summary = apply_import(storage, settings, export, mode)?;
    println!("Import complete ({}).", summary.mode);
    println!("  {}", summary.summary());
    Ok(())
}

fn import_csv(storage: &Storage, settings: &Settings, args: CsvImportArgs) -> MoneyNoteResult<()> {
    if !args.file.is_file() {
        return Err(MoneyNoteError::Import(format!(
            "File not found: {}",
            args.file.display()
        )));
    }

    let service = ImportService::new(storage);
    let mut mapping = args.explicit_mapping();
    if let (Some(m), Some(format)) = (mapping.as_mut(), args.date_format.as_deref()) {
        m.date_format = format.to_string();
    }
    let (mapping, parsed) = match (mapping, args.date_format.as_deref()) {
        (Some(mapping), _) => service.parse_file(&args.file, Some(mapping))?,
        (None, Some(format)) => {
            // Detect columns first, then re-parse with the requested format
            let (detected, _) = service.parse_file(&args.file, None)?;
            service.parse_file(&args.file, Some(detected.with_date_format(format)))?
        }
        (None, None) => service.parse_file(&args.file, None)?,
    };
    tracing::debug!(?mapping, rows = parsed.len(), "csv parsed");

    if parsed.is_empty() {
        println!("No rows found in CSV file.");
        return Ok(());
    }

    let preview = service.generate_preview(&parsed)?;
    let new_count = preview.iter().filter(|e| e.status == ImportStatus::New).count();
    let dup_count = preview
        .iter()
        .filter(|e| e.status == ImportStatus::Duplicate)
        .count();
    let err_count = preview
        .iter()
        .filter(|e| matches!(e.status, ImportStatus::Error(_)))
        .count();

    println!("Import Preview for {}", args.file.display());
    println!("{}", "=".repeat(40));
    println!("  New expenses:       {}", new_count);
    println!("  Duplicates (skip):  {}", dup_count);
    println!("  Errors:             {}", err_count);
    println!();

    for entry in preview
        .iter()
        .filter(|e| e.status == ImportStatus::New)
        .take(5)
    {
        if let Some(row) = &entry.row {
            println!(
                "  {} {:>12}  {}",
                row.date,
                row.amount.format_with_symbol(&settings.currency_symbol),
                row.description
            );
        }
    }
    if new_count > 5 {
        println!("  ... and {} more", new_count - 5);
    }

    let importable = new_count + if args.allow_duplicates { dup_count } else { 0 };
    if args.dry_run || importable == 0 {
        if importable == 0 {
            println!("No new expenses to import.");
        }
        return Ok(());
    }

    let default_category = args
        .category
        .as_deref()
        .map(|c| CategoryService::new(storage).require(c, Some(CategoryKind::Expense)))
        .transpose()?
        .map(|c| c.id);
    let options = ImportOptions {
        default_category,
        create_categories: args.create_categories,
        allow_duplicates: args.allow_duplicates,
    };
    let result = service.import_from_preview(&preview, &options)?;

    println!();
    println!("Import Complete!");
    println!(
        "  Imported:    {} ({})",
        result.imported,
        result.total.format_with_symbol(&settings.currency_symbol)
    );
    println!("  Skipped:     {}", result.duplicates_skipped);
    if !result.categories_created.is_empty() {
        println!("  New categories: {}", result.categories_created.join(", "));
    }
    if !result.error_messages.is_empty() {
        println!("  Errors:      {}", result.errors);
        let mut errors: Vec<_> = result.error_messages.iter().collect();
        errors.sort_by_key(|(row, _)| **row);
        for (row, msg) in errors {
            println!("    Row {}: {}", row, msg);
        }
    }

    Ok(())
}
