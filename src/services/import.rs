//! CSV Import service
//!
//! Imports expenses from CSV files: column mapping (detected from headers or
//! given), date and amount parsing, category lookup by name, duplicate
//! detection against existing expenses, and batch import.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use csv::{Reader, StringRecord};

use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{CategoryId, CategoryKind, Expense, Money, PaymentMethod};
use crate::services::{CategoryService, ExpenseService};
use crate::storage::Storage;

/// Date formats tried after the mapping's own format
const FALLBACK_DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d/%m/%y", "%Y/%m/%d", "%m-%d-%Y",
    "%d-%m-%Y",
];

/// Column mapping configuration for CSV import
#[derive(Debug, Clone)]
pub struct ColumnMapping {
    pub date_column: usize,
    pub amount_column: usize,
    pub description_column: Option<usize>,
    /// Category looked up by name
    pub category_column: Option<usize>,
    pub notes_column: Option<usize>,
    pub payment_method_column: Option<usize>,
    /// Date format string (e.g., "%Y-%m-%d", "%m/%d/%Y")
    pub date_format: String,
    pub has_header: bool,
    pub delimiter: char,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            date_column: 0,
            amount_column: 1,
            description_column: Some(2),
            category_column: Some(3),
            notes_column: None,
            payment_method_column: None,
            date_format: "%Y-%m-%d".to_string(),
            has_header: true,
            delimiter: ',',
        }
    }
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bank statement layout: date, description, amount
    pub fn simple_bank() -> Self {
        Self {
            date_column: 0,
            amount_column: 2,
            description_column: Some(1),
            category_column: None,
            date_format: "%m/%d/%Y".to_string(),
            ..Self::default()
        }
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Detect the mapping from a header row. Columns that aren't recognized
    /// keep their default position.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut mapping = Self {
            description_column: None,
            category_column: None,
            ..Self::default()
        };
        let mut seen_amount = false;

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();
            if h.contains("date") || h.contains("posted") {
                mapping.date_column = idx;
            } else if (h.contains("amount") || h.contains("debit") || h.contains("value"))
                && !seen_amount
            {
                mapping.amount_column = idx;
                seen_amount = true;
            } else if h.contains("subcategory") {
                continue;
            } else if h.contains("category") {
                mapping.category_column = Some(idx);
            } else if h.contains("description")
                || h.contains("payee")
                || h.contains("merchant")
                || h.contains("name")
            {
                mapping.description_column = Some(idx);
            } else if h.contains("memo") || h.contains("note") {
                mapping.notes_column = Some(idx);
            } else if h.contains("payment") || h.contains("method") {
                mapping.payment_method_column = Some(idx);
            }
        }
        mapping
    }

    fn open<R: std::io::Read>(&self, reader: R) -> Reader<R> {
        csv::ReaderBuilder::new()
            .has_headers(self.has_header)
            .delimiter(self.delimiter as u8)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader)
    }
}

/// A parsed row from the CSV before import
#[derive(Debug, Clone)]
pub struct ParsedRow {
    pub date: NaiveDate,
    pub amount: Money,
    pub description: String,
    pub category: Option<String>,
    pub notes: String,
    pub payment_method: Option<PaymentMethod>,
    /// Data row number, 1-based, header excluded
    pub row_number: usize,
}

/// Status of a row in the import preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportStatus {
    New,
    /// Same date, amount and description as an existing expense
    Duplicate,
    Error(String),
}

/// Preview entry for import review
#[derive(Debug, Clone)]
pub struct ImportPreviewEntry {
    pub row_number: usize,
    pub row: Option<ParsedRow>,
    /// Category the row will be filed under
    pub category_id: Option<CategoryId>,
    pub status: ImportStatus,
}

/// Options for turning a preview into expenses
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Used for rows without a category, or whose category is unknown when
    /// `create_categories` is off. Falls back to "Other".
    pub default_category: Option<CategoryId>,
    /// Create expense categories named in the file that don't exist yet
    pub create_categories: bool,
    /// Import rows flagged as duplicates anyway
    pub allow_duplicates: bool,
}

/// Result of a completed import
#[derive(Debug, Clone, Default)]
pub struct ImportResult {
    pub imported: usize,
    pub duplicates_skipped: usize,
    pub errors: usize,
    pub total: Money,
    pub categories_created: Vec<String>,
    /// Error messages by row number
    pub error_messages: HashMap<usize, String>,
}

/// Service for CSV import
pub struct ImportService<'a> {
    storage: &'a Storage,
}

impl<'a> ImportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Read a CSV file, detecting the column mapping from its header row
    /// when none is given
    pub fn parse_file(
        &self,
        path: &std::path::Path,
        mapping: Option<ColumnMapping>,
    ) -> MoneyNoteResult<(ColumnMapping, Vec<Result<ParsedRow, String>>)> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MoneyNoteError::Import(format!("Cannot read {}: {}", path.display(), e))
        })?;

        let mapping = match mapping {
            Some(mapping) => mapping,
            None => {
                let mut reader = csv::ReaderBuilder::new()
                    .has_headers(true)
                    .from_reader(content.as_bytes());
                let headers = reader
                    .headers()
                    .map_err(|e| MoneyNoteError::Import(format!("Invalid CSV header: {}", e)))?
                    .clone();
                ColumnMapping::from_headers(&headers)
            }
        };

        let rows = self.parse_csv(content.as_bytes(), &mapping);
        Ok((mapping, rows))
    }

    /// Parse CSV data into rows; unreadable rows become `Err` entries
    pub fn parse_csv<R: std::io::Read>(
        &self,
        data: R,
        mapping: &ColumnMapping,
    ) -> Vec<Result<ParsedRow, String>> {
        let mut reader = mapping.open(data);
        reader
            .records()
            .enumerate()
            .map(|(idx, result)| {
                let record = result.map_err(|e| format!("Error reading CSV record: {}", e))?;
                parse_record(&record, idx + 1, mapping)
            })
            .collect()
    }

    /// Resolve categories and flag duplicates
    pub fn generate_preview(
        &self,
        parsed: &[Result<ParsedRow, String>],
    ) -> MoneyNoteResult<Vec<ImportPreviewEntry>> {
        let existing: HashSet<(NaiveDate, i64, String)> = self
            .storage
            .expenses
            .get_all()?
            .iter()
            .map(duplicate_key_of)
            .collect();
        let categories = CategoryService::new(self.storage);

        let mut preview = Vec::with_capacity(parsed.len());
        for (idx, result) in parsed.iter().enumerate() {
            let entry = match result {
                Ok(row) => {
                    let category_id = match row.category.as_deref() {
                        Some(name) => categories
                            .find(name, Some(CategoryKind::Expense))?
                            .filter(|c| c.kind == CategoryKind::Expense)
                            .map(|c| c.id),
                        None => None,
                    };
                    let key = (row.date, row.amount.cents(), row.description.to_lowercase());
                    let status = if existing.contains(&key) {
                        ImportStatus::Duplicate
                    } else {
                        ImportStatus::New
                    };
                    ImportPreviewEntry {
                        row_number: row.row_number,
                        row: Some(row.clone()),
                        category_id,
                        status,
                    }
                }
                Err(e) => ImportPreviewEntry {
                    row_number: idx + 1,
                    row: None,
                    category_id: None,
                    status: ImportStatus::Error(e.clone()),
                },
            };
            preview.push(entry);
        }
        Ok(preview)
    }

    /// Import the new rows of a preview as expenses
    pub fn import_from_preview(
        &self,
        preview: &[ImportPreviewEntry],
        options: &ImportOptions,
    ) -> MoneyNoteResult<ImportResult> {
        let categories = CategoryService::new(self.storage);
        let default_category = match options.default_category {
            Some(id) => id,
            None => categories.fallback_category(CategoryKind::Expense)?.id,
        };

        let mut result = ImportResult::default();
        let mut created: HashMap<String, CategoryId> = HashMap::new();
        let mut expenses = Vec::new();

        for entry in preview {
            let row = match (&entry.status, &entry.row) {
                (ImportStatus::Error(e), _) => {
                    result.errors += 1;
                    result.error_messages.insert(entry.row_number, e.clone());
                    continue;
                }
                (_, None) => {
                    result.errors += 1;
                    result
                        .error_messages
                        .insert(entry.row_number, "row could not be read".to_string());
                    continue;
                }
                (ImportStatus::Duplicate, Some(_)) if !options.allow_duplicates => {
                    result.duplicates_skipped += 1;
                    continue;
                }
                (_, Some(row)) => row,
            };

            let category_id = match (entry.category_id, row.category.as_deref()) {
                (Some(id), _) => id,
                (None, Some(name)) if options.create_categories => {
                    let key = name.to_lowercase();
                    match created.get(&key) {
                        Some(id) => *id,
                        None => {
                            let category =
                                categories.create(name, CategoryKind::Expense, None, None)?;
                            result.categories_created.push(category.name.clone());
                            created.insert(key, category.id);
                            category.id
                        }
                    }
                }
                _ => default_category,
            };

            let mut expense = Expense::new(row.amount, row.date, category_id);
            expense.description = row.description.clone();
            expense.notes = row.notes.clone();
            if let Some(method) = row.payment_method {
                expense.payment_method = method;
            }
            match expense.validate() {
                Ok(()) => {
                    result.total += expense.amount;
                    expenses.push(expense);
                }
                Err(e) => {
                    result.errors += 1;
                    result.error_messages.insert(entry.row_number, e.to_string());
                }
            }
        }

        result.imported = expenses.len();
        if !expenses.is_empty() {
            ExpenseService::new(self.storage).insert_many(expenses)?;
        }
        tracing::info!(
            imported = result.imported,
            duplicates = result.duplicates_skipped,
            errors = result.errors,
            "CSV import finished"
        );

        Ok(result)
    }
}

fn duplicate_key_of(expense: &Expense) -> (NaiveDate, i64, String) {
    (
        expense.date,
        expense.amount.cents(),
        expense.description.to_lowercase(),
    )
}

fn parse_record(
    record: &StringRecord,
    row_number: usize,
    mapping: &ColumnMapping,
) -> Result<ParsedRow, String> {
    let field = |col: Option<usize>| {
        col.and_then(|c| record.get(c))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let date_str = record
        .get(mapping.date_column)
        .ok_or_else(|| format!("Row {}: missing date column", row_number))?
        .trim();
    let date = parse_date(date_str, &mapping.date_format)
        .map_err(|e| format!("Row {}: {}", row_number, e))?;

    let amount_str = record
        .get(mapping.amount_column)
        .ok_or_else(|| format!("Row {}: missing amount column", row_number))?
        .trim();
    // Bank exports write outflows as negatives; an expense is always positive
    let amount = parse_amount(amount_str)
        .map_err(|e| format!("Row {}: {}", row_number, e))?
        .abs();
    if amount.is_zero() {
        return Err(format!("Row {}: amount is zero", row_number));
    }

    let payment_method = match field(mapping.payment_method_column) {
        Some(method) => Some(
            method
                .parse::<PaymentMethod>()
                .map_err(|e| format!("Row {}: {}", row_number, e))?,
        ),
        None => None,
    };

    Ok(ParsedRow {
        date,
        amount,
        description: field(mapping.description_column).unwrap_or_default(),
        category: field(mapping.category_column),
        notes: field(mapping.notes_column).unwrap_or_default(),
        payment_method,
        row_number,
    })
}

fn parse_date(s: &str, primary_format: &str) -> Result<NaiveDate, String> {
    std::iter::once(primary_format)
        .chain(FALLBACK_DATE_FORMATS)
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .ok_or_else(|| format!("could not parse date '{}'", s))
}

/// Parse an amount, accepting currency symbols, thousands separators and the
/// accounting `(12.00)` negative form
fn parse_amount(s: &str) -> Result<Money, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '(' | ')'))
        .collect();

    let (is_negative, value) = if cleaned.starts_with('(') && cleaned.ends_with(')') {
        (true, &cleaned[1..cleaned.len() - 1])
    } else if let Some(stripped) = cleaned.strip_prefix('-') {
        (true, stripped)
    } else {
        (false, cleaned.as_str())
    };

    Money::parse(value)
        .map(|m| if is_negative { -m } else { m })
        .map_err(|e| format!("could not parse amount '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::storage::initialize_storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_simple_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let csv_data = "Date,Amount,Description,Category\n\
                        2025-01-15,-50.00,Grocery run,Food\n\
                        2025-01-16,\"$1,200.00\",Rent,Housing";
        let rows = service.parse_csv(csv_data.as_bytes(), &ColumnMapping::new());
        assert_eq!(rows.len(), 2);

        let first = rows[0].as_ref().unwrap();
        assert_eq!(first.date, d(2025, 1, 15));
        assert_eq!(first.amount.cents(), 5000);
        assert_eq!(first.description, "Grocery run");
        assert_eq!(first.category.as_deref(), Some("Food"));

        let second = rows[1].as_ref().unwrap();
        assert_eq!(second.amount.cents(), 120000);
        assert_eq!(second.row_number, 2);
    }

    #[test]
    fn test_parse_errors_are_per_row() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let csv_data = "Date,Amount,Description\nnot-a-date,5.00,x\n2025-01-15,0,y\n01/20/2025,(12.00),z";
        let mapping = ColumnMapping::new().with_date_format("%m/%d/%Y");
        let rows = service.parse_csv(csv_data.as_bytes(), &mapping);
        assert!(rows[0].is_err());
        assert!(rows[1].as_ref().unwrap_err().contains("zero"));
        let last = rows[2].as_ref().unwrap();
        assert_eq!(last.date, d(2025, 1, 20));
        assert_eq!(last.amount.cents(), 1200);
    }

    #[test]
    fn test_detect_mapping() {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader("Posted Date,Merchant,Debit,Category,Memo,Payment Method".as_bytes());
        let headers = reader.records().next().unwrap().unwrap();
        let mapping = ColumnMapping::from_headers(&headers);

        assert_eq!(mapping.date_column, 0);
        assert_eq!(mapping.description_column, Some(1));
        assert_eq!(mapping.amount_column, 2);
        assert_eq!(mapping.category_column, Some(3));
        assert_eq!(mapping.notes_column, Some(4));
        assert_eq!(mapping.payment_method_column, Some(5));
    }

    #[test]
    fn test_import_resolves_categories_and_skips_duplicates() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let csv_data = "Date,Amount,Description,Category\n\
                        2025-01-15,50.00,Groceries,food\n\
                        2025-01-16,20.00,Mystery,Nonexistent\n\
                        bad,1,x,Food";
        let rows = service.parse_csv(csv_data.as_bytes(), &ColumnMapping::new());
        let preview = service.generate_preview(&rows).unwrap();
        assert!(preview[0].category_id.is_some());
        assert!(preview[1].category_id.is_none());

        let result = service
            .import_from_preview(&preview, &ImportOptions::default())
            .unwrap();
        assert_eq!(result.imported, 2);
        assert_eq!(result.errors, 1);
        assert_eq!(result.total.cents(), 7000);

        let other = storage
            .categories
            .get_by_name("Other", CategoryKind::Expense)
            .unwrap()
            .unwrap();
        let mystery = storage
            .expenses
            .find(|e| e.description == "Mystery")
            .unwrap()
            .unwrap();
        assert_eq!(mystery.category_id, other.id);

        let again = service.generate_preview(&rows).unwrap();
        assert_eq!(again[0].status, ImportStatus::Duplicate);
        let result = service
            .import_from_preview(&again, &ImportOptions::default())
            .unwrap();
        assert_eq!(result.imported, 0);
        assert_eq!(result.duplicates_skipped, 2);
        assert_eq!(storage.expenses.count().unwrap(), 2);
    }

    #[test]
    fn test_import_creates_missing_categories() {
        let (_temp_dir, storage) = create_test_storage();
        let service = ImportService::new(&storage);

        let csv_data = "Date,Amount,Description,Category\n\
                        2025-02-01,9.99,Stream,Subscriptions\n\
                        2025-03-01,9.99,Stream,subscriptions";
        let rows = service.parse_csv(csv_data.as_bytes(), &ColumnMapping::new());
        let preview = service.generate_preview(&rows).unwrap();
        let result = service
            .import_from_preview(
                &preview,
                &ImportOptions {
                    create_categories: true,
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(result.imported, 2);
        assert_eq!(result.categories_created, vec!["Subscriptions"]);
    }
}
