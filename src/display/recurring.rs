//! Recurring transaction display formatting

use tabled::Tabled;

use crate::models::{RecurringTransaction, TransactionKind};
use crate::services::recurring::label;
use crate::services::{GeneratedRecord, ProcessReport, UpcomingOccurrence};

use super::report::truncate;
use super::{render_table, NameLookup};

#[derive(Tabled)]
struct RecurringRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Schedule")]
    schedule: String,
    #[tabled(rename = "Next")]
    next: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status(rule: &RecurringTransaction) -> &'static str {
    if rule.active {
        "active"
    } else if rule.is_finished() {
        "finished"
    } else {
        "paused"
    }
}

pub fn format_recurring_table(rules: &[RecurringTransaction], symbol: &str) -> String {
    if rules.is_empty() {
        return "No recurring transactions found.\n".to_string();
    }

    let rows = rules
        .iter()
        .map(|r| RecurringRow {
            id: r.id.to_string(),
            kind: r.kind.to_string(),
            description: truncate(&label(r), 28),
            amount: r.amount.format_with_symbol(symbol),
            schedule: r.frequency.describe(r.interval),
            next: if r.active {
                r.next_date.to_string()
            } else {
                "-".to_string()
            },
            status: status(r).to_string(),
        })
        .collect();

    format!("{}\n", render_table(rows, &[3]))
}

pub fn format_recurring_details(
    rule: &RecurringTransaction,
    names: &NameLookup,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Recurring:   {}\n", rule.id));
    output.push_str(&format!("Kind:        {}\n", rule.kind));
    output.push_str(&format!("Amount:      {}\n", rule.amount.format_with_symbol(symbol)));
    if !rule.description.is_empty() {
        output.push_str(&format!("Description: {}\n", rule.description));
    }
    if let Some(category_id) = rule.category_id {
        output.push_str(&format!(
            "Category:    {}\n",
            names.category_path(category_id, rule.subcategory_id)
        ));
    }
    match rule.kind {
        TransactionKind::Expense => {
            output.push_str(&format!("Payment:     {}\n", rule.payment_method));
            if !rule.tags.is_empty() {
                output.push_str(&format!("Tags:        {}\n", names.tags(&rule.tags)));
            }
        }
        TransactionKind::Income => {
            output.push_str(&format!("Source:      {}\n", rule.source));
        }
    }
    output.push_str(&format!(
        "Schedule:    {} from {}\n",
        rule.frequency.describe(rule.interval),
        rule.start_date
    ));
    if let Some(end) = rule.end_date {
        output.push_str(&format!("Ends:        {}\n", end));
    }
    output.push_str(&format!("Status:      {}\n", status(rule)));
    if rule.active {
        output.push_str(&format!("Next:        {}\n", rule.next_date));
    }
    output.push_str(&format!("Executed:    {} time(s)\n", rule.execution_count));
    if let Some(last) = rule.last_executed {
        output.push_str(&format!("Last run:    {}\n", last));
    }
    output.push_str(&format!(
        "Per month:   ~{}\n",
        rule.monthly_equivalent().format_with_symbol(symbol)
    ));

    output
}

fn record_line(record: &GeneratedRecord, symbol: &str) -> String {
    let (id, what) = match record {
        GeneratedRecord::Expense(e) => (e.id.to_string(), e.description.clone()),
        GeneratedRecord::Income(i) => (i.id.to_string(), i.source.clone()),
    };
    format!(
        "  {}  {:<8} {:>12}  {}  [{}]\n",
        record.date(),
        record.kind(),
        record.amount().format_with_symbol(symbol),
        truncate(&what, 30),
        id
    )
}

/// Format the outcome of processing due recurring transactions
pub fn format_process_report(report: &ProcessReport, symbol: &str) -> String {
    if report.is_empty() {
        return "No recurring transactions were due.\n".to_string();
    }

    let mut output = String::new();
    if !report.generated.is_empty() {
        output.push_str(&format!("Generated {} record(s):\n", report.generated.len()));
        for (_, record) in &report.generated {
            output.push_str(&record_line(record, symbol));
        }
        output.push_str(&format!(
            "Expenses: {}  Income: {}\n",
            report.expense_total().format_with_symbol(symbol),
            report.income_total().format_with_symbol(symbol)
        ));
    }
    for id in &report.finished {
        output.push_str(&format!("Finished (past end date): {}\n", id));
    }
    for (id, reason) in &report.failed {
        output.push_str(&format!("Failed {}: {}\n", id, reason));
    }
    output
}

/// Format a single generated record (run-now, template apply)
pub fn format_generated(record: &GeneratedRecord, symbol: &str) -> String {
    record_line(record, symbol)
}

pub fn format_upcoming(upcoming: &[UpcomingOccurrence], days: u64, symbol: &str) -> String {
    if upcoming.is_empty() {
        return format!("Nothing scheduled in the next {} days.\n", days);
    }

    let mut output = format!("Upcoming in the next {} days:\n", days);
    for item in upcoming {
        output.push_str(&format!(
            "  {}  {:<8} {:>12}  {}\n",
            item.date,
            item.kind,
            item.amount.format_with_symbol(symbol),
            truncate(&item.description, 36)
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_recurring_table_status() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut rule = RecurringTransaction::new(
            TransactionKind::Expense,
            Money::from_cents(1500),
            Frequency::Monthly,
            start,
        );
        rule.description = "Streaming".into();
        rule.pause();

        let table = format_recurring_table(&[rule], "$");
        assert!(table.contains("Streaming"));
        assert!(table.contains("paused"));
        assert!(table.contains("Every month"));
    }

    #[test]
    fn test_empty_report() {
        assert!(format_process_report(&ProcessReport::default(), "$").contains("No recurring"));
    }
}
