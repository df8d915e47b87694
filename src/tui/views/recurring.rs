//! Recurring rules view

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use crate::display::report::truncate;
use crate::models::{RecurringTransaction, TransactionKind};
use crate::services::recurring::label;
use crate::tui::app::App;
use crate::tui::layout::MainPanelLayout;

use super::{header_row, highlight_style, list_block, render_empty, render_header};

fn status(rule: &RecurringTransaction) -> (&'static str, Color) {
    if rule.is_finished() {
        ("Finished", Color::DarkGray)
    } else if rule.active {
        ("Active", Color::Green)
    } else {
        ("Paused", Color::Yellow)
    }
}

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let layout = MainPanelLayout::new(area);
    let rules = app.recurring_rules();
    let symbol = app.symbol().to_string();
    let today = app.today();
    let due = rules
        .iter()
        .filter(|r| r.active && !r.is_finished() && r.is_due(today))
        .count();

    render_header(
        frame,
        layout.header,
        format!(" Recurring ({} rules, {} due) ", rules.len(), due),
        "p:Pause/Resume  s:Skip  r:Run now  P:Process due  d:Delete",
    );

    let block = list_block(app);
    if rules.is_empty() {
        render_empty(
            frame,
            layout.content,
            block,
            "No recurring rules. Add one with `moneynote recurring add`.",
        );
        return;
    }

    let rows: Vec<Row> = rules
        .iter()
        .map(|rule| {
            let (status_text, status_color) = status(rule);
            let amount_color = match rule.kind {
                TransactionKind::Expense => Color::Red,
                TransactionKind::Income => Color::Green,
            };
            let next = if rule.is_finished() {
                "-".to_string()
            } else {
                rule.next_date.format("%Y-%m-%d").to_string()
            };
            let next_style = if rule.active && rule.is_due(today) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(truncate(&label(rule), 28)),
                Cell::from(rule.kind.to_string()),
                Cell::from(rule.amount.format_with_symbol(&symbol))
                    .style(Style::default().fg(amount_color)),
                Cell::from(rule.frequency.describe(rule.interval)),
                Cell::from(next).style(next_style),
                Cell::from(status_text).style(Style::default().fg(status_color)),
                Cell::from(rule.execution_count.to_string()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(18),
        Constraint::Length(8),
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(5),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(&[
            "Description",
            "Kind",
            "Amount",
            "Frequency",
            "Next",
            "Status",
            "Runs",
        ]))
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_recurring_index.min(rules.len() - 1)));
    frame.render_stateful_widget(table, layout.content, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Frequency, Money};
    use chrono::NaiveDate;

    #[test]
    fn test_status_labels() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut rule = RecurringTransaction::new(
            TransactionKind::Expense,
            Money::from_cents(1500),
            Frequency::Monthly,
            start,
        );
        assert_eq!(status(&rule).0, "Active");
        rule.pause();
        assert_eq!(status(&rule).0, "Paused");
    }
}
