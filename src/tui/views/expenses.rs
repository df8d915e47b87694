//! Expense list view
//!
//! The viewed month's expenses, newest first.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use crate::display::report::truncate;
use crate::display::NameLookup;
use crate::models::Money;
use crate::tui::app::App;
use crate::tui::layout::MainPanelLayout;

use super::{header_row, highlight_style, list_block, render_empty, render_header};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let layout = MainPanelLayout::new(area);
    let expenses = app.month_expenses();
    let symbol = app.symbol().to_string();

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    render_header(
        frame,
        layout.header,
        format!(
            " Expenses - {} ({} entries, {}) ",
            app.current_month.label(),
            expenses.len(),
            total.format_with_symbol(&symbol)
        ),
        "a:Add  e:Edit  d:Delete  [/]:Month",
    );

    let block = list_block(app);
    if expenses.is_empty() {
        render_empty(
            frame,
            layout.content,
            block,
            "No expenses. Press 'a' to add one.",
        );
        return;
    }

    let names = NameLookup::from_storage(app.storage).unwrap_or_default();

    let rows: Vec<Row> = expenses
        .iter()
        .map(|expense| {
            let fixed = if expense.is_fixed { "F" } else { "" };
            Row::new(vec![
                Cell::from(expense.date.format("%Y-%m-%d").to_string()),
                Cell::from(truncate(
                    &names.category_path(expense.category_id, expense.subcategory_id),
                    22,
                )),
                Cell::from(truncate(&expense.description, 28)),
                Cell::from(expense.payment_method.to_string()),
                Cell::from(truncate(&names.tags(&expense.tags), 18))
                    .style(Style::default().fg(Color::Magenta)),
                Cell::from(fixed).style(Style::default().fg(Color::DarkGray)),
                Cell::from(expense.amount.format_with_symbol(&symbol))
                    .style(Style::default().fg(Color::Red)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(22),
        Constraint::Min(16),
        Constraint::Length(13),
        Constraint::Length(18),
        Constraint::Length(1),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(&[
            "Date",
            "Category",
            "Description",
            "Method",
            "Tags",
            "",
            "Amount",
        ]))
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_expense_index.min(expenses.len() - 1)));
    frame.render_stateful_widget(table, layout.content, &mut state);
}
