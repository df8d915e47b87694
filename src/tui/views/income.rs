//! Income list view

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
    let incomes = app.month_incomes();
    let symbol = app.symbol().to_string();

    let total: Money = incomes.iter().map(|i| i.amount).sum();
    render_header(
        frame,
        layout.header,
        format!(
            " Income - {} ({} entries, {}) ",
            app.current_month.label(),
            incomes.len(),
            total.format_with_symbol(&symbol)
        ),
        "i:Add  e:Edit  d:Delete  [/]:Month",
    );

    let block = list_block(app);
    if incomes.is_empty() {
        render_empty(
            frame,
            layout.content,
            block,
            "No income recorded. Press 'i' to add some.",
        );
        return;
    }

    let names = NameLookup::from_storage(app.storage).unwrap_or_default();

    let rows: Vec<Row> = incomes
        .iter()
        .map(|income| {
            Row::new(vec![
                Cell::from(income.date.format("%Y-%m-%d").to_string()),
                Cell::from(truncate(&income.source, 22)),
                Cell::from(truncate(&income.description, 30)),
                Cell::from(truncate(&names.optional_category(income.category_id), 18)),
                Cell::from(income.amount.format_with_symbol(&symbol))
                    .style(Style::default().fg(Color::Green)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(22),
        Constraint::Min(16),
        Constraint::Length(18),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(&[
            "Date",
            "Source",
            "Description",
            "Category",
            "Amount",
        ]))
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_income_index.min(incomes.len() - 1)));
    frame.render_stateful_widget(table, layout.content, &mut state);
}
