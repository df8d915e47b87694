//! Category list view
//!
//! Read-only; categories are managed from the command line.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Cell, Row, Table, TableState},
    Frame,
};

use crate::display::report::truncate;
use crate::models::CategoryKind;
use crate::services::CategoryService;
use crate::tui::app::App;
use crate::tui::layout::MainPanelLayout;

use super::{header_row, highlight_style, list_block, render_empty, render_header};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let layout = MainPanelLayout::new(area);
    let categories = app.categories();

    render_header(
        frame,
        layout.header,
        format!(" Categories ({}) ", categories.len()),
        "Manage with `moneynote category ...`",
    );

    let block = list_block(app);
    if categories.is_empty() {
        render_empty(frame, layout.content, block, "No categories.");
        return;
    }

    let service = CategoryService::new(app.storage);
    let rows: Vec<Row> = categories
        .iter()
        .map(|category| {
            let kind_color = match category.kind {
                CategoryKind::Expense => Color::Red,
                CategoryKind::Income => Color::Green,
            };
            let subcategories = category
                .subcategories
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let used = service
                .usage(category.id)
                .map(|u| (u.expenses + u.incomes).to_string())
                .unwrap_or_else(|_| "?".to_string());
            Row::new(vec![
                Cell::from(category.label()),
                Cell::from(category.kind.to_string()).style(Style::default().fg(kind_color)),
                Cell::from(truncate(&subcategories, 36)),
                Cell::from(if category.is_default { "yes" } else { "" }),
                Cell::from(used),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(22),
        Constraint::Length(8),
        Constraint::Min(20),
        Constraint::Length(7),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header_row(&[
            "Name",
            "Kind",
            "Subcategories",
            "Default",
            "Used",
        ]))
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(app.selected_category_index.min(categories.len() - 1)));
    frame.render_stateful_widget(table, layout.content, &mut state);
}
