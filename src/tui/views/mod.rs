//! TUI Views module
//!
//! One module per view plus the sidebar and status bar, and the dispatch
//! that draws the active view and any open dialog.

pub mod budget;
pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod income;
pub mod recurring;
pub mod reports;
pub mod sidebar;
pub mod status_bar;

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row},
    Frame,
};

use crate::models::BudgetStatus;

use super::app::{ActiveDialog, ActiveView, App, FocusedPanel};
use super::dialogs;
use super::layout::AppLayout;

/// Render the entire application
pub fn render(frame: &mut Frame, app: &mut App) {
    let layout = AppLayout::new(frame.area());

    sidebar::render(frame, app, layout.sidebar);

    match app.active_view {
        ActiveView::Dashboard => dashboard::render(frame, app, layout.main),
        ActiveView::Expenses => expenses::render(frame, app, layout.main),
        ActiveView::Income => income::render(frame, app, layout.main),
        ActiveView::Budget => budget::render(frame, app, layout.main),
        ActiveView::Reports => reports::render(frame, app, layout.main),
        ActiveView::Categories => categories::render(frame, app, layout.main),
        ActiveView::Recurring => recurring::render(frame, app, layout.main),
    }

    status_bar::render(frame, app, layout.status_bar);

    if app.has_dialog() {
        render_dialog(frame, app);
    }
}

/// Render active dialog
fn render_dialog(frame: &mut Frame, app: &mut App) {
    match app.active_dialog.clone() {
        ActiveDialog::Help => dialogs::help::render(frame, app),
        ActiveDialog::Confirm(action, message) => {
            dialogs::confirm::render(frame, &action, &message)
        }
        ActiveDialog::AddExpense | ActiveDialog::EditExpense(_) => {
            dialogs::expense::render(frame, app)
        }
        ActiveDialog::AddIncome | ActiveDialog::EditIncome(_) => dialogs::income::render(frame, app),
        ActiveDialog::BudgetLimit => dialogs::budget::render(frame, app),
        ActiveDialog::None => {}
    }
}

/// Color for a budget line's status
pub fn status_color(status: BudgetStatus) -> Color {
    match status {
        BudgetStatus::Ok => Color::Green,
        BudgetStatus::Warning => Color::Yellow,
        BudgetStatus::Over => Color::Red,
    }
}

/// Bordered block for a view's main list; cyan while the panel has focus
pub fn list_block(app: &App) -> Block<'static> {
    let border_color = if app.focused_panel == FocusedPanel::Main {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

/// Title block with a line of key hints
pub fn render_header(frame: &mut Frame, area: Rect, title: String, hints: &str) {
    let block = Block::default()
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(hints.to_string())
        .block(block)
        .style(Style::default().fg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}

/// Bold yellow table header
pub fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(
        titles
            .iter()
            .map(|t| Cell::from(*t).style(Style::default().add_modifier(Modifier::BOLD)))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Yellow))
    .height(1)
}

/// Placeholder text inside a block, for empty lists
pub fn render_empty(frame: &mut Frame, area: Rect, block: Block<'static>, message: &str) {
    let text = Paragraph::new(message.to_string())
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Row highlight used by every table
pub fn highlight_style() -> Style {
    Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD)
}
