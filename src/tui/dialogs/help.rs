//! Help dialog
//!
//! Shows the global keys plus those of the active view

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::{ActiveView, App};
use crate::tui::layout::centered_rect;

/// Render the help dialog
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(60, 75, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Help ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(help_lines(app.active_view))
        .block(block)
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn help_lines(view: ActiveView) -> Vec<Line<'static>> {
    let mut lines = vec![
        heading("Global Keys"),
        Line::from(""),
        key_line("q", "Quit"),
        key_line("?", "Show/hide help"),
        key_line("1-7", "Switch view"),
        key_line("Tab", "Switch panel focus"),
        key_line("h/l", "Move focus left/right"),
        key_line("j/k", "Move selection down/up"),
        key_line("[ / ]", "Previous / next month"),
        key_line("a", "Add expense"),
        key_line("i", "Add income"),
        Line::from(""),
        heading(&format!("{} View", view.label())),
        Line::from(""),
    ];

    match view {
        ActiveView::Dashboard => {
            lines.push(key_line("r", "Process due recurring transactions"));
        }
        ActiveView::Expenses | ActiveView::Income => {
            lines.push(key_line("e/Enter", "Edit selected entry"));
            lines.push(key_line("d", "Delete selected entry"));
            lines.push(key_line("g/G", "Go to top/bottom"));
        }
        ActiveView::Budget => {
            lines.push(key_line("b", "Add a category limit"));
            lines.push(key_line("e/Enter", "Change the selected limit"));
            lines.push(key_line("d", "Remove the selected limit"));
            lines.push(key_line("c", "Copy last month's budget"));
        }
        ActiveView::Reports => {
            lines.push(key_line("←/→", "Switch report"));
        }
        ActiveView::Categories => {
            lines.push(Line::from(
                "  Manage categories with 'moneynote category'.",
            ));
        }
        ActiveView::Recurring => {
            lines.push(key_line("p", "Pause / resume rule"));
            lines.push(key_line("s", "Skip next occurrence"));
            lines.push(key_line("r", "Record selected rule now"));
            lines.push(key_line("P", "Process all due rules"));
            lines.push(key_line("d", "Delete rule"));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![Span::styled(
        "Press any key to close",
        Style::default().fg(Color::DarkGray),
    )]));

    lines
}

fn heading(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_string(),
        Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Yellow),
    )])
}

/// Create a formatted key line
fn key_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:>12}", key), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(description.to_string(), Style::default().fg(Color::White)),
    ])
}
