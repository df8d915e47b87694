//! Status bar view
//!
//! Shows the month, its balance, the last status message and key hints

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::reports::MonthSummary;
use crate::tui::app::App;

/// Render the status bar
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.current_month),
        Style::default().fg(Color::Cyan),
    )];

    if let Ok(summary) = MonthSummary::compute(app.storage, app.current_month) {
        let color = if summary.balance.is_negative() {
            Color::Red
        } else {
            Color::Green
        };
        spans.push(Span::raw("│ Bal: "));
        spans.push(Span::styled(
            summary.balance.format_with_symbol(app.symbol()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    if let Some(ref message) = app.status_message {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            message.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    // Key hints (right-aligned)
    let hints = " q:Quit  ?:Help  [/]:Month ";
    let left_len: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    let padding_len = (area.width as usize)
        .saturating_sub(left_len)
        .saturating_sub(hints.chars().count());
    spans.push(Span::raw(" ".repeat(padding_len.max(1))));
    spans.push(Span::styled(hints, Style::default().fg(Color::White)));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
