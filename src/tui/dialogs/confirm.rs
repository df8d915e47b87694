//! Yes/no prompt shown before deleting anything

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::ConfirmAction;
use crate::tui::layout::centered_rect_fixed;

fn title(action: &ConfirmAction) -> &'static str {
    match action {
        ConfirmAction::DeleteExpense(_) => " Delete Expense ",
        ConfirmAction::DeleteIncome(_) => " Delete Income ",
        ConfirmAction::DeleteRecurring(_) => " Delete Recurring Rule ",
        ConfirmAction::RemoveBudgetLine(_) => " Remove Budget Limit ",
    }
}

pub fn render(frame: &mut Frame, action: &ConfirmAction, message: &str) {
    let width = (message.chars().count() as u16 + 6).clamp(40, 70);
    let area = centered_rect_fixed(width, 8, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title(action))
        .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(message)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new("This cannot be undone.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray)),
        rows[1],
    );

    let key = Style::default().fg(Color::Yellow);
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("y/Enter", key),
            Span::raw(" confirm   "),
            Span::styled("n/Esc", key),
            Span::raw(" keep"),
        ]))
        .alignment(Alignment::Center),
        rows[2],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, ExpenseId};

    #[test]
    fn test_title_names_the_target() {
        assert_eq!(
            title(&ConfirmAction::DeleteExpense(ExpenseId::new())),
            " Delete Expense "
        );
        assert_eq!(
            title(&ConfirmAction::RemoveBudgetLine(CategoryId::new())),
            " Remove Budget Limit "
        );
    }
}
