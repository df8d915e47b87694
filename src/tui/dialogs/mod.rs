//! Dialog modules for the TUI
//!
//! Modal forms and prompts drawn over the active view

pub mod budget;
pub mod confirm;
pub mod expense;
pub mod help;
pub mod income;

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

use crate::models::Money;

/// Amount as the plain decimal a user would type, e.g. "12.50"
pub fn amount_text(amount: Money) -> String {
    format!("{:.2}", amount.as_f64())
}

/// A form row whose value is chosen rather than typed
pub fn choice_line(label: &str, value: &str, focused: bool, hint: &str) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let value_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Yellow)
    };

    let mut spans = vec![
        Span::styled(format!("{:>12}: ", label), label_style),
        Span::styled(value.to_string(), value_style),
    ];
    if focused {
        spans.push(Span::styled(
            format!("  {}", hint),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

/// Key hints shown at the bottom of every form
pub fn form_hints() -> Line<'static> {
    Line::from(vec![
        Span::styled("[Tab]", Style::default().fg(Color::Yellow)),
        Span::raw(" Next  "),
        Span::styled("[Shift+Tab]", Style::default().fg(Color::Yellow)),
        Span::raw(" Prev  "),
        Span::styled("[Enter]", Style::default().fg(Color::Green)),
        Span::raw(" Save  "),
        Span::styled("[Esc]", Style::default().fg(Color::Red)),
        Span::raw(" Cancel"),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_text() {
        assert_eq!(amount_text(Money::from_cents(1250)), "12.50");
        assert_eq!(amount_text(Money::from_cents(7)), "0.07");
        assert_eq!(amount_text(Money::from_cents(100000)), "1000.00");
    }
}
