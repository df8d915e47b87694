//! Budget limit dialog
//!
//! Sets the spending limit of one category in the viewed month's budget,
//! creating the budget when the month has none yet.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::models::{Category, CategoryId, CategoryKind, Money};
use crate::services::BudgetService;
use crate::tui::app::App;
use crate::tui::layout::centered_rect_fixed;
use crate::tui::widgets::{render_field, render_picker, CategoryPicker, TextInput};

use super::{amount_text, form_hints};

#[derive(Debug, Clone)]
pub struct BudgetLimitState {
    pub category: CategoryPicker,
    pub amount_input: TextInput,
    /// Amount field has focus (otherwise the category picker)
    pub amount_focused: bool,
    pub error_message: Option<String>,
}

impl Default for BudgetLimitState {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetLimitState {
    pub fn new() -> Self {
        let mut state = Self {
            category: CategoryPicker::new("Category"),
            amount_input: TextInput::new().label("Limit").placeholder("0.00"),
            amount_focused: false,
            error_message: None,
        };
        state.update_focus();
        state
    }

    /// Start from an existing budget line
    pub fn prefill(&mut self, category: &Category, amount: Money) {
        self.category.select(category);
        self.amount_input.set_value(amount_text(amount));
        self.amount_focused = true;
        self.update_focus();
    }

    pub fn toggle_focus(&mut self) {
        self.amount_focused = !self.amount_focused;
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.category.search.focused = !self.amount_focused;
        self.amount_input.focused = self.amount_focused;
    }

    pub fn validate(&self) -> Result<(CategoryId, Money), String> {
        let category_id = self
            .category
            .selected
            .ok_or_else(|| "Pick a category (Enter selects from the list)".to_string())?;
        let amount_str = self
            .amount_input
            .non_empty()
            .ok_or_else(|| "Enter a limit".to_string())?;
        let amount = Money::parse(amount_str).map_err(|e| format!("Limit: {}", e))?;
        if amount.is_negative() {
            return Err("Limit cannot be negative".to_string());
        }
        Ok((category_id, amount))
    }
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let area = centered_rect_fixed(60, 12, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(format!(" Budget Limit - {} ", app.current_month.label()))
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Category
            Constraint::Length(5), // Dropdown
            Constraint::Length(1), // Amount
            Constraint::Length(1), // Error
            Constraint::Length(1), // Hints
            Constraint::Min(0),
        ])
        .split(inner);

    let categories = app.categories_of(CategoryKind::Expense);
    let state = &app.budget_limit;

    render_picker(frame, chunks[0], chunks[1], &state.category, &categories);
    render_field(frame, chunks[2], &state.amount_input);
    if let Some(ref error) = state.error_message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            ))),
            chunks[3],
        );
    }
    frame.render_widget(Paragraph::new(form_hints()), chunks[4]);
}

/// Handle key input for the budget limit dialog.
/// Returns true if the key was handled.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let categories = app.categories_of(CategoryKind::Expense);
    let state = &mut app.budget_limit;

    match key.code {
        KeyCode::Esc => {
            app.close_dialog();
            return true;
        }
        KeyCode::Tab | KeyCode::BackTab => state.toggle_focus(),
        KeyCode::Enter => {
            if state.category.is_open() {
                if state.category.select_highlighted(&categories) {
                    state.toggle_focus();
                }
                return true;
            }
            if let Err(e) = save_limit(app) {
                app.budget_limit.error_message = Some(e);
            }
        }
        KeyCode::Up if state.category.is_open() => state.category.move_up(),
        KeyCode::Down if state.category.is_open() => state.category.move_down(),
        KeyCode::Backspace => {
            state.error_message = None;
            if state.amount_focused {
                state.amount_input.backspace();
            } else {
                state.category.backspace();
            }
        }
        KeyCode::Left if state.amount_focused => state.amount_input.move_left(),
        KeyCode::Right if state.amount_focused => state.amount_input.move_right(),
        KeyCode::Char(c) => {
            state.error_message = None;
            if state.amount_focused {
                state.amount_input.insert(c);
            } else {
                state.category.insert(c);
            }
        }
        _ => return false,
    }

    true
}

fn save_limit(app: &mut App) -> Result<(), String> {
    let (category_id, amount) = app.budget_limit.validate()?;
    BudgetService::new(app.storage)
        .set_category(app.current_month, category_id, amount)
        .map_err(|e| e.to_string())?;

    app.close_dialog();
    app.set_status(format!(
        "Budget limit set: {}",
        amount.format_with_symbol(app.symbol())
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefill_focuses_amount() {
        let food = Category::new("Food");
        let mut state = BudgetLimitState::new();
        assert!(state.category.search.focused);

        state.prefill(&food, Money::from_cents(40000));
        assert!(state.amount_focused);
        assert_eq!(state.amount_input.value(), "400.00");
        assert_eq!(state.validate().unwrap(), (food.id, Money::from_cents(40000)));
    }

    #[test]
    fn test_validate_requires_category_and_amount() {
        let mut state = BudgetLimitState::new();
        assert!(state.validate().is_err());

        state.category.select(&Category::new("Food"));
        assert_eq!(state.validate().unwrap_err(), "Enter a limit");

        state.amount_input.set_value("-5");
        assert_eq!(state.validate().unwrap_err(), "Limit cannot be negative");
    }
}
