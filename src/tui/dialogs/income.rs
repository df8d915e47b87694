//! Income entry/edit dialog

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::models::{Category, CategoryId, CategoryKind, Income, Money};
use crate::services::{IncomeService, IncomeUpdate};
use crate::tui::app::{ActiveDialog, App};
use crate::tui::layout::centered_rect_fixed;
use crate::tui::widgets::{render_field, render_picker, CategoryPicker, TextInput};

use super::{amount_text, form_hints};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncomeField {
    #[default]
    Date,
    Amount,
    Source,
    Description,
    Category,
}

impl IncomeField {
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Amount,
            Self::Amount => Self::Source,
            Self::Source => Self::Description,
            Self::Description => Self::Category,
            Self::Category => Self::Date,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Date => Self::Category,
            Self::Amount => Self::Date,
            Self::Source => Self::Amount,
            Self::Description => Self::Source,
            Self::Category => Self::Description,
        }
    }
}

/// Values from a form that passed validation
#[derive(Debug, Clone)]
pub struct IncomeDraft {
    pub date: NaiveDate,
    pub amount: Money,
    pub source: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
}

/// State for the income form dialog
#[derive(Debug, Clone)]
pub struct IncomeFormState {
    pub focused_field: IncomeField,
    pub date_input: TextInput,
    pub amount_input: TextInput,
    pub source_input: TextInput,
    pub description_input: TextInput,
    /// Optional for incomes
    pub category: CategoryPicker,
    pub error_message: Option<String>,
}

impl IncomeFormState {
    pub fn new(date: NaiveDate) -> Self {
        let mut state = Self {
            focused_field: IncomeField::Date,
            date_input: TextInput::new()
                .label("Date")
                .placeholder("YYYY-MM-DD")
                .content(date.format("%Y-%m-%d").to_string()),
            amount_input: TextInput::new().label("Amount").placeholder("0.00"),
            source_input: TextInput::new()
                .label("Source")
                .placeholder("Employer, client..."),
            description_input: TextInput::new()
                .label("Description")
                .placeholder("(optional)"),
            category: CategoryPicker::new("Category"),
            error_message: None,
        };
        state.category.search.placeholder = "(optional)".into();
        state.update_focus();
        state
    }

    pub fn from_income(income: &Income, categories: &[Category]) -> Self {
        let mut state = Self::new(income.date);
        state.amount_input.set_value(amount_text(income.amount));
        state.source_input.set_value(income.source.clone());
        state.description_input.set_value(income.description.clone());
        if let Some(category) = income
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
        {
            state.category.select(category);
        }
        state
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
        self.update_focus();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
        self.update_focus();
    }

    fn update_focus(&mut self) {
        self.date_input.focused = self.focused_field == IncomeField::Date;
        self.amount_input.focused = self.focused_field == IncomeField::Amount;
        self.source_input.focused = self.focused_field == IncomeField::Source;
        self.description_input.focused = self.focused_field == IncomeField::Description;
        self.category.search.focused = self.focused_field == IncomeField::Category;
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focused_field {
            IncomeField::Date => &mut self.date_input,
            IncomeField::Amount => &mut self.amount_input,
            IncomeField::Source => &mut self.source_input,
            IncomeField::Description => &mut self.description_input,
            IncomeField::Category => &mut self.category.search,
        }
    }

    pub fn validate(&self) -> Result<IncomeDraft, String> {
        let date = NaiveDate::parse_from_str(self.date_input.value().trim(), "%Y-%m-%d")
            .map_err(|_| "Invalid date format. Use YYYY-MM-DD".to_string())?;

        let amount_str = self
            .amount_input
            .non_empty()
            .ok_or_else(|| "Enter an amount".to_string())?;
        let amount = Money::parse(amount_str).map_err(|e| format!("Amount: {}", e))?;
        if !amount.is_positive() {
            return Err("Amount must be greater than zero".to_string());
        }

        let source = self
            .source_input
            .non_empty()
            .ok_or_else(|| "Enter a source".to_string())?;

        // Leftover search text without a pick is a mistake, not "no category"
        if self.category.selected.is_none() && self.category.search.non_empty().is_some() {
            return Err("Pick a category from the list or clear the field".to_string());
        }

        Ok(IncomeDraft {
            date,
            amount,
            source: source.to_string(),
            description: self.description_input.value().trim().to_string(),
            category_id: self.category.selected,
        })
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
    }
}

/// Render the income dialog
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = centered_rect_fixed(64, 16, frame.area());
    frame.render_widget(Clear, area);

    let title = match app.active_dialog {
        ActiveDialog::EditIncome(_) => " Edit Income ",
        _ => " Add Income ",
    };
    let block = Block::default()
        .title(title)
        .title_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Date
            Constraint::Length(1), // Amount
            Constraint::Length(1), // Source
            Constraint::Length(1), // Description
            Constraint::Length(1), // Category
            Constraint::Length(5), // Category dropdown
            Constraint::Length(1), // Error
            Constraint::Length(1), // Hints
            Constraint::Min(0),
        ])
        .split(inner);

    let categories = app.categories_of(CategoryKind::Income);
    let form = &app.income_form;

    render_field(frame, chunks[0], &form.date_input);
    render_field(frame, chunks[1], &form.amount_input);
    render_field(frame, chunks[2], &form.source_input);
    render_field(frame, chunks[3], &form.description_input);
    render_picker(frame, chunks[4], chunks[5], &form.category, &categories);

    if let Some(ref error) = form.error_message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            ))),
            chunks[6],
        );
    }
    frame.render_widget(Paragraph::new(form_hints()), chunks[7]);
}

/// Handle key input for the income dialog.
/// Returns true if the key was handled.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let categories = app.categories_of(CategoryKind::Income);
    let form = &mut app.income_form;
    let on_category = form.focused_field == IncomeField::Category;

    match key.code {
        KeyCode::Esc => {
            app.close_dialog();
            return true;
        }
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => form.prev_field(),
        KeyCode::Tab => form.next_field(),
        KeyCode::BackTab => form.prev_field(),

        KeyCode::Enter => {
            if form.category.is_open() && form.category.search.non_empty().is_some() {
                form.category.select_highlighted(&categories);
                return true;
            }
            if let Err(e) = save_income(app) {
                app.income_form.set_error(e);
            }
        }

        KeyCode::Up if form.category.is_open() => form.category.move_up(),
        KeyCode::Down if form.category.is_open() => form.category.move_down(),
        KeyCode::Up => form.prev_field(),
        KeyCode::Down => form.next_field(),

        KeyCode::Backspace => {
            form.clear_error();
            if on_category {
                form.category.backspace();
            } else {
                form.focused_input().backspace();
            }
        }
        KeyCode::Delete => {
            form.clear_error();
            form.focused_input().delete();
        }
        KeyCode::Left => form.focused_input().move_left(),
        KeyCode::Right => form.focused_input().move_right(),
        KeyCode::Home => form.focused_input().move_start(),
        KeyCode::End => form.focused_input().move_end(),
        KeyCode::Char(c) => {
            form.clear_error();
            if on_category {
                form.category.insert(c);
            } else {
                form.focused_input().insert(c);
            }
        }
        _ => return false,
    }

    true
}

fn save_income(app: &mut App) -> Result<(), String> {
    let draft = app.income_form.validate()?;
    let service = IncomeService::new(app.storage);

    let message = match app.active_dialog {
        ActiveDialog::EditIncome(id) => {
            let update = IncomeUpdate {
                amount: Some(draft.amount),
                date: Some(draft.date),
                source: Some(draft.source),
                description: Some(draft.description),
                category_id: Some(draft.category_id),
            };
            service
                .update(id, update)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Income no longer exists".to_string())?;
            "Income updated".to_string()
        }
        _ => {
            let income = service
                .create(
                    draft.amount,
                    draft.date,
                    &draft.source,
                    &draft.description,
                    draft.category_id,
                )
                .map_err(|e| e.to_string())?;
            format!(
                "Income added: {}",
                income.amount.format_with_symbol(app.symbol())
            )
        }
    };

    app.close_dialog();
    app.set_status(message);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> IncomeFormState {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let mut form = IncomeFormState::new(date);
        form.amount_input.set_value("3500");
        form.source_input.set_value("Acme Corp");
        form
    }

    #[test]
    fn test_category_is_optional() {
        let draft = form().validate().unwrap();
        assert_eq!(draft.amount, Money::from_cents(350000));
        assert_eq!(draft.source, "Acme Corp");
        assert_eq!(draft.category_id, None);
    }

    #[test]
    fn test_source_required() {
        let mut form = form();
        form.source_input.set_value("  ");
        assert_eq!(form.validate().unwrap_err(), "Enter a source");
    }

    #[test]
    fn test_unpicked_category_text_rejected() {
        let mut form = form();
        form.category.insert('S');
        assert!(form.validate().is_err());

        let salary = Category::with_kind("Salary", CategoryKind::Income);
        form.category.select(&salary);
        assert_eq!(form.validate().unwrap().category_id, Some(salary.id));
    }

    #[test]
    fn test_from_income_round_trips_fields() {
        let salary = Category::with_kind("Salary", CategoryKind::Income);
        let date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let mut income = Income::new(Money::from_cents(120050), date, "Acme");
        income.category_id = Some(salary.id);

        let form = IncomeFormState::from_income(&income, &[salary.clone()]);
        assert_eq!(form.amount_input.value(), "1200.50");
        assert_eq!(form.date_input.value(), "2025-02-28");
        assert_eq!(form.category.selected, Some(salary.id));
    }
}
