//! Expense entry/edit dialog
//!
//! Modal form for adding or editing an expense with tab navigation, a
//! category search dropdown, validation, and save/cancel.

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::cli::split_list;
use crate::config::settings::Settings;
use crate::models::{Category, CategoryId, CategoryKind, Expense, Money, PaymentMethod, SubcategoryId};
use crate::services::{CreateExpenseInput, ExpenseService, ExpenseUpdate, TagService};
use crate::storage::Storage;
use crate::tui::app::{ActiveDialog, App};
use crate::tui::layout::centered_rect_fixed;
use crate::tui::widgets::{render_field, render_picker, CategoryPicker, TextInput};

use super::{amount_text, choice_line, form_hints};

/// Which field is currently focused in the expense form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseField {
    #[default]
    Date,
    Amount,
    Category,
    Subcategory,
    Description,
    Method,
    Tags,
    Fixed,
}

impl ExpenseField {
    pub fn next(self) -> Self {
        match self {
            Self::Date => Self::Amount,
            Self::Amount => Self::Category,
            Self::Category => Self::Subcategory,
            Self::Subcategory => Self::Description,
            Self::Description => Self::Method,
            Self::Method => Self::Tags,
            Self::Tags => Self::Fixed,
            Self::Fixed => Self::Date,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Self::Date => Self::Fixed,
            Self::Amount => Self::Date,
            Self::Category => Self::Amount,
            Self::Subcategory => Self::Category,
            Self::Description => Self::Subcategory,
            Self::Method => Self::Description,
            Self::Tags => Self::Method,
            Self::Fixed => Self::Tags,
        }
    }
}

/// Values from a form that passed validation
#[derive(Debug, Clone)]
pub struct ExpenseDraft {
    pub date: NaiveDate,
    pub amount: Money,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub tag_names: Vec<String>,
    pub is_fixed: bool,
}

/// State for the expense form dialog
#[derive(Debug, Clone)]
pub struct ExpenseFormState {
    pub focused_field: ExpenseField,
    pub date_input: TextInput,
    pub amount_input: TextInput,
    pub category: CategoryPicker,
    pub subcategory_input: TextInput,
    pub description_input: TextInput,
    pub method: PaymentMethod,
    pub tags_input: TextInput,
    pub is_fixed: bool,
    pub error_message: Option<String>,
}

impl ExpenseFormState {
    /// Empty form dated `date`
    pub fn new(date: NaiveDate, settings: &Settings) -> Self {
        let mut state = Self {
            focused_field: ExpenseField::Date,
            date_input: TextInput::new()
                .label("Date")
                .placeholder("YYYY-MM-DD")
                .content(date.format("%Y-%m-%d").to_string()),
            amount_input: TextInput::new().label("Amount").placeholder("0.00"),
            category: CategoryPicker::new("Category"),
            subcategory_input: TextInput::new()
                .label("Subcategory")
                .placeholder("(optional)"),
            description_input: TextInput::new()
                .label("Description")
                .placeholder("What was it?"),
            method: settings.default_payment_method,
            tags_input: TextInput::new()
                .label("Tags")
                .placeholder("comma,separated"),
            is_fixed: false,
            error_message: None,
        };
        state.update_focus();
        state
    }

    /// Form pre-populated from an existing expense
    pub fn from_expense(expense: &Expense, categories: &[Category], storage: &Storage) -> Self {
        let mut state = Self {
            focused_field: ExpenseField::Date,
            date_input: TextInput::new()
                .label("Date")
                .content(expense.date.format("%Y-%m-%d").to_string()),
            amount_input: TextInput::new()
                .label("Amount")
                .content(amount_text(expense.amount)),
            category: CategoryPicker::new("Category"),
            subcategory_input: TextInput::new().label("Subcategory"),
            description_input: TextInput::new()
                .label("Description")
                .content(expense.description.clone()),
            method: expense.payment_method,
            tags_input: TextInput::new().label("Tags"),
            is_fixed: expense.is_fixed,
            error_message: None,
        };

        if let Some(category) = categories.iter().find(|c| c.id == expense.category_id) {
            state.category.select(category);
            if let Some(sub) = expense.subcategory_id.and_then(|id| category.subcategory(id)) {
                state.subcategory_input.set_value(sub.name.clone());
            }
        }

        let tag_names: Vec<String> = expense
            .tags
            .iter()
            .filter_map(|id| storage.tags.get(*id).ok().flatten())
            .map(|t| t.name)
            .collect();
        state.tags_input.set_value(tag_names.join(", "));

        state.update_focus();
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
        self.date_input.focused = self.focused_field == ExpenseField::Date;
        self.amount_input.focused = self.focused_field == ExpenseField::Amount;
        self.category.search.focused = self.focused_field == ExpenseField::Category;
        self.subcategory_input.focused = self.focused_field == ExpenseField::Subcategory;
        self.description_input.focused = self.focused_field == ExpenseField::Description;
        self.tags_input.focused = self.focused_field == ExpenseField::Tags;
    }

    /// The focused free-text input; `None` on the choice fields
    pub fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.focused_field {
            ExpenseField::Date => Some(&mut self.date_input),
            ExpenseField::Amount => Some(&mut self.amount_input),
            ExpenseField::Category => Some(&mut self.category.search),
            ExpenseField::Subcategory => Some(&mut self.subcategory_input),
            ExpenseField::Description => Some(&mut self.description_input),
            ExpenseField::Tags => Some(&mut self.tags_input),
            ExpenseField::Method | ExpenseField::Fixed => None,
        }
    }

    /// Step the payment method forward or back through the list
    pub fn cycle_method(&mut self, forward: bool) {
        let all = PaymentMethod::all();
        let pos = all.iter().position(|m| *m == self.method).unwrap_or(0);
        let next = if forward {
            (pos + 1) % all.len()
        } else {
            (pos + all.len() - 1) % all.len()
        };
        self.method = all[next];
    }

    /// Validate the form against the known categories
    pub fn validate(&self, categories: &[Category]) -> Result<ExpenseDraft, String> {
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

        let category_id = self
            .category
            .selected
            .ok_or_else(|| "Pick a category (Enter selects from the list)".to_string())?;
        let category = categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| "Selected category no longer exists".to_string())?;

        let subcategory_id = match self.subcategory_input.non_empty() {
            Some(name) => Some(
                category
                    .find_subcategory(name)
                    .map(|s| s.id)
                    .ok_or_else(|| format!("'{}' has no subcategory '{}'", category.name, name))?,
            ),
            None => None,
        };

        Ok(ExpenseDraft {
            date,
            amount,
            category_id,
            subcategory_id,
            description: self.description_input.value().trim().to_string(),
            payment_method: self.method,
            tag_names: split_list(self.tags_input.value()),
            is_fixed: self.is_fixed,
        })
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.error_message = Some(msg.into());
    }
}

/// Render the expense dialog
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = centered_rect_fixed(64, 20, frame.area());
    frame.render_widget(Clear, area);

    let title = match app.active_dialog {
        ActiveDialog::EditExpense(_) => " Edit Expense ",
        _ => " Add Expense ",
    };
    let block = Block::default()
        .title(title)
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
            Constraint::Length(1), // Date
            Constraint::Length(1), // Amount
            Constraint::Length(1), // Category
            Constraint::Length(5), // Category dropdown
            Constraint::Length(1), // Subcategory
            Constraint::Length(1), // Description
            Constraint::Length(1), // Method
            Constraint::Length(1), // Tags
            Constraint::Length(1), // Fixed
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Error
            Constraint::Length(1), // Hints
            Constraint::Min(0),
        ])
        .split(inner);

    let categories = app.categories_of(CategoryKind::Expense);
    let form = &app.expense_form;

    render_field(frame, chunks[0], &form.date_input);
    render_field(frame, chunks[1], &form.amount_input);
    render_picker(frame, chunks[2], chunks[3], &form.category, &categories);
    render_field(frame, chunks[4], &form.subcategory_input);
    render_field(frame, chunks[5], &form.description_input);
    frame.render_widget(
        Paragraph::new(choice_line(
            "Method",
            &form.method.to_string(),
            form.focused_field == ExpenseField::Method,
            "←/→ to change",
        )),
        chunks[6],
    );
    render_field(frame, chunks[7], &form.tags_input);
    frame.render_widget(
        Paragraph::new(choice_line(
            "Fixed",
            if form.is_fixed { "[x] fixed cost" } else { "[ ] variable" },
            form.focused_field == ExpenseField::Fixed,
            "Space to toggle",
        )),
        chunks[8],
    );

    if let Some(ref error) = form.error_message {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red),
            ))),
            chunks[10],
        );
    }
    frame.render_widget(Paragraph::new(form_hints()), chunks[11]);
}

/// Handle key input for the expense dialog.
/// Returns true if the key was handled.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    let categories = app.categories_of(CategoryKind::Expense);
    let form = &mut app.expense_form;

    match key.code {
        KeyCode::Esc => {
            app.close_dialog();
            return true;
        }
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => form.prev_field(),
        KeyCode::Tab => form.next_field(),
        KeyCode::BackTab => form.prev_field(),

        KeyCode::Enter => {
            if form.category.is_open() {
                if form.category.select_highlighted(&categories) {
                    form.next_field();
                }
                return true;
            }
            if let Err(e) = save_expense(app, &categories) {
                app.expense_form.set_error(e);
            }
        }

        KeyCode::Up if form.category.is_open() => form.category.move_up(),
        KeyCode::Down if form.category.is_open() => form.category.move_down(),
        KeyCode::Up => form.prev_field(),
        KeyCode::Down => form.next_field(),

        KeyCode::Left if form.focused_field == ExpenseField::Method => form.cycle_method(false),
        KeyCode::Right if form.focused_field == ExpenseField::Method => form.cycle_method(true),
        KeyCode::Char(' ') if form.focused_field == ExpenseField::Method => {
            form.cycle_method(true)
        }
        KeyCode::Char(' ') if form.focused_field == ExpenseField::Fixed => {
            form.is_fixed = !form.is_fixed
        }

        KeyCode::Backspace => {
            form.clear_error();
            if form.focused_field == ExpenseField::Category {
                form.category.backspace();
            } else if let Some(input) = form.focused_input() {
                input.backspace();
            }
        }
        KeyCode::Delete => {
            form.clear_error();
            if let Some(input) = form.focused_input() {
                input.delete();
            }
        }
        KeyCode::Left => {
            if let Some(input) = form.focused_input() {
                input.move_left();
            }
        }
        KeyCode::Right => {
            if let Some(input) = form.focused_input() {
                input.move_right();
            }
        }
        KeyCode::Home => {
            if let Some(input) = form.focused_input() {
                input.move_start();
            }
        }
        KeyCode::End => {
            if let Some(input) = form.focused_input() {
                input.move_end();
            }
        }
        KeyCode::Char(c) => {
            form.clear_error();
            if form.focused_field == ExpenseField::Category {
                form.category.insert(c);
            } else if let Some(input) = form.focused_input() {
                input.insert(c);
            }
        }
        _ => return false,
    }

    true
}

/// Create or update the expense through the service layer
fn save_expense(app: &mut App, categories: &[Category]) -> Result<(), String> {
    let draft = app.expense_form.validate(categories)?;
    let tags = TagService::new(app.storage)
        .resolve_names(&draft.tag_names, true)
        .map_err(|e| e.to_string())?;
    let service = ExpenseService::new(app.storage);

    let message = match app.active_dialog {
        ActiveDialog::EditExpense(id) => {
            let update = ExpenseUpdate {
                amount: Some(draft.amount),
                date: Some(draft.date),
                category_id: Some(draft.category_id),
                subcategory_id: Some(draft.subcategory_id),
                description: Some(draft.description),
                payment_method: Some(draft.payment_method),
                tags: Some(tags),
                is_fixed: Some(draft.is_fixed),
                notes: None,
            };
            service
                .update(id, update)
                .map_err(|e| e.to_string())?
                .ok_or_else(|| "Expense no longer exists".to_string())?;
            "Expense updated".to_string()
        }
        _ => {
            let mut input = CreateExpenseInput::new(draft.amount, draft.date, draft.category_id);
            input.subcategory_id = draft.subcategory_id;
            input.description = draft.description;
            input.payment_method = draft.payment_method;
            input.tags = tags;
            input.is_fixed = draft.is_fixed;
            let expense = service.create(input).map_err(|e| e.to_string())?;
            format!(
                "Expense added: {}",
                expense.amount.format_with_symbol(app.symbol())
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
    use crate::models::Subcategory;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn food() -> Category {
        let mut food = Category::new("Food");
        food.add_subcategory(Subcategory::new("Groceries")).unwrap();
        food
    }

    fn filled_form(category: &Category) -> ExpenseFormState {
        let mut form = ExpenseFormState::new(date("2025-03-14"), &Settings::default());
        form.amount_input.set_value("42.10");
        form.category.select(category);
        form.description_input.set_value("  weekly shop ");
        form.tags_input.set_value("home, , family");
        form
    }

    #[test]
    fn test_field_cycle() {
        let mut field = ExpenseField::Date;
        for _ in 0..8 {
            field = field.next();
        }
        assert_eq!(field, ExpenseField::Date);
        assert_eq!(ExpenseField::Date.prev(), ExpenseField::Fixed);
    }

    #[test]
    fn test_validate_builds_draft() {
        let food = food();
        let mut form = filled_form(&food);
        form.subcategory_input.set_value("groceries");

        let draft = form.validate(std::slice::from_ref(&food)).unwrap();
        assert_eq!(draft.date, date("2025-03-14"));
        assert_eq!(draft.amount, Money::from_cents(4210));
        assert_eq!(draft.category_id, food.id);
        assert_eq!(draft.subcategory_id, Some(food.subcategories[0].id));
        assert_eq!(draft.description, "weekly shop");
        assert_eq!(draft.tag_names, vec!["home", "family"]);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        let food = food();
        let categories = vec![food.clone()];

        let mut form = filled_form(&food);
        form.date_input.set_value("14/03/2025");
        assert!(form.validate(&categories).unwrap_err().contains("date"));

        let mut form = filled_form(&food);
        form.amount_input.set_value("0");
        assert!(form.validate(&categories).is_err());

        let mut form = filled_form(&food);
        form.category.clear();
        assert!(form.validate(&categories).unwrap_err().contains("category"));

        let mut form = filled_form(&food);
        form.subcategory_input.set_value("Restaurants");
        assert!(form.validate(&categories).unwrap_err().contains("Restaurants"));
    }

    #[test]
    fn test_cycle_method_wraps() {
        let mut form = ExpenseFormState::new(date("2025-03-14"), &Settings::default());
        let start = form.method;
        for _ in 0..PaymentMethod::all().len() {
            form.cycle_method(true);
        }
        assert_eq!(form.method, start);
        form.cycle_method(false);
        assert_eq!(form.method, PaymentMethod::all()[0]);
    }
}
