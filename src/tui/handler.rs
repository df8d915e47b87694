//! Event handler for the TUI
//!
//! Routes key events to the open dialog, the global keys, the sidebar or
//! the active view.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::display::report::truncate;
use crate::models::RecurringTransaction;
use crate::services::{
    recurring, BudgetService, ExpenseService, GeneratedRecord, IncomeService, RecurringService,
};

use super::app::{ActiveDialog, ActiveView, App, ConfirmAction, FocusedPanel};
use super::dialogs;
use super::event::Event;

/// Handle an incoming event
pub fn handle_event(app: &mut App, event: Event) -> Result<()> {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Resize(_, _) | Event::Tick => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if app.has_dialog() {
        return handle_dialog_key(app, key);
    }

    // Any key acknowledges the last status message
    app.clear_status();

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.quit();
            return Ok(());
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.quit();
            return Ok(());
        }
        KeyCode::Char('?') => {
            app.open_dialog(ActiveDialog::Help);
            return Ok(());
        }
        KeyCode::Tab => {
            app.toggle_panel_focus();
            return Ok(());
        }
        KeyCode::Char('[') => {
            app.prev_month();
            return Ok(());
        }
        KeyCode::Char(']') => {
            app.next_month();
            return Ok(());
        }
        KeyCode::Char(c @ '1'..='7') => {
            if let Some(view) = ActiveView::from_key(c) {
                app.switch_view(view);
            }
            return Ok(());
        }
        KeyCode::Char('a') => {
            app.open_dialog(ActiveDialog::AddExpense);
            return Ok(());
        }
        KeyCode::Char('i') => {
            app.open_dialog(ActiveDialog::AddIncome);
            return Ok(());
        }
        KeyCode::Char('h') if app.focused_panel == FocusedPanel::Main => {
            app.focused_panel = FocusedPanel::Sidebar;
            return Ok(());
        }
        KeyCode::Char('l') if app.focused_panel == FocusedPanel::Sidebar => {
            app.focused_panel = FocusedPanel::Main;
            return Ok(());
        }
        _ => {}
    }

    match app.focused_panel {
        FocusedPanel::Sidebar => handle_sidebar_key(app, key),
        FocusedPanel::Main => handle_main_panel_key(app, key),
    }
}

/// Handle keys when sidebar is focused
fn handle_sidebar_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(ActiveView::ALL.len()),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Enter => {
            if let Some(view) = ActiveView::ALL.get(app.selected_view_index).copied() {
                app.switch_view(view);
                app.focused_panel = FocusedPanel::Main;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Handle keys when the main panel is focused
fn handle_main_panel_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.active_view {
        ActiveView::Dashboard => handle_dashboard_key(app, key),
        ActiveView::Expenses => handle_expenses_key(app, key),
        ActiveView::Income => handle_income_key(app, key),
        ActiveView::Budget => handle_budget_key(app, key),
        ActiveView::Reports => handle_reports_key(app, key),
        ActiveView::Categories => handle_categories_key(app, key),
        ActiveView::Recurring => handle_recurring_key(app, key),
    }
}

fn handle_dashboard_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.code == KeyCode::Char('r') {
        process_due(app);
    }
    Ok(())
}

fn handle_expenses_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let count = app.month_expenses().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(count),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.selected_expense_index = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.selected_expense_index = count.saturating_sub(1);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(expense) = app.selected_expense() {
                app.open_dialog(ActiveDialog::EditExpense(expense.id));
            }
        }
        KeyCode::Char('d') => {
            if let Some(expense) = app.selected_expense() {
                let message = format!(
                    "Delete expense {} {} on {}?",
                    expense.amount.format_with_symbol(app.symbol()),
                    truncate(&expense.description, 24),
                    expense.date.format("%Y-%m-%d")
                );
                app.open_dialog(ActiveDialog::Confirm(
                    ConfirmAction::DeleteExpense(expense.id),
                    message,
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_income_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let count = app.month_incomes().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(count),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('g') | KeyCode::Home => app.selected_income_index = 0,
        KeyCode::Char('G') | KeyCode::End => {
            app.selected_income_index = count.saturating_sub(1);
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(income) = app.selected_income() {
                app.open_dialog(ActiveDialog::EditIncome(income.id));
            }
        }
        KeyCode::Char('d') => {
            if let Some(income) = app.selected_income() {
                let message = format!(
                    "Delete income {} from {} on {}?",
                    income.amount.format_with_symbol(app.symbol()),
                    truncate(&income.source, 24),
                    income.date.format("%Y-%m-%d")
                );
                app.open_dialog(ActiveDialog::Confirm(
                    ConfirmAction::DeleteIncome(income.id),
                    message,
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_budget_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let lines = app
        .budget_progress()
        .map(|p| p.categories)
        .unwrap_or_default();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(lines.len()),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('b') => {
            // Fresh limit, not a change of the highlighted one
            app.open_dialog(ActiveDialog::BudgetLimit);
            app.budget_limit = dialogs::budget::BudgetLimitState::new();
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            if !lines.is_empty() {
                app.open_dialog(ActiveDialog::BudgetLimit);
            }
        }
        KeyCode::Char('d') => {
            if let Some(line) = lines.get(app.selected_budget_index) {
                let message = format!(
                    "Remove the {} limit from {}?",
                    line.name,
                    app.current_month.label()
                );
                app.open_dialog(ActiveDialog::Confirm(
                    ConfirmAction::RemoveBudgetLine(line.category_id),
                    message,
                ));
            }
        }
        KeyCode::Char('c') => {
            let from = app.current_month.prev();
            match BudgetService::new(app.storage).copy(from, app.current_month, false) {
                Ok(budget) => {
                    app.clamp_selections();
                    app.set_status(format!(
                        "Copied {} category limit(s) from {}",
                        budget.categories.len(),
                        from.label()
                    ));
                }
                Err(e) => app.set_status(format!("Copy failed: {}", e)),
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_reports_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Right | KeyCode::Char('L') => app.report_tab = app.report_tab.next(),
        KeyCode::Left | KeyCode::Char('H') => app.report_tab = app.report_tab.prev(),
        _ => {}
    }
    Ok(())
}

fn handle_categories_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let count = app.categories().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(count),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        _ => {}
    }
    Ok(())
}

fn handle_recurring_key(app: &mut App, key: KeyEvent) -> Result<()> {
    let count = app.recurring_rules().len();
    let today = app.today();
    let service = RecurringService::new(app.storage);

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.move_down(count),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('P') => process_due(app),
        KeyCode::Char('p') => {
            if let Some(rule) = app.selected_recurring() {
                let result = if rule.active {
                    service.pause(rule.id).map(|_| "Paused")
                } else {
                    service.resume(rule.id, today).map(|_| "Resumed")
                };
                match result {
                    Ok(verb) => app.set_status(format!("{} '{}'", verb, label_of(&rule))),
                    Err(e) => app.set_status(format!("Error: {}", e)),
                }
            }
        }
        KeyCode::Char('s') => {
            if let Some(rule) = app.selected_recurring() {
                match service.skip_next(rule.id) {
                    Ok(Some(updated)) => app.set_status(format!(
                        "Skipped; next '{}' on {}",
                        label_of(&updated),
                        updated.next_date.format("%Y-%m-%d")
                    )),
                    Ok(None) => app.set_status("Recurring rule not found"),
                    Err(e) => app.set_status(format!("Error: {}", e)),
                }
            }
        }
        KeyCode::Char('r') => {
            if let Some(rule) = app.selected_recurring() {
                match service.run_now(rule.id, today) {
                    Ok(Some(record)) => {
                        let symbol = app.symbol().to_string();
                        app.set_status(generated_message(&record, &symbol));
                    }
                    Ok(None) => app.set_status("Recurring rule not found"),
                    Err(e) => app.set_status(format!("Error: {}", e)),
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(rule) = app.selected_recurring() {
                let message = format!(
                    "Delete recurring '{}'? Records it created are kept.",
                    truncate(&label_of(&rule), 30)
                );
                app.open_dialog(ActiveDialog::Confirm(
                    ConfirmAction::DeleteRecurring(rule.id),
                    message,
                ));
            }
        }
        _ => {}
    }
    Ok(())
}

fn label_of(rule: &RecurringTransaction) -> String {
    recurring::label(rule)
}

fn generated_message(record: &GeneratedRecord, symbol: &str) -> String {
    let kind = match record {
        GeneratedRecord::Expense(_) => "expense",
        GeneratedRecord::Income(_) => "income",
    };
    format!(
        "Recorded {} {} on {}",
        kind,
        record.amount().format_with_symbol(symbol),
        record.date().format("%Y-%m-%d")
    )
}

/// Generate every due recurring record and report the outcome in the status bar
fn process_due(app: &mut App) {
    let today = app.today();
    match RecurringService::new(app.storage).process_due(today) {
        Ok(report) if report.is_empty() => app.set_status("No recurring transactions were due"),
        Ok(report) => {
            let mut message = format!("Generated {} record(s)", report.generated.len());
            if !report.failed.is_empty() {
                message.push_str(&format!(", {} rule(s) failed", report.failed.len()));
            }
            app.clamp_selections();
            app.set_status(message);
        }
        Err(e) => app.set_status(format!("Processing failed: {}", e)),
    }
}

/// Handle keys while a dialog is open
fn handle_dialog_key(app: &mut App, key: KeyEvent) -> Result<()> {
    match app.active_dialog.clone() {
        ActiveDialog::Help => app.close_dialog(),
        ActiveDialog::Confirm(action, _) => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.close_dialog();
                    execute_confirmed_action(app, action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
                _ => {}
            }
        }
        ActiveDialog::AddExpense | ActiveDialog::EditExpense(_) => {
            dialogs::expense::handle_key(app, key);
        }
        ActiveDialog::AddIncome | ActiveDialog::EditIncome(_) => {
            dialogs::income::handle_key(app, key);
        }
        ActiveDialog::BudgetLimit => {
            dialogs::budget::handle_key(app, key);
        }
        ActiveDialog::None => {}
    }
    Ok(())
}

/// Run a confirmed destructive action
fn execute_confirmed_action(app: &mut App, action: ConfirmAction) {
    let result = match action {
        ConfirmAction::DeleteExpense(id) => ExpenseService::new(app.storage)
            .delete(id)
            .map(|found| found.then_some("Expense deleted")),
        ConfirmAction::DeleteIncome(id) => IncomeService::new(app.storage)
            .delete(id)
            .map(|found| found.then_some("Income deleted")),
        ConfirmAction::DeleteRecurring(id) => RecurringService::new(app.storage)
            .delete(id)
            .map(|found| found.then_some("Recurring rule deleted")),
        ConfirmAction::RemoveBudgetLine(category_id) => BudgetService::new(app.storage)
            .remove_category(app.current_month, category_id)
            .map(|budget| budget.map(|_| "Budget limit removed")),
    };

    match result {
        Ok(Some(message)) => app.set_status(message),
        Ok(None) => app.set_status("Nothing to delete; it was already gone"),
        Err(e) => app.set_status(format!("Error: {}", e)),
    }
    app.clamp_selections();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::config::settings::Settings;
    use crate::models::{CategoryKind, Money};
    use crate::services::{CategoryService, CreateExpenseInput};
    use crate::storage::init::initialize_storage;
    use crate::storage::Storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn press(app: &mut App, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        handle_event(app, Event::Key(key)).unwrap();
    }

    #[test]
    fn test_number_keys_switch_views() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let mut app = App::new(&storage, &settings);

        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.active_view, ActiveView::Budget);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.active_dialog, ActiveDialog::Help);
        // Help closes on any key
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.has_dialog());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_delete_expense_after_confirmation() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let other = CategoryService::new(&storage)
            .fallback_category(CategoryKind::Expense)
            .unwrap();
        let mut app = App::new(&storage, &settings);
        let date = app.today();
        ExpenseService::new(&storage)
            .create(CreateExpenseInput::new(Money::from_cents(900), date, other.id))
            .unwrap();

        press(&mut app, KeyCode::Char('2'));
        app.focused_panel = FocusedPanel::Main;
        press(&mut app, KeyCode::Char('d'));
        assert!(matches!(
            app.active_dialog,
            ActiveDialog::Confirm(ConfirmAction::DeleteExpense(_), _)
        ));

        // 'n' backs out without deleting
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.month_expenses().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.month_expenses().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Expense deleted"));
    }

    #[test]
    fn test_copy_budget_without_source_reports_error() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let mut app = App::new(&storage, &settings);

        press(&mut app, KeyCode::Char('4'));
        app.focused_panel = FocusedPanel::Main;
        press(&mut app, KeyCode::Char('c'));
        let status = app.status_message.clone().unwrap_or_default();
        assert!(status.starts_with("Copy failed"), "{}", status);
    }
}
