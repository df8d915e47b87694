//! Application state for the TUI
//!
//! The App struct holds all state needed for rendering and handling events.

use chrono::{Local, NaiveDate};

use crate::config::settings::Settings;
use crate::models::{
    Category, CategoryId, CategoryKind, Expense, ExpenseId, Income, IncomeId, Month, RecurringId,
    RecurringTransaction,
};
use crate::services::{
    BudgetProgress, BudgetService, CategoryService, ExpenseFilter, ExpenseService, IncomeFilter,
    IncomeService, RecurringService,
};
use crate::storage::Storage;

use super::dialogs::budget::BudgetLimitState;
use super::dialogs::expense::ExpenseFormState;
use super::dialogs::income::IncomeFormState;

/// Which view is currently active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Dashboard,
    Expenses,
    Income,
    Budget,
    Reports,
    Categories,
    Recurring,
}

impl ActiveView {
    /// Sidebar order; the number keys 1-7 follow it
    pub const ALL: [ActiveView; 7] = [
        Self::Dashboard,
        Self::Expenses,
        Self::Income,
        Self::Budget,
        Self::Reports,
        Self::Categories,
        Self::Recurring,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Expenses => "Expenses",
            Self::Income => "Income",
            Self::Budget => "Budget",
            Self::Reports => "Reports",
            Self::Categories => "Categories",
            Self::Recurring => "Recurring",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    /// View for a number key ('1' is the dashboard)
    pub fn from_key(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

/// Which panel currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPanel {
    #[default]
    Sidebar,
    Main,
}

/// Tabs of the reports view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTab {
    #[default]
    Categories,
    Trend,
    Tags,
    PaymentMethods,
}

impl ReportTab {
    pub const ALL: [ReportTab; 4] = [
        Self::Categories,
        Self::Trend,
        Self::Tags,
        Self::PaymentMethods,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Categories => "Categories",
            Self::Trend => "Trend",
            Self::Tags => "Tags",
            Self::PaymentMethods => "Payment Methods",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A destructive action waiting for y/n
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteExpense(ExpenseId),
    DeleteIncome(IncomeId),
    DeleteRecurring(RecurringId),
    RemoveBudgetLine(CategoryId),
}

/// Currently active dialog (if any)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveDialog {
    #[default]
    None,
    Help,
    AddExpense,
    EditExpense(ExpenseId),
    AddIncome,
    EditIncome(IncomeId),
    /// Set a category limit in the current month's budget
    BudgetLimit,
    Confirm(ConfirmAction, String),
}

/// Main application state
pub struct App<'a> {
    pub storage: &'a Storage,
    pub settings: &'a Settings,

    pub should_quit: bool,
    pub active_view: ActiveView,
    pub focused_panel: FocusedPanel,
    pub active_dialog: ActiveDialog,

    /// Month shown by the dashboard, expense, income, budget and report views
    pub current_month: Month,

    /// Highlighted entry in the sidebar
    pub selected_view_index: usize,
    pub selected_expense_index: usize,
    pub selected_income_index: usize,
    pub selected_budget_index: usize,
    pub selected_category_index: usize,
    pub selected_recurring_index: usize,

    pub report_tab: ReportTab,

    /// Status message to display
    pub status_message: Option<String>,

    pub expense_form: ExpenseFormState,
    pub income_form: IncomeFormState,
    pub budget_limit: BudgetLimitState,
}

impl<'a> App<'a> {
    pub fn new(storage: &'a Storage, settings: &'a Settings) -> Self {
        Self {
            storage,
            settings,
            should_quit: false,
            active_view: ActiveView::default(),
            focused_panel: FocusedPanel::default(),
            active_dialog: ActiveDialog::default(),
            current_month: Month::current(),
            selected_view_index: 0,
            selected_expense_index: 0,
            selected_income_index: 0,
            selected_budget_index: 0,
            selected_category_index: 0,
            selected_recurring_index: 0,
            report_tab: ReportTab::default(),
            status_message: None,
            expense_form: ExpenseFormState::new(Local::now().date_naive(), settings),
            income_form: IncomeFormState::new(Local::now().date_naive()),
            budget_limit: BudgetLimitState::new(),
        }
    }

    pub fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Switch to a different view
    pub fn switch_view(&mut self, view: ActiveView) {
        self.active_view = view;
        self.selected_view_index = view.index();

        match view {
            ActiveView::Expenses => self.selected_expense_index = 0,
            ActiveView::Income => self.selected_income_index = 0,
            ActiveView::Budget => self.selected_budget_index = 0,
            ActiveView::Categories => self.selected_category_index = 0,
            ActiveView::Recurring => self.selected_recurring_index = 0,
            ActiveView::Dashboard | ActiveView::Reports => {}
        }
    }

    pub fn toggle_panel_focus(&mut self) {
        self.focused_panel = match self.focused_panel {
            FocusedPanel::Sidebar => FocusedPanel::Main,
            FocusedPanel::Main => FocusedPanel::Sidebar,
        };
    }

    /// Open a dialog, resetting the form it uses
    pub fn open_dialog(&mut self, dialog: ActiveDialog) {
        let today = self.today();
        match &dialog {
            ActiveDialog::AddExpense => {
                let date = self.default_entry_date(today);
                self.expense_form = ExpenseFormState::new(date, self.settings);
            }
            ActiveDialog::EditExpense(id) => {
                match ExpenseService::new(self.storage).get(*id) {
                    Ok(Some(expense)) => {
                        let categories = self.categories_of(CategoryKind::Expense);
                        self.expense_form =
                            ExpenseFormState::from_expense(&expense, &categories, self.storage);
                    }
                    _ => {
                        self.set_status("Expense not found");
                        return;
                    }
                }
            }
            ActiveDialog::AddIncome => {
                let date = self.default_entry_date(today);
                self.income_form = IncomeFormState::new(date);
            }
            ActiveDialog::EditIncome(id) => match IncomeService::new(self.storage).get(*id) {
                Ok(Some(income)) => {
                    let categories = self.categories_of(CategoryKind::Income);
                    self.income_form = IncomeFormState::from_income(&income, &categories);
                }
                _ => {
                    self.set_status("Income not found");
                    return;
                }
            },
            ActiveDialog::BudgetLimit => {
                self.budget_limit = BudgetLimitState::new();
                let line = self
                    .budget_progress()
                    .and_then(|p| p.categories.get(self.selected_budget_index).cloned());
                if let Some(line) = line {
                    let categories = self.categories_of(CategoryKind::Expense);
                    if let Some(category) = categories.iter().find(|c| c.id == line.category_id) {
                        self.budget_limit.prefill(category, line.progress.budget);
                    }
                }
            }
            _ => {}
        }
        self.active_dialog = dialog;
    }

    pub fn close_dialog(&mut self) {
        self.active_dialog = ActiveDialog::None;
    }

    pub fn has_dialog(&self) -> bool {
        !matches!(self.active_dialog, ActiveDialog::None)
    }

    /// New entries default to today when viewing the current month, otherwise
    /// to the first of the viewed month
    fn default_entry_date(&self, today: NaiveDate) -> NaiveDate {
        if self.current_month.contains(today) {
            today
        } else {
            self.current_month.start_date()
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.focused_panel {
            FocusedPanel::Sidebar => Some(&mut self.selected_view_index),
            FocusedPanel::Main => match self.active_view {
                ActiveView::Expenses => Some(&mut self.selected_expense_index),
                ActiveView::Income => Some(&mut self.selected_income_index),
                ActiveView::Budget => Some(&mut self.selected_budget_index),
                ActiveView::Categories => Some(&mut self.selected_category_index),
                ActiveView::Recurring => Some(&mut self.selected_recurring_index),
                ActiveView::Dashboard | ActiveView::Reports => None,
            },
        }
    }

    /// Move selection up in the focused list
    pub fn move_up(&mut self) {
        if let Some(index) = self.selection_mut() {
            *index = index.saturating_sub(1);
        }
    }

    /// Move selection down in the focused list of `max` rows
    pub fn move_down(&mut self, max: usize) {
        if let Some(index) = self.selection_mut() {
            if *index < max.saturating_sub(1) {
                *index += 1;
            }
        }
    }

    /// Go to the previous month; list selections start over
    pub fn prev_month(&mut self) {
        self.current_month = self.current_month.prev();
        self.reset_month_selections();
    }

    pub fn next_month(&mut self) {
        self.current_month = self.current_month.next();
        self.reset_month_selections();
    }

    fn reset_month_selections(&mut self) {
        self.selected_expense_index = 0;
        self.selected_income_index = 0;
        self.selected_budget_index = 0;
    }

    /// Keep list selections inside their lists after a delete
    pub fn clamp_selections(&mut self) {
        let expenses = self.month_expenses().len();
        let incomes = self.month_incomes().len();
        let budget_lines = self
            .budget_progress()
            .map(|p| p.categories.len())
            .unwrap_or(0);
        let rules = self.recurring_rules().len();

        let clamp = |index: &mut usize, len: usize| *index = (*index).min(len.saturating_sub(1));
        clamp(&mut self.selected_expense_index, expenses);
        clamp(&mut self.selected_income_index, incomes);
        clamp(&mut self.selected_budget_index, budget_lines);
        clamp(&mut self.selected_recurring_index, rules);
    }

    /// Expenses of the current month, newest first
    pub fn month_expenses(&self) -> Vec<Expense> {
        ExpenseService::new(self.storage)
            .list(&ExpenseFilter::new().month(self.current_month))
            .unwrap_or_default()
    }

    /// Incomes of the current month, newest first
    pub fn month_incomes(&self) -> Vec<Income> {
        IncomeService::new(self.storage)
            .list(&IncomeFilter::month(self.current_month))
            .unwrap_or_default()
    }

    /// All recurring rules, paused ones included
    pub fn recurring_rules(&self) -> Vec<RecurringTransaction> {
        RecurringService::new(self.storage)
            .list(true)
            .unwrap_or_default()
    }

    pub fn categories(&self) -> Vec<Category> {
        CategoryService::new(self.storage).list().unwrap_or_default()
    }

    pub fn categories_of(&self, kind: CategoryKind) -> Vec<Category> {
        CategoryService::new(self.storage)
            .list_by_kind(kind)
            .unwrap_or_default()
    }

    /// Budget progress for the current month, `None` without a budget
    pub fn budget_progress(&self) -> Option<BudgetProgress> {
        BudgetService::new(self.storage)
            .progress(self.current_month, self.settings.budget_alert_threshold)
            .ok()
            .flatten()
    }

    pub fn selected_expense(&self) -> Option<Expense> {
        self.month_expenses()
            .into_iter()
            .nth(self.selected_expense_index)
    }

    pub fn selected_income(&self) -> Option<Income> {
        self.month_incomes().into_iter().nth(self.selected_income_index)
    }

    pub fn selected_recurring(&self) -> Option<RecurringTransaction> {
        self.recurring_rules()
            .into_iter()
            .nth(self.selected_recurring_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::Money;
    use crate::services::CreateExpenseInput;
    use crate::storage::init::initialize_storage;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_view_keys() {
        assert_eq!(ActiveView::from_key('1'), Some(ActiveView::Dashboard));
        assert_eq!(ActiveView::from_key('7'), Some(ActiveView::Recurring));
        assert_eq!(ActiveView::from_key('0'), None);
        assert_eq!(ActiveView::from_key('8'), None);
        assert_eq!(ActiveView::Budget.index(), 3);
    }

    #[test]
    fn test_report_tabs_wrap() {
        assert_eq!(ReportTab::Categories.prev(), ReportTab::PaymentMethods);
        assert_eq!(ReportTab::PaymentMethods.next(), ReportTab::Categories);
        assert_eq!(ReportTab::Trend.next(), ReportTab::Tags);
    }

    #[test]
    fn test_month_navigation_resets_selection() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let mut app = App::new(&storage, &settings);

        let start = app.current_month;
        app.selected_expense_index = 4;
        app.prev_month();
        assert_eq!(app.current_month, start.prev());
        assert_eq!(app.selected_expense_index, 0);
        app.next_month();
        assert_eq!(app.current_month, start);
    }

    #[test]
    fn test_move_down_stops_at_end() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let mut app = App::new(&storage, &settings);

        app.focused_panel = FocusedPanel::Main;
        app.switch_view(ActiveView::Expenses);
        app.move_down(2);
        app.move_down(2);
        assert_eq!(app.selected_expense_index, 1);
        app.move_up();
        app.move_up();
        assert_eq!(app.selected_expense_index, 0);
    }

    #[test]
    fn test_edit_dialog_loads_expense() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let other = CategoryService::new(&storage)
            .fallback_category(CategoryKind::Expense)
            .unwrap();
        let today = Local::now().date_naive();
        let mut input = CreateExpenseInput::new(Money::from_cents(1250), today, other.id);
        input.description = "Lunch".into();
        let expense = ExpenseService::new(&storage).create(input).unwrap();

        let mut app = App::new(&storage, &settings);
        app.open_dialog(ActiveDialog::EditExpense(expense.id));
        assert_eq!(app.active_dialog, ActiveDialog::EditExpense(expense.id));
        assert_eq!(app.expense_form.amount_input.value(), "12.50");
        assert_eq!(app.expense_form.description_input.value(), "Lunch");
        assert_eq!(app.expense_form.category.selected, Some(other.id));

        app.close_dialog();
        assert!(!app.has_dialog());
    }

    #[test]
    fn test_edit_missing_expense_keeps_dialog_closed() {
        let (_dir, storage) = create_test_storage();
        let settings = Settings::default();
        let mut app = App::new(&storage, &settings);

        app.open_dialog(ActiveDialog::EditExpense(ExpenseId::new()));
        assert!(!app.has_dialog());
        assert_eq!(app.status_message.as_deref(), Some("Expense not found"));
    }
}
