//! Dashboard view
//!
//! Month totals with the change from last month, the overall budget gauge,
//! top spending categories, recent entries and upcoming recurring items.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
    Frame,
};

use crate::display::report::{format_bar, format_percentage, truncate};
use crate::models::{BudgetStatus, CategoryId, Money, TransactionKind};
use crate::reports::Dashboard;
use crate::tui::app::App;
use crate::tui::layout::DashboardLayout;

use super::status_color;

/// Render the dashboard
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let dashboard = match Dashboard::generate(
        app.storage,
        app.current_month,
        app.today(),
        app.settings.budget_alert_threshold,
    ) {
        Ok(dashboard) => dashboard,
        Err(e) => {
            let text = Paragraph::new(format!("Dashboard unavailable: {}", e))
                .block(Block::default().title(" Dashboard ").borders(Borders::ALL))
                .style(Style::default().fg(Color::Red));
            frame.render_widget(text, area);
            return;
        }
    };

    let layout = DashboardLayout::new(area);
    let symbol = app.symbol().to_string();

    render_summary(frame, &dashboard, &symbol, layout.summary);
    render_budget_gauge(frame, &dashboard, &symbol, layout.budget);
    render_top_categories(frame, &dashboard, &symbol, layout.top_categories);
    render_recent(frame, &dashboard, &symbol, layout.recent);
    render_upcoming(frame, &dashboard, &symbol, layout.upcoming);
}

fn change_span(change: Option<f64>, rising_is_bad: bool) -> Span<'static> {
    match change {
        None => Span::styled("  (no data last month)", Style::default().fg(Color::DarkGray)),
        Some(pct) => {
            let bad = (pct > 0.0) == rising_is_bad && pct != 0.0;
            let color = if bad { Color::Red } else { Color::Green };
            let arrow = if pct >= 0.0 { "▲" } else { "▼" };
            Span::styled(
                format!("  {} {} vs last month", arrow, format_percentage(pct.abs())),
                Style::default().fg(color),
            )
        }
    }
}

fn render_summary(frame: &mut Frame, dashboard: &Dashboard, symbol: &str, area: Rect) {
    let block = Block::default()
        .title(format!(" Dashboard - {} ", dashboard.month.label()))
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let current = &dashboard.current;
    let balance_color = if current.balance.is_negative() {
        Color::Red
    } else {
        Color::Green
    };
    let amount = |label: &str, value: Money, color: Color| {
        vec![
            Span::styled(format!("{:<10}", label), Style::default().fg(Color::White)),
            Span::styled(
                format!("{:>14}", value.format_with_symbol(symbol)),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]
    };

    let mut income = amount("Income", current.income, Color::Green);
    income.push(change_span(dashboard.income_change(), false));
    let mut expenses = amount("Expenses", current.expenses, Color::Red);
    expenses.push(change_span(dashboard.expense_change(), true));
    let mut balance = amount("Balance", current.balance, balance_color);
    balance.push(Span::styled(
        format!("  saved {}", format_percentage(current.savings_rate)),
        Style::default().fg(Color::White),
    ));

    let lines = vec![Line::from(income), Line::from(expenses), Line::from(balance)];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_budget_gauge(frame: &mut Frame, dashboard: &Dashboard, symbol: &str, area: Rect) {
    let block = Block::default()
        .title(" Budget ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(budget) = &dashboard.budget else {
        let text = Paragraph::new("No budget for this month (press 4, then b)")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, area);
        return;
    };

    let progress = &budget.expenses;
    if progress.budget.is_zero() {
        let text = Paragraph::new(format!(
            "Spent {} with no overall limit; {} over budget",
            progress.spent.format_with_symbol(symbol),
            budget.over_budget_count()
        ))
        .block(block);
        frame.render_widget(text, area);
        return;
    }

    let label = format!(
        "{} of {} ({})  {} alert(s)",
        progress.spent.format_with_symbol(symbol),
        progress.budget.format_with_symbol(symbol),
        format_percentage(progress.percentage),
        budget.alerts().len()
    );
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(status_color(progress.status)))
        .ratio(progress.display_percentage() / 100.0)
        .label(label);
    frame.render_widget(gauge, area);
}

fn render_top_categories(frame: &mut Frame, dashboard: &Dashboard, symbol: &str, area: Rect) {
    let block = Block::default()
        .title(" Top Categories ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if dashboard.top_categories.is_empty() {
        let text = Paragraph::new("No spending this month")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, area);
        return;
    }

    let max = dashboard
        .top_categories
        .first()
        .map(|c| c.total.as_f64())
        .unwrap_or(0.0);
    let budget_status = |id: CategoryId| {
        dashboard
            .budget
            .as_ref()
            .and_then(|b| b.categories.iter().find(|c| c.category_id == id))
            .map(|c| c.progress.status)
            .unwrap_or(BudgetStatus::Ok)
    };

    let items: Vec<ListItem> = dashboard
        .top_categories
        .iter()
        .flat_map(|category| {
            let color = status_color(budget_status(category.category_id));
            vec![
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<18}", truncate(&category.name, 18)),
                        Style::default().fg(Color::White),
                    ),
                    Span::styled(
                        format!("{:>12}", category.total.format_with_symbol(symbol)),
                        Style::default().fg(color),
                    ),
                    Span::styled(
                        format!(" {:>5}", format_percentage(category.percentage)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])),
                ListItem::new(Span::styled(
                    format_bar(category.total.as_f64(), max, 30),
                    Style::default().fg(color),
                )),
            ]
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn kind_span(kind: TransactionKind) -> Span<'static> {
    match kind {
        TransactionKind::Expense => Span::styled("-", Style::default().fg(Color::Red)),
        TransactionKind::Income => Span::styled("+", Style::default().fg(Color::Green)),
    }
}

fn render_recent(frame: &mut Frame, dashboard: &Dashboard, symbol: &str, area: Rect) {
    let block = Block::default()
        .title(" Recent ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let items: Vec<ListItem> = dashboard
        .recent
        .iter()
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    entry.date.format("%m-%d ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                kind_span(entry.kind),
                Span::styled(
                    format!("{:>11} ", entry.amount.format_with_symbol(symbol)),
                    Style::default().fg(Color::White),
                ),
                Span::raw(truncate(&entry.label, 22)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

fn render_upcoming(frame: &mut Frame, dashboard: &Dashboard, symbol: &str, area: Rect) {
    let block = Block::default()
        .title(" Upcoming ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if dashboard.upcoming.is_empty() {
        let text = Paragraph::new("Nothing scheduled")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = dashboard
        .upcoming
        .iter()
        .map(|item| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    item.date.format("%m-%d ").to_string(),
                    Style::default().fg(Color::Yellow),
                ),
                kind_span(item.kind),
                Span::styled(
                    format!("{:>11} ", item.amount.format_with_symbol(symbol)),
                    Style::default().fg(Color::White),
                ),
                Span::raw(truncate(&item.description, 22)),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
