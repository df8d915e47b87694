//! Budget view
//!
//! Income, expense and savings targets against actuals for the viewed
//! month, then one row per budgeted category.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::display::report::{format_bar, format_percentage};
use crate::models::Money;
use crate::services::{BudgetProgress, TargetProgress};
use crate::tui::app::App;

use super::{header_row, highlight_style, list_block, render_empty, render_header, status_color};

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Targets
            Constraint::Min(5),    // Category lines
        ])
        .split(area);

    render_header(
        frame,
        chunks[0],
        format!(" Budget - {} ", app.current_month.label()),
        "b:Add limit  e:Change  d:Remove  c:Copy last month",
    );

    let symbol = app.symbol().to_string();
    let Some(progress) = app.budget_progress() else {
        let block = list_block(app);
        render_empty(
            frame,
            Rect {
                height: chunks[1].height + chunks[2].height,
                ..chunks[1]
            },
            block,
            "No budget for this month. Press 'b' to set a category limit or 'c' to copy last month's budget.",
        );
        return;
    };

    render_targets(frame, &progress, &symbol, chunks[1]);
    render_lines(frame, app, &progress, &symbol, chunks[2]);
}

fn target_line(label: &str, target: &TargetProgress, symbol: &str) -> Line<'static> {
    let color = if target.target.is_zero() {
        Color::DarkGray
    } else if target.is_met() {
        Color::Green
    } else {
        Color::Yellow
    };
    let detail = if target.target.is_zero() {
        "no target".to_string()
    } else {
        format!(
            "of {} ({})",
            target.target.format_with_symbol(symbol),
            format_percentage(target.percentage)
        )
    };
    Line::from(vec![
        Span::styled(format!("{:>10}: ", label), Style::default().fg(Color::White)),
        Span::styled(
            format!("{:>12} ", target.actual.format_with_symbol(symbol)),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(detail, Style::default().fg(Color::DarkGray)),
    ])
}

fn render_targets(frame: &mut Frame, progress: &BudgetProgress, symbol: &str, area: Rect) {
    let expenses = &progress.expenses;
    let expense_detail = if expenses.budget.is_zero() {
        "no target".to_string()
    } else {
        format!(
            "of {} ({})",
            expenses.budget.format_with_symbol(symbol),
            format_percentage(expenses.percentage)
        )
    };

    let lines = vec![
        target_line("Income", &progress.income, symbol),
        Line::from(vec![
            Span::styled(format!("{:>10}: ", "Expenses"), Style::default().fg(Color::White)),
            Span::styled(
                format!("{:>12} ", expenses.spent.format_with_symbol(symbol)),
                Style::default()
                    .fg(status_color(expenses.status))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(expense_detail, Style::default().fg(Color::DarkGray)),
        ]),
        target_line("Savings", &progress.savings, symbol),
    ];

    let mut title = " Targets ".to_string();
    if progress.unbudgeted_spent.is_positive() {
        title = format!(
            " Targets ({} unbudgeted) ",
            progress.unbudgeted_spent.format_with_symbol(symbol)
        );
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_lines(
    frame: &mut Frame,
    app: &App,
    progress: &BudgetProgress,
    symbol: &str,
    area: Rect,
) {
    let block = list_block(app);
    if progress.categories.is_empty() {
        render_empty(
            frame,
            area,
            block,
            "No category limits yet. Press 'b' to add one.",
        );
        return;
    }

    let rows: Vec<Row> = progress
        .categories
        .iter()
        .map(|line| {
            let p = &line.progress;
            let color = status_color(p.status);
            let remaining_color = if p.remaining.is_negative() {
                Color::Red
            } else {
                Color::Green
            };
            Row::new(vec![
                Cell::from(format!("{} {}", line.icon, line.name)),
                Cell::from(p.budget.format_with_symbol(symbol)),
                Cell::from(p.spent.format_with_symbol(symbol)),
                Cell::from(p.remaining.format_with_symbol(symbol))
                    .style(Style::default().fg(remaining_color)),
                Cell::from(format_bar(p.display_percentage(), 100.0, 12))
                    .style(Style::default().fg(color)),
                Cell::from(format_percentage(p.percentage)).style(Style::default().fg(color)),
                Cell::from(p.status.to_string()).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(8),
    ];

    let total_budget: Money = progress.categories.iter().map(|c| c.progress.budget).sum();
    let block = block.title(format!(
        " Category limits ({} budgeted, {} over) ",
        total_budget.format_with_symbol(symbol),
        progress.over_budget_count()
    ));

    let table = Table::new(rows, widths)
        .header(header_row(&[
            "Category",
            "Budget",
            "Spent",
            "Remaining",
            "",
            "%",
            "Status",
        ]))
        .block(block)
        .highlight_style(highlight_style())
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(
        app.selected_budget_index
            .min(progress.categories.len() - 1),
    ));
    frame.render_stateful_widget(table, area, &mut state);
}
