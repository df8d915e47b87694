//! Reports view
//!
//! Tabs over the month's spending by category, tag and payment method,
//! plus a six-month income/expense trend.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{BarChart, Block, Borders, Cell, Paragraph, Row, Table, Tabs},
    Frame,
};

use crate::display::report::{format_bar, format_percentage, truncate};
use crate::reports::{Breakdown, BreakdownRow, CategoryBreakdown, TrendReport};
use crate::tui::app::{App, ReportTab};

use super::{header_row, render_empty};

/// Months shown by the trend tab
const TREND_MONTHS: usize = 6;

pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_tabs(frame, app, chunks[0]);

    let symbol = app.symbol().to_string();
    let start = app.current_month.start_date();
    let end = app.current_month.end_date();

    let result = match app.report_tab {
        ReportTab::Categories => CategoryBreakdown::generate(app.storage, start, end)
            .map(|report| render_categories(frame, &report, &symbol, chunks[1])),
        ReportTab::Trend => TrendReport::generate(app.storage, app.current_month, TREND_MONTHS)
            .map(|report| render_trend(frame, &report, &symbol, chunks[1])),
        ReportTab::Tags => Breakdown::by_tag(app.storage, start, end)
            .map(|report| render_breakdown(frame, &report, &symbol, chunks[1])),
        ReportTab::PaymentMethods => Breakdown::by_payment_method(app.storage, start, end)
            .map(|report| render_breakdown(frame, &report, &symbol, chunks[1])),
    };

    if let Err(e) = result {
        let text = Paragraph::new(format!("Report unavailable: {}", e))
            .block(Block::default().borders(Borders::ALL))
            .style(Style::default().fg(Color::Red));
        frame.render_widget(text, chunks[1]);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = ReportTab::ALL
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.label())))
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .title(format!(" Reports - {} ", app.current_month.label()))
                .title_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .select(app.report_tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn content_block(title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

fn render_categories(frame: &mut Frame, report: &CategoryBreakdown, symbol: &str, area: Rect) {
    let block = content_block(format!(
        " Spending by category ({} in {} expenses) ",
        report.total.format_with_symbol(symbol),
        report.count
    ));
    if report.categories.is_empty() {
        render_empty(frame, area, block, "No expenses this month.");
        return;
    }

    let max = report
        .categories
        .iter()
        .map(|c| c.total.as_f64())
        .fold(0.0, f64::max);

    let mut rows = Vec::new();
    for category in &report.categories {
        rows.push(Row::new(vec![
            Cell::from(format!("{} {}", category.icon, category.name)),
            Cell::from(category.total.format_with_symbol(symbol)),
            Cell::from(category.count.to_string()),
            Cell::from(format_percentage(category.percentage)),
            Cell::from(format_bar(category.total.as_f64(), max, 20))
                .style(Style::default().fg(Color::Cyan)),
        ]));
        // Subcategory rows only when the split says something
        if category.subcategories.len() > 1 {
            for sub in &category.subcategories {
                rows.push(
                    Row::new(vec![
                        Cell::from(format!("    {}", truncate(&sub.name, 20))),
                        Cell::from(sub.total.format_with_symbol(symbol)),
                        Cell::from(sub.count.to_string()),
                        Cell::from(format_percentage(sub.percentage)),
                        Cell::from(""),
                    ])
                    .style(Style::default().fg(Color::DarkGray)),
                );
            }
        }
    }

    let widths = [
        Constraint::Min(18),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(20),
    ];
    let table = Table::new(rows, widths)
        .header(header_row(&["Category", "Total", "Count", "%", ""]))
        .block(block);
    frame.render_widget(table, area);
}

fn render_trend(frame: &mut Frame, report: &TrendReport, symbol: &str, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(report.months.len() as u16 + 4),
            Constraint::Min(6),
        ])
        .split(area);

    let rows: Vec<Row> = report
        .months
        .iter()
        .map(|m| {
            let balance_color = if m.balance.is_negative() {
                Color::Red
            } else {
                Color::Green
            };
            Row::new(vec![
                Cell::from(m.month.label()),
                Cell::from(m.income.format_with_symbol(symbol))
                    .style(Style::default().fg(Color::Green)),
                Cell::from(m.expenses.format_with_symbol(symbol))
                    .style(Style::default().fg(Color::Red)),
                Cell::from(m.balance.format_with_symbol(symbol))
                    .style(Style::default().fg(balance_color)),
                Cell::from(format_percentage(m.savings_rate)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(16),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths)
        .header(header_row(&["Month", "Income", "Expenses", "Balance", "Saved"]))
        .block(content_block(format!(
            " Last {} months (avg spending {}) ",
            report.months.len(),
            report.average_expenses().format_with_symbol(symbol)
        )));
    frame.render_widget(table, chunks[0]);

    let labels: Vec<String> = report
        .months
        .iter()
        .map(|m| m.month.start_date().format("%b").to_string())
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&report.months)
        .map(|(label, m)| (label.as_str(), m.expenses.as_f64().max(0.0).round() as u64))
        .collect();

    let chart = BarChart::default()
        .block(content_block(" Spending per month ".to_string()))
        .data(data.as_slice())
        .bar_width(7)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Red))
        .value_style(Style::default().fg(Color::Black).bg(Color::Red));
    frame.render_widget(chart, chunks[1]);
}

fn render_breakdown(frame: &mut Frame, report: &Breakdown, symbol: &str, area: Rect) {
    let block = content_block(format!(
        " {} ({}) ",
        report.title,
        report.total.format_with_symbol(symbol)
    ));
    if report.rows.is_empty() {
        render_empty(frame, area, block, "No expenses this month.");
        return;
    }

    let max = report
        .rows
        .iter()
        .map(|r| r.total.as_f64())
        .fold(0.0, f64::max);

    let rows: Vec<Row> = report
        .rows
        .iter()
        .map(|row: &BreakdownRow| {
            Row::new(vec![
                Cell::from(truncate(&row.label, 24)),
                Cell::from(row.total.format_with_symbol(symbol)),
                Cell::from(row.count.to_string()),
                Cell::from(format_percentage(row.percentage)),
                Cell::from(format_bar(row.total.as_f64(), max, 20))
                    .style(Style::default().fg(Color::Magenta)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Min(18),
        Constraint::Length(12),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(20),
    ];
    let table = Table::new(rows, widths)
        .header(header_row(&["", "Total", "Count", "%", ""]))
        .block(block);
    frame.render_widget(table, area);
}
