//! Sidebar view
//!
//! Shows the view list and the month's income/expense totals

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::reports::MonthSummary;
use crate::tui::app::{ActiveView, App, FocusedPanel};
use crate::tui::layout::SidebarLayout;

/// Render the sidebar
pub fn render(frame: &mut Frame, app: &mut App, area: Rect) {
    let layout = SidebarLayout::new(area);

    render_header(frame, app, layout.header);
    render_views(frame, app, layout.views);
    render_summary(frame, app, layout.summary);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" MoneyNote ")
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = vec![
        Line::from(Span::styled(
            format!("◀ {} ▶", app.current_month.label()),
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_views(frame: &mut Frame, app: &mut App, area: Rect) {
    let is_focused = app.focused_panel == FocusedPanel::Sidebar;
    let border_color = if is_focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .title(" Views ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let items: Vec<ListItem> = ActiveView::ALL
        .iter()
        .enumerate()
        .map(|(i, view)| {
            let active = app.active_view == *view;
            let style = if active {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let indicator = if active { "▶" } else { " " };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", indicator), style),
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(view.label(), style),
            ]))
        })
        .collect();

    let mut list = List::new(items).block(block);
    let mut state = ListState::default();
    if is_focused {
        list = list.highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );
        state.select(Some(app.selected_view_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" This Month ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Ok(summary) = MonthSummary::compute(app.storage, app.current_month) else {
        let text = Paragraph::new("Unavailable")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(text, area);
        return;
    };

    let symbol = app.symbol();
    let balance_color = if summary.balance.is_negative() {
        Color::Red
    } else {
        Color::Green
    };
    let row = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{:<9}", label), Style::default().fg(Color::White)),
            Span::styled(format!("{:>13}", value), Style::default().fg(color)),
        ])
    };

    let lines = vec![
        row(
            "Income",
            summary.income.format_with_symbol(symbol),
            Color::Green,
        ),
        row(
            "Expenses",
            summary.expenses.format_with_symbol(symbol),
            Color::Red,
        ),
        row(
            "Balance",
            summary.balance.format_with_symbol(symbol),
            balance_color,
        ),
        row(
            "Saved",
            format!("{:.1}%", summary.savings_rate),
            balance_color,
        ),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
