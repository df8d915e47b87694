//! Screen regions
//!
//! Sidebar on the left, the active view on the right, one status line
//! along the bottom.

use ratatui::layout::{Constraint, Flex, Layout, Rect};

const SIDEBAR_WIDTH: u16 = 26;

pub struct AppLayout {
    pub sidebar: Rect,
    pub main: Rect,
    pub status_bar: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let [body, status_bar] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
                .areas(body);

        Self {
            sidebar,
            main,
            status_bar,
        }
    }
}

/// Title and month, the view list, then the month's totals
pub struct SidebarLayout {
    pub header: Rect,
    pub views: Rect,
    pub summary: Rect,
}

impl SidebarLayout {
    pub fn new(area: Rect) -> Self {
        let [header, views, summary] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Min(6),
        ])
        .areas(area);

        Self {
            header,
            views,
            summary,
        }
    }
}

/// A three-line header over a list or table
pub struct MainPanelLayout {
    pub header: Rect,
    pub content: Rect,
}

impl MainPanelLayout {
    pub fn new(area: Rect) -> Self {
        let [header, content] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);
        Self { header, content }
    }
}

pub struct DashboardLayout {
    /// Income, expenses, balance
    pub summary: Rect,
    /// Overall budget gauge
    pub budget: Rect,
    pub top_categories: Rect,
    pub recent: Rect,
    pub upcoming: Rect,
}

impl DashboardLayout {
    pub fn new(area: Rect) -> Self {
        let [summary, budget, lists] = Layout::vertical([
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(6),
        ])
        .areas(area);
        let [top_categories, right] =
            Layout::horizontal([Constraint::Percentage(50); 2]).areas(lists);
        let [recent, upcoming] =
            Layout::vertical([Constraint::Percentage(55), Constraint::Percentage(45)])
                .areas(right);

        Self {
            summary,
            budget,
            top_categories,
            recent,
            upcoming,
        }
    }
}

/// Popup covering a percentage of `area`, centered
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)])
        .flex(Flex::Center)
        .areas(area);
    let [popup] = Layout::horizontal([Constraint::Percentage(percent_x)])
        .flex(Flex::Center)
        .areas(row);
    popup
}

/// Popup of a fixed size, shrunk to fit small terminals
pub fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_layout_splits() {
        let layout = AppLayout::new(Rect::new(0, 0, 100, 30));
        assert_eq!(layout.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.main.width, 74);
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.status_bar.y, 29);
    }

    #[test]
    fn test_dashboard_columns_share_width() {
        let layout = DashboardLayout::new(Rect::new(0, 0, 80, 30));
        assert_eq!(layout.summary.height, 5);
        assert_eq!(layout.top_categories.width, 40);
        assert_eq!(layout.recent.x, 40);
        assert_eq!(layout.recent.x, layout.upcoming.x);
    }

    #[test]
    fn test_centered_rect_fixed_clamps() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect_fixed(60, 20, area);
        assert_eq!(rect, area);

        let rect = centered_rect_fixed(20, 4, area);
        assert_eq!((rect.x, rect.y), (10, 3));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 50, area);
        assert_eq!((rect.width, rect.height), (60, 20));
        assert_eq!((rect.x, rect.y), (20, 10));
    }
}
