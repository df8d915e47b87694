//! Category picker
//!
//! A search field with a short dropdown of matching categories. Typing
//! filters, Up/Down moves the highlight, Enter picks.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::models::{Category, CategoryId};

use super::input::TextInput;

/// Dropdown rows shown at once
pub const PICKER_ROWS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct CategoryPicker {
    pub search: TextInput,
    pub selected: Option<CategoryId>,
    pub list_index: usize,
}

impl CategoryPicker {
    pub fn new(label: &str) -> Self {
        Self {
            search: TextInput::new()
                .label(label)
                .placeholder("Type to search..."),
            selected: None,
            list_index: 0,
        }
    }

    /// Categories whose name contains the search text
    pub fn matches<'c>(&self, categories: &'c [Category]) -> Vec<&'c Category> {
        let search = self.search.value().trim().to_lowercase();
        categories
            .iter()
            .filter(|c| search.is_empty() || c.name.to_lowercase().contains(&search))
            .take(PICKER_ROWS)
            .collect()
    }

    pub fn select(&mut self, category: &Category) {
        self.selected = Some(category.id);
        self.search.set_value(category.name.clone());
        self.list_index = 0;
    }

    /// Pick the highlighted match; false when nothing matches
    pub fn select_highlighted(&mut self, categories: &[Category]) -> bool {
        let matches = self.matches(categories);
        let idx = self.list_index.min(matches.len().saturating_sub(1));
        match matches.get(idx).copied() {
            Some(category) => {
                self.select(category);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.search.clear();
        self.list_index = 0;
    }

    pub fn is_open(&self) -> bool {
        self.search.focused && self.selected.is_none()
    }

    pub fn move_up(&mut self) {
        self.list_index = self.list_index.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if self.list_index + 1 < PICKER_ROWS {
            self.list_index += 1;
        }
    }

    /// Typing replaces a previous pick
    pub fn insert(&mut self, c: char) {
        if self.selected.is_some() {
            self.clear();
        }
        self.search.insert(c);
        self.list_index = 0;
    }

    pub fn backspace(&mut self) {
        if self.selected.is_some() {
            self.clear();
        } else {
            self.search.backspace();
            self.list_index = 0;
        }
    }
}

/// Render the picker's input row and, while it is open, its dropdown
pub fn render_picker(
    frame: &mut Frame,
    input_area: Rect,
    dropdown_area: Rect,
    picker: &CategoryPicker,
    categories: &[Category],
) {
    let mut line = picker.search.line();
    if picker.search.focused && picker.selected.is_some() {
        line.spans.push(Span::styled(
            " (Backspace to clear)",
            Style::default().fg(Color::DarkGray),
        ));
    }
    frame.render_widget(Paragraph::new(line), input_area);

    if !picker.is_open() {
        return;
    }

    let matches = picker.matches(categories);
    if matches.is_empty() {
        let hint = Paragraph::new("              No matching categories")
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(hint, dropdown_area);
        return;
    }

    let items: Vec<ListItem> = matches
        .iter()
        .map(|c| {
            ListItem::new(Line::from(Span::styled(
                format!("              {}", c.label()),
                Style::default().fg(Color::White),
            )))
        })
        .collect();

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ListState::default();
    state.select(Some(picker.list_index.min(matches.len() - 1)));
    frame.render_stateful_widget(list, dropdown_area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<Category> {
        vec![
            Category::new("Food"),
            Category::new("Transport"),
            Category::new("Fun"),
        ]
    }

    #[test]
    fn test_matches_filters_case_insensitively() {
        let cats = categories();
        let mut picker = CategoryPicker::new("Category");
        assert_eq!(picker.matches(&cats).len(), 3);

        picker.insert('F');
        let names: Vec<_> = picker.matches(&cats).iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["Food", "Fun"]);

        picker.insert('U');
        assert_eq!(picker.matches(&cats)[0].name, "Fun");
    }

    #[test]
    fn test_select_highlighted() {
        let cats = categories();
        let mut picker = CategoryPicker::new("Category");
        picker.insert('f');
        picker.move_down();
        assert!(picker.select_highlighted(&cats));
        assert_eq!(picker.selected, Some(cats[2].id));
        assert_eq!(picker.search.value(), "Fun");

        // Typing after a pick starts a new search
        picker.insert('t');
        assert_eq!(picker.selected, None);
        assert_eq!(picker.search.value(), "t");
    }

    #[test]
    fn test_no_match() {
        let cats = categories();
        let mut picker = CategoryPicker::new("Category");
        picker.insert('z');
        assert!(!picker.select_highlighted(&cats));
        assert_eq!(picker.selected, None);
    }
}
