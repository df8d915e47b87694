//! Text input widget
//!
//! A single-line text field with a character-based cursor

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// A single-line text input
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    /// Current text content
    pub content: String,
    /// Cursor position, counted in characters
    pub cursor: usize,
    /// Whether the input is focused
    pub focused: bool,
    /// Shown while the field is empty and unfocused
    pub placeholder: String,
    pub label: String,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set content and move the cursor to the end
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.set_value(content);
        self
    }

    pub fn set_value(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.char_count();
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    /// Byte offset of the cursor within `content`
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    /// Insert a character at the cursor
    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index();
        self.content.insert(idx, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index();
            self.content.remove(idx);
        }
    }

    /// Delete the character at the cursor
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let idx = self.byte_index();
            self.content.remove(idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_start(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    pub fn value(&self) -> &str {
        &self.content
    }

    /// Trimmed content, `None` when blank
    pub fn non_empty(&self) -> Option<&str> {
        Some(self.content.trim()).filter(|s| !s.is_empty())
    }

    /// Build the display line: right-aligned label, then the value with a
    /// block cursor when focused
    pub fn line(&self) -> Line<'static> {
        let label_style = if self.focused {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let mut spans = vec![Span::styled(format!("{:>12}: ", self.label), label_style)];

        if !self.focused {
            if self.content.is_empty() {
                spans.push(Span::styled(
                    self.placeholder.clone(),
                    Style::default().fg(Color::DarkGray),
                ));
            } else {
                spans.push(Span::styled(
                    self.content.clone(),
                    Style::default().fg(Color::Yellow),
                ));
            }
            return Line::from(spans);
        }

        let value_style = Style::default().fg(Color::White);
        let before: String = self.content.chars().take(self.cursor).collect();
        let mut rest = self.content.chars().skip(self.cursor);
        let cursor_char = rest.next().unwrap_or(' ');
        let after: String = rest.collect();

        spans.push(Span::styled(before, value_style));
        spans.push(Span::styled(
            cursor_char.to_string(),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ));
        if !after.is_empty() {
            spans.push(Span::styled(after, value_style));
        }
        Line::from(spans)
    }
}

/// Render an input on a single row
pub fn render_field(frame: &mut Frame, area: Rect, input: &TextInput) {
    frame.render_widget(Paragraph::new(input.line()), area);
}
