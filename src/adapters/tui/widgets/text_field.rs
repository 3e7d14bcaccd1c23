use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Single-line input with a cursor. `masked` replaces every character
/// with a bullet for the password field.
pub struct TextField {
    label: &'static str,
    value: String,
    cursor_position: usize,
    masked: bool,
}

impl TextField {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            value: String::new(),
            cursor_position: 0,
            masked: false,
        }
    }

    pub fn masked(label: &'static str) -> Self {
        Self {
            masked: true,
            ..Self::new(label)
        }
    }

    pub fn with_value(label: &'static str, value: &str) -> Self {
        Self {
            value: value.to_string(),
            cursor_position: value.chars().count(),
            ..Self::new(label)
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_index = self.byte_index();
        self.value.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let mut chars: Vec<char> = self.value.chars().collect();
            chars.remove(self.cursor_position - 1);
            self.value = chars.into_iter().collect();
            self.cursor_position -= 1;
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Gray)
        };

        let block = Block::default()
            .title(self.label)
            .borders(Borders::ALL)
            .border_style(border_style);

        let display: String = if self.masked {
            self.value.chars().map(|_| '•').collect()
        } else {
            self.value.clone()
        };

        let paragraph = Paragraph::new(display).block(block);
        frame.render_widget(paragraph, area);

        if focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width - 1 {
                frame.set_cursor_position(ratatui::layout::Position {
                    x: cursor_x,
                    y: cursor_y,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_keeps_cursor_in_bounds() {
        let mut field = TextField::new("Name");
        field.insert_char('h');
        field.insert_char('i');
        assert_eq!(field.value(), "hi");

        field.move_left();
        field.insert_char('a');
        assert_eq!(field.value(), "hai");

        field.delete_char();
        assert_eq!(field.value(), "hi");

        field.move_right();
        field.move_right(); // Already at the end, no-op
        field.delete_char();
        assert_eq!(field.value(), "h");

        field.clear();
        assert!(field.is_empty());
        field.delete_char(); // Empty field, no-op
        assert!(field.is_empty());
    }

    #[test]
    fn prefilled_field_starts_with_cursor_at_end() {
        let mut field = TextField::with_value("Name", "Alpha");
        field.insert_char('!');
        assert_eq!(field.value(), "Alpha!");
    }
}
