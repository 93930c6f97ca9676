//! Search box for the table viewer.
//!
//! The widget only edits text. Debouncing belongs to the `TableView`, which
//! receives every change through `queue_search` and decides when to run it.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInputAction {
    /// Key consumed, text unchanged
    Continue,
    /// Text changed; queue a debounced search
    Changed(String),
    /// Enter: run the search now and leave the box
    Confirm(String),
    /// Esc: leave the box, keeping the current search
    Cancel,
    /// Not handled here
    PassThrough,
}

pub struct SearchInput {
    input: Input,
    title: String,
    style: Style,
    active: bool,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchInput {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            title: "Search".to_string(),
            style: Style::default().fg(Color::Yellow),
            active: false,
        }
    }

    /// Start editing, keeping `current` as the initial text
    pub fn activate(&mut self, current: &str) {
        self.active = true;
        self.input = Input::default().with_value(current.to_string());
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Replace the text without reporting a change
    pub fn set_value(&mut self, value: &str) {
        self.input = Input::default().with_value(value.to_string());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> SearchInputAction {
        if !self.active {
            return SearchInputAction::PassThrough;
        }

        match key.code {
            KeyCode::Esc => {
                self.deactivate();
                SearchInputAction::Cancel
            }
            KeyCode::Enter => {
                self.deactivate();
                SearchInputAction::Confirm(self.input.value().to_string())
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                SearchInputAction::PassThrough
            }
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() != before {
                    SearchInputAction::Changed(self.input.value().to_string())
                } else {
                    SearchInputAction::Continue
                }
            }
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, pending: bool) {
        let title = if pending {
            format!("{} (typing...)", self.title)
        } else {
            self.title.clone()
        };
        let border_style = if self.active {
            self.style
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(border_style);

        let widget = Paragraph::new(self.input.value())
            .block(block)
            .style(self.style);
        f.render_widget(widget, area);

        if self.active {
            let x = area.x + 1 + self.input.visual_cursor() as u16;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }
}
