use std::{cell::RefCell, rc::Rc};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use recall_core::widget::{DisposeHook, InputWidget, Snapshot};

/// Shared handle to a combo; the history store keeps only a weak reference
/// to the inner state.
pub type SharedCombo = Rc<RefCell<ComboState>>;

/// An editable one-line input with an attached suggestion list, the TUI
/// analogue of a combo box.
pub struct ComboState {
    name: Option<String>,
    text: String,
    // grapheme index, not byte index
    cursor: usize,
    items: Vec<String>,
    selected: Option<usize>,
    disposed: bool,
    dispose_hooks: Vec<DisposeHook>,
}

impl ComboState {
    pub fn new() -> Self {
        Self {
            name: None,
            text: String::new(),
            cursor: 0,
            items: Vec::new(),
            selected: None,
            disposed: false,
            dispose_hooks: Vec::new(),
        }
    }

    /// A combo carrying a name tag, so the store can derive its field id.
    pub fn named(name: &str) -> Self {
        let mut state = Self::new();
        state.name = Some(name.to_string());
        state
    }

    pub fn shared(self) -> SharedCombo {
        Rc::new(RefCell::new(self))
    }

    pub fn text_value(&self) -> &str {
        &self.text
    }

    pub fn insert_text(&mut self, s: &str) {
        let parts: Vec<&str> = self.text.graphemes(true).collect();
        let idx = self.cursor.min(parts.len());
        let mut new_text = String::new();
        for g in &parts[..idx] {
            new_text.push_str(g);
        }
        new_text.push_str(s);
        for g in &parts[idx..] {
            new_text.push_str(g);
        }
        self.text = new_text;
        let added = s.graphemes(true).count();
        self.cursor = (idx + added).min(self.text.graphemes(true).count());
        self.selected = None;
    }

    pub fn delete_left_grapheme(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let mut parts: Vec<&str> = self.text.graphemes(true).collect();
        parts.remove(self.cursor - 1);
        self.text = parts.concat();
        self.cursor -= 1;
        self.selected = None;
    }

    pub fn delete_right_grapheme(&mut self) {
        let mut parts: Vec<&str> = self.text.graphemes(true).collect();
        let idx = self.cursor.min(parts.len());
        if idx < parts.len() {
            parts.remove(idx);
            self.text = parts.concat();
        }
        self.selected = None;
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        let len = self.text.graphemes(true).count();
        self.cursor = (self.cursor + 1).min(len);
    }

    /// Move the suggestion highlight and copy the highlighted item into the
    /// text, cursor at the end.
    pub fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.selected {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.apply_selection(next);
    }

    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let next = match self.selected {
            None => 0,
            Some(i) => (i + 1).min(self.items.len() - 1),
        };
        self.apply_selection(next);
    }

    fn apply_selection(&mut self, idx: usize) {
        self.selected = Some(idx);
        self.text = self.items[idx].clone();
        self.cursor = self.text.graphemes(true).count();
    }

    /// Handle a key event. Returns true when the event changed the state.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if self.disposed || key.kind == KeyEventKind::Release {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.insert_text(&c.to_string());
                true
            }
            KeyCode::Backspace => {
                self.delete_left_grapheme();
                true
            }
            KeyCode::Delete => {
                self.delete_right_grapheme();
                true
            }
            KeyCode::Left => {
                self.move_cursor_left();
                true
            }
            KeyCode::Right => {
                self.move_cursor_right();
                true
            }
            KeyCode::Up => {
                self.select_prev();
                true
            }
            KeyCode::Down => {
                self.select_next();
                true
            }
            _ => false,
        }
    }

    /// Draw the field and its suggestion list. When focused, the cursor is
    /// placed after the grapheme the edit cursor sits on.
    pub fn render(&self, f: &mut Frame, area: Rect, title: &str, focused: bool) {
        let [input_area, list_area] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(area);

        let input_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let input = Paragraph::new(self.text.as_str())
            .block(Block::default().borders(Borders::ALL).title(format!(" {title} ")))
            .style(input_style);
        f.render_widget(input, input_area);

        if focused {
            let prefix: String = self
                .text
                .graphemes(true)
                .take(self.cursor)
                .collect();
            let col = UnicodeWidthStr::width(prefix.as_str()) as u16;
            f.set_cursor_position((
                input_area.x + 1 + col.min(input_area.width.saturating_sub(2)),
                input_area.y + 1,
            ));
        }

        let rows: Vec<ListItem> = self.items.iter().map(|i| ListItem::new(i.as_str())).collect();
        let list = List::new(rows)
            .block(Block::default().borders(Borders::ALL))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default();
        state.select(self.selected);
        f.render_stateful_widget(list, list_area, &mut state);
    }

    /// Tear the widget down: fire every registered hook with the final text
    /// and items, then refuse further interaction.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let snap = Snapshot {
            text: self.text.clone(),
            items: self.items.clone(),
        };
        for hook in self.dispose_hooks.drain(..) {
            hook(snap.clone());
        }
    }
}

impl Default for ComboState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputWidget for ComboState {
    fn name(&self) -> Option<String> {
        self.name.clone()
    }

    fn text(&self) -> String {
        self.text.clone()
    }

    fn items(&self) -> Vec<String> {
        self.items.clone()
    }

    fn set_items(&mut self, items: &[String]) {
        let value = self.text.clone();
        self.items = items.to_vec();
        self.selected = None;
        if !value.is_empty() {
            // replacing the list must not clobber what the user typed
            self.text = value;
        } else if let Some(first) = self.items.first() {
            self.text = first.clone();
            self.cursor = self.text.graphemes(true).count();
            self.selected = Some(0);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn on_dispose(&mut self, hook: DisposeHook) {
        self.dispose_hooks.push(hook);
    }
}
