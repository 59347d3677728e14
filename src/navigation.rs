//! Keyboard traversal and selection for menu-shaped overlays.
//!
//! The cursor is an index into the *enabled* items only, so wrapping and
//! skipping disabled entries fall out of plain modulo arithmetic. Both the
//! keyboard path and pointer clicks end in [`ItemNavigator::commit`].

use crossterm::event::KeyEvent;

use crate::keybindings::{Action, KeyBindings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub value: String,
    pub label: String,
    pub disabled: bool,
    pub selected: bool,
}

impl MenuItem {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            disabled: false,
            selected: false,
        }
    }

    /// Item whose label doubles as its value.
    pub fn labeled(label: impl Into<String>) -> Self {
        let label = label.into();
        Self::new(label.clone(), label)
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

/// Payload of a committed selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedItem {
    pub index: usize,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Idle,
    /// Position within the enabled items.
    Cursored(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Ignored,
    Moved,
    /// Commit the item at this index of the full item list.
    Commit(usize),
    /// Leave the menu without selecting.
    Close,
}

#[derive(Debug, Clone, Default)]
pub struct ItemNavigator {
    items: Vec<MenuItem>,
    cursor: Cursor,
    bindings: KeyBindings,
}

impl ItemNavigator {
    pub fn new(items: Vec<MenuItem>) -> Self {
        let mut nav = Self::default();
        nav.set_items(items);
        nav
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    /// Replace the item set. If the caller passes several selected items
    /// only the first keeps its flag.
    pub fn set_items(&mut self, mut items: Vec<MenuItem>) {
        let mut seen_selected = false;
        for item in items.iter_mut() {
            if item.selected {
                if seen_selected {
                    tracing::debug!(value = %item.value, "dropping extra selected flag");
                    item.selected = false;
                }
                seen_selected = true;
            }
        }
        self.items = items;
        if let Cursor::Cursored(pos) = self.cursor
            && pos >= self.enabled_indices().len()
        {
            self.cursor = Cursor::Idle;
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MenuItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Indices (into the full list) of items that can take the cursor.
    pub fn enabled_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.disabled)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Full-list index of the item under the cursor.
    pub fn cursor_index(&self) -> Option<usize> {
        match self.cursor {
            Cursor::Idle => None,
            Cursor::Cursored(pos) => self.enabled_indices().get(pos).copied(),
        }
    }

    pub fn cursor_item(&self) -> Option<&MenuItem> {
        self.cursor_index().and_then(|index| self.items.get(index))
    }

    pub fn selected(&self) -> Option<(usize, &MenuItem)> {
        self.items.iter().enumerate().find(|(_, item)| item.selected)
    }

    /// Called on every closed-to-open transition: start on the current
    /// selection when there is one, otherwise with no cursor.
    pub fn seed_cursor(&mut self) {
        self.cursor = self
            .selected()
            .map(|(index, _)| index)
            .and_then(|index| self.enabled_indices().iter().position(|i| *i == index))
            .map_or(Cursor::Idle, Cursor::Cursored);
    }

    pub fn reset(&mut self) {
        self.cursor = Cursor::Idle;
    }

    pub fn move_next(&mut self) {
        let count = self.enabled_indices().len();
        if count == 0 {
            self.cursor = Cursor::Idle;
            return;
        }
        self.cursor = Cursor::Cursored(match self.cursor {
            Cursor::Idle => 0,
            Cursor::Cursored(pos) => (pos + 1) % count,
        });
    }

    pub fn move_prev(&mut self) {
        let count = self.enabled_indices().len();
        if count == 0 {
            self.cursor = Cursor::Idle;
            return;
        }
        self.cursor = Cursor::Cursored(match self.cursor {
            Cursor::Idle => count - 1,
            Cursor::Cursored(pos) => (pos + count - 1) % count,
        });
    }

    pub fn move_first(&mut self) {
        if self.enabled_indices().is_empty() {
            self.cursor = Cursor::Idle;
        } else {
            self.cursor = Cursor::Cursored(0);
        }
    }

    pub fn move_last(&mut self) {
        let count = self.enabled_indices().len();
        self.cursor = if count == 0 {
            Cursor::Idle
        } else {
            Cursor::Cursored(count - 1)
        };
    }

    /// Put the cursor on a full-list index; disabled items are refused.
    pub fn hover(&mut self, index: usize) -> bool {
        match self.enabled_indices().iter().position(|i| *i == index) {
            Some(pos) => {
                self.cursor = Cursor::Cursored(pos);
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> NavOutcome {
        let kb = &self.bindings;
        if kb.matches(Action::MenuDown, key) {
            self.move_next();
            NavOutcome::Moved
        } else if kb.matches(Action::MenuUp, key) {
            self.move_prev();
            NavOutcome::Moved
        } else if kb.matches(Action::MenuFirst, key) {
            self.move_first();
            NavOutcome::Moved
        } else if kb.matches(Action::MenuLast, key) {
            self.move_last();
            NavOutcome::Moved
        } else if kb.matches(Action::MenuSelect, key) {
            self.cursor_index()
                .map_or(NavOutcome::Ignored, NavOutcome::Commit)
        } else if kb.matches(Action::MenuLeave, key) {
            NavOutcome::Close
        } else {
            NavOutcome::Ignored
        }
    }

    /// Mark `index` as the single selected item. Every other flag is cleared
    /// before the new one is set. Disabled or missing items are refused.
    /// The cursor is left alone.
    pub fn commit(&mut self, index: usize) -> Option<SelectedItem> {
        if self.items.get(index).is_none_or(|item| item.disabled) {
            return None;
        }
        for item in self.items.iter_mut() {
            item.selected = false;
        }
        let item = &mut self.items[index];
        item.selected = true;
        Some(SelectedItem {
            index,
            value: item.value.clone(),
            label: item.label.clone(),
        })
    }

    /// Select by value without emitting anything (host-driven updates).
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.items.iter().position(|item| item.value == value) {
            Some(index) => self.commit(index).is_some(),
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        for item in self.items.iter_mut() {
            item.selected = false;
        }
    }
}
