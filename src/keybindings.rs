use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    // Trigger
    OverlayOpen,
    OverlayDismiss,
    // Menu navigation
    MenuUp,
    MenuDown,
    MenuFirst,
    MenuLast,
    MenuSelect,
    MenuLeave,
    // Confirm panel navigation/actions
    ConfirmToggle,
    ConfirmLeft,
    ConfirmRight,
    ConfirmAccept,
    ConfirmCancel,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::OverlayOpen => "Open overlay",
            Action::OverlayDismiss => "Dismiss overlay (Esc)",
            Action::MenuUp => "Menu up",
            Action::MenuDown => "Menu down",
            Action::MenuFirst => "Menu first item",
            Action::MenuLast => "Menu last item",
            Action::MenuSelect => "Menu select",
            Action::MenuLeave => "Leave menu (Tab)",
            Action::ConfirmToggle => "Confirm toggle (Tab)",
            Action::ConfirmLeft => "Confirm left",
            Action::ConfirmRight => "Confirm right",
            Action::ConfirmAccept => "Confirm accept",
            Action::ConfirmCancel => "Confirm cancel",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    /// Release events never match; terminals that report them would
    /// otherwise fire every binding twice.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.kind != KeyEventKind::Release && key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "BackTab".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        // Trigger
        kb.add(OverlayOpen, KeyCombo::plain(KeyCode::Enter));
        kb.add(OverlayOpen, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(OverlayOpen, KeyCombo::plain(KeyCode::Down));
        kb.add(OverlayDismiss, KeyCombo::plain(KeyCode::Esc));
        // Menu navigation
        kb.add(MenuUp, KeyCombo::plain(KeyCode::Up));
        kb.add(MenuDown, KeyCombo::plain(KeyCode::Down));
        kb.add(MenuFirst, KeyCombo::plain(KeyCode::Home));
        kb.add(MenuLast, KeyCombo::plain(KeyCode::End));
        kb.add(MenuSelect, KeyCombo::plain(KeyCode::Enter));
        kb.add(MenuSelect, KeyCombo::plain(KeyCode::Char(' ')));
        kb.add(MenuLeave, KeyCombo::plain(KeyCode::Tab));
        kb.add(MenuLeave, KeyCombo::plain(KeyCode::BackTab));
        // Confirm panel
        kb.add(ConfirmToggle, KeyCombo::plain(KeyCode::Tab));
        kb.add(ConfirmToggle, KeyCombo::plain(KeyCode::BackTab));
        kb.add(ConfirmLeft, KeyCombo::plain(KeyCode::Left));
        kb.add(ConfirmRight, KeyCombo::plain(KeyCode::Right));
        kb.add(ConfirmAccept, KeyCombo::plain(KeyCode::Enter));
        kb.add(ConfirmAccept, KeyCombo::plain(KeyCode::Char('y')));
        kb.add(ConfirmCancel, KeyCombo::plain(KeyCode::Char('n')));
        kb
    }
}

impl KeyBindings {
    /// Empty bindings; see `KeyBindings::default()` for the stock set.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    /// Drop every combo bound to `action`.
    pub fn clear(&mut self, action: Action) {
        self.map.remove(&action);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        if let Some(list) = self.map.get(&action) {
            list.iter().any(|c| c.matches(key))
        } else {
            false
        }
    }

    pub fn combos(&self, action: Action) -> &[KeyCombo] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or_default()
    }

    /// Return the display strings for all combos mapped to `action`.
    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.combos(action).iter().map(|c| c.display()).collect()
    }

    /// Return the first `KeyCombo` mapped to `action`, if any.
    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.combos(action).first().cloned()
    }
}
