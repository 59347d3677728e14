//! Popover asking the user to confirm an action.
//!
//! Deciding through the buttons or their keys closes the panel and queues
//! `Confirmed` or `Cancelled`. Dismissing it (Escape, outside click) only
//! closes.

use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Paragraph, Wrap};

use crate::components::Component;
use crate::components::surface::{cells, inner_rect, render_arrow, render_panel, visible_area};
use crate::document::{Document, ElementId};
use crate::keybindings::{Action, KeyBindings};
use crate::layout::{FloatRect, float_rect_contains};
use crate::overlay::{AnchorPair, OverlayConfig, OverlayController, OverlayEvent};
use crate::placement::Placement;
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

const MAX_PANEL_WIDTH: u16 = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    Confirm,
    Cancel,
}

#[derive(Debug)]
pub struct Popconfirm {
    overlay: OverlayController,
    bindings: KeyBindings,
    message: String,
    cancel_label: String,
    confirm_label: String,
    selected_confirm: bool,
    trigger: ElementId,
    panel: ElementId,
    arrow: Option<ElementId>,
}

fn button_face(label: &str) -> String {
    format!("[ {label} ]")
}

fn panel_size(message: &str, cancel: &str, confirm: &str) -> (u16, u16) {
    let buttons = button_face(cancel).chars().count() + 1 + button_face(confirm).chars().count();
    let text = message
        .lines()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0);
    let width = cells(buttons.max(text).saturating_add(4)).min(MAX_PANEL_WIDTH);
    let inner = width.saturating_sub(4).max(1) as usize;
    let rows: usize = message
        .lines()
        .map(|l| l.chars().count().div_ceil(inner).max(1))
        .fold(0usize, usize::saturating_add);
    // message rows, separator, buttons, border
    (width, cells(rows.max(1)).saturating_add(4))
}

impl Popconfirm {
    pub fn new(doc: &mut Document, trigger: ElementId, message: impl Into<String>) -> Self {
        Self::with_config(doc, trigger, message, OverlayConfig::new(Placement::Top))
    }

    pub fn with_config(
        doc: &mut Document,
        trigger: ElementId,
        message: impl Into<String>,
        config: OverlayConfig,
    ) -> Self {
        let message = message.into();
        let cancel_label = "Cancel".to_string();
        let confirm_label = "OK".to_string();
        let (width, height) = panel_size(&message, &cancel_label, &confirm_label);
        let panel = doc.append_floating(Some(trigger), width, height);
        let arrow = config
            .show_arrow
            .then(|| doc.append_absolute(panel, 1, 1));
        let mut anchors = AnchorPair::new(trigger, panel);
        if let Some(arrow) = arrow {
            anchors = anchors.with_arrow(arrow);
        }
        let mut overlay = OverlayController::new(config);
        overlay.set_anchors(doc, anchors);
        Self {
            overlay,
            bindings: KeyBindings::default(),
            message,
            cancel_label,
            confirm_label,
            selected_confirm: true,
            trigger,
            panel,
            arrow,
        }
    }

    pub fn set_labels(
        &mut self,
        doc: &mut Document,
        cancel: impl Into<String>,
        confirm: impl Into<String>,
    ) {
        self.cancel_label = cancel.into();
        self.confirm_label = confirm.into();
        let (width, height) = panel_size(&self.message, &self.cancel_label, &self.confirm_label);
        doc.set_size(self.panel, width, height);
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.overlay.set_bindings(bindings.clone());
        self.bindings = bindings;
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    pub fn panel(&self) -> ElementId {
        self.panel
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    /// Which button Enter would press.
    pub fn focused_action(&self) -> ConfirmAction {
        if self.selected_confirm {
            ConfirmAction::Confirm
        } else {
            ConfirmAction::Cancel
        }
    }

    pub fn open(&mut self, doc: &mut Document) {
        if !self.overlay.is_open() {
            self.selected_confirm = true;
        }
        self.overlay.open(doc);
    }

    pub fn close(&mut self, doc: &mut Document) {
        self.overlay.close(doc);
    }

    /// Close, hand focus back to the trigger and report the decision.
    pub fn resolve(&mut self, doc: &mut Document, action: ConfirmAction) {
        if !self.overlay.is_open() {
            return;
        }
        self.overlay.close(doc);
        doc.focus(self.trigger);
        self.overlay.emit(match action {
            ConfirmAction::Confirm => OverlayEvent::Confirmed,
            ConfirmAction::Cancel => OverlayEvent::Cancelled,
        });
    }

    /// Cancel and confirm button cells, in document coordinates.
    fn button_rects(&self, doc: &Document) -> Option<(FloatRect, FloatRect)> {
        let inner = inner_rect(doc.rect(self.panel)?);
        if inner.height < 3 || inner.width < 2 {
            return None;
        }
        let cancel = button_face(&self.cancel_label).chars().count() as u16;
        let confirm = button_face(&self.confirm_label).chars().count() as u16;
        let y = inner.bottom() - 1;
        let right = inner.right() - 1;
        let confirm_x = right - confirm as i32;
        let cancel_x = confirm_x - 1 - cancel as i32;
        Some((
            FloatRect::new(cancel_x, y, cancel, 1),
            FloatRect::new(confirm_x, y, confirm, 1),
        ))
    }

    /// Map an event on the open panel to a decision. Selection keys only
    /// move the button focus.
    pub fn handle_confirm_event(&mut self, doc: &Document, event: &Event) -> Option<ConfirmAction> {
        match event {
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let (cancel, confirm) = self.button_rects(doc)?;
                if float_rect_contains(confirm, mouse.column, mouse.row) {
                    Some(ConfirmAction::Confirm)
                } else if float_rect_contains(cancel, mouse.column, mouse.row) {
                    Some(ConfirmAction::Cancel)
                } else {
                    None
                }
            }
            Event::Key(key) => {
                let kb = &self.bindings;
                if kb.matches(Action::ConfirmToggle, key) {
                    self.selected_confirm = !self.selected_confirm;
                    None
                } else if kb.matches(Action::ConfirmLeft, key) {
                    self.selected_confirm = false;
                    None
                } else if kb.matches(Action::ConfirmRight, key) {
                    self.selected_confirm = true;
                    None
                } else if kb.matches(Action::ConfirmAccept, key) {
                    Some(self.focused_action())
                } else if kb.matches(Action::ConfirmCancel, key) {
                    Some(ConfirmAction::Cancel)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

impl Component for Popconfirm {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        let bounds = frame.area();
        let Some(area) = visible_area(doc, self.panel, bounds) else {
            return;
        };
        let inner = render_panel(frame, area, None);
        if inner.height < 3 || inner.width < 2 {
            return;
        }
        let body = Rect {
            x: inner.x + 1,
            y: inner.y,
            width: inner.width - 2,
            height: inner.height - 2,
        };
        let paragraph = Paragraph::new(self.message.as_str())
            .style(Style::default().fg(theme::dialog_fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, body);

        let separator_y = inner.y + inner.height - 2;
        let separator = "─".repeat(inner.width as usize);
        safe_set_string(
            frame.buffer_mut(),
            bounds,
            inner.x,
            separator_y,
            &separator,
            Style::default().fg(theme::dialog_separator()),
        );

        let selected = Style::default()
            .fg(theme::decorator_header_fg())
            .bg(theme::decorator_header_bg())
            .add_modifier(Modifier::BOLD);
        let unselected = Style::default()
            .fg(theme::dialog_fg())
            .bg(theme::panel_bg());
        let (cancel_style, confirm_style) = if self.selected_confirm {
            (unselected, selected)
        } else {
            (selected, unselected)
        };
        if let Some((cancel, confirm)) = self.button_rects(doc) {
            for (rect, label, style) in [
                (cancel, &self.cancel_label, cancel_style),
                (confirm, &self.confirm_label, confirm_style),
            ] {
                if rect.x < 0 || rect.y < 0 {
                    continue;
                }
                safe_set_string(
                    frame.buffer_mut(),
                    bounds,
                    rect.x as u16,
                    rect.y as u16,
                    &button_face(label),
                    style,
                );
            }
        }
        if let Some(arrow) = self.arrow {
            render_arrow(frame, doc, self.panel, arrow);
        }
    }

    fn handle_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        let was_open = self.overlay.is_open();
        if self.overlay.handle_trigger_event(doc, event) {
            if !was_open && self.overlay.is_open() {
                self.selected_confirm = true;
            }
            return true;
        }
        if !self.overlay.is_open() {
            return false;
        }
        if let Some(action) = self.handle_confirm_event(doc, event) {
            self.resolve(doc, action);
            return true;
        }
        let Event::Key(key) = event else {
            return false;
        };
        let kb = &self.bindings;
        kb.matches(Action::ConfirmToggle, key)
            || kb.matches(Action::ConfirmLeft, key)
            || kb.matches(Action::ConfirmRight, key)
    }

    fn pump(&mut self, doc: &mut Document, now: Instant) {
        self.overlay.pump(doc);
        self.overlay.tick(now);
    }

    fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.overlay.take_events()
    }

    fn dispose(&mut self, doc: &mut Document) {
        self.overlay.dispose(doc);
        doc.remove(self.panel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::buffer::Buffer;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn setup() -> (Document, Popconfirm) {
        let mut doc = Document::new(Rect::new(0, 0, 40, 20));
        let trigger = doc.append(None, FloatRect::new(10, 12, 8, 1));
        let confirm = Popconfirm::new(&mut doc, trigger, "Delete file?");
        (doc, confirm)
    }

    fn send(doc: &mut Document, confirm: &mut Popconfirm, event: Event) -> bool {
        doc.dispatch(&event);
        let handled = confirm.handle_event(doc, &event);
        confirm.pump(doc, Instant::now());
        handled
    }

    #[test]
    fn panel_fits_message_and_buttons() {
        assert_eq!(panel_size("Delete file?", "Cancel", "OK"), (21, 5));
    }

    #[test]
    fn keys_move_focus_and_decide() {
        let (mut doc, mut confirm) = setup();
        confirm.open(&mut doc);
        assert_eq!(confirm.focused_action(), ConfirmAction::Confirm);
        assert!(send(&mut doc, &mut confirm, key(KeyCode::Tab)));
        assert_eq!(confirm.focused_action(), ConfirmAction::Cancel);
        assert!(send(&mut doc, &mut confirm, key(KeyCode::Right)));
        assert!(send(&mut doc, &mut confirm, key(KeyCode::Enter)));
        assert!(!confirm.is_open());
        assert_eq!(doc.focused(), Some(confirm.trigger()));
        assert_eq!(
            confirm.take_events(),
            vec![
                OverlayEvent::Opened,
                OverlayEvent::Closed,
                OverlayEvent::Confirmed
            ]
        );
    }

    #[test]
    fn clicking_cancel_button_cancels() {
        let (mut doc, mut confirm) = setup();
        send(&mut doc, &mut confirm, click(11, 12));
        assert!(confirm.is_open());
        let (cancel, _) = confirm.button_rects(&doc).unwrap();
        assert!(send(
            &mut doc,
            &mut confirm,
            click(cancel.x as u16 + 1, cancel.y as u16)
        ));
        assert!(!confirm.is_open());
        assert_eq!(confirm.take_events().last(), Some(&OverlayEvent::Cancelled));
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn escape_dismisses_without_a_decision() {
        let (mut doc, mut confirm) = setup();
        confirm.open(&mut doc);
        send(&mut doc, &mut confirm, key(KeyCode::Esc));
        assert!(!confirm.is_open());
        assert_eq!(
            confirm.take_events(),
            vec![OverlayEvent::Opened, OverlayEvent::Closed]
        );
    }

    #[test]
    fn renders_buttons_on_last_row() {
        let (mut doc, mut confirm) = setup();
        confirm.open(&mut doc);
        confirm.pump(&mut doc, Instant::now());
        let area = doc.viewport();
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        confirm.render(&mut frame, &doc);
        let (cancel, confirm_rect) = confirm.button_rects(&doc).unwrap();
        assert_eq!(
            buffer
                .cell((cancel.x as u16, cancel.y as u16))
                .map(|c| c.symbol()),
            Some("[")
        );
        assert_eq!(
            buffer
                .cell((confirm_rect.x as u16 + 2, confirm_rect.y as u16))
                .map(|c| c.symbol()),
            Some("O")
        );
        confirm.dispose(&mut doc);
    }

    #[test]
    fn oversized_message_saturates_panel_height() {
        let message = "x\n".repeat(65_533);
        assert_eq!(panel_size(&message, "Cancel", "OK"), (21, u16::MAX));

        let mut doc = Document::new(Rect::new(0, 0, 40, 20));
        let trigger = doc.append(None, FloatRect::new(10, 12, 8, 1));
        let mut confirm = Popconfirm::new(&mut doc, trigger, message);
        assert_eq!(doc.rect(confirm.panel()).map(|r| r.height), Some(u16::MAX));
        confirm.dispose(&mut doc);
    }
}
