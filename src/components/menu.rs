//! Shared core of the dropdown and select components.
//!
//! The panel is a bordered list, one item per row. Keyboard commits and
//! pointer clicks both go through [`Menu::commit`], so either path emits an
//! identical `SelectedItem` payload.

use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::components::Component;
use crate::components::surface::{inner_rect, render_arrow, render_panel, visible_area};
use crate::document::{Document, ElementId};
use crate::keybindings::KeyBindings;
use crate::layout::float_rect_contains;
use crate::navigation::{ItemNavigator, MenuItem, NavOutcome};
use crate::overlay::{AnchorPair, OverlayConfig, OverlayController, OverlayEvent};
use crate::theme;
use crate::ui::{UiFrame, truncate_to_width};

const MIN_PANEL_WIDTH: u16 = 8;
/// Border on both sides plus the two-cell selection marker.
const PANEL_CHROME: u16 = 4;

#[derive(Debug)]
pub struct Menu {
    overlay: OverlayController,
    nav: ItemNavigator,
    trigger: ElementId,
    panel: ElementId,
    arrow: Option<ElementId>,
}

fn panel_size(items: &[MenuItem]) -> (u16, u16) {
    let widest = items
        .iter()
        .map(|item| item.label.chars().count())
        .max()
        .unwrap_or(0);
    let width = (widest as u16).saturating_add(PANEL_CHROME).max(MIN_PANEL_WIDTH);
    let height = (items.len() as u16).saturating_add(2);
    (width, height)
}

impl Menu {
    /// Append the menu panel under `trigger` and bind an overlay to it.
    pub fn new(
        doc: &mut Document,
        trigger: ElementId,
        items: Vec<MenuItem>,
        config: OverlayConfig,
    ) -> Self {
        let (width, height) = panel_size(&items);
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
            nav: ItemNavigator::new(items),
            trigger,
            panel,
            arrow,
        }
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

    pub fn overlay_mut(&mut self) -> &mut OverlayController {
        &mut self.overlay
    }

    pub fn navigator(&self) -> &ItemNavigator {
        &self.nav
    }

    pub fn navigator_mut(&mut self) -> &mut ItemNavigator {
        &mut self.nav
    }

    pub fn items(&self) -> &[MenuItem] {
        self.nav.items()
    }

    /// Replace the items and resize the panel; an open menu repositions on
    /// the next pump.
    pub fn set_items(&mut self, doc: &mut Document, items: Vec<MenuItem>) {
        let (width, height) = panel_size(&items);
        self.nav.set_items(items);
        doc.set_size(self.panel, width, height);
    }

    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.nav.set_bindings(bindings.clone());
        self.overlay.set_bindings(bindings);
    }

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn open(&mut self, doc: &mut Document) {
        let was_open = self.overlay.is_open();
        self.overlay.open(doc);
        self.sync_cursor(was_open);
    }

    pub fn close(&mut self, doc: &mut Document) {
        let was_open = self.overlay.is_open();
        self.overlay.close(doc);
        self.sync_cursor(was_open);
    }

    pub fn toggle(&mut self, doc: &mut Document) {
        if self.is_open() {
            self.close(doc);
        } else {
            self.open(doc);
        }
    }

    fn sync_cursor(&mut self, was_open: bool) {
        match (was_open, self.overlay.is_open()) {
            (false, true) => self.nav.seed_cursor(),
            (true, false) => self.nav.reset(),
            _ => {}
        }
    }

    /// Select the item at `index`, close, and queue the payload. Disabled
    /// items are refused.
    pub fn commit(&mut self, doc: &mut Document, index: usize) -> bool {
        let Some(payload) = self.nav.commit(index) else {
            return false;
        };
        self.close(doc);
        doc.focus(self.trigger);
        self.overlay.emit(OverlayEvent::SelectedItem(payload));
        true
    }

    /// Item under a screen cell, if the cell is on one of the list rows.
    pub fn item_at(&self, doc: &Document, column: u16, row: u16) -> Option<usize> {
        if !doc.is_visible(self.panel) {
            return None;
        }
        let inner = inner_rect(doc.rect(self.panel)?);
        if !float_rect_contains(inner, column, row) {
            return None;
        }
        let index = (row as i32 - inner.y) as usize;
        (index < self.nav.len()).then_some(index)
    }

    fn item_line(&self, index: usize, item: &MenuItem, width: usize) -> Line<'static> {
        let marker = if item.selected { "✓ " } else { "  " };
        let text = truncate_to_width(&format!("{marker}{}", item.label), width);
        let padded = format!("{text:<width$}");
        let mut style = Style::default().fg(theme::menu_fg()).bg(theme::menu_bg());
        if item.disabled {
            style = style.fg(theme::panel_inactive_fg()).add_modifier(Modifier::DIM);
        } else if self.nav.cursor_index() == Some(index) {
            style = style
                .fg(theme::menu_selected_fg())
                .bg(theme::menu_selected_bg());
        }
        Line::styled(padded, style)
    }
}

impl Component for Menu {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        let Some(area) = visible_area(doc, self.panel, frame.area()) else {
            return;
        };
        let inner = render_panel(frame, area, None);
        let width = inner.width as usize;
        let lines: Vec<Line<'static>> = self
            .nav
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| self.item_line(index, item, width))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
        if let Some(arrow) = self.arrow {
            render_arrow(frame, doc, self.panel, arrow);
        }
    }

    fn handle_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        let was_open = self.overlay.is_open();
        let handled = self.overlay.handle_trigger_event(doc, event);
        self.sync_cursor(was_open);
        if handled {
            return true;
        }
        if !self.overlay.is_open() {
            return false;
        }
        match event {
            Event::Key(key) => match self.nav.handle_key(key) {
                NavOutcome::Ignored => false,
                NavOutcome::Moved => true,
                NavOutcome::Commit(index) => {
                    self.commit(doc, index);
                    true
                }
                NavOutcome::Close => {
                    // Tab leaves the menu; let the host move focus on.
                    self.close(doc);
                    false
                }
            },
            Event::Mouse(mouse) => {
                let Some(index) = self.item_at(doc, mouse.column, mouse.row) else {
                    return false;
                };
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.commit(doc, index);
                        true
                    }
                    MouseEventKind::Moved => {
                        self.nav.hover(index);
                        true
                    }
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn pump(&mut self, doc: &mut Document, now: Instant) {
        let was_open = self.overlay.is_open();
        self.overlay.pump(doc);
        self.overlay.tick(now);
        self.sync_cursor(was_open);
    }

    fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.overlay.take_events()
    }

    fn dispose(&mut self, doc: &mut Document) {
        self.overlay.dispose(doc);
        doc.remove(self.panel);
    }
}
