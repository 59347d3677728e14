use std::time::Instant;

use crossterm::event::Event;

use crate::components::Component;
use crate::components::menu::Menu;
use crate::components::surface::render_trigger;
use crate::document::{Document, ElementId};
use crate::navigation::MenuItem;
use crate::overlay::{OverlayConfig, OverlayEvent};
use crate::placement::Placement;
use crate::ui::UiFrame;

/// Action menu: a labelled trigger that opens a list of commands.
#[derive(Debug)]
pub struct Dropdown {
    label: String,
    menu: Menu,
}

impl Dropdown {
    pub fn new(
        doc: &mut Document,
        trigger: ElementId,
        label: impl Into<String>,
        items: Vec<MenuItem>,
    ) -> Self {
        Self::with_config(
            doc,
            trigger,
            label,
            items,
            OverlayConfig::new(Placement::BottomStart),
        )
    }

    pub fn with_config(
        doc: &mut Document,
        trigger: ElementId,
        label: impl Into<String>,
        items: Vec<MenuItem>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            label: label.into(),
            menu: Menu::new(doc, trigger, items, config),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        &mut self.menu
    }

    pub fn is_open(&self) -> bool {
        self.menu.is_open()
    }
}

impl Component for Dropdown {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        let face = format!("{} ▾", self.label);
        render_trigger(frame, doc, self.menu.trigger(), &face);
        self.menu.render(frame, doc);
    }

    fn handle_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        self.menu.handle_event(doc, event)
    }

    fn pump(&mut self, doc: &mut Document, now: Instant) {
        self.menu.pump(doc, now);
    }

    fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.menu.take_events()
    }

    fn dispose(&mut self, doc: &mut Document) {
        self.menu.dispose(doc);
    }
}
