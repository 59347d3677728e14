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

/// Single-choice picker. The trigger shows the selected label, or the
/// placeholder while nothing is selected.
#[derive(Debug)]
pub struct Select {
    placeholder: String,
    menu: Menu,
}

impl Select {
    pub fn new(
        doc: &mut Document,
        trigger: ElementId,
        placeholder: impl Into<String>,
        options: Vec<MenuItem>,
    ) -> Self {
        Self::with_config(
            doc,
            trigger,
            placeholder,
            options,
            OverlayConfig::new(Placement::BottomStart),
        )
    }

    pub fn with_config(
        doc: &mut Document,
        trigger: ElementId,
        placeholder: impl Into<String>,
        options: Vec<MenuItem>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            menu: Menu::new(doc, trigger, options, config),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.menu
            .navigator()
            .selected()
            .map(|(_, item)| item.value.as_str())
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.menu
            .navigator()
            .selected()
            .map(|(_, item)| item.label.as_str())
    }

    /// Host-driven selection; emits nothing. Unknown or disabled values
    /// leave the current selection alone.
    pub fn set_value(&mut self, value: &str) -> bool {
        self.menu.navigator_mut().select_value(value)
    }

    pub fn clear(&mut self) {
        self.menu.navigator_mut().clear_selection();
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

impl Component for Select {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        let label = self.selected_label().unwrap_or(&self.placeholder);
        let face = format!("{label} ▾");
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
