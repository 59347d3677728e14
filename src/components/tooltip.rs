use std::time::Instant;

use crossterm::event::Event;

use crate::components::{Component, Popover};
use crate::document::{Document, ElementId};
use crate::overlay::{OverlayConfig, OverlayEvent, TriggerMode};
use crate::placement::Placement;
use crate::ui::UiFrame;

/// Hover hint with an arrow pointing at its trigger.
#[derive(Debug)]
pub struct Tooltip {
    popover: Popover,
}

impl Tooltip {
    pub fn default_config() -> OverlayConfig {
        OverlayConfig::new(Placement::Top)
            .with_trigger_mode(TriggerMode::Hover)
            .with_arrow(true)
    }

    pub fn new(doc: &mut Document, trigger: ElementId, text: impl Into<String>) -> Self {
        Self::with_config(doc, trigger, text, Self::default_config())
    }

    pub fn with_config(
        doc: &mut Document,
        trigger: ElementId,
        text: impl Into<String>,
        config: OverlayConfig,
    ) -> Self {
        Self {
            popover: Popover::new(doc, trigger, "", text, config),
        }
    }

    pub fn text(&self) -> &str {
        self.popover.body()
    }

    pub fn set_text(&mut self, doc: &mut Document, text: impl Into<String>) {
        self.popover.set_content(doc, "", text);
    }

    pub fn popover(&self) -> &Popover {
        &self.popover
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }
}

impl Component for Tooltip {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        self.popover.render(frame, doc);
    }

    fn handle_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        self.popover.handle_event(doc, event)
    }

    fn pump(&mut self, doc: &mut Document, now: Instant) {
        self.popover.pump(doc, now);
    }

    fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.popover.take_events()
    }

    fn dispose(&mut self, doc: &mut Document) {
        self.popover.dispose(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FloatRect;
    use crossterm::event::{KeyModifiers, MouseEvent, MouseEventKind};
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect;

    fn hover(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn hover_shows_panel_above_with_arrow() {
        let mut doc = Document::new(Rect::new(0, 0, 30, 12));
        let trigger = doc.append(None, FloatRect::new(10, 8, 5, 1));
        let mut tip = Tooltip::new(&mut doc, trigger, "Saves");
        assert!(tip.handle_event(&mut doc, &hover(11, 8)));
        tip.pump(&mut doc, Instant::now());
        assert!(tip.is_open());

        // 9x3 panel centred over the trigger, one gap row for the arrow.
        let panel = tip.popover().panel();
        assert_eq!(doc.rect(panel), Some(FloatRect::new(8, 4, 9, 3)));
        let area = doc.viewport();
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        tip.render(&mut frame, &doc);
        assert_eq!(buffer.cell((12, 7)).map(|c| c.symbol()), Some("▼"));

        tip.handle_event(&mut doc, &hover(1, 1));
        assert!(!tip.is_open());
        assert_eq!(
            tip.take_events(),
            vec![OverlayEvent::Opened, OverlayEvent::Closed]
        );
    }
}
