//! Click-triggered floating panel with a title and free text.

use std::time::Instant;

use crossterm::event::Event;
use ratatui::style::Style;
use ratatui::widgets::{Paragraph, Wrap};

use crate::components::Component;
use crate::components::surface::{cells, render_arrow, render_panel, visible_area};
use crate::document::{Document, ElementId};
use crate::overlay::{AnchorPair, OverlayConfig, OverlayController, OverlayEvent};
use crate::theme;
use crate::ui::UiFrame;

const MAX_PANEL_WIDTH: u16 = 40;

#[derive(Debug)]
pub struct Popover {
    overlay: OverlayController,
    title: String,
    body: String,
    trigger: ElementId,
    panel: ElementId,
    arrow: Option<ElementId>,
}

pub(crate) fn text_panel_size(title: &str, body: &str) -> (u16, u16) {
    let title_width = if title.is_empty() {
        0
    } else {
        title.chars().count() + 2
    };
    let body_width = body.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = cells(title_width.max(body_width).saturating_add(4)).min(MAX_PANEL_WIDTH);
    let inner = width.saturating_sub(4).max(1) as usize;
    let rows: usize = body
        .lines()
        .map(|l| l.chars().count().div_ceil(inner).max(1))
        .fold(0usize, usize::saturating_add);
    (width, cells(rows.max(1)).saturating_add(2))
}

impl Popover {
    pub fn new(
        doc: &mut Document,
        trigger: ElementId,
        title: impl Into<String>,
        body: impl Into<String>,
        config: OverlayConfig,
    ) -> Self {
        let title = title.into();
        let body = body.into();
        let (width, height) = text_panel_size(&title, &body);
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
            title,
            body,
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

    pub fn is_open(&self) -> bool {
        self.overlay.is_open()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Swap the text and resize the panel; an open panel repositions.
    pub fn set_content(
        &mut self,
        doc: &mut Document,
        title: impl Into<String>,
        body: impl Into<String>,
    ) {
        self.title = title.into();
        self.body = body.into();
        let (width, height) = text_panel_size(&self.title, &self.body);
        doc.set_size(self.panel, width, height);
    }
}

impl Component for Popover {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document) {
        let Some(area) = visible_area(doc, self.panel, frame.area()) else {
            return;
        };
        let inner = render_panel(frame, area, Some(&self.title));
        let content = inner.inner(ratatui::layout::Margin::new(1, 0));
        let paragraph = Paragraph::new(self.body.as_str())
            .style(Style::default().fg(theme::dialog_fg()))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, content);
        if let Some(arrow) = self.arrow {
            render_arrow(frame, doc, self.panel, arrow);
        }
    }

    fn handle_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        self.overlay.handle_trigger_event(doc, event)
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
    use crate::layout::FloatRect;
    use crate::placement::Placement;
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::layout::Rect;

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn text_panel_wraps_long_lines() {
        assert_eq!(text_panel_size("Info", "short"), (10, 3));
        let long = "x".repeat(80);
        let (width, height) = text_panel_size("", &long);
        assert_eq!(width, MAX_PANEL_WIDTH);
        assert_eq!(height, 3 + 2);
    }

    #[test]
    fn nested_popover_keeps_outer_open() {
        let mut doc = Document::new(Rect::new(0, 0, 60, 30));
        let outer_trigger = doc.append(None, FloatRect::new(2, 2, 6, 1));
        let mut outer = Popover::new(
            &mut doc,
            outer_trigger,
            "Outer",
            "hello there",
            OverlayConfig::new(Placement::BottomStart),
        );
        // The inner trigger lives inside the outer panel.
        let inner_trigger = doc.append(Some(outer.panel()), FloatRect::new(3, 5, 4, 1));
        let mut inner = Popover::new(
            &mut doc,
            inner_trigger,
            "Inner",
            "nested",
            OverlayConfig::new(Placement::RightStart),
        );

        let mut send = |doc: &mut Document, event: Event| {
            doc.dispatch(&event);
            outer.handle_event(doc, &event);
            inner.handle_event(doc, &event);
            outer.pump(doc, Instant::now());
            inner.pump(doc, Instant::now());
        };
        send(&mut doc, click(3, 2));
        // Clicking the inner trigger lands inside the outer panel's path.
        send(&mut doc, click(4, 5));
        assert!(doc.is_visible(inner_trigger));
        assert!(outer.is_open());
        assert!(inner.is_open());

        outer.dispose(&mut doc);
        inner.dispose(&mut doc);
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn oversized_body_saturates_instead_of_wrapping() {
        let body = "x\n".repeat(70_000);
        assert_eq!(text_panel_size("", &body), (5, u16::MAX));
        let wide = "y".repeat(100_000);
        assert_eq!(text_panel_size(&wide, "").0, MAX_PANEL_WIDTH);
    }
}
