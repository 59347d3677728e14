//! Drawing helpers shared by the overlay components.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Clear};

use crate::constants::{ATTR_OPEN, ATTR_PLACEMENT};
use crate::document::{Document, ElementId};
use crate::layout::FloatRect;
use crate::placement::{Placement, Side};
use crate::theme;
use crate::ui::{UiFrame, safe_set_string};

/// On-screen area of an element, or `None` when it is hidden or fully
/// outside `bounds`.
pub fn visible_area(doc: &Document, id: ElementId, bounds: Rect) -> Option<Rect> {
    if !doc.is_visible(id) {
        return None;
    }
    doc.rect(id)?.clip_to(bounds)
}

/// Area inside a one-cell border, in document coordinates.
pub fn inner_rect(rect: FloatRect) -> FloatRect {
    FloatRect::new(
        rect.x + 1,
        rect.y + 1,
        rect.width.saturating_sub(2),
        rect.height.saturating_sub(2),
    )
}

/// Clear the panel and draw its border. Returns the area left for content.
pub fn render_panel(frame: &mut UiFrame<'_>, area: Rect, title: Option<&str>) -> Rect {
    frame.render_widget(Clear, area);
    let mut block = Block::bordered()
        .border_style(Style::default().fg(theme::decorator_border()))
        .style(Style::default().bg(theme::menu_bg()).fg(theme::menu_fg()));
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        block = block.title(format!(" {title} "));
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// Cell count for a layout quantity, saturating at the grid limit.
pub(crate) fn cells(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn arrow_glyph(placement: Placement) -> &'static str {
    // The arrow sits on the side facing the anchor and points at it.
    match placement.static_side() {
        Side::Top => "▲",
        Side::Bottom => "▼",
        Side::Left => "◀",
        Side::Right => "▶",
    }
}

pub fn render_arrow(frame: &mut UiFrame<'_>, doc: &Document, panel: ElementId, arrow: ElementId) {
    let bounds = frame.area();
    let Some(area) = visible_area(doc, arrow, bounds) else {
        return;
    };
    let placement = doc
        .attribute(panel, ATTR_PLACEMENT)
        .and_then(|p| p.parse::<Placement>().ok())
        .unwrap_or_default();
    let style = Style::default().fg(theme::decorator_border());
    safe_set_string(
        frame.buffer_mut(),
        bounds,
        area.x,
        area.y,
        arrow_glyph(placement),
        style,
    );
}

/// Trigger face: the label plus an open/closed indicator.
pub fn render_trigger(frame: &mut UiFrame<'_>, doc: &Document, trigger: ElementId, label: &str) {
    let bounds = frame.area();
    let Some(area) = visible_area(doc, trigger, bounds) else {
        return;
    };
    let open = doc.attribute(trigger, ATTR_OPEN) == Some("true");
    let mut style = Style::default()
        .fg(theme::panel_active_fg())
        .bg(theme::panel_active_bg());
    if doc.focused() == Some(trigger) {
        style = style.add_modifier(Modifier::BOLD);
    }
    if open {
        style = style
            .fg(theme::decorator_header_fg())
            .bg(theme::decorator_header_bg());
    }
    let text = format!("{label:<width$}", width = area.width as usize);
    safe_set_string(frame.buffer_mut(), bounds, area.x, area.y, &text, style);
}
