use std::time::Instant;

use crossterm::event::Event;

use crate::document::Document;
use crate::overlay::OverlayEvent;
use crate::ui::UiFrame;

pub mod dropdown;
pub mod menu;
pub mod popconfirm;
pub mod popover;
pub mod select;
pub mod surface;
pub mod tooltip;

pub use dropdown::Dropdown;
pub use menu::Menu;
pub use popconfirm::{ConfirmAction, Popconfirm};
pub use popover::Popover;
pub use select::Select;
pub use tooltip::Tooltip;

/// An overlay-backed widget living in a [`Document`].
///
/// The host dispatches every input event to the document first, then offers
/// it to each component, then pumps them. Notifications are drained with
/// `take_events` once per frame.
pub trait Component {
    fn render(&mut self, frame: &mut UiFrame<'_>, doc: &Document);

    fn handle_event(&mut self, _doc: &mut Document, _event: &Event) -> bool {
        false
    }

    /// Housekeeping between events: dismissal, repositioning, close
    /// transitions.
    fn pump(&mut self, _doc: &mut Document, _now: Instant) {}

    fn take_events(&mut self) -> Vec<OverlayEvent> {
        Vec::new()
    }

    /// Release every document resource the component holds. Idempotent.
    fn dispose(&mut self, _doc: &mut Document) {}
}
