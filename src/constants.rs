//! Shared crate-wide constants.

use std::time::Duration;

/// Gap, in cells, between an anchor and its floating panel.
pub const DEFAULT_OFFSET_DISTANCE: i32 = 1;

/// Minimum number of cells a floating panel keeps between itself and the
/// viewport edge when collision handling moves it.
pub const DEFAULT_COLLISION_PADDING: u16 = 1;

/// Cells kept between an arrow and the corners of its panel.
pub const DEFAULT_ARROW_PADDING: u16 = 1;

/// Close notifications are emitted immediately unless a component opts into
/// a close transition.
pub const DEFAULT_CLOSE_ANIMATION: Duration = Duration::ZERO;

/// Attribute mirroring `OverlayState::is_open` on the trigger and panel.
pub const ATTR_OPEN: &str = "data-open";

/// Attribute mirroring the placement the engine resolved to.
pub const ATTR_PLACEMENT: &str = "data-placement";
