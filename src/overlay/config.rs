use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_ARROW_PADDING, DEFAULT_CLOSE_ANIMATION, DEFAULT_COLLISION_PADDING,
    DEFAULT_OFFSET_DISTANCE,
};
use crate::placement::Placement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerMode {
    Hover,
    #[default]
    Click,
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerMode::Hover => f.write_str("hover"),
            TriggerMode::Click => f.write_str("click"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown trigger mode `{0}` (expected `hover` or `click`)")]
pub struct ParseTriggerModeError(String);

impl FromStr for TriggerMode {
    type Err = ParseTriggerModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hover" => Ok(TriggerMode::Hover),
            "click" => Ok(TriggerMode::Click),
            _ => Err(ParseTriggerModeError(s.to_string())),
        }
    }
}

/// Placement and interaction settings for one overlay.
///
/// A config is never patched while a computation reads it; reconfiguring
/// swaps the whole value through `OverlayController::set_config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    pub placement: Placement,
    pub fallback_placements: Vec<Placement>,
    pub trigger_mode: TriggerMode,
    pub offset_distance: i32,
    pub collision_padding: u16,
    pub show_arrow: bool,
    pub arrow_padding: u16,
    pub close_animation: Duration,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Bottom,
            fallback_placements: vec![Placement::Bottom.flipped()],
            trigger_mode: TriggerMode::Click,
            offset_distance: DEFAULT_OFFSET_DISTANCE,
            collision_padding: DEFAULT_COLLISION_PADDING,
            show_arrow: false,
            arrow_padding: DEFAULT_ARROW_PADDING,
            close_animation: DEFAULT_CLOSE_ANIMATION,
        }
    }
}

impl OverlayConfig {
    pub fn new(placement: Placement) -> Self {
        Self::default().with_placement(placement)
    }

    /// Also resets the fallbacks to the opposite side, which is what every
    /// menu-like component wants unless it asks for more.
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self.fallback_placements = vec![placement.flipped()];
        self
    }

    pub fn with_fallback_placements(mut self, fallbacks: Vec<Placement>) -> Self {
        self.fallback_placements = fallbacks;
        self
    }

    pub fn with_trigger_mode(mut self, mode: TriggerMode) -> Self {
        self.trigger_mode = mode;
        self
    }

    pub fn with_offset(mut self, distance: i32) -> Self {
        self.offset_distance = distance;
        self
    }

    pub fn with_collision_padding(mut self, padding: u16) -> Self {
        self.collision_padding = padding;
        self
    }

    pub fn with_arrow(mut self, show: bool) -> Self {
        self.show_arrow = show;
        self
    }

    pub fn with_arrow_padding(mut self, padding: u16) -> Self {
        self.arrow_padding = padding;
        self
    }

    pub fn with_close_animation(mut self, duration: Duration) -> Self {
        self.close_animation = duration;
        self
    }
}
