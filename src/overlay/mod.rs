//! Overlay lifecycle: configuration, state, dismissal and the controller
//! tying them to a positioning engine.

pub mod config;
pub mod controller;
pub mod dismissal;
pub mod state;

pub use config::{OverlayConfig, ParseTriggerModeError, TriggerMode};
pub use controller::OverlayController;
pub use dismissal::{DismissReason, DismissalCoordinator};
pub use state::{AnchorPair, OverlayEvent, OverlayState};
