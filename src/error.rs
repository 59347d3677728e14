use thiserror::Error;

use crate::document::ElementId;
use crate::positioning::PositionError;

/// Conditions the overlay controller absorbs and logs.
///
/// None of these cross the component boundary; they exist so the absorbing
/// call sites can log a structured reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error("overlay has no {missing} element")]
    AnchorUnresolved { missing: &'static str },
    #[error("{role} element {id} is not connected to the document")]
    Disconnected { role: &'static str, id: ElementId },
    #[error("position computation failed: {0}")]
    Positioning(#[from] PositionError),
}
