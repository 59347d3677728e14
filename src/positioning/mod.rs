//! Contract with the positioning engine.
//!
//! The overlay controller never does geometry itself. It describes what it
//! wants (a placement and a middleware pipeline) and reacts to the
//! coordinates the engine hands back.

mod cell_engine;

pub use cell_engine::CellEngine;

use thiserror::Error;

use crate::document::{Document, ElementId, ObserverHandle};
use crate::placement::Placement;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Middleware {
    /// Gap between anchor and panel along the main axis.
    Offset(i32),
    /// Switch to a fallback placement when the requested one overflows.
    Flip {
        fallback_placements: Vec<Placement>,
        padding: u16,
    },
    /// Slide along the alignment axis to stay inside the viewport.
    Shift { padding: u16 },
    /// Report where the arrow element should sit on the panel edge.
    Arrow { element: ElementId, padding: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeOptions {
    pub placement: Placement,
    pub middleware: Vec<Middleware>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrowData {
    /// Offset from the panel's left edge (vertical placements).
    pub x: Option<i32>,
    /// Offset from the panel's top edge (horizontal placements).
    pub y: Option<i32>,
    /// How far the arrow was pushed away from the anchor's centre by
    /// clamping.
    pub center_offset: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlipData {
    /// Placements tried, with the overflow each one produced.
    pub overflows: Vec<(Placement, i32)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MiddlewareData {
    pub offset: Option<i32>,
    pub flip: Option<FlipData>,
    pub shift: Option<(i32, i32)>,
    pub arrow: Option<ArrowData>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputedPosition {
    pub x: i32,
    pub y: i32,
    /// Final placement after flipping.
    pub placement: Placement,
    pub middleware_data: MiddlewareData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("element {0} no longer exists")]
    Missing(ElementId),
    #[error("element {0} is not connected to the document")]
    Detached(ElementId),
    #[error("viewport has no area")]
    EmptyViewport,
}

pub trait PositioningEngine {
    fn compute_position(
        &self,
        doc: &Document,
        anchor: ElementId,
        floating: ElementId,
        options: &ComputeOptions,
    ) -> Result<ComputedPosition, PositionError>;
}

impl<T: PositioningEngine + ?Sized> PositioningEngine for &T {
    fn compute_position(
        &self,
        doc: &Document,
        anchor: ElementId,
        floating: ElementId,
        options: &ComputeOptions,
    ) -> Result<ComputedPosition, PositionError> {
        (**self).compute_position(doc, anchor, floating, options)
    }
}

impl<T: PositioningEngine + ?Sized> PositioningEngine for Box<T> {
    fn compute_position(
        &self,
        doc: &Document,
        anchor: ElementId,
        floating: ElementId,
        options: &ComputeOptions,
    ) -> Result<ComputedPosition, PositionError> {
        (**self).compute_position(doc, anchor, floating, options)
    }
}

/// Continuous repositioning subscription for one anchor/panel pair.
///
/// The handle is the overlay's only tie to the document's layout observers;
/// disposing it more than once is harmless.
#[derive(Debug)]
pub struct AutoUpdate {
    handle: Option<ObserverHandle>,
}

impl AutoUpdate {
    pub fn start(doc: &mut Document, anchor: ElementId, floating: ElementId) -> Self {
        Self {
            handle: Some(doc.observe(anchor, floating)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    /// True once per batch of layout changes affecting the pair.
    pub fn take_change(&self, doc: &mut Document) -> bool {
        self.handle
            .is_some_and(|handle| doc.take_layout_change(handle))
    }

    pub fn dispose(&mut self, doc: &mut Document) {
        if let Some(handle) = self.handle.take() {
            doc.unobserve(handle);
        }
    }
}
