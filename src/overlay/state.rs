use crate::document::ElementId;
use crate::navigation::SelectedItem;

/// Visibility of one overlay. `is_open` is the only thing that decides
/// whether the panel shows; document attributes merely mirror it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub is_open: bool,
    /// A close transition is running and `Closed` has not been emitted yet.
    pub is_animating: bool,
}

/// Element handles an overlay is bound to. Slots fill in as the host
/// resolves its markup; `open` needs both trigger and panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnchorPair {
    pub trigger: Option<ElementId>,
    pub panel: Option<ElementId>,
    pub arrow: Option<ElementId>,
}

impl AnchorPair {
    pub fn new(trigger: ElementId, panel: ElementId) -> Self {
        Self {
            trigger: Some(trigger),
            panel: Some(panel),
            arrow: None,
        }
    }

    pub fn with_arrow(mut self, arrow: ElementId) -> Self {
        self.arrow = Some(arrow);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.trigger.is_some() && self.panel.is_some()
    }
}

/// Fire-and-forget notifications drained by the owning component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Opened,
    Closed,
    SelectedItem(SelectedItem),
    Confirmed,
    Cancelled,
}
