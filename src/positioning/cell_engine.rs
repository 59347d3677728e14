use super::{
    ArrowData, ComputeOptions, ComputedPosition, FlipData, Middleware, MiddlewareData,
    PositionError, PositioningEngine,
};
use crate::document::{Document, ElementId};
use crate::layout::FloatRect;
use crate::placement::{Alignment, Placement, Side};

/// Upper bound on pipeline restarts caused by flipping.
const MAX_RESETS: usize = 16;

/// Positioning engine working on the terminal cell grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Overflow {
    top: i32,
    right: i32,
    bottom: i32,
    left: i32,
}

impl Overflow {
    fn of(rect: FloatRect, bounds: FloatRect, padding: u16) -> Self {
        let p = padding as i32;
        Self {
            top: (bounds.y + p) - rect.y,
            right: rect.right() - (bounds.right() - p),
            bottom: rect.bottom() - (bounds.bottom() - p),
            left: (bounds.x + p) - rect.x,
        }
    }

    fn side(&self, side: Side) -> i32 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

fn base_coords(reference: FloatRect, width: u16, height: u16, placement: Placement) -> (i32, i32) {
    let (w, h) = (width as i32, height as i32);
    let (rw, rh) = (reference.width as i32, reference.height as i32);
    let cross_x = match placement.alignment() {
        Alignment::Start => reference.x,
        Alignment::Center => reference.x + (rw - w) / 2,
        Alignment::End => reference.right() - w,
    };
    let cross_y = match placement.alignment() {
        Alignment::Start => reference.y,
        Alignment::Center => reference.y + (rh - h) / 2,
        Alignment::End => reference.bottom() - h,
    };
    match placement.side() {
        Side::Top => (cross_x, reference.y - h),
        Side::Bottom => (cross_x, reference.bottom()),
        Side::Left => (reference.x - w, cross_y),
        Side::Right => (reference.right(), cross_y),
    }
}

/// Clamp `value` into `[min, max]`, preferring `min` when the range is empty.
fn clamp_start(value: i32, min: i32, max: i32) -> i32 {
    value.min(max).max(min)
}

fn connected_rect(doc: &Document, id: ElementId) -> Result<FloatRect, PositionError> {
    if !doc.contains(id) {
        return Err(PositionError::Missing(id));
    }
    if !doc.is_connected(id) {
        return Err(PositionError::Detached(id));
    }
    doc.rect(id).ok_or(PositionError::Detached(id))
}

impl PositioningEngine for CellEngine {
    fn compute_position(
        &self,
        doc: &Document,
        anchor: ElementId,
        floating: ElementId,
        options: &ComputeOptions,
    ) -> Result<ComputedPosition, PositionError> {
        let reference = connected_rect(doc, anchor)?;
        let panel = connected_rect(doc, floating)?;
        let viewport = FloatRect::from(doc.viewport());
        if viewport.is_empty() {
            return Err(PositionError::EmptyViewport);
        }
        let (w, h) = (panel.width, panel.height);

        let mut placement = options.placement;
        let (mut x, mut y) = base_coords(reference, w, h, placement);
        let mut data = MiddlewareData::default();
        let mut flip_settled = false;
        let mut resets = 0;
        let mut index = 0;

        while let Some(middleware) = options.middleware.get(index) {
            index += 1;
            match middleware {
                Middleware::Offset(distance) => {
                    data.offset = Some(*distance);
                    match placement.side() {
                        Side::Top => y -= distance,
                        Side::Bottom => y += distance,
                        Side::Left => x -= distance,
                        Side::Right => x += distance,
                    }
                }
                Middleware::Flip {
                    fallback_placements,
                    padding,
                } => {
                    let overflow = Overflow::of(FloatRect::new(x, y, w, h), viewport, *padding)
                        .side(placement.side());
                    let flip = data.flip.get_or_insert_with(FlipData::default);
                    if !flip.overflows.iter().any(|(p, _)| *p == placement) {
                        flip.overflows.push((placement, overflow));
                    }
                    if overflow <= 0 || flip_settled || resets >= MAX_RESETS {
                        continue;
                    }
                    let untried = fallback_placements
                        .iter()
                        .copied()
                        .find(|p| !flip.overflows.iter().any(|(tried, _)| tried == p));
                    let next = match untried {
                        Some(next) => next,
                        None => {
                            // Nothing fits; settle on the least-bad candidate.
                            flip_settled = true;
                            let best = flip
                                .overflows
                                .iter()
                                .min_by_key(|(_, o)| *o)
                                .map(|(p, _)| *p)
                                .unwrap_or(placement);
                            if best == placement {
                                continue;
                            }
                            best
                        }
                    };
                    placement = next;
                    (x, y) = base_coords(reference, w, h, placement);
                    data.offset = None;
                    data.shift = None;
                    data.arrow = None;
                    resets += 1;
                    index = 0;
                }
                Middleware::Shift { padding } => {
                    let p = *padding as i32;
                    let (before_x, before_y) = (x, y);
                    if placement.side().is_vertical() {
                        x = clamp_start(x, viewport.x + p, viewport.right() - p - w as i32);
                    } else {
                        y = clamp_start(y, viewport.y + p, viewport.bottom() - p - h as i32);
                    }
                    data.shift = Some((x - before_x, y - before_y));
                }
                Middleware::Arrow { element, padding } => {
                    let Some(arrow) = doc.rect(*element) else {
                        continue;
                    };
                    let p = *padding as i32;
                    let arrow_data = if placement.side().is_vertical() {
                        let ideal = reference.center_x() - arrow.width as i32 / 2 - x;
                        let max = w as i32 - arrow.width as i32 - p;
                        let at = clamp_start(ideal, p, max);
                        ArrowData {
                            x: Some(at),
                            y: None,
                            center_offset: ideal - at,
                        }
                    } else {
                        let ideal = reference.center_y() - arrow.height as i32 / 2 - y;
                        let max = h as i32 - arrow.height as i32 - p;
                        let at = clamp_start(ideal, p, max);
                        ArrowData {
                            x: None,
                            y: Some(at),
                            center_offset: ideal - at,
                        }
                    };
                    data.arrow = Some(arrow_data);
                }
            }
        }

        Ok(ComputedPosition {
            x,
            y,
            placement,
            middleware_data: data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn setup(viewport: Rect, trigger: FloatRect, w: u16, h: u16) -> (Document, ElementId, ElementId) {
        let mut doc = Document::new(viewport);
        let anchor = doc.append(None, trigger);
        let panel = doc.append_floating(Some(anchor), w, h);
        (doc, anchor, panel)
    }

    fn options(placement: Placement, middleware: Vec<Middleware>) -> ComputeOptions {
        ComputeOptions {
            placement,
            middleware,
        }
    }

    #[test]
    fn bottom_start_with_offset() {
        let (doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 20), FloatRect::new(5, 5, 10, 1), 8, 4);
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(Placement::BottomStart, vec![Middleware::Offset(1)]),
            )
            .unwrap();
        assert_eq!((pos.x, pos.y), (5, 7));
        assert_eq!(pos.placement, Placement::BottomStart);
        assert_eq!(pos.middleware_data.offset, Some(1));
    }

    #[test]
    fn flips_to_first_fitting_fallback() {
        let (doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 20), FloatRect::new(5, 17, 10, 1), 8, 4);
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(
                    Placement::Bottom,
                    vec![
                        Middleware::Offset(1),
                        Middleware::Flip {
                            fallback_placements: vec![Placement::Top],
                            padding: 0,
                        },
                    ],
                ),
            )
            .unwrap();
        assert_eq!(pos.placement, Placement::Top);
        assert_eq!(pos.y, 17 - 4 - 1);
        assert_eq!(pos.middleware_data.offset, Some(1));
    }

    #[test]
    fn keeps_least_overflowing_placement_when_nothing_fits() {
        let (doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 8), FloatRect::new(5, 3, 10, 1), 8, 5);
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(
                    Placement::Top,
                    vec![Middleware::Flip {
                        fallback_placements: vec![Placement::Bottom],
                        padding: 0,
                    }],
                ),
            )
            .unwrap();
        // top overflows by 2, bottom by 1
        assert_eq!(pos.placement, Placement::Bottom);
        assert_eq!(pos.y, 4);
        let flip = pos.middleware_data.flip.unwrap();
        assert_eq!(
            flip.overflows,
            vec![(Placement::Top, 2), (Placement::Bottom, 1)]
        );
    }

    #[test]
    fn shift_keeps_panel_inside_padding() {
        let (doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 20), FloatRect::new(36, 2, 4, 1), 10, 3);
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(Placement::Bottom, vec![Middleware::Shift { padding: 1 }]),
            )
            .unwrap();
        assert_eq!(pos.x, 29);
        assert_eq!(pos.middleware_data.shift, Some((-4, 0)));
    }

    #[test]
    fn arrow_points_at_anchor_centre_and_clamps() {
        let (mut doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 20), FloatRect::new(10, 5, 4, 1), 10, 3);
        let arrow = doc.append_absolute(panel, 1, 1);
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(
                    Placement::Bottom,
                    vec![Middleware::Arrow {
                        element: arrow,
                        padding: 1,
                    }],
                ),
            )
            .unwrap();
        assert_eq!(pos.x, 7);
        let data = pos.middleware_data.arrow.unwrap();
        assert_eq!(data.x, Some(5));
        assert_eq!(data.y, None);
        assert_eq!(data.center_offset, 0);

        doc.set_rect(anchor, FloatRect::new(0, 5, 1, 1));
        let pos = CellEngine
            .compute_position(
                &doc,
                anchor,
                panel,
                &options(
                    Placement::BottomStart,
                    vec![Middleware::Arrow {
                        element: arrow,
                        padding: 1,
                    }],
                ),
            )
            .unwrap();
        let data = pos.middleware_data.arrow.unwrap();
        assert_eq!(data.x, Some(1));
        assert_eq!(data.center_offset, -1);
    }

    #[test]
    fn detached_anchor_is_an_error() {
        let (mut doc, anchor, panel) =
            setup(Rect::new(0, 0, 40, 20), FloatRect::new(5, 5, 10, 1), 8, 4);
        doc.detach(anchor);
        let err = CellEngine
            .compute_position(&doc, anchor, panel, &options(Placement::Bottom, vec![]))
            .unwrap_err();
        assert_eq!(err, PositionError::Detached(anchor));
        doc.remove(anchor);
        let err = CellEngine
            .compute_position(&doc, anchor, panel, &options(Placement::Bottom, vec![]))
            .unwrap_err();
        assert_eq!(err, PositionError::Missing(anchor));
    }
}
