//! Lifecycle of one floating overlay.
//!
//! `OverlayController` is the single authority on whether a panel is open.
//! It binds the trigger, arms outside dismissal, keeps a continuous
//! repositioning subscription while open, and writes the engine's answer
//! into the panel's inline style.
//!
//! Position computations cross an asynchronous boundary: `open` and
//! `reposition` only *request* one, and `flush` (or `pump`, once per event)
//! resolves it. A resolution for an overlay that has closed since, or whose
//! anchors have been detached, is dropped on the floor.
//!
//! Notifications are queued rather than delivered through callbacks, so a
//! component reacting to `Opened` by calling `toggle` can never re-enter the
//! controller mid-transition.

use std::collections::VecDeque;
use std::time::Instant;

use crossterm::event::{Event, MouseButton, MouseEventKind};
use tracing::{debug, trace, warn};

use crate::constants::{ATTR_OPEN, ATTR_PLACEMENT};
use crate::document::{Document, ElementId};
use crate::error::OverlayError;
use crate::keybindings::{Action, KeyBindings};
use crate::overlay::config::{OverlayConfig, TriggerMode};
use crate::overlay::dismissal::DismissalCoordinator;
use crate::overlay::state::{AnchorPair, OverlayEvent, OverlayState};
use crate::placement::Side;
use crate::positioning::{
    AutoUpdate, CellEngine, ComputeOptions, ComputedPosition, Middleware, PositioningEngine,
};

#[derive(Debug, Clone, Copy)]
struct Bound {
    trigger: ElementId,
    panel: ElementId,
    arrow: Option<ElementId>,
}

pub struct OverlayController<E: PositioningEngine = CellEngine> {
    config: OverlayConfig,
    state: OverlayState,
    anchors: AnchorPair,
    subscription: Option<AutoUpdate>,
    dismissal: DismissalCoordinator,
    bindings: KeyBindings,
    engine: E,
    generation: u64,
    pending: Option<u64>,
    close_deadline: Option<Instant>,
    last_position: Option<ComputedPosition>,
    events: VecDeque<OverlayEvent>,
}

impl<E: PositioningEngine> std::fmt::Debug for OverlayController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("anchors", &self.anchors)
            .field("subscribed", &self.subscription.is_some())
            .field("armed", &self.dismissal.is_armed())
            .field("pending", &self.pending)
            .finish()
    }
}

impl OverlayController<CellEngine> {
    pub fn new(config: OverlayConfig) -> Self {
        Self::with_engine(config, CellEngine)
    }
}

impl Default for OverlayController<CellEngine> {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

impl<E: PositioningEngine> OverlayController<E> {
    pub fn with_engine(config: OverlayConfig, engine: E) -> Self {
        Self {
            config,
            state: OverlayState::default(),
            anchors: AnchorPair::default(),
            subscription: None,
            dismissal: DismissalCoordinator::new(),
            bindings: KeyBindings::default(),
            engine,
            generation: 0,
            pending: None,
            close_deadline: None,
            last_position: None,
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    pub fn anchors(&self) -> AnchorPair {
        self.anchors
    }

    pub fn has_subscription(&self) -> bool {
        self.subscription.as_ref().is_some_and(AutoUpdate::is_active)
    }

    pub fn is_armed(&self) -> bool {
        self.dismissal.is_armed()
    }

    pub fn has_pending_computation(&self) -> bool {
        self.pending.is_some()
    }

    pub fn last_position(&self) -> Option<&ComputedPosition> {
        self.last_position.as_ref()
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Takes effect the next time the overlay opens.
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    /// Drain queued notifications in emission order.
    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.events.drain(..).collect()
    }

    pub(crate) fn emit(&mut self, event: OverlayEvent) {
        self.events.push_back(event);
    }

    /// Entry point for slot changes: the host resolved (or lost) its
    /// trigger/panel markup. Everything bound to the previous pair is torn
    /// down first.
    pub fn set_anchors(&mut self, doc: &mut Document, anchors: AnchorPair) {
        if self.anchors == anchors {
            return;
        }
        self.dispose(doc);
        self.anchors = anchors;
    }

    /// Swap the whole configuration. An open overlay is repositioned with
    /// the new settings.
    pub fn set_config(&mut self, config: OverlayConfig) {
        self.config = config;
        if self.state.is_open {
            self.request_position();
        }
    }

    fn resolve(&self, doc: &Document) -> Result<Bound, OverlayError> {
        let trigger = self.anchors.trigger.ok_or(OverlayError::AnchorUnresolved {
            missing: "trigger",
        })?;
        let panel = self
            .anchors
            .panel
            .ok_or(OverlayError::AnchorUnresolved { missing: "panel" })?;
        for (role, id) in [("trigger", trigger), ("panel", panel)] {
            if !doc.is_connected(id) {
                return Err(OverlayError::Disconnected { role, id });
            }
        }
        Ok(Bound {
            trigger,
            panel,
            arrow: self.anchors.arrow,
        })
    }

    pub fn open(&mut self, doc: &mut Document) {
        if self.state.is_open {
            return;
        }
        let bound = match self.resolve(doc) {
            Ok(bound) => bound,
            Err(err) => {
                warn!(error = %err, "overlay open ignored");
                return;
            }
        };
        self.finish_close_animation();
        self.state.is_open = true;
        self.project(doc);
        self.request_position();
        if self.subscription.is_none() {
            self.subscription = Some(AutoUpdate::start(doc, bound.trigger, bound.panel));
        }
        self.dismissal
            .arm(doc, bound.panel, bound.trigger, &self.bindings);
        debug!(trigger = %bound.trigger, panel = %bound.panel, "overlay opened");
        self.events.push_back(OverlayEvent::Opened);
    }

    pub fn close(&mut self, doc: &mut Document) {
        if !self.state.is_open {
            return;
        }
        self.teardown(doc);
        self.state.is_open = false;
        self.project(doc);
        if self.config.close_animation.is_zero() {
            self.events.push_back(OverlayEvent::Closed);
        } else {
            self.state.is_animating = true;
            self.close_deadline = Some(Instant::now() + self.config.close_animation);
        }
        debug!("overlay closed");
    }

    pub fn toggle(&mut self, doc: &mut Document) {
        if self.state.is_open {
            self.close(doc);
        } else {
            self.open(doc);
        }
    }

    /// Ask for a fresh computation, e.g. after the panel's content changed
    /// size.
    pub fn reposition(&mut self) {
        if self.state.is_open {
            self.request_position();
        }
    }

    /// Full teardown. Safe to call any number of times, from any exit path.
    pub fn dispose(&mut self, doc: &mut Document) {
        if self.state.is_open {
            self.close(doc);
        }
        self.teardown(doc);
        self.finish_close_animation();
        self.anchors = AnchorPair::default();
        self.last_position = None;
    }

    fn teardown(&mut self, doc: &mut Document) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.dispose(doc);
        }
        self.dismissal.disarm(doc);
        self.pending = None;
    }

    fn finish_close_animation(&mut self) {
        if self.state.is_animating {
            self.state.is_animating = false;
            self.close_deadline = None;
            self.events.push_back(OverlayEvent::Closed);
        }
    }

    /// Complete a running close transition once its deadline has passed.
    pub fn tick(&mut self, now: Instant) {
        if self
            .close_deadline
            .is_some_and(|deadline| now >= deadline)
        {
            self.finish_close_animation();
        }
    }

    /// Write state onto the elements. Nothing ever reads these back.
    fn project(&self, doc: &mut Document) {
        let open = if self.state.is_open { "true" } else { "false" };
        if let Some(trigger) = self.anchors.trigger {
            doc.set_attribute(trigger, ATTR_OPEN, open);
        }
        if let Some(panel) = self.anchors.panel {
            doc.set_attribute(panel, ATTR_OPEN, open);
            doc.set_hidden(panel, !self.state.is_open);
        }
    }

    fn request_position(&mut self) {
        self.generation += 1;
        self.pending = Some(self.generation);
    }

    fn compute_options(&self, bound: Bound) -> ComputeOptions {
        let cfg = &self.config;
        let mut middleware = vec![
            Middleware::Offset(cfg.offset_distance),
            Middleware::Flip {
                fallback_placements: cfg.fallback_placements.clone(),
                padding: cfg.collision_padding,
            },
            Middleware::Shift {
                padding: cfg.collision_padding,
            },
        ];
        if cfg.show_arrow
            && let Some(arrow) = bound.arrow
        {
            middleware.push(Middleware::Arrow {
                element: arrow,
                padding: cfg.arrow_padding,
            });
        }
        ComputeOptions {
            placement: cfg.placement,
            middleware,
        }
    }

    /// Resolve the pending computation, if any. Returns whether a position
    /// was written.
    pub fn flush(&mut self, doc: &mut Document) -> bool {
        let Some(ticket) = self.pending.take() else {
            return false;
        };
        if !self.state.is_open || ticket != self.generation {
            debug!(ticket, "discarding stale position computation");
            return false;
        }
        let bound = match self.resolve(doc) {
            Ok(bound) => bound,
            Err(err) => {
                debug!(error = %err, "discarding position computation");
                return false;
            }
        };
        let options = self.compute_options(bound);
        match self
            .engine
            .compute_position(doc, bound.trigger, bound.panel, &options)
        {
            Ok(position) => {
                self.apply_position(doc, bound, &position);
                self.last_position = Some(position);
                true
            }
            Err(err) => {
                debug!(error = %OverlayError::from(err), "keeping previous position");
                false
            }
        }
    }

    fn apply_position(&self, doc: &mut Document, bound: Bound, position: &ComputedPosition) {
        let viewport = doc.viewport();
        if let Some(style) = doc.style_mut(bound.panel) {
            style.reset();
            style.left = Some(position.x - viewport.x as i32);
            style.top = Some(position.y - viewport.y as i32);
        }
        doc.set_attribute(bound.panel, ATTR_PLACEMENT, position.placement.as_str());
        trace!(
            x = position.x,
            y = position.y,
            placement = %position.placement,
            "panel positioned"
        );

        let Some(arrow) = bound.arrow else {
            return;
        };
        let arrow_rect = doc.rect(arrow);
        let data = position
            .middleware_data
            .arrow
            .filter(|_| self.config.show_arrow);
        if let Some(style) = doc.style_mut(arrow) {
            style.reset();
            if let (Some(data), Some(rect)) = (data, arrow_rect) {
                style.left = data.x;
                style.top = data.y;
                let w = rect.width as i32;
                let h = rect.height as i32;
                match position.placement.static_side() {
                    Side::Top => style.top = Some(-h),
                    Side::Bottom => style.bottom = Some(-h),
                    Side::Left => style.left = Some(-w),
                    Side::Right => style.right = Some(-w),
                }
            }
        }
        doc.set_hidden(arrow, data.is_none());
    }

    /// Per-tick housekeeping: act on dismissal requests, stop when an anchor
    /// left the document, turn layout changes into repositioning, and
    /// resolve the pending computation.
    pub fn pump(&mut self, doc: &mut Document) {
        if let Some(reason) = self.dismissal.take_request() {
            debug!(?reason, "overlay dismissed");
            self.close(doc);
        }
        if self.state.is_open {
            if let Err(err) = self.resolve(doc) {
                debug!(error = %err, "anchor left the document; closing overlay");
                self.close(doc);
            } else if self
                .subscription
                .as_ref()
                .is_some_and(|subscription| subscription.take_change(doc))
            {
                self.request_position();
            }
        }
        self.flush(doc);
    }

    /// Trigger bindings: click or hover depending on the configured mode,
    /// plus keyboard opening from a focused click trigger.
    pub fn handle_trigger_event(&mut self, doc: &mut Document, event: &Event) -> bool {
        let Some(trigger) = self.anchors.trigger else {
            return false;
        };
        let panel = self.anchors.panel;
        match event {
            Event::Mouse(mouse) => {
                let path = doc.composed_path(mouse.column, mouse.row);
                let in_panel = panel.is_some_and(|p| path.contains(&p));
                let on_trigger = path.contains(&trigger) && !in_panel;
                match (self.config.trigger_mode, mouse.kind) {
                    (TriggerMode::Click, MouseEventKind::Down(MouseButton::Left)) if on_trigger => {
                        self.toggle(doc);
                        true
                    }
                    (TriggerMode::Hover, MouseEventKind::Moved | MouseEventKind::Drag(_)) => {
                        let inside = on_trigger || in_panel;
                        if inside && !self.state.is_open {
                            self.open(doc);
                        } else if !inside && self.state.is_open {
                            self.close(doc);
                        }
                        inside
                    }
                    _ => false,
                }
            }
            Event::Key(key)
                if self.config.trigger_mode == TriggerMode::Click
                    && !self.state.is_open
                    && doc.focused() == Some(trigger)
                    && self.bindings.matches(Action::OverlayOpen, key) =>
            {
                self.open(doc);
                true
            }
            _ => false,
        }
    }
}

impl<E: PositioningEngine> Drop for OverlayController<E> {
    fn drop(&mut self) {
        if self.subscription.is_some() || self.dismissal.is_armed() {
            warn!("overlay dropped without dispose; document listeners left behind");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::FloatRect;
    use crate::placement::Placement;
    use crate::positioning::PositionError;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
    use ratatui::layout::Rect;
    use std::time::Duration;

    struct Fixture {
        doc: Document,
        trigger: ElementId,
        panel: ElementId,
        arrow: ElementId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new(Rect::new(0, 0, 40, 20));
        let trigger = doc.append(None, FloatRect::new(10, 5, 6, 1));
        let panel = doc.append_floating(Some(trigger), 12, 4);
        let arrow = doc.append_absolute(panel, 1, 1);
        Fixture {
            doc,
            trigger,
            panel,
            arrow,
        }
    }

    fn bound(fx: &mut Fixture, config: OverlayConfig) -> OverlayController {
        let mut overlay = OverlayController::new(config);
        overlay.set_anchors(
            &mut fx.doc,
            AnchorPair::new(fx.trigger, fx.panel).with_arrow(fx.arrow),
        );
        overlay
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn open_positions_panel_and_projects_state() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::new(Placement::BottomStart));
        overlay.open(&mut fx.doc);
        assert!(overlay.has_pending_computation());
        assert!(overlay.flush(&mut fx.doc));
        assert_eq!(fx.doc.rect(fx.panel), Some(FloatRect::new(10, 7, 12, 4)));
        assert_eq!(fx.doc.attribute(fx.panel, ATTR_OPEN), Some("true"));
        assert_eq!(
            fx.doc.attribute(fx.panel, ATTR_PLACEMENT),
            Some("bottom-start")
        );
        assert!(fx.doc.is_visible(fx.panel));
        assert_eq!(overlay.take_events(), vec![OverlayEvent::Opened]);
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn subscription_tracks_open_state() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        for step in [true, true, false, false, true, false, true] {
            if step {
                overlay.open(&mut fx.doc);
            } else {
                overlay.close(&mut fx.doc);
            }
            assert_eq!(overlay.has_subscription(), overlay.is_open());
            assert_eq!(overlay.is_armed(), overlay.is_open());
            assert_eq!(fx.doc.observer_count(), usize::from(overlay.is_open()));
        }
        overlay.dispose(&mut fx.doc);
        assert_eq!(fx.doc.listener_count(), 0);
    }

    #[test]
    fn unresolved_anchors_make_open_a_no_op() {
        let mut doc = Document::new(Rect::new(0, 0, 40, 20));
        let trigger = doc.append(None, FloatRect::new(0, 0, 4, 1));
        let mut overlay = OverlayController::default();
        overlay.set_anchors(
            &mut doc,
            AnchorPair {
                trigger: Some(trigger),
                ..AnchorPair::default()
            },
        );
        overlay.open(&mut doc);
        assert!(!overlay.is_open());
        assert!(overlay.take_events().is_empty());
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn close_and_dispose_are_idempotent() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.close(&mut fx.doc);
        assert!(overlay.take_events().is_empty());
        overlay.open(&mut fx.doc);
        overlay.dispose(&mut fx.doc);
        overlay.dispose(&mut fx.doc);
        assert_eq!(
            overlay.take_events(),
            vec![OverlayEvent::Opened, OverlayEvent::Closed]
        );
        assert_eq!(overlay.state(), OverlayState::default());
        assert_eq!(fx.doc.listener_count(), 0);
        assert_eq!(fx.doc.observer_count(), 0);
    }

    #[test]
    fn computation_discarded_when_trigger_detached_in_flight() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.open(&mut fx.doc);
        overlay.flush(&mut fx.doc);
        let before = fx.doc.style(fx.panel);
        fx.doc.set_rect(fx.trigger, FloatRect::new(2, 2, 6, 1));
        overlay.reposition();
        fx.doc.detach(fx.trigger);
        assert!(!overlay.flush(&mut fx.doc));
        assert_eq!(fx.doc.style(fx.panel), before);
        overlay.pump(&mut fx.doc);
        assert!(!overlay.is_open());
        assert!(!overlay.has_subscription());
    }

    #[test]
    fn close_while_in_flight_drops_the_result() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.open(&mut fx.doc);
        overlay.close(&mut fx.doc);
        assert!(!overlay.flush(&mut fx.doc));
        assert!(fx.doc.style(fx.panel).is_some_and(|s| s.is_empty()));
    }

    struct FailingEngine;

    impl PositioningEngine for FailingEngine {
        fn compute_position(
            &self,
            _doc: &Document,
            _anchor: ElementId,
            floating: ElementId,
            _options: &ComputeOptions,
        ) -> Result<ComputedPosition, PositionError> {
            Err(PositionError::Detached(floating))
        }
    }

    #[test]
    fn engine_failure_keeps_overlay_open() {
        let mut fx = fixture();
        let mut overlay = OverlayController::with_engine(OverlayConfig::default(), FailingEngine);
        overlay.set_anchors(&mut fx.doc, AnchorPair::new(fx.trigger, fx.panel));
        overlay.open(&mut fx.doc);
        assert!(!overlay.flush(&mut fx.doc));
        assert!(overlay.is_open());
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn layout_change_requests_reposition() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::new(Placement::BottomStart));
        overlay.open(&mut fx.doc);
        overlay.pump(&mut fx.doc);
        fx.doc.set_rect(fx.trigger, FloatRect::new(3, 2, 6, 1));
        overlay.pump(&mut fx.doc);
        assert_eq!(fx.doc.rect(fx.panel), Some(FloatRect::new(3, 4, 12, 4)));
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn flip_moves_arrow_to_new_static_side() {
        let mut fx = fixture();
        let config = OverlayConfig::new(Placement::Bottom).with_arrow(true);
        let mut overlay = bound(&mut fx, config);
        overlay.open(&mut fx.doc);
        overlay.pump(&mut fx.doc);
        let style = fx.doc.style(fx.arrow).unwrap();
        assert_eq!(style.bottom, None);
        assert_eq!(style.top, Some(-1));
        let panel = fx.doc.rect(fx.panel).unwrap();
        assert_eq!(fx.doc.rect(fx.arrow).map(|r| r.y), Some(panel.y - 1));

        // Push the trigger to the bottom edge so the panel flips above it.
        fx.doc.set_rect(fx.trigger, FloatRect::new(10, 18, 6, 1));
        overlay.pump(&mut fx.doc);
        assert_eq!(
            overlay.last_position().map(|p| p.placement),
            Some(Placement::Top)
        );
        let style = fx.doc.style(fx.arrow).unwrap();
        assert_eq!(style.top, None);
        assert_eq!(style.bottom, Some(-1));
        let panel = fx.doc.rect(fx.panel).unwrap();
        assert_eq!(fx.doc.rect(fx.arrow).map(|r| r.y), Some(panel.bottom()));
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn click_trigger_toggles_and_outside_click_dismisses() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::new(Placement::BottomStart));
        let down = MouseEventKind::Down(MouseButton::Left);
        let ev = mouse(down, 11, 5);
        fx.doc.dispatch(&ev);
        assert!(overlay.handle_trigger_event(&mut fx.doc, &ev));
        overlay.pump(&mut fx.doc);
        assert!(overlay.is_open());

        // Inside the panel: neither toggles nor dismisses.
        let ev = mouse(down, 12, 8);
        fx.doc.dispatch(&ev);
        overlay.pump(&mut fx.doc);
        assert!(!overlay.handle_trigger_event(&mut fx.doc, &ev));
        assert!(overlay.is_open());

        let ev = mouse(down, 35, 1);
        fx.doc.dispatch(&ev);
        overlay.pump(&mut fx.doc);
        assert!(!overlay.is_open());
        assert_eq!(fx.doc.listener_count(), 0);
    }

    #[test]
    fn escape_closes_and_refocuses_trigger() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.open(&mut fx.doc);
        fx.doc.blur();
        fx.doc
            .dispatch(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert_eq!(fx.doc.focused(), Some(fx.trigger));
        overlay.pump(&mut fx.doc);
        assert!(!overlay.is_open());
    }

    #[test]
    fn hover_mode_follows_pointer() {
        let mut fx = fixture();
        let config = OverlayConfig::new(Placement::BottomStart).with_trigger_mode(TriggerMode::Hover);
        let mut overlay = bound(&mut fx, config);
        assert!(overlay.handle_trigger_event(&mut fx.doc, &mouse(MouseEventKind::Moved, 12, 5)));
        overlay.pump(&mut fx.doc);
        assert!(overlay.is_open());
        // Moving onto the panel keeps it open.
        assert!(overlay.handle_trigger_event(&mut fx.doc, &mouse(MouseEventKind::Moved, 12, 8)));
        assert!(overlay.is_open());
        assert!(!overlay.handle_trigger_event(&mut fx.doc, &mouse(MouseEventKind::Moved, 38, 0)));
        assert!(!overlay.is_open());
    }

    #[test]
    fn keyboard_opens_focused_click_trigger() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        let enter = Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(!overlay.handle_trigger_event(&mut fx.doc, &enter));
        fx.doc.focus(fx.trigger);
        assert!(overlay.handle_trigger_event(&mut fx.doc, &enter));
        assert!(overlay.is_open());
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn toggle_from_event_handler_does_not_double_fire() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.toggle(&mut fx.doc);
        let mut seen = Vec::new();
        for event in overlay.take_events() {
            if event == OverlayEvent::Opened {
                overlay.toggle(&mut fx.doc);
            }
            seen.push(event);
        }
        seen.extend(overlay.take_events());
        assert_eq!(seen, vec![OverlayEvent::Opened, OverlayEvent::Closed]);
        assert!(!overlay.is_open());
    }

    #[test]
    fn close_animation_defers_closed_notification() {
        let mut fx = fixture();
        let config = OverlayConfig::default().with_close_animation(Duration::from_millis(150));
        let mut overlay = bound(&mut fx, config);
        overlay.open(&mut fx.doc);
        overlay.close(&mut fx.doc);
        assert!(overlay.state().is_animating);
        assert_eq!(overlay.take_events(), vec![OverlayEvent::Opened]);
        overlay.tick(Instant::now() + Duration::from_secs(1));
        assert!(!overlay.state().is_animating);
        assert_eq!(overlay.take_events(), vec![OverlayEvent::Closed]);

        // Re-opening mid-transition completes the pending close first.
        overlay.open(&mut fx.doc);
        overlay.close(&mut fx.doc);
        overlay.open(&mut fx.doc);
        assert_eq!(
            overlay.take_events(),
            vec![
                OverlayEvent::Opened,
                OverlayEvent::Closed,
                OverlayEvent::Opened
            ]
        );
        overlay.dispose(&mut fx.doc);
    }

    #[test]
    fn replacing_anchors_tears_down_previous_pair() {
        let mut fx = fixture();
        let mut overlay = bound(&mut fx, OverlayConfig::default());
        overlay.open(&mut fx.doc);
        let new_trigger = fx.doc.append(None, FloatRect::new(0, 0, 3, 1));
        let new_panel = fx.doc.append_floating(Some(new_trigger), 5, 2);
        overlay.set_anchors(&mut fx.doc, AnchorPair::new(new_trigger, new_panel));
        assert!(!overlay.is_open());
        assert_eq!(fx.doc.listener_count(), 0);
        assert_eq!(fx.doc.observer_count(), 0);
        assert_eq!(overlay.anchors().trigger, Some(new_trigger));
        overlay.open(&mut fx.doc);
        assert!(overlay.is_open());
        overlay.dispose(&mut fx.doc);
    }
}
