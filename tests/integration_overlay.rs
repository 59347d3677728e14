use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::Rect;

use term_overlay::constants::{ATTR_OPEN, ATTR_PLACEMENT};
use term_overlay::document::{Document, ElementId};
use term_overlay::layout::FloatRect;
use term_overlay::overlay::{AnchorPair, OverlayConfig, OverlayController, OverlayEvent};
use term_overlay::placement::Placement;

fn pointer_down(column: u16, row: u16) -> Event {
    Event::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

fn bind(doc: &mut Document, trigger_rect: FloatRect) -> (ElementId, ElementId, OverlayController) {
    let trigger = doc.append(None, trigger_rect);
    let panel = doc.append_floating(Some(trigger), 10, 3);
    let mut overlay = OverlayController::new(OverlayConfig::new(Placement::Bottom));
    overlay.set_anchors(doc, AnchorPair::new(trigger, panel));
    (trigger, panel, overlay)
}

#[test]
fn lifecycle_bookkeeping_follows_open_state() {
    let mut doc = Document::new(Rect::new(0, 0, 40, 20));
    let (trigger, panel, mut overlay) = bind(&mut doc, FloatRect::new(4, 2, 6, 1));

    // Fixed pseudo-random walk over open/close/toggle/reposition/pump.
    let mut seed: u32 = 0x2545_f491;
    for _ in 0..200 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        match (seed >> 16) % 5 {
            0 => overlay.open(&mut doc),
            1 => overlay.close(&mut doc),
            2 => overlay.toggle(&mut doc),
            3 => overlay.reposition(),
            _ => overlay.pump(&mut doc),
        }
        let open = overlay.is_open();
        assert_eq!(overlay.has_subscription(), open);
        assert_eq!(overlay.is_armed(), open);
        assert_eq!(doc.listener_count(), usize::from(open));
        assert_eq!(doc.observer_count(), usize::from(open));
        let expected = if open { "true" } else { "false" };
        if doc.attribute(trigger, ATTR_OPEN).is_some() {
            assert_eq!(doc.attribute(trigger, ATTR_OPEN), Some(expected));
            assert_eq!(doc.attribute(panel, ATTR_OPEN), Some(expected));
            assert_eq!(doc.is_visible(panel), open);
        }
    }

    // Opened/Closed strictly alternate, starting with Opened.
    let events = overlay.take_events();
    for pair in events.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(events.first(), Some(&OverlayEvent::Opened));

    overlay.dispose(&mut doc);
    overlay.dispose(&mut doc);
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(doc.observer_count(), 0);
}

#[test]
fn open_without_panel_does_nothing() {
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
    overlay.pump(&mut doc);
    assert!(!overlay.is_open());
    assert!(!overlay.has_subscription());
    assert!(overlay.take_events().is_empty());
    assert_eq!(doc.attribute(trigger, ATTR_OPEN), None);
}

#[test]
fn panel_removed_mid_flight_closes_without_writing() {
    let mut doc = Document::new(Rect::new(0, 0, 40, 20));
    let (_, panel, mut overlay) = bind(&mut doc, FloatRect::new(4, 2, 6, 1));
    overlay.open(&mut doc);
    assert!(overlay.has_pending_computation());
    doc.detach(panel);
    assert!(!overlay.flush(&mut doc));
    assert!(doc.style(panel).is_some_and(|s| s.is_empty()));

    overlay.pump(&mut doc);
    assert!(!overlay.is_open());
    assert_eq!(doc.listener_count(), 0);
    assert_eq!(
        overlay.take_events(),
        vec![OverlayEvent::Opened, OverlayEvent::Closed]
    );
}

#[test]
fn viewport_resize_flips_open_panel() {
    let mut doc = Document::new(Rect::new(0, 0, 40, 20));
    let (_, panel, mut overlay) = bind(&mut doc, FloatRect::new(10, 12, 6, 1));
    overlay.open(&mut doc);
    overlay.pump(&mut doc);
    assert_eq!(doc.attribute(panel, ATTR_PLACEMENT), Some("bottom"));

    doc.dispatch(&Event::Resize(40, 16));
    overlay.pump(&mut doc);
    assert_eq!(doc.attribute(panel, ATTR_PLACEMENT), Some("top"));
    let rect = doc.rect(panel).unwrap();
    assert_eq!(rect.bottom(), 11);
    overlay.dispose(&mut doc);
}

#[test]
fn overlays_keep_independent_dismissal() {
    let mut doc = Document::new(Rect::new(0, 0, 60, 20));
    let (_, _, mut first) = bind(&mut doc, FloatRect::new(2, 2, 6, 1));
    let (second_trigger, _, mut second) = bind(&mut doc, FloatRect::new(30, 2, 6, 1));
    first.open(&mut doc);
    second.open(&mut doc);
    assert_eq!(doc.listener_count(), 2);

    first.close(&mut doc);
    assert!(!first.is_armed());
    assert!(second.is_armed());
    assert_eq!(doc.listener_count(), 1);

    // A click on the second trigger is not outside the second overlay.
    doc.dispatch(&pointer_down(31, 2));
    second.pump(&mut doc);
    assert!(second.is_open());
    assert_eq!(doc.focused(), Some(second_trigger));

    doc.dispatch(&pointer_down(50, 18));
    first.pump(&mut doc);
    second.pump(&mut doc);
    assert!(!second.is_open());
    assert_eq!(doc.listener_count(), 0);
}

#[test]
fn clicking_another_trigger_dismisses_the_open_overlay() {
    let mut doc = Document::new(Rect::new(0, 0, 60, 20));
    let (_, _, mut first) = bind(&mut doc, FloatRect::new(2, 2, 6, 1));
    let (_, _, mut second) = bind(&mut doc, FloatRect::new(30, 2, 6, 1));
    first.open(&mut doc);

    let click = pointer_down(31, 2);
    doc.dispatch(&click);
    first.handle_trigger_event(&mut doc, &click);
    second.handle_trigger_event(&mut doc, &click);
    first.pump(&mut doc);
    second.pump(&mut doc);
    assert!(!first.is_open());
    assert!(second.is_open());
    assert_eq!(doc.listener_count(), 1);
    first.dispose(&mut doc);
    second.dispose(&mut doc);
}

#[test]
fn escape_returns_focus_from_panel_to_trigger() {
    let mut doc = Document::new(Rect::new(0, 0, 40, 20));
    let (trigger, panel, mut overlay) = bind(&mut doc, FloatRect::new(4, 2, 6, 1));
    overlay.open(&mut doc);
    overlay.pump(&mut doc);
    assert!(doc.focus(panel));
    doc.dispatch(&Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
    assert_eq!(doc.focused(), Some(trigger));
    overlay.pump(&mut doc);
    assert!(!overlay.is_open());
    assert_eq!(doc.attribute(panel, ATTR_OPEN), Some("false"));
}
