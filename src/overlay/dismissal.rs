//! Outside-interaction dismissal.
//!
//! Each armed coordinator owns exactly one document listener. The listener
//! closes over its own panel/trigger pair and reports through a private
//! mailbox, so two open overlays never share state and disarming one leaves
//! the other's listener in place.

use std::cell::Cell;
use std::rc::Rc;

use crate::document::{Document, ElementId, ListenerHandle};
use crate::keybindings::{Action, KeyBindings, KeyCombo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    OutsidePointer,
    Escape,
}

#[derive(Debug, Default)]
pub struct DismissalCoordinator {
    registration: Option<ListenerHandle>,
    mailbox: Rc<Cell<Option<DismissReason>>>,
}

impl DismissalCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_armed(&self) -> bool {
        self.registration.is_some()
    }

    pub fn registration(&self) -> Option<ListenerHandle> {
        self.registration
    }

    /// Start watching for pointer-downs outside `panel`/`trigger` and for
    /// the dismiss key. Escape hands focus back to the trigger while the
    /// event is still being dispatched.
    pub fn arm(
        &mut self,
        doc: &mut Document,
        panel: ElementId,
        trigger: ElementId,
        bindings: &KeyBindings,
    ) {
        self.disarm(doc);
        let mailbox = Rc::clone(&self.mailbox);
        let dismiss_keys: Vec<KeyCombo> = bindings.combos(Action::OverlayDismiss).to_vec();
        let handle = doc.add_listener(move |ev, focus| {
            if ev.is_pointer_down() {
                if !ev.path_contains(panel) && !ev.path_contains(trigger) {
                    mailbox.set(Some(DismissReason::OutsidePointer));
                }
                return;
            }
            if let Some(key) = ev.key()
                && dismiss_keys.iter().any(|combo| combo.matches(key))
            {
                focus.focus(trigger);
                mailbox.set(Some(DismissReason::Escape));
            }
        });
        self.registration = Some(handle);
    }

    /// Remove this coordinator's listener, if any, and drop any request it
    /// left behind. Returns whether a listener was removed.
    pub fn disarm(&mut self, doc: &mut Document) -> bool {
        self.mailbox.set(None);
        match self.registration.take() {
            Some(handle) => doc.remove_listener(handle),
            None => false,
        }
    }

    pub fn take_request(&self) -> Option<DismissReason> {
        self.mailbox.take()
    }
}
