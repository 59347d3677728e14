use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use crossterm::event::Event;

use super::InputDriver;

/// Replays a fixed sequence of events; reports no input once drained.
#[derive(Debug, Default)]
pub struct ScriptedInputDriver {
    events: VecDeque<Event>,
}

impl ScriptedInputDriver {
    pub fn new(events: impl IntoIterator<Item = Event>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push_back(event);
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl InputDriver for ScriptedInputDriver {
    fn poll(&mut self, _timeout: Duration) -> io::Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> io::Result<Event> {
        self.events
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn replays_in_order_then_reports_idle() {
        let mut d = ScriptedInputDriver::new([Event::Resize(10, 5), Event::FocusGained]);
        assert!(d.poll(Duration::ZERO).unwrap());
        assert!(matches!(d.read().unwrap(), Event::Resize(10, 5)));
        d.push(Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert_eq!(d.remaining(), 2);
        d.read().unwrap();
        d.read().unwrap();
        assert!(!d.poll(Duration::ZERO).unwrap());
        assert!(d.read().is_err());
    }

    #[test]
    fn blanket_impl_for_mut_ref_works() {
        let mut d = ScriptedInputDriver::new([Event::FocusLost]);
        let mut by_ref = &mut d;
        assert!(InputDriver::poll(&mut by_ref, Duration::ZERO).unwrap());
        assert!(matches!(InputDriver::read(&mut by_ref).unwrap(), Event::FocusLost));
    }
}
