use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// The message pump driving the UI thread.
///
/// It is the only place that polls the input driver. Each input event is
/// handed to the handler closure, which dispatches it to the document and
/// the overlay components. Between bursts of input the handler is called
/// with `None`, which is where hosts pump overlays and draw.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs until the handler returns `ControlFlow::Quit`.
    ///
    /// The handler sees `None` once per iteration before input is polled,
    /// then `Some(event)` for every queued event.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain bursts (mouse drags, paste) in one go so rendering
                // never falls behind the input stream.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::scripted::ScriptedInputDriver;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn burst_is_drained_before_next_idle_tick() {
        let driver = ScriptedInputDriver::new([key('a'), key('b'), key('q')]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                let flow = match &event {
                    Some(Event::Key(k)) if k.code == KeyCode::Char('q') => ControlFlow::Quit,
                    _ => ControlFlow::Continue,
                };
                seen.push(event.is_some());
                Ok(flow)
            })
            .unwrap();
        assert_eq!(seen, vec![false, true, true, true]);
        assert_eq!(event_loop.driver().remaining(), 0);
    }

    #[test]
    fn idle_tick_can_quit() {
        let mut event_loop = EventLoop::new(ScriptedInputDriver::default(), Duration::ZERO);
        let mut ticks = 0;
        event_loop
            .run(|_, _| {
                ticks += 1;
                Ok(if ticks == 3 {
                    ControlFlow::Quit
                } else {
                    ControlFlow::Continue
                })
            })
            .unwrap();
        assert_eq!(ticks, 3);
        assert!(event_loop.poll().unwrap().is_none());
    }
}
