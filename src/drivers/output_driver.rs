use crate::ui::UiFrame;
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use std::io;

/// Where frames go. `enter`/`exit` bracket the session (raw mode, alternate
/// screen, mouse capture) and must be safe to call repeatedly.
pub trait OutputDriver {
    type Backend: Backend;

    fn enter(&mut self) -> io::Result<()>;
    fn exit(&mut self) -> io::Result<()>;

    /// Current drawable area, used to seed the document viewport.
    fn viewport(&self) -> io::Result<Rect>;

    fn draw<F>(&mut self, f: F) -> io::Result<()>
    where
        F: FnOnce(UiFrame<'_>);
}
