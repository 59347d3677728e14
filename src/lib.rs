pub mod components;
pub mod constants;
pub mod document;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod keybindings;
pub mod layout;
pub mod log_buffer;
pub mod navigation;
pub mod overlay;
pub mod placement;
pub mod positioning;
pub mod theme;
pub mod tracing_sub;
pub mod ui;
