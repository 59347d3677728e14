use ratatui::style::Color;

// Centralized theme colors. Kept as small helpers so components never
// hard-code a palette.

pub const ACCENT_RGB: (u8, u8, u8) = (200, 100, 0);

pub fn accent() -> Color {
    let (r, g, b) = ACCENT_RGB;
    Color::Rgb(r, g, b)
}

// Trigger / panel
pub fn panel_bg() -> Color {
    Color::DarkGray
}
pub fn panel_inactive_fg() -> Color {
    Color::DarkGray
}
pub fn panel_active_bg() -> Color {
    Color::Gray
}
pub fn panel_active_fg() -> Color {
    Color::Black
}

// Menu
pub fn menu_bg() -> Color {
    Color::Black
}
pub fn menu_fg() -> Color {
    Color::White
}
pub fn menu_selected_bg() -> Color {
    Color::Gray
}
pub fn menu_selected_fg() -> Color {
    Color::Black
}

// Dialog / confirm
pub fn dialog_fg() -> Color {
    Color::White
}
pub fn dialog_separator() -> Color {
    Color::DarkGray
}

// Decorator
pub fn decorator_header_bg() -> Color {
    Color::Blue
}
pub fn decorator_header_fg() -> Color {
    Color::White
}
pub fn decorator_border() -> Color {
    Color::Gray
}
