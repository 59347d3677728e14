use ratatui::prelude::Rect;

/// Signed rectangle origin with unsigned size.
///
/// Floating panels are positioned before collision handling runs, so their
/// origin may legitimately sit left of or above the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FloatRect {
    pub x: i32,
    pub y: i32,
    pub width: u16,
    pub height: u16,
}

impl FloatRect {
    pub const fn new(x: i32, y: i32, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn center_x(&self) -> i32 {
        self.x + self.width as i32 / 2
    }

    pub fn center_y(&self) -> i32 {
        self.y + self.height as i32 / 2
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn with_origin(self, x: i32, y: i32) -> Self {
        Self { x, y, ..self }
    }

    /// Clip to `bounds`, returning `None` when nothing is visible.
    pub fn clip_to(&self, bounds: Rect) -> Option<Rect> {
        let left = self.x.max(bounds.x as i32);
        let top = self.y.max(bounds.y as i32);
        let right = self.right().min(bounds.right() as i32);
        let bottom = self.bottom().min(bounds.bottom() as i32);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect {
            x: left as u16,
            y: top as u16,
            width: (right - left) as u16,
            height: (bottom - top) as u16,
        })
    }
}

impl From<Rect> for FloatRect {
    fn from(rect: Rect) -> Self {
        Self {
            x: rect.x as i32,
            y: rect.y as i32,
            width: rect.width,
            height: rect.height,
        }
    }
}

pub fn rect_contains(rect: Rect, column: u16, row: u16) -> bool {
    if rect.width == 0 || rect.height == 0 {
        return false;
    }
    let max_x = rect.x.saturating_add(rect.width);
    let max_y = rect.y.saturating_add(rect.height);
    column >= rect.x && column < max_x && row >= rect.y && row < max_y
}

pub fn float_rect_contains(rect: FloatRect, column: u16, row: u16) -> bool {
    if rect.is_empty() {
        return false;
    }
    let (column, row) = (column as i32, row as i32);
    column >= rect.x && column < rect.right() && row >= rect.y && row < rect.bottom()
}
