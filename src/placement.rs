//! Named placements of a floating panel relative to its anchor.
//!
//! A placement is a main side (`top`, `right`, `bottom`, `left`) plus an
//! optional alignment along the perpendicular axis (`start`, `end`). The
//! string forms (`"bottom-start"`) match what hosts pass on the command line.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Top => Side::Bottom,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Sides whose main axis runs vertically (the panel sits above/below).
    pub fn is_vertical(self) -> bool {
        matches!(self, Side::Top | Side::Bottom)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Placement {
    Top,
    TopStart,
    TopEnd,
    Right,
    RightStart,
    RightEnd,
    #[default]
    Bottom,
    BottomStart,
    BottomEnd,
    Left,
    LeftStart,
    LeftEnd,
}

impl Placement {
    pub const ALL: [Placement; 12] = [
        Placement::Top,
        Placement::TopStart,
        Placement::TopEnd,
        Placement::Right,
        Placement::RightStart,
        Placement::RightEnd,
        Placement::Bottom,
        Placement::BottomStart,
        Placement::BottomEnd,
        Placement::Left,
        Placement::LeftStart,
        Placement::LeftEnd,
    ];

    pub fn new(side: Side, alignment: Alignment) -> Self {
        use Alignment::*;
        match (side, alignment) {
            (Side::Top, Center) => Placement::Top,
            (Side::Top, Start) => Placement::TopStart,
            (Side::Top, End) => Placement::TopEnd,
            (Side::Right, Center) => Placement::Right,
            (Side::Right, Start) => Placement::RightStart,
            (Side::Right, End) => Placement::RightEnd,
            (Side::Bottom, Center) => Placement::Bottom,
            (Side::Bottom, Start) => Placement::BottomStart,
            (Side::Bottom, End) => Placement::BottomEnd,
            (Side::Left, Center) => Placement::Left,
            (Side::Left, Start) => Placement::LeftStart,
            (Side::Left, End) => Placement::LeftEnd,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Placement::Top | Placement::TopStart | Placement::TopEnd => Side::Top,
            Placement::Right | Placement::RightStart | Placement::RightEnd => Side::Right,
            Placement::Bottom | Placement::BottomStart | Placement::BottomEnd => Side::Bottom,
            Placement::Left | Placement::LeftStart | Placement::LeftEnd => Side::Left,
        }
    }

    pub fn alignment(self) -> Alignment {
        match self {
            Placement::Top | Placement::Right | Placement::Bottom | Placement::Left => {
                Alignment::Center
            }
            Placement::TopStart
            | Placement::RightStart
            | Placement::BottomStart
            | Placement::LeftStart => Alignment::Start,
            Placement::TopEnd | Placement::RightEnd | Placement::BottomEnd | Placement::LeftEnd => {
                Alignment::End
            }
        }
    }

    /// Same alignment on the opposite side.
    pub fn flipped(self) -> Self {
        Placement::new(self.side().opposite(), self.alignment())
    }

    /// Edge of the panel the arrow is pinned to: the one facing the anchor.
    pub fn static_side(self) -> Side {
        self.side().opposite()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placement::Top => "top",
            Placement::TopStart => "top-start",
            Placement::TopEnd => "top-end",
            Placement::Right => "right",
            Placement::RightStart => "right-start",
            Placement::RightEnd => "right-end",
            Placement::Bottom => "bottom",
            Placement::BottomStart => "bottom-start",
            Placement::BottomEnd => "bottom-end",
            Placement::Left => "left",
            Placement::LeftStart => "left-start",
            Placement::LeftEnd => "left-end",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown placement `{0}`")]
pub struct ParsePlacementError(String);

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Placement::ALL
            .into_iter()
            .find(|p| p.as_str() == needle)
            .ok_or_else(|| ParsePlacementError(s.to_string()))
    }
}
