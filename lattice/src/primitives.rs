//! Core primitive types for Lattice.
//!
//! Integer pixel geometry used throughout the layout system, plus the margin
//! types that describe how an element's inner rect is inset from its outer rect.

use std::ops::Sub;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Largest extent an element may occupy. Used as the "unbounded" maximum.
pub const MAX_EXTENT: i32 = 16_777_215;

/// A point in canvas coordinates (used for hit-testing).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const ZERO: Self = Self { width: 0, height: 0 };

    /// The unbounded size, `MAX_EXTENT` on both axes.
    pub const MAX: Self = Self {
        width: MAX_EXTENT,
        height: MAX_EXTENT,
    };

    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    #[inline]
    pub fn max(self, other: Size) -> Size {
        Size::new(self.width.max(other.width), self.height.max(other.height))
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Size) -> Size {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }

    /// Grow by the horizontal and vertical sums of `margins`, saturating at `MAX_EXTENT`.
    #[inline]
    pub fn grow(self, margins: Margins) -> Size {
        Size::new(
            saturating_extent(self.width as i64 + margins.horizontal() as i64),
            saturating_extent(self.height as i64 + margins.vertical() as i64),
        )
    }
}

/// Clamp a wide intermediate sum back into `0..=MAX_EXTENT`.
#[inline]
pub(crate) fn saturating_extent(value: i64) -> i32 {
    value.clamp(0, MAX_EXTENT as i64) as i32
}

/// An axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const ZERO: Self = Self {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn from_origin_size(x: i32, y: i32, size: Size) -> Self {
        Self {
            x,
            y,
            width: size.width,
            height: size.height,
        }
    }

    /// Check if a point is inside this rectangle.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x as f64
            && point.x < self.right() as f64
            && point.y >= self.y as f64
            && point.y < self.bottom() as f64
    }

    /// Get the size of this rectangle.
    #[inline]
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Get the right edge X coordinate (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottom edge Y coordinate (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Inset this rectangle by `margins`. Width and height never go negative.
    #[inline]
    pub fn shrink(&self, margins: Margins) -> Rect {
        Rect {
            x: self.x.saturating_add(margins.left),
            y: self.y.saturating_add(margins.top),
            width: self.width.saturating_sub(margins.horizontal()).max(0),
            height: self.height.saturating_sub(margins.vertical()).max(0),
        }
    }

}

/// A rectangle expressed as fractions of a container rect.
///
/// `(0.0, 0.0, 1.0, 1.0)` covers the whole container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FractionalRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FractionalRect {
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Map onto a concrete container rect, truncating toward zero.
    pub fn resolve(&self, container: Rect) -> Rect {
        let w = container.width as f64;
        let h = container.height as f64;
        Rect {
            x: (container.x as f64 + w * self.x) as i32,
            y: (container.y as f64 + h * self.y) as i32,
            width: (w * self.width) as i32,
            height: (h * self.height) as i32,
        }
    }
}

impl Default for FractionalRect {
    fn default() -> Self {
        Self::new(0.6, 0.6, 0.4, 0.4)
    }
}

/// One side of an element's margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginSide {
    Left,
    Right,
    Top,
    Bottom,
}

impl MarginSide {
    /// All sides, in the order margins are resolved.
    pub const ALL: [MarginSide; 4] = [
        MarginSide::Left,
        MarginSide::Right,
        MarginSide::Top,
        MarginSide::Bottom,
    ];

    /// Slot used for per-side storage.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        match self {
            MarginSide::Left => 0,
            MarginSide::Right => 1,
            MarginSide::Top => 2,
            MarginSide::Bottom => 3,
        }
    }
}

bitflags! {
    /// A set of margin sides, e.g. the sides computed automatically.
    ///
    /// Combine with bitwise OR: `MarginSides::LEFT | MarginSides::RIGHT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct MarginSides: u8 {
        const NONE = 0;
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const TOP = 1 << 2;
        const BOTTOM = 1 << 3;
        const ALL = Self::LEFT.bits() | Self::RIGHT.bits() | Self::TOP.bits() | Self::BOTTOM.bits();
    }
}

impl MarginSides {
    /// Whether `side` is part of this set.
    #[inline]
    pub fn has(self, side: MarginSide) -> bool {
        self.contains(MarginSides::from(side))
    }

    /// Iterate the sides in this set.
    pub fn sides(self) -> impl Iterator<Item = MarginSide> {
        MarginSide::ALL.into_iter().filter(move |side| self.has(*side))
    }
}

impl From<MarginSide> for MarginSides {
    fn from(side: MarginSide) -> Self {
        match side {
            MarginSide::Left => MarginSides::LEFT,
            MarginSide::Right => MarginSides::RIGHT,
            MarginSide::Top => MarginSides::TOP,
            MarginSide::Bottom => MarginSides::BOTTOM,
        }
    }
}

/// Insets from an element's outer rect to its inner rect.
///
/// Values are never negative; constructors and setters clamp at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const ZERO: Self = Self {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };

    /// Create margins with explicit values for each side.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left: left.max(0),
            top: top.max(0),
            right: right.max(0),
            bottom: bottom.max(0),
        }
    }

    /// Uniform margins on all sides.
    pub fn all(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Total horizontal margin.
    pub fn horizontal(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    /// Total vertical margin.
    pub fn vertical(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }

    /// Value on one side.
    pub fn get(&self, side: MarginSide) -> i32 {
        match side {
            MarginSide::Left => self.left,
            MarginSide::Right => self.right,
            MarginSide::Top => self.top,
            MarginSide::Bottom => self.bottom,
        }
    }

    /// Set the value on one side (clamped at zero).
    pub fn set(&mut self, side: MarginSide, value: i32) {
        let value = value.max(0);
        match side {
            MarginSide::Left => self.left = value,
            MarginSide::Right => self.right = value,
            MarginSide::Top => self.top = value,
            MarginSide::Bottom => self.bottom = value,
        }
    }
}

impl Sub<Margins> for Rect {
    type Output = Rect;
    fn sub(self, rhs: Margins) -> Rect {
        self.shrink(rhs)
    }
}
