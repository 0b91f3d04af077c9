//! Stand-in content elements.
//!
//! Real chart content (axis rects, legends, titles) lives outside this crate
//! and implements `ElementContent` itself. These two cover the common shapes:
//! a text block sized from an estimate, and a frame with fixed size hints and
//! label extents driving its automatic margins.

use unicode_width::UnicodeWidthStr;

use crate::primitives::{MarginSide, Margins, Size, MAX_EXTENT};

use super::element::{ElementContent, ElementGeometry};

/// Default character advance used for text estimates.
pub const CHAR_WIDTH: f64 = 8.4;

/// Default line height used for text estimates.
pub const LINE_HEIGHT: f64 = 18.0;

// =========================================================================
// TextElement
// =========================================================================

/// A block of text sized from character counts, without shaping.
///
/// The block never shrinks below its estimate, does not grow vertically,
/// and stretches freely horizontally (a title row spanning a whole grid).
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    pub char_width: f64,
    pub line_height: f64,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            char_width: CHAR_WIDTH,
            line_height: LINE_HEIGHT,
        }
    }

    /// Use different text metrics.
    pub fn metrics(mut self, char_width: f64, line_height: f64) -> Self {
        self.char_width = char_width.max(0.0);
        self.line_height = line_height.max(0.0);
        self
    }

    /// Estimated inner size: widest line by display width, one line height per line.
    pub fn estimate_size(&self) -> Size {
        if self.text.is_empty() {
            return Size::ZERO;
        }
        let columns = self.text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
        let lines = self.text.lines().count().max(1);
        let width = (columns as f64 * self.char_width).ceil();
        let height = (lines as f64 * self.line_height).ceil();
        Size::new(
            width.min(MAX_EXTENT as f64) as i32,
            height.min(MAX_EXTENT as f64) as i32,
        )
    }
}

impl ElementContent for TextElement {
    fn minimum_outer_size_hint(&self, geometry: &ElementGeometry) -> Size {
        self.estimate_size().grow(geometry.margins)
    }

    fn maximum_outer_size_hint(&self, geometry: &ElementGeometry) -> Size {
        let minimum = self.minimum_outer_size_hint(geometry);
        Size::new(MAX_EXTENT, minimum.height)
    }
}

// =========================================================================
// FrameElement
// =========================================================================

/// A rectangular area with fixed inner size hints and labels around it.
///
/// `labels` holds the extent of whatever is drawn in each margin (tick
/// labels, axis titles); automatic margins are sized to fit it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameElement {
    pub minimum: Size,
    pub maximum: Size,
    pub labels: Margins,
}

impl Default for FrameElement {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameElement {
    /// No size preference and no labels.
    pub fn new() -> Self {
        Self {
            minimum: Size::ZERO,
            maximum: Size::MAX,
            labels: Margins::ZERO,
        }
    }

    pub fn minimum(mut self, size: Size) -> Self {
        self.minimum = size;
        self
    }

    pub fn maximum(mut self, size: Size) -> Self {
        self.maximum = size;
        self
    }

    pub fn labels(mut self, labels: Margins) -> Self {
        self.labels = labels;
        self
    }
}

impl ElementContent for FrameElement {
    fn minimum_outer_size_hint(&self, geometry: &ElementGeometry) -> Size {
        self.minimum.grow(geometry.margins)
    }

    fn maximum_outer_size_hint(&self, geometry: &ElementGeometry) -> Size {
        self.maximum.grow(geometry.margins)
    }

    fn calculate_auto_margin(&self, side: MarginSide, geometry: &ElementGeometry) -> i32 {
        self.labels.get(side).max(geometry.minimum_margins.get(side))
    }
}

// =========================================================================
// Tests
// =========================================================================
