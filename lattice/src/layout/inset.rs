//! InsetLayout - elements placed freely or anchored to a border.
//!
//! Unlike the grid there is no row/column structure and no space is shared
//! between siblings: each element is positioned on its own and may overlap
//! the others. Typical use is a legend floating in a corner of a plot area.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::primitives::{FractionalRect, Rect};

use super::container::{BoundsLookup, Layout};
use super::sizer::SurplusPolicy;
use super::ElementId;

/// How an inset element is positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InsetPlacement {
    /// Rect given as fractions of the container's inner rect.
    Free,
    /// Anchored to an edge, corner or the center, sized at its minimum.
    #[default]
    BorderAligned,
}

/// Anchor of a border-aligned element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InsetAlignment {
    TopLeft,
    Top,
    #[default]
    TopRight,
    Left,
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Top,
    Center,
    Bottom,
}

impl InsetAlignment {
    fn split(self) -> (Horizontal, Vertical) {
        use InsetAlignment::*;
        match self {
            TopLeft => (Horizontal::Left, Vertical::Top),
            Top => (Horizontal::Center, Vertical::Top),
            TopRight => (Horizontal::Right, Vertical::Top),
            Left => (Horizontal::Left, Vertical::Center),
            Center => (Horizontal::Center, Vertical::Center),
            Right => (Horizontal::Right, Vertical::Center),
            BottomLeft => (Horizontal::Left, Vertical::Bottom),
            Bottom => (Horizontal::Center, Vertical::Bottom),
            BottomRight => (Horizontal::Right, Vertical::Bottom),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct InsetEntry {
    element: ElementId,
    placement: InsetPlacement,
    alignment: InsetAlignment,
    rect: FractionalRect,
}

/// Ordered list of inset elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsetLayout {
    entries: Vec<InsetEntry>,
}

impl InsetLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `element` anchored at `alignment`.
    pub fn add_aligned(&mut self, element: ElementId, alignment: InsetAlignment) {
        self.entries.push(InsetEntry {
            element,
            placement: InsetPlacement::BorderAligned,
            alignment,
            rect: FractionalRect::default(),
        });
    }

    /// Append `element` at the fractional `rect`.
    pub fn add_free(&mut self, element: ElementId, rect: FractionalRect) {
        self.entries.push(InsetEntry {
            element,
            placement: InsetPlacement::Free,
            alignment: InsetAlignment::default(),
            rect,
        });
    }

    /// Slot of `element`, if it is in this layout.
    pub fn index_of(&self, element: ElementId) -> Option<usize> {
        self.entries.iter().position(|e| e.element == element)
    }

    fn entry(&self, index: usize) -> Result<&InsetEntry> {
        self.entries.get(index).ok_or_else(|| {
            tracing::warn!(index, "invalid inset element index");
            LayoutError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            }
        })
    }

    fn entry_mut(&mut self, index: usize) -> Result<&mut InsetEntry> {
        let len = self.entries.len();
        self.entries.get_mut(index).ok_or_else(|| {
            tracing::warn!(index, "invalid inset element index");
            LayoutError::IndexOutOfRange { index, len }
        })
    }

    pub fn placement(&self, index: usize) -> Result<InsetPlacement> {
        self.entry(index).map(|e| e.placement)
    }

    pub fn alignment(&self, index: usize) -> Result<InsetAlignment> {
        self.entry(index).map(|e| e.alignment)
    }

    pub fn rect(&self, index: usize) -> Result<FractionalRect> {
        self.entry(index).map(|e| e.rect)
    }

    /// Switch placement mode; the stored alignment and rect are kept for
    /// switching back.
    pub fn set_placement(&mut self, index: usize, placement: InsetPlacement) -> Result<()> {
        self.entry_mut(index)?.placement = placement;
        Ok(())
    }

    /// Used while the element is border-aligned.
    pub fn set_alignment(&mut self, index: usize, alignment: InsetAlignment) -> Result<()> {
        self.entry_mut(index)?.alignment = alignment;
        Ok(())
    }

    /// Used while the element is placed freely.
    pub fn set_rect(&mut self, index: usize, rect: FractionalRect) -> Result<()> {
        self.entry_mut(index)?.rect = rect;
        Ok(())
    }
}

impl Layout for InsetLayout {
    fn element_count(&self) -> usize {
        self.entries.len()
    }

    fn element_at(&self, index: usize) -> Option<ElementId> {
        self.entries.get(index).map(|e| e.element)
    }

    fn take_at(&mut self, index: usize) -> Option<ElementId> {
        if index >= self.entries.len() {
            tracing::warn!(index, "invalid inset element index");
            return None;
        }
        Some(self.entries.remove(index).element)
    }

    fn arrange(&self, rect: Rect, bounds: &BoundsLookup<'_>, _policy: SurplusPolicy) -> Vec<(ElementId, Rect)> {
        self.entries
            .iter()
            .map(|entry| {
                let b = bounds(entry.element);
                let placed = match entry.placement {
                    InsetPlacement::Free => {
                        let resolved = entry.rect.resolve(rect);
                        let size = resolved.size().max(b.minimum).min(b.maximum);
                        Rect::from_origin_size(resolved.x, resolved.y, size)
                    }
                    InsetPlacement::BorderAligned => {
                        let size = b.minimum;
                        let (horizontal, vertical) = entry.alignment.split();
                        let x = match horizontal {
                            Horizontal::Left => rect.x,
                            Horizontal::Center => rect.x + (rect.width - size.width) / 2,
                            Horizontal::Right => rect.x + rect.width - size.width,
                        };
                        let y = match vertical {
                            Vertical::Top => rect.y,
                            Vertical::Center => rect.y + (rect.height - size.height) / 2,
                            Vertical::Bottom => rect.y + rect.height - size.height,
                        };
                        Rect::from_origin_size(x, y, size)
                    }
                };
                (entry.element, placed)
            })
            .collect()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::element::OuterBounds;
    use crate::primitives::Size;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<ElementId> {
        let mut map: SlotMap<ElementId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn legend_bounds(_: ElementId) -> OuterBounds {
        OuterBounds {
            minimum: Size::new(40, 20),
            maximum: Size::new(120, 60),
        }
    }

    const AREA: Rect = Rect::new(10, 20, 200, 100);

    #[test]
    fn test_border_aligned_anchors() {
        let ids = ids(9);
        let anchors = [
            (InsetAlignment::TopLeft, 10, 20),
            (InsetAlignment::Top, 90, 20),
            (InsetAlignment::TopRight, 170, 20),
            (InsetAlignment::Left, 10, 60),
            (InsetAlignment::Center, 90, 60),
            (InsetAlignment::Right, 170, 60),
            (InsetAlignment::BottomLeft, 10, 100),
            (InsetAlignment::Bottom, 90, 100),
            (InsetAlignment::BottomRight, 170, 100),
        ];
        let mut inset = InsetLayout::new();
        for (id, (alignment, _, _)) in ids.iter().zip(anchors) {
            inset.add_aligned(*id, alignment);
        }
        let placed = inset.arrange(AREA, &legend_bounds, SurplusPolicy::Distribute);
        for ((id, rect), (alignment, x, y)) in placed.into_iter().zip(anchors) {
            assert_eq!(rect, Rect::new(x, y, 40, 20), "{alignment:?}");
            assert!(ids.contains(&id));
        }
    }

    #[test]
    fn test_free_placement_clamps_to_bounds() {
        let ids = ids(3);
        let mut inset = InsetLayout::new();
        inset.add_free(ids[0], FractionalRect::new(0.5, 0.5, 0.5, 0.5));
        inset.add_free(ids[1], FractionalRect::new(0.0, 0.0, 0.1, 0.1));
        inset.add_free(ids[2], FractionalRect::new(0.0, 0.0, 1.0, 1.0));
        let placed = inset.arrange(AREA, &legend_bounds, SurplusPolicy::Distribute);
        assert_eq!(placed[0].1, Rect::new(110, 70, 100, 50));
        assert_eq!(placed[1].1, Rect::new(10, 20, 40, 20));
        assert_eq!(placed[2].1, Rect::new(10, 20, 120, 60));
    }

    #[test]
    fn test_siblings_do_not_affect_each_other() {
        let ids = ids(2);
        let mut alone = InsetLayout::new();
        alone.add_aligned(ids[0], InsetAlignment::BottomLeft);
        let mut crowded = alone.clone();
        crowded.add_aligned(ids[1], InsetAlignment::BottomLeft);

        let a = alone.arrange(AREA, &legend_bounds, SurplusPolicy::Distribute);
        let b = crowded.arrange(AREA, &legend_bounds, SurplusPolicy::Distribute);
        assert_eq!(a[0], b[0]);
        assert_eq!(b[0].1, b[1].1);
    }

    #[test]
    fn test_switching_placement_keeps_defaults() {
        let ids = ids(1);
        let mut inset = InsetLayout::new();
        inset.add_aligned(ids[0], InsetAlignment::Left);
        assert_eq!(inset.rect(0).unwrap(), FractionalRect::new(0.6, 0.6, 0.4, 0.4));

        inset.set_placement(0, InsetPlacement::Free).unwrap();
        let placed = inset.arrange(AREA, &legend_bounds, SurplusPolicy::Distribute);
        assert_eq!(placed[0].1, Rect::new(130, 80, 80, 40));

        inset.set_placement(0, InsetPlacement::BorderAligned).unwrap();
        assert_eq!(inset.alignment(0).unwrap(), InsetAlignment::Left);
    }

    #[test]
    fn test_index_errors() {
        let mut inset = InsetLayout::new();
        assert_eq!(
            inset.set_alignment(0, InsetAlignment::Top),
            Err(LayoutError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert!(inset.placement(3).is_err());
        assert_eq!(inset.take_at(0), None);
    }

    #[test]
    fn test_take_removes_slot() {
        let ids = ids(3);
        let mut inset = InsetLayout::new();
        for id in &ids {
            inset.add_aligned(*id, InsetAlignment::TopRight);
        }
        assert!(inset.take(ids[1]));
        assert_eq!(inset.element_count(), 2);
        assert_eq!(inset.elements(), vec![ids[0], ids[2]]);
        assert_eq!(inset.index_of(ids[2]), Some(1));
        assert_eq!(inset.take_at(0), Some(ids[0]));
    }
}
