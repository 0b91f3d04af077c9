//! The container interface shared by grid and inset layouts.
//!
//! Containers store only child handles. Everything that needs the rest of the
//! tree (child size bounds, writing child rects) goes through `LayoutTree`,
//! which hands the container a bounds lookup and applies the rects it returns.

use crate::primitives::{Rect, Size};

use super::element::OuterBounds;
use super::sizer::SurplusPolicy;
use super::ElementId;

/// Lookup of a child's final outer bounds, provided by the tree.
pub type BoundsLookup<'a> = dyn Fn(ElementId) -> OuterBounds + 'a;

/// A layout element that owns and arranges child elements.
pub trait Layout {
    /// Number of slots, including empty ones.
    fn element_count(&self) -> usize;

    /// Child in slot `index`, `None` for empty or out-of-range slots.
    fn element_at(&self, index: usize) -> Option<ElementId>;

    /// Remove the child in slot `index` from this container and return it.
    ///
    /// The child is not destroyed; the caller decides what happens to it.
    fn take_at(&mut self, index: usize) -> Option<ElementId>;

    /// Remove `element` from this container. Returns `false` if it is not a child.
    fn take(&mut self, element: ElementId) -> bool {
        let index = (0..self.element_count()).find(|&i| self.element_at(i) == Some(element));
        match index {
            Some(index) => self.take_at(index).is_some(),
            None => false,
        }
    }

    /// Every child, in slot order.
    fn elements(&self) -> Vec<ElementId> {
        (0..self.element_count())
            .filter_map(|i| self.element_at(i))
            .collect()
    }

    /// Compute the outer rect of every child inside `rect` (the container's inner rect).
    fn arrange(&self, rect: Rect, bounds: &BoundsLookup<'_>, policy: SurplusPolicy) -> Vec<(ElementId, Rect)>;

    /// Smallest size the children need, excluding the container's own margins.
    fn minimum_content_size(&self, _bounds: &BoundsLookup<'_>) -> Size {
        Size::ZERO
    }

    /// Largest size the children can use, excluding the container's own margins.
    fn maximum_content_size(&self, _bounds: &BoundsLookup<'_>) -> Size {
        Size::MAX
    }

    /// Drop empty structure left behind by removals.
    fn simplify(&mut self) {}
}
