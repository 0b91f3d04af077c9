//! Layout element contract.
//!
//! Every node of a layout tree carries a `LayoutElement`: its outer rect, the
//! margins that derive the inner rect, size constraints, automatic-margin
//! configuration and margin-group membership. Leaf nodes additionally own an
//! `ElementContent` implementation that supplies intrinsic size hints and
//! content-driven margins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitives::{MarginSide, MarginSides, Margins, Point, Rect, Size, MAX_EXTENT};

use super::context::UpdateContext;
use super::MarginGroupId;

/// The three phases of a layout pass, always run in this order over the whole tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpdatePhase {
    /// Content prepares whatever its size hints and margins depend on.
    Preparation,
    /// Automatic margins are resolved, including margin groups.
    Margins,
    /// Containers carve their inner rect among their children.
    Layout,
}

impl UpdatePhase {
    pub const ORDER: [UpdatePhase; 3] = [
        UpdatePhase::Preparation,
        UpdatePhase::Margins,
        UpdatePhase::Layout,
    ];
}

/// Which rect the explicit minimum/maximum sizes refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConstraintTarget {
    /// Sizes bound the inner rect; margins are added on top.
    #[default]
    Inner,
    /// Sizes bound the outer rect, margins included.
    Outer,
}

/// Explicit size bounds of an element.
///
/// A minimum component of 0 and a maximum component of `MAX_EXTENT` mean
/// "unset": the element's size hint is used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeConstraint {
    pub minimum: Size,
    pub maximum: Size,
    pub target: ConstraintTarget,
}

impl Default for SizeConstraint {
    fn default() -> Self {
        Self {
            minimum: Size::ZERO,
            maximum: Size::MAX,
            target: ConstraintTarget::Inner,
        }
    }
}

/// Final minimum and maximum outer sizes a container uses for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OuterBounds {
    pub minimum: Size,
    pub maximum: Size,
}

impl OuterBounds {
    pub const UNBOUNDED: Self = Self {
        minimum: Size::ZERO,
        maximum: Size::MAX,
    };
}

/// Read-only view of an element's geometry handed to content hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementGeometry {
    pub outer_rect: Rect,
    pub inner_rect: Rect,
    pub margins: Margins,
    pub minimum_margins: Margins,
}

/// Content of a leaf element: everything the layout needs to know about what
/// gets drawn inside it.
///
/// Every method has a default, so a content type only overrides what it
/// actually knows about.
pub trait ElementContent: fmt::Debug {
    /// Smallest outer size the content can live with.
    fn minimum_outer_size_hint(&self, geometry: &ElementGeometry) -> Size {
        Size::new(geometry.margins.horizontal(), geometry.margins.vertical())
    }

    /// Largest outer size the content wants.
    fn maximum_outer_size_hint(&self, _geometry: &ElementGeometry) -> Size {
        Size::MAX
    }

    /// Margin requested on `side` when that side is automatic.
    ///
    /// Must not depend on margin-group membership.
    fn calculate_auto_margin(&self, side: MarginSide, geometry: &ElementGeometry) -> i32 {
        geometry.margins.get(side).max(geometry.minimum_margins.get(side))
    }

    /// Called once per phase after the element's own phase work is done.
    fn update(&mut self, _phase: UpdatePhase, _geometry: &ElementGeometry, _ctx: &mut UpdateContext) {}

    /// Distance of `point` to the content, or `None` if it is not hit.
    ///
    /// `tolerance` is the tree's selection tolerance.
    fn select_test(&self, point: Point, geometry: &ElementGeometry, tolerance: f64) -> Option<f64> {
        geometry
            .outer_rect
            .contains(point)
            .then_some(tolerance * 0.99)
    }
}

/// Common state of every node in a layout tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    outer_rect: Rect,
    inner_rect: Rect,
    margins: Margins,
    minimum_margins: Margins,
    auto_margins: MarginSides,
    constraint: SizeConstraint,
    margin_groups: [Option<MarginGroupId>; 4],
    visible: bool,
}

impl Default for LayoutElement {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutElement {
    /// A visible element with all margins automatic and no explicit size bounds.
    pub fn new() -> Self {
        Self {
            outer_rect: Rect::ZERO,
            inner_rect: Rect::ZERO,
            margins: Margins::ZERO,
            minimum_margins: Margins::ZERO,
            auto_margins: MarginSides::ALL,
            constraint: SizeConstraint::default(),
            margin_groups: [None; 4],
            visible: true,
        }
    }

    #[inline]
    pub fn outer_rect(&self) -> Rect {
        self.outer_rect
    }

    /// Outer rect minus margins.
    #[inline]
    pub fn inner_rect(&self) -> Rect {
        self.inner_rect
    }

    #[inline]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    #[inline]
    pub fn minimum_margins(&self) -> Margins {
        self.minimum_margins
    }

    #[inline]
    pub fn auto_margins(&self) -> MarginSides {
        self.auto_margins
    }

    #[inline]
    pub fn size_constraint(&self) -> SizeConstraint {
        self.constraint
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Margin group this element belongs to on `side`, if any.
    #[inline]
    pub fn margin_group(&self, side: MarginSide) -> Option<MarginGroupId> {
        self.margin_groups[side.index()]
    }

    pub fn geometry(&self) -> ElementGeometry {
        ElementGeometry {
            outer_rect: self.outer_rect,
            inner_rect: self.inner_rect,
            margins: self.margins,
            minimum_margins: self.minimum_margins,
        }
    }

    pub(crate) fn set_outer_rect(&mut self, rect: Rect) {
        self.outer_rect = rect;
        self.inner_rect = rect.shrink(self.margins);
    }

    pub(crate) fn set_margins(&mut self, margins: Margins) {
        self.margins = margins;
        self.inner_rect = self.outer_rect.shrink(margins);
    }

    pub(crate) fn set_minimum_margins(&mut self, margins: Margins) {
        self.minimum_margins = margins;
    }

    pub(crate) fn set_auto_margins(&mut self, sides: MarginSides) {
        self.auto_margins = sides;
    }

    /// Returns `true` if the constraint actually changed.
    pub(crate) fn set_size_constraint(&mut self, constraint: SizeConstraint) -> bool {
        let sanitized = SizeConstraint {
            minimum: constraint.minimum.max(Size::ZERO).min(Size::MAX),
            maximum: constraint.maximum.max(Size::ZERO).min(Size::MAX),
            target: constraint.target,
        };
        let changed = sanitized != self.constraint;
        self.constraint = sanitized;
        changed
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_margin_group(&mut self, side: MarginSide, group: Option<MarginGroupId>) {
        self.margin_groups[side.index()] = group;
    }

    /// Combine explicit constraints with the element's own size hints.
    ///
    /// An explicit minimum (non-zero) or maximum (below `MAX_EXTENT`) wins over
    /// the hint on that axis. For `ConstraintTarget::Inner` the current margins
    /// are added to explicit values.
    pub fn outer_bounds(&self, minimum_hint: Size, maximum_hint: Size) -> OuterBounds {
        let inner_target = self.constraint.target == ConstraintTarget::Inner;
        let horizontal = if inner_target { self.margins.horizontal() } else { 0 };
        let vertical = if inner_target { self.margins.vertical() } else { 0 };

        let explicit_min = self.constraint.minimum;
        let explicit_max = self.constraint.maximum;
        let pick_min = |explicit: i32, margin: i32, hint: i32| {
            if explicit > 0 {
                explicit.saturating_add(margin).min(MAX_EXTENT)
            } else {
                hint
            }
        };
        let pick_max = |explicit: i32, margin: i32, hint: i32| {
            if explicit < MAX_EXTENT {
                explicit.saturating_add(margin).min(MAX_EXTENT)
            } else {
                hint
            }
        };

        OuterBounds {
            minimum: Size::new(
                pick_min(explicit_min.width, horizontal, minimum_hint.width),
                pick_min(explicit_min.height, vertical, minimum_hint.height),
            ),
            maximum: Size::new(
                pick_max(explicit_max.width, horizontal, maximum_hint.width),
                pick_max(explicit_max.height, vertical, maximum_hint.height),
            ),
        }
    }
}
