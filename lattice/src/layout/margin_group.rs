//! Margin groups: keep one margin side equal across unrelated elements.
//!
//! A typical use is lining up the left edges of plot areas stacked in
//! different grid cells even though their axis labels differ in width.
//! The group only stores membership; the shared value is pulled lazily
//! during the margins phase by `LayoutTree::common_margin`.

use crate::primitives::MarginSide;

use super::ElementId;

/// What one member asks for on a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarginRequest {
    /// The member's automatic margin (`calculate_auto_margin`).
    pub automatic: i32,
    /// The member's configured minimum margin on that side.
    pub minimum: i32,
}

impl MarginRequest {
    #[inline]
    pub fn floored(&self) -> i32 {
        self.automatic.max(self.minimum)
    }
}

/// Per-side ordered member sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarginGroup {
    members: [Vec<ElementId>; 4],
}

impl MarginGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members registered on `side`, in join order.
    pub fn members(&self, side: MarginSide) -> &[ElementId] {
        &self.members[side.index()]
    }

    /// Whether no element is registered on any side.
    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Vec::is_empty)
    }

    /// Register `element` on `side`. Returns `false` if it already was.
    pub(crate) fn add(&mut self, side: MarginSide, element: ElementId) -> bool {
        let members = &mut self.members[side.index()];
        if members.contains(&element) {
            return false;
        }
        members.push(element);
        true
    }

    /// Unregister `element` from `side`. Returns `false` if it was not a member.
    pub(crate) fn remove(&mut self, side: MarginSide, element: ElementId) -> bool {
        let members = &mut self.members[side.index()];
        match members.iter().position(|m| *m == element) {
            Some(position) => {
                members.remove(position);
                true
            }
            None => false,
        }
    }

    /// Drop every membership, returning what was registered.
    pub(crate) fn take_all(&mut self) -> Vec<(MarginSide, ElementId)> {
        let mut taken = Vec::new();
        for side in MarginSide::ALL {
            for element in std::mem::take(&mut self.members[side.index()]) {
                taken.push((side, element));
            }
        }
        taken
    }

    /// Largest floored request among the members of `side`.
    ///
    /// `request` returns `None` for members whose `side` is not automatic;
    /// those do not take part. An empty side yields 0.
    pub fn common_margin(
        &self,
        side: MarginSide,
        mut request: impl FnMut(ElementId) -> Option<MarginRequest>,
    ) -> i32 {
        self.members(side)
            .iter()
            .filter_map(|&element| request(element))
            .map(|r| r.floored())
            .max()
            .unwrap_or(0)
            .max(0)
    }
}
