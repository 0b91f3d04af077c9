//! Per-pass context handed to content hooks.
//!
//! The UpdateContext carries the current phase and depth through the tree and
//! collects relayout requests raised while a pass is running. Requests are never
//! acted on mid-pass: the tree forwards them to its invalidation callback once
//! the pass has finished.

use super::element::UpdatePhase;
use super::ElementId;

/// Context passed to `ElementContent::update`.
#[derive(Debug)]
pub struct UpdateContext {
    phase: UpdatePhase,
    depth: u32,
    current: Option<ElementId>,
    relayout_requests: Vec<ElementId>,
}

impl UpdateContext {
    pub(crate) fn new(phase: UpdatePhase) -> Self {
        Self {
            phase,
            depth: 0,
            current: None,
            relayout_requests: Vec::new(),
        }
    }

    #[inline]
    pub fn phase(&self) -> UpdatePhase {
        self.phase
    }

    /// Nesting depth of the element being updated (root is 0).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth.saturating_sub(1)
    }

    /// Ask for a fresh layout pass once this one completes.
    ///
    /// Content calls this when its intrinsic size changed during the pass
    /// (for example after measuring labels in the preparation phase).
    pub fn request_relayout(&mut self) {
        if let Some(id) = self.current {
            if !self.relayout_requests.contains(&id) {
                tracing::debug!(element = ?id, phase = ?self.phase, "relayout requested mid-pass, deferring");
                self.relayout_requests.push(id);
            }
        }
    }

    pub(crate) fn enter(&mut self, element: ElementId) -> Option<ElementId> {
        self.depth += 1;
        self.current.replace(element)
    }

    pub(crate) fn exit(&mut self, previous: Option<ElementId>) {
        self.depth = self.depth.saturating_sub(1);
        self.current = previous;
    }

    pub(crate) fn take_requests(&mut self) -> Vec<ElementId> {
        std::mem::take(&mut self.relayout_requests)
    }
}
