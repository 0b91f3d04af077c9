//! LayoutTree - arena of layout elements and the phase driver.
//!
//! Elements live in a generation-checked `SlotMap`; containers refer to their
//! children by `ElementId` and every node records its owning container, so
//! ownership is an explicit map instead of back-pointers. Removing an element
//! cascades to its whole subtree.
//!
//! A layout pass runs the three `UpdatePhase`s over a subtree, each phase
//! finishing for every element before the next starts:
//!
//! 1. Preparation: content hooks only.
//! 2. Margins: automatic margins are resolved (margin groups pulled lazily).
//! 3. Layout: containers carve their inner rect among their children.
//!
//! Size changes reported while a pass runs are deferred and forwarded to the
//! invalidation callback once the pass has finished.

use std::fmt;

use slotmap::SlotMap;

use crate::error::{LayoutError, Result};
use crate::primitives::{FractionalRect, MarginSide, MarginSides, Margins, Point, Rect, Size};
use crate::settings::{GridSettings, LayoutSettings};

use super::container::Layout;
use super::context::UpdateContext;
use super::element::{
    ConstraintTarget, ElementContent, LayoutElement, OuterBounds, SizeConstraint, UpdatePhase,
};
use super::grid::{FillOrder, GridLayout};
use super::inset::{InsetAlignment, InsetLayout, InsetPlacement};
use super::margin_group::{MarginGroup, MarginRequest};
use super::{ElementId, MarginGroupId};

// =========================================================================
// Nodes
// =========================================================================

/// What a node is: a leaf with content, or one of the container kinds.
#[derive(Debug)]
enum NodeKind {
    Content(Box<dyn ElementContent>),
    Grid(GridLayout),
    Inset(InsetLayout),
}

impl NodeKind {
    fn layout(&self) -> Option<&dyn Layout> {
        match self {
            NodeKind::Content(_) => None,
            NodeKind::Grid(grid) => Some(grid),
            NodeKind::Inset(inset) => Some(inset),
        }
    }

    fn layout_mut(&mut self) -> Option<&mut dyn Layout> {
        match self {
            NodeKind::Content(_) => None,
            NodeKind::Grid(grid) => Some(grid),
            NodeKind::Inset(inset) => Some(inset),
        }
    }
}

#[derive(Debug)]
struct Node {
    element: LayoutElement,
    parent: Option<ElementId>,
    kind: NodeKind,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            element: LayoutElement::new(),
            parent: None,
            kind,
        }
    }

    /// Margin this node asks for on `side` when the side is automatic.
    fn auto_margin(&self, side: MarginSide) -> i32 {
        let geometry = self.element.geometry();
        match &self.kind {
            NodeKind::Content(content) => content.calculate_auto_margin(side, &geometry),
            _ => geometry.margins.get(side).max(geometry.minimum_margins.get(side)),
        }
    }
}

fn stale(id: ElementId) -> LayoutError {
    tracing::warn!(element = ?id, "stale element handle");
    LayoutError::StaleElement(id)
}

fn stale_group(id: MarginGroupId) -> LayoutError {
    tracing::warn!(group = ?id, "stale margin group handle");
    LayoutError::StaleMarginGroup(id)
}

/// Callback fired with the root of a tree whose layout needs a fresh pass.
pub type InvalidationCallback = Box<dyn FnMut(ElementId)>;

// =========================================================================
// LayoutTree
// =========================================================================

/// Owner of every layout element and margin group of a canvas.
pub struct LayoutTree {
    nodes: SlotMap<ElementId, Node>,
    groups: SlotMap<MarginGroupId, MarginGroup>,
    settings: LayoutSettings,
    /// Set while a pass runs.
    updating: bool,
    /// Roots invalidated while a pass was running.
    pending: Vec<ElementId>,
    on_invalidate: Option<InvalidationCallback>,
}

impl fmt::Debug for LayoutTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutTree")
            .field("nodes", &self.nodes.len())
            .field("groups", &self.groups.len())
            .field("settings", &self.settings)
            .field("updating", &self.updating)
            .finish_non_exhaustive()
    }
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self::with_settings(LayoutSettings::default())
    }

    pub fn with_settings(settings: LayoutSettings) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            groups: SlotMap::with_key(),
            settings,
            updating: false,
            pending: Vec::new(),
            on_invalidate: None,
        }
    }

    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: LayoutSettings) {
        self.settings = settings;
    }

    /// Register the callback that asks the host for a fresh layout pass.
    pub fn set_invalidation_callback(&mut self, callback: impl FnMut(ElementId) + 'static) {
        self.on_invalidate = Some(Box::new(callback));
    }

    pub fn clear_invalidation_callback(&mut self) {
        self.on_invalidate = None;
    }

    // =====================================================================
    // Arena
    // =====================================================================

    /// Add a content leaf. The new element has no owner.
    pub fn insert_content(&mut self, content: impl ElementContent + 'static) -> ElementId {
        self.insert_node(NodeKind::Content(Box::new(content)))
    }

    /// Add an empty grid container.
    pub fn insert_grid(&mut self, settings: GridSettings) -> ElementId {
        self.insert_node(NodeKind::Grid(GridLayout::with_settings(settings)))
    }

    /// Add an empty inset container.
    pub fn insert_inset(&mut self) -> ElementId {
        self.insert_node(NodeKind::Inset(InsetLayout::new()))
    }

    fn insert_node(&mut self, kind: NodeKind) -> ElementId {
        let id = self.nodes.insert(Node::new(kind));
        tracing::trace!(element = ?id, "inserted layout element");
        id
    }

    /// Detach `id` from its owner and destroy it with its whole subtree.
    ///
    /// Destroyed elements leave every margin group they were part of.
    pub fn remove(&mut self, id: ElementId) -> Result<()> {
        self.node(id)?;
        let parent = self.detach(id);

        let mut doomed = vec![id];
        doomed.extend(self.descendants(id));
        for element in &doomed {
            let Some(node) = self.nodes.remove(*element) else { continue };
            for side in MarginSide::ALL {
                if let Some(group) = node.element.margin_group(side).and_then(|g| self.groups.get_mut(g)) {
                    group.remove(side, *element);
                }
            }
        }
        tracing::debug!(element = ?id, removed = doomed.len(), "removed layout subtree");

        if let Some(parent) = parent {
            self.notify(parent);
        }
        Ok(())
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn element(&self, id: ElementId) -> Option<&LayoutElement> {
        self.nodes.get(id).map(|node| &node.element)
    }

    /// Content of a leaf element.
    pub fn content(&self, id: ElementId) -> Result<&dyn ElementContent> {
        match &self.node(id)?.kind {
            NodeKind::Content(content) => Ok(content.as_ref()),
            _ => {
                tracing::warn!(element = ?id, "element is a container, not content");
                Err(LayoutError::NotContent(id))
            }
        }
    }

    /// Swap the content of a leaf and return the old one.
    ///
    /// Counts as an intrinsic size change: the tree is invalidated.
    pub fn replace_content(
        &mut self,
        id: ElementId,
        content: impl ElementContent + 'static,
    ) -> Result<Box<dyn ElementContent>> {
        let node = self.node_mut(id)?;
        let NodeKind::Content(slot) = &mut node.kind else {
            tracing::warn!(element = ?id, "element is a container, not content");
            return Err(LayoutError::NotContent(id));
        };
        let content: Box<dyn ElementContent> = Box::new(content);
        let previous = std::mem::replace(slot, content);
        self.notify(id);
        Ok(previous)
    }

    pub fn is_container(&self, id: ElementId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.kind.layout().is_some())
    }

    /// Owning container of `id`.
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Topmost ancestor of `id` (itself if it has no owner).
    pub fn root_of(&self, id: ElementId) -> ElementId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Direct children in slot order; empty for content and stale handles.
    pub fn children(&self, id: ElementId) -> Vec<ElementId> {
        self.nodes
            .get(id)
            .and_then(|node| node.kind.layout())
            .map(|layout| layout.elements())
            .unwrap_or_default()
    }

    /// Every element below `id`, depth first, parents before children.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.children(id).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        out
    }

    fn node(&self, id: ElementId) -> Result<&Node> {
        self.nodes.get(id).ok_or_else(|| stale(id))
    }

    fn node_mut(&mut self, id: ElementId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or_else(|| stale(id))
    }

    fn layout_ref(&self, id: ElementId) -> Result<&dyn Layout> {
        self.node(id)?.kind.layout().ok_or_else(|| {
            tracing::warn!(element = ?id, "element is not a layout container");
            LayoutError::NotAContainer(id)
        })
    }

    // =====================================================================
    // Ownership
    // =====================================================================

    /// Whether `ancestor` is `id` or one of its owners.
    fn is_ancestor_or_self(&self, ancestor: ElementId, id: ElementId) -> bool {
        let mut current = Some(id);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = self.parent(element);
        }
        false
    }

    /// Common checks before `child` moves into `container`.
    fn check_attach(&self, container: ElementId, child: ElementId) -> Result<()> {
        self.node(child)?;
        self.layout_ref(container)?;
        if self.is_ancestor_or_self(child, container) {
            tracing::warn!(parent = ?container, child = ?child, "attachment would create a cycle");
            return Err(LayoutError::WouldCreateCycle {
                parent: container,
                child,
            });
        }
        Ok(())
    }

    /// Take `child` out of its owner, if any, and return the former owner.
    fn detach(&mut self, child: ElementId) -> Option<ElementId> {
        let parent = self.nodes.get_mut(child)?.parent.take()?;
        if let Some(layout) = self.nodes.get_mut(parent).and_then(|node| node.kind.layout_mut()) {
            layout.take(child);
        }
        Some(parent)
    }

    fn adopt(&mut self, container: ElementId, child: ElementId) {
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(container);
        }
        self.notify(container);
    }

    fn release(&mut self, container: ElementId, children: &[ElementId]) {
        for child in children {
            if let Some(node) = self.nodes.get_mut(*child) {
                node.parent = None;
            }
        }
        if !children.is_empty() {
            self.notify(container);
        }
    }

    /// Detach `id` from its owner without destroying it.
    ///
    /// Returns `false` if it had no owner.
    pub fn take(&mut self, id: ElementId) -> Result<bool> {
        self.node(id)?;
        match self.detach(id) {
            Some(parent) => {
                self.notify(parent);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Detach the child in slot `index` of `container` and return it.
    pub fn take_at(&mut self, container: ElementId, index: usize) -> Result<Option<ElementId>> {
        let taken = self
            .node_mut(container)?
            .kind
            .layout_mut()
            .ok_or_else(|| {
                tracing::warn!(element = ?container, "element is not a layout container");
                LayoutError::NotAContainer(container)
            })?
            .take_at(index);
        if let Some(child) = taken {
            self.release(container, &[child]);
        }
        Ok(taken)
    }

    /// Drop empty structure left behind in `container`.
    pub fn simplify(&mut self, container: ElementId) -> Result<()> {
        let node = self.node_mut(container)?;
        match node.kind.layout_mut() {
            Some(layout) => {
                layout.simplify();
                Ok(())
            }
            None => {
                tracing::warn!(element = ?container, "element is not a layout container");
                Err(LayoutError::NotAContainer(container))
            }
        }
    }

    // =====================================================================
    // Grid containers
    // =====================================================================

    pub fn grid(&self, id: ElementId) -> Result<&GridLayout> {
        match &self.node(id)?.kind {
            NodeKind::Grid(grid) => Ok(grid),
            NodeKind::Content(_) => {
                tracing::warn!(element = ?id, "element is not a layout container");
                Err(LayoutError::NotAContainer(id))
            }
            NodeKind::Inset(_) => {
                tracing::warn!(element = ?id, "element is not a grid");
                Err(LayoutError::WrongLayoutKind {
                    element: id,
                    expected: "grid",
                })
            }
        }
    }

    fn with_grid<R>(&mut self, id: ElementId, f: impl FnOnce(&mut GridLayout) -> Result<R>) -> Result<R> {
        self.grid(id)?;
        match self.nodes.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Grid(grid)) => f(grid),
            _ => Err(LayoutError::StaleElement(id)),
        }
    }

    /// Put `child` into cell `(row, column)` of `grid`, growing the grid as needed.
    ///
    /// A child owned elsewhere is detached first.
    pub fn grid_add(&mut self, grid: ElementId, row: usize, column: usize, child: ElementId) -> Result<()> {
        self.check_attach(grid, child)?;
        if let Some(existing) = self.grid(grid)?.element(row, column) {
            if existing != child {
                tracing::warn!(row, column, "there is already an element in the cell");
                return Err(LayoutError::CellOccupied { row, column });
            }
        }
        self.detach(child);
        self.with_grid(grid, |g| g.place(row, column, child))?;
        self.adopt(grid, child);
        Ok(())
    }

    /// Put `child` into the next free cell of `grid` and return that cell.
    pub fn grid_add_auto(&mut self, grid: ElementId, child: ElementId) -> Result<(usize, usize)> {
        self.check_attach(grid, child)?;
        self.grid(grid)?;
        self.detach(child);
        let cell = self.with_grid(grid, |g| Ok(g.auto_place(child)))?;
        self.adopt(grid, child);
        Ok(cell)
    }

    /// Detach the element at `(row, column)` and return it.
    pub fn grid_take(&mut self, grid: ElementId, row: usize, column: usize) -> Result<Option<ElementId>> {
        let (rows, columns) = {
            let g = self.grid(grid)?;
            (g.row_count(), g.column_count())
        };
        if row >= rows || column >= columns {
            tracing::warn!(row, column, rows, columns, "cell out of range");
            return Err(LayoutError::CellOutOfRange {
                row,
                column,
                rows,
                columns,
            });
        }
        let taken = self.with_grid(grid, |g| Ok(g.take_cell(row, column)))?;
        if let Some(child) = taken {
            self.release(grid, &[child]);
        }
        Ok(taken)
    }

    pub fn grid_insert_row(&mut self, grid: ElementId, index: usize) -> Result<()> {
        self.with_grid(grid, |g| {
            g.insert_row(index);
            Ok(())
        })?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_insert_column(&mut self, grid: ElementId, index: usize) -> Result<()> {
        self.with_grid(grid, |g| {
            g.insert_column(index);
            Ok(())
        })?;
        self.notify(grid);
        Ok(())
    }

    /// Remove row `index`; its elements are detached, not destroyed, and returned.
    pub fn grid_remove_row(&mut self, grid: ElementId, index: usize) -> Result<Vec<ElementId>> {
        let removed = self.with_grid(grid, |g| g.remove_row(index))?;
        self.release(grid, &removed);
        self.notify(grid);
        Ok(removed)
    }

    /// Remove column `index`; its elements are detached, not destroyed, and returned.
    pub fn grid_remove_column(&mut self, grid: ElementId, index: usize) -> Result<Vec<ElementId>> {
        let removed = self.with_grid(grid, |g| g.remove_column(index))?;
        self.release(grid, &removed);
        self.notify(grid);
        Ok(removed)
    }

    pub fn grid_expand_to(&mut self, grid: ElementId, rows: usize, columns: usize) -> Result<()> {
        self.with_grid(grid, |g| {
            g.expand_to(rows, columns);
            Ok(())
        })?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_apply_settings(&mut self, grid: ElementId, settings: GridSettings) -> Result<()> {
        self.with_grid(grid, |g| {
            g.apply_settings(settings);
            Ok(())
        })?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_set_fill_order(&mut self, grid: ElementId, order: FillOrder, rearrange: bool) -> Result<()> {
        self.with_grid(grid, |g| {
            g.set_fill_order(order, rearrange);
            Ok(())
        })?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_set_row_stretch_factor(&mut self, grid: ElementId, row: usize, factor: f64) -> Result<()> {
        self.with_grid(grid, |g| g.set_row_stretch_factor(row, factor))?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_set_row_stretch_factors(&mut self, grid: ElementId, factors: &[f64]) -> Result<()> {
        self.with_grid(grid, |g| g.set_row_stretch_factors(factors))?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_set_column_stretch_factor(&mut self, grid: ElementId, column: usize, factor: f64) -> Result<()> {
        self.with_grid(grid, |g| g.set_column_stretch_factor(column, factor))?;
        self.notify(grid);
        Ok(())
    }

    pub fn grid_set_column_stretch_factors(&mut self, grid: ElementId, factors: &[f64]) -> Result<()> {
        self.with_grid(grid, |g| g.set_column_stretch_factors(factors))?;
        self.notify(grid);
        Ok(())
    }

    // =====================================================================
    // Inset containers
    // =====================================================================

    pub fn inset(&self, id: ElementId) -> Result<&InsetLayout> {
        match &self.node(id)?.kind {
            NodeKind::Inset(inset) => Ok(inset),
            NodeKind::Content(_) => {
                tracing::warn!(element = ?id, "element is not a layout container");
                Err(LayoutError::NotAContainer(id))
            }
            NodeKind::Grid(_) => {
                tracing::warn!(element = ?id, "element is not an inset layout");
                Err(LayoutError::WrongLayoutKind {
                    element: id,
                    expected: "inset",
                })
            }
        }
    }

    fn with_inset<R>(&mut self, id: ElementId, f: impl FnOnce(&mut InsetLayout) -> Result<R>) -> Result<R> {
        self.inset(id)?;
        match self.nodes.get_mut(id).map(|node| &mut node.kind) {
            Some(NodeKind::Inset(inset)) => f(inset),
            _ => Err(LayoutError::StaleElement(id)),
        }
    }

    /// Add `child` to `inset`, anchored at `alignment`.
    pub fn inset_add_aligned(&mut self, inset: ElementId, child: ElementId, alignment: InsetAlignment) -> Result<()> {
        self.check_attach(inset, child)?;
        self.inset(inset)?;
        self.detach(child);
        self.with_inset(inset, |i| {
            i.add_aligned(child, alignment);
            Ok(())
        })?;
        self.adopt(inset, child);
        Ok(())
    }

    /// Add `child` to `inset` at a fractional rect of the inset's inner rect.
    pub fn inset_add_free(&mut self, inset: ElementId, child: ElementId, rect: FractionalRect) -> Result<()> {
        self.check_attach(inset, child)?;
        self.inset(inset)?;
        self.detach(child);
        self.with_inset(inset, |i| {
            i.add_free(child, rect);
            Ok(())
        })?;
        self.adopt(inset, child);
        Ok(())
    }

    pub fn inset_set_placement(&mut self, inset: ElementId, index: usize, placement: InsetPlacement) -> Result<()> {
        self.with_inset(inset, |i| i.set_placement(index, placement))?;
        self.notify(inset);
        Ok(())
    }

    pub fn inset_set_alignment(&mut self, inset: ElementId, index: usize, alignment: InsetAlignment) -> Result<()> {
        self.with_inset(inset, |i| i.set_alignment(index, alignment))?;
        self.notify(inset);
        Ok(())
    }

    pub fn inset_set_rect(&mut self, inset: ElementId, index: usize, rect: FractionalRect) -> Result<()> {
        self.with_inset(inset, |i| i.set_rect(index, rect))?;
        self.notify(inset);
        Ok(())
    }

    // =====================================================================
    // Element configuration
    // =====================================================================

    fn with_element<R>(&mut self, id: ElementId, f: impl FnOnce(&mut LayoutElement) -> R) -> Result<R> {
        Ok(f(&mut self.node_mut(id)?.element))
    }

    /// Set margins directly. Automatic sides are overwritten by the next pass.
    pub fn set_margins(&mut self, id: ElementId, margins: Margins) -> Result<()> {
        let changed = self.with_element(id, |el| {
            let changed = el.margins() != margins;
            el.set_margins(margins);
            changed
        })?;
        self.notify_if(changed, id);
        Ok(())
    }

    pub fn set_minimum_margins(&mut self, id: ElementId, margins: Margins) -> Result<()> {
        let changed = self.with_element(id, |el| {
            let changed = el.minimum_margins() != margins;
            el.set_minimum_margins(margins);
            changed
        })?;
        self.notify_if(changed, id);
        Ok(())
    }

    pub fn set_auto_margins(&mut self, id: ElementId, sides: MarginSides) -> Result<()> {
        let changed = self.with_element(id, |el| {
            let changed = el.auto_margins() != sides;
            el.set_auto_margins(sides);
            changed
        })?;
        self.notify_if(changed, id);
        Ok(())
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        self.with_element(id, |el| el.set_visible(visible))
    }

    /// Replace the whole size constraint.
    pub fn set_size_constraint(&mut self, id: ElementId, constraint: SizeConstraint) -> Result<()> {
        if self.with_element(id, |el| el.set_size_constraint(constraint))? {
            self.size_constraints_changed(id)?;
        }
        Ok(())
    }

    /// Explicit minimum size; a zero component falls back to the size hint.
    pub fn set_minimum_size(&mut self, id: ElementId, size: Size) -> Result<()> {
        let constraint = SizeConstraint {
            minimum: size,
            ..self.node(id)?.element.size_constraint()
        };
        self.set_size_constraint(id, constraint)
    }

    /// Explicit maximum size; a `MAX_EXTENT` component falls back to the size hint.
    pub fn set_maximum_size(&mut self, id: ElementId, size: Size) -> Result<()> {
        let constraint = SizeConstraint {
            maximum: size,
            ..self.node(id)?.element.size_constraint()
        };
        self.set_size_constraint(id, constraint)
    }

    pub fn set_size_constraint_target(&mut self, id: ElementId, target: ConstraintTarget) -> Result<()> {
        let constraint = SizeConstraint {
            target,
            ..self.node(id)?.element.size_constraint()
        };
        self.set_size_constraint(id, constraint)
    }

    // =====================================================================
    // Margin groups
    // =====================================================================

    pub fn create_margin_group(&mut self) -> MarginGroupId {
        self.groups.insert(MarginGroup::new())
    }

    pub fn margin_group(&self, id: MarginGroupId) -> Option<&MarginGroup> {
        self.groups.get(id)
    }

    /// Destroy a group. Its members fall back to their own margin computation.
    pub fn remove_margin_group(&mut self, id: MarginGroupId) -> Result<()> {
        let mut group = self.groups.remove(id).ok_or_else(|| stale_group(id))?;
        let mut roots = Vec::new();
        for (side, element) in group.take_all() {
            if let Some(node) = self.nodes.get_mut(element) {
                node.element.set_margin_group(side, None);
                let root = self.root_of(element);
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
        for root in roots {
            self.notify(root);
        }
        Ok(())
    }

    /// Join `group` on every side in `sides`, or leave the current groups with `None`.
    ///
    /// Joining a side leaves whatever group the element had there before.
    pub fn set_margin_group(&mut self, id: ElementId, sides: MarginSides, group: Option<MarginGroupId>) -> Result<()> {
        self.node(id)?;
        if let Some(group) = group {
            if !self.groups.contains_key(group) {
                return Err(stale_group(group));
            }
        }
        for side in sides.sides() {
            let previous = self.nodes[id].element.margin_group(side);
            if previous == group {
                continue;
            }
            if let Some(old) = previous.and_then(|g| self.groups.get_mut(g)) {
                old.remove(side, id);
            }
            if let Some(new) = group.and_then(|g| self.groups.get_mut(g)) {
                new.add(side, id);
            }
            self.nodes[id].element.set_margin_group(side, group);
        }
        Ok(())
    }

    /// Margin shared by the members of `group` on `side`.
    pub fn common_margin(&self, group: MarginGroupId, side: MarginSide) -> Result<i32> {
        let group = self.groups.get(group).ok_or_else(|| stale_group(group))?;
        Ok(self.group_margin(group, side))
    }

    fn group_margin(&self, group: &MarginGroup, side: MarginSide) -> i32 {
        group.common_margin(side, |member| {
            let node = self.nodes.get(member)?;
            node.element.auto_margins().has(side).then(|| MarginRequest {
                automatic: node.auto_margin(side),
                minimum: node.element.minimum_margins().get(side),
            })
        })
    }

    // =====================================================================
    // Size hints
    // =====================================================================

    pub fn minimum_outer_size_hint(&self, id: ElementId) -> Result<Size> {
        Ok(self.minimum_hint(self.node(id)?))
    }

    pub fn maximum_outer_size_hint(&self, id: ElementId) -> Result<Size> {
        Ok(self.maximum_hint(self.node(id)?))
    }

    /// Final outer bounds a container uses for `id`.
    pub fn outer_bounds(&self, id: ElementId) -> Result<OuterBounds> {
        self.node(id)?;
        Ok(self.bounds_of(id))
    }

    fn bounds_of(&self, id: ElementId) -> OuterBounds {
        match self.nodes.get(id) {
            Some(node) => node.element.outer_bounds(self.minimum_hint(node), self.maximum_hint(node)),
            None => OuterBounds::UNBOUNDED,
        }
    }

    fn minimum_hint(&self, node: &Node) -> Size {
        match &node.kind {
            NodeKind::Content(content) => content.minimum_outer_size_hint(&node.element.geometry()),
            kind => kind
                .layout()
                .map(|layout| layout.minimum_content_size(&|child: ElementId| self.bounds_of(child)))
                .unwrap_or(Size::ZERO)
                .grow(node.element.margins()),
        }
    }

    fn maximum_hint(&self, node: &Node) -> Size {
        match &node.kind {
            NodeKind::Content(content) => content.maximum_outer_size_hint(&node.element.geometry()),
            kind => kind
                .layout()
                .map(|layout| layout.maximum_content_size(&|child: ElementId| self.bounds_of(child)))
                .unwrap_or(Size::MAX)
                .grow(node.element.margins()),
        }
    }

    // =====================================================================
    // Invalidation
    // =====================================================================

    /// Report that the intrinsic sizing of `id` changed outside a pass.
    ///
    /// The root of its tree is handed to the invalidation callback; during a
    /// pass the notification waits until the pass has finished.
    pub fn size_constraints_changed(&mut self, id: ElementId) -> Result<()> {
        self.node(id)?;
        self.notify(id);
        Ok(())
    }

    fn notify_if(&mut self, changed: bool, id: ElementId) {
        if changed {
            self.notify(id);
        }
    }

    fn notify(&mut self, id: ElementId) {
        let root = self.root_of(id);
        if self.updating {
            if !self.pending.contains(&root) {
                tracing::debug!(root = ?root, "invalidation during pass, deferring");
                self.pending.push(root);
            }
            return;
        }
        self.fire(root);
    }

    fn fire(&mut self, root: ElementId) {
        match self.on_invalidate.as_mut() {
            Some(callback) => callback(root),
            None => tracing::trace!(root = ?root, "layout invalidated, no callback registered"),
        }
    }

    // =====================================================================
    // Passes
    // =====================================================================

    /// Run a single phase over the subtree rooted at `root`.
    pub fn update(&mut self, root: ElementId, phase: UpdatePhase) -> Result<()> {
        self.run_phases(root, &[phase])
    }

    /// Give `root` the outer rect `rect` and run all three phases over it.
    pub fn relayout(&mut self, root: ElementId, rect: Rect) -> Result<()> {
        if self.updating {
            tracing::warn!(root = ?root, "layout pass requested while one is running");
            return Err(LayoutError::ReentrantUpdate);
        }
        self.node_mut(root)?.element.set_outer_rect(rect);
        self.run_phases(root, &UpdatePhase::ORDER)
    }

    fn run_phases(&mut self, root: ElementId, phases: &[UpdatePhase]) -> Result<()> {
        if self.updating {
            tracing::warn!(root = ?root, "layout pass requested while one is running");
            return Err(LayoutError::ReentrantUpdate);
        }
        self.node(root)?;

        self.updating = true;
        let mut requests = Vec::new();
        for &phase in phases {
            tracing::debug!(root = ?root, ?phase, "layout phase");
            let mut ctx = UpdateContext::new(phase);
            self.update_node(root, &mut ctx);
            requests.extend(ctx.take_requests());
        }
        self.updating = false;

        let mut roots = std::mem::take(&mut self.pending);
        for element in requests {
            let root = self.root_of(element);
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        for root in roots {
            self.fire(root);
        }
        Ok(())
    }

    fn update_node(&mut self, id: ElementId, ctx: &mut UpdateContext) {
        let previous = ctx.enter(id);
        let phase = ctx.phase();
        tracing::trace!(element = ?id, ?phase, depth = ctx.depth(), "update");

        match phase {
            UpdatePhase::Preparation => {}
            UpdatePhase::Margins => self.update_margins(id),
            UpdatePhase::Layout => self.layout_children(id),
        }

        let children = match self.nodes.get_mut(id) {
            Some(node) => {
                let geometry = node.element.geometry();
                match &mut node.kind {
                    NodeKind::Content(content) => {
                        content.update(phase, &geometry, ctx);
                        Vec::new()
                    }
                    kind => kind.layout().map(|layout| layout.elements()).unwrap_or_default(),
                }
            }
            None => Vec::new(),
        };
        for child in children {
            self.update_node(child, ctx);
        }
        ctx.exit(previous);
    }

    /// Resolve automatic margins: group margin if the side is grouped, the
    /// element's own request otherwise, floored by the minimum margin.
    fn update_margins(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get(id) else { return };
        let auto = node.element.auto_margins();
        if auto.is_empty() {
            return;
        }
        let minimum = node.element.minimum_margins();
        let mut margins = node.element.margins();
        for side in auto.sides() {
            let value = match node.element.margin_group(side).and_then(|g| self.groups.get(g)) {
                Some(group) => self.group_margin(group, side),
                None => node.auto_margin(side),
            };
            margins.set(side, value.max(minimum.get(side)));
        }
        if let Some(node) = self.nodes.get_mut(id) {
            node.element.set_margins(margins);
        }
    }

    /// Arrange the children of a container inside its inner rect.
    fn layout_children(&mut self, id: ElementId) {
        let Some(node) = self.nodes.get(id) else { return };
        let Some(layout) = node.kind.layout() else { return };
        let bounds = |child: ElementId| self.bounds_of(child);
        let placed = layout.arrange(node.element.inner_rect(), &bounds, self.settings.surplus_policy);
        for (child, rect) in placed {
            if let Some(node) = self.nodes.get_mut(child) {
                node.element.set_outer_rect(rect);
            }
        }
    }

    // =====================================================================
    // Hit-testing
    // =====================================================================

    /// Distance of `point` to element `id`, or `None` if it is not hit.
    ///
    /// Invisible elements are never hit. An inset container is only hit where
    /// one of its visible children is, so it never blocks what lies beneath.
    pub fn select_test(&self, id: ElementId, point: Point) -> Option<f64> {
        let node = self.nodes.get(id)?;
        if !node.element.is_visible() {
            return None;
        }
        let tolerance = self.settings.selection_tolerance;
        let geometry = node.element.geometry();
        let own_hit = || geometry.outer_rect.contains(point).then_some(tolerance * 0.99);
        match &node.kind {
            NodeKind::Content(content) => content.select_test(point, &geometry, tolerance),
            NodeKind::Grid(_) => own_hit(),
            NodeKind::Inset(inset) => {
                let child_hit = inset
                    .elements()
                    .into_iter()
                    .any(|child| self.select_test(child, point).is_some());
                if child_hit { own_hit() } else { None }
            }
        }
    }

    /// Deepest element under `point` in the subtree rooted at `root`.
    ///
    /// Later children win over earlier ones, matching draw order.
    pub fn element_at(&self, root: ElementId, point: Point) -> Option<ElementId> {
        self.select_test(root, point)?;
        self.children(root)
            .into_iter()
            .rev()
            .find_map(|child| self.element_at(child, point))
            .or(Some(root))
    }
}

// =========================================================================
// Tests
// =========================================================================
