//! GridLayout - rows and columns of elements.
//!
//! Cells hold optional element handles; the matrix is always rectangular.
//! Column widths and row heights come from running the section sizer once
//! per axis over the per-column and per-row bounds of the elements.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::primitives::{saturating_extent, Rect, Size, MAX_EXTENT};
use crate::settings::GridSettings;

use super::container::{BoundsLookup, Layout};
use super::sizer::{distribute_sections, Section, SurplusPolicy};
use super::ElementId;

/// Order in which auto-placement fills cells and linear indices walk the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FillOrder {
    /// Row-major: fill a row across its columns, then move to the next row.
    #[default]
    RowsFirst,
    /// Column-major: fill a column down its rows, then move to the next column.
    ColumnsFirst,
}

/// Per-axis bounds of a grid, computed from its elements.
#[derive(Debug, Clone, Default, PartialEq)]
struct AxisBounds {
    minimum: Vec<i32>,
    maximum: Vec<i32>,
}

/// A grid of optional elements with per-row and per-column stretch factors.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// `cells[row][column]`, every row has `column_stretch.len()` entries.
    cells: Vec<Vec<Option<ElementId>>>,
    column_stretch: Vec<f64>,
    row_stretch: Vec<f64>,
    row_spacing: i32,
    column_spacing: i32,
    wrap: usize,
    fill_order: FillOrder,
    surplus_policy: Option<SurplusPolicy>,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl GridLayout {
    /// An empty 0x0 grid with default settings.
    pub fn new() -> Self {
        Self::with_settings(GridSettings::default())
    }

    pub fn with_settings(settings: GridSettings) -> Self {
        let mut grid = Self {
            cells: Vec::new(),
            column_stretch: Vec::new(),
            row_stretch: Vec::new(),
            row_spacing: 0,
            column_spacing: 0,
            wrap: 0,
            fill_order: FillOrder::RowsFirst,
            surplus_policy: None,
        };
        grid.apply_settings(settings);
        grid
    }

    /// Current settings.
    pub fn settings(&self) -> GridSettings {
        GridSettings {
            row_spacing: self.row_spacing,
            column_spacing: self.column_spacing,
            wrap: self.wrap,
            fill_order: self.fill_order,
            surplus_policy: self.surplus_policy,
        }
    }

    /// Apply settings. The fill order changes without rearranging elements.
    pub fn apply_settings(&mut self, settings: GridSettings) {
        self.set_row_spacing(settings.row_spacing);
        self.set_column_spacing(settings.column_spacing);
        self.wrap = settings.wrap;
        self.fill_order = settings.fill_order;
        self.surplus_policy = settings.surplus_policy;
    }

    // =====================================================================
    // Structure
    // =====================================================================

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_stretch.len()
    }

    /// Element at `(row, column)`, `None` if the cell is empty or out of range.
    pub fn element(&self, row: usize, column: usize) -> Option<ElementId> {
        self.cells.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    pub fn has_element(&self, row: usize, column: usize) -> bool {
        self.element(row, column).is_some()
    }

    /// Position of `element` in the grid.
    pub fn position_of(&self, element: ElementId) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|cell| *cell == Some(element))
                .map(|column| (row, column))
        })
    }

    /// Grow the grid to at least `rows` x `columns` with empty cells.
    ///
    /// New rows and columns get a stretch factor of 1. Never shrinks.
    pub fn expand_to(&mut self, rows: usize, columns: usize) {
        while self.column_stretch.len() < columns {
            self.column_stretch.push(1.0);
        }
        let columns = self.column_stretch.len();
        for row in &mut self.cells {
            row.resize(columns, None);
        }
        while self.cells.len() < rows {
            self.cells.push(vec![None; columns]);
            self.row_stretch.push(1.0);
        }
    }

    /// Insert an empty row before `index`. Indices past the end append.
    pub fn insert_row(&mut self, index: usize) {
        if self.cells.is_empty() || self.column_count() == 0 {
            self.expand_to(1, 1);
            return;
        }
        let index = index.min(self.row_count());
        self.cells.insert(index, vec![None; self.column_count()]);
        self.row_stretch.insert(index, 1.0);
    }

    /// Insert an empty column before `index`. Indices past the end append.
    pub fn insert_column(&mut self, index: usize) {
        if self.cells.is_empty() || self.column_count() == 0 {
            self.expand_to(1, 1);
            return;
        }
        let index = index.min(self.column_count());
        for row in &mut self.cells {
            row.insert(index, None);
        }
        self.column_stretch.insert(index, 1.0);
    }

    /// Remove row `index` and return the elements it held.
    pub fn remove_row(&mut self, index: usize) -> Result<Vec<ElementId>> {
        if index >= self.row_count() {
            tracing::warn!(index, rows = self.row_count(), "invalid row index");
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.row_count(),
            });
        }
        let removed = self.cells.remove(index).into_iter().flatten().collect();
        self.row_stretch.remove(index);
        if self.cells.is_empty() {
            self.column_stretch.clear();
        }
        Ok(removed)
    }

    /// Remove column `index` and return the elements it held.
    pub fn remove_column(&mut self, index: usize) -> Result<Vec<ElementId>> {
        if index >= self.column_count() {
            tracing::warn!(index, columns = self.column_count(), "invalid column index");
            return Err(LayoutError::IndexOutOfRange {
                index,
                len: self.column_count(),
            });
        }
        let removed = self.cells.iter_mut().filter_map(|row| row.remove(index)).collect();
        self.column_stretch.remove(index);
        if self.column_stretch.is_empty() {
            self.cells.clear();
            self.row_stretch.clear();
        }
        Ok(removed)
    }

    // =====================================================================
    // Placement
    // =====================================================================

    /// Put `element` into `(row, column)`, growing the grid as needed.
    ///
    /// Fails if the cell is occupied. Detaching the element from a previous
    /// owner is the tree's job.
    pub fn place(&mut self, row: usize, column: usize, element: ElementId) -> Result<()> {
        if self.has_element(row, column) {
            tracing::warn!(row, column, "there is already an element in the cell");
            return Err(LayoutError::CellOccupied { row, column });
        }
        self.expand_to(row + 1, column + 1);
        self.cells[row][column] = Some(element);
        Ok(())
    }

    /// First free cell in fill order, wrapping after `wrap` cells per row
    /// (or column). May lie outside the current grid.
    pub fn next_free_cell(&self) -> (usize, usize) {
        let (mut row, mut column) = (0, 0);
        match self.fill_order {
            FillOrder::RowsFirst => {
                while self.has_element(row, column) {
                    column += 1;
                    if self.wrap > 0 && column >= self.wrap {
                        column = 0;
                        row += 1;
                    }
                }
            }
            FillOrder::ColumnsFirst => {
                while self.has_element(row, column) {
                    row += 1;
                    if self.wrap > 0 && row >= self.wrap {
                        row = 0;
                        column += 1;
                    }
                }
            }
        }
        (row, column)
    }

    /// Place `element` in the next free cell and return that cell.
    pub fn auto_place(&mut self, element: ElementId) -> (usize, usize) {
        let (row, column) = self.next_free_cell();
        self.expand_to(row + 1, column + 1);
        self.cells[row][column] = Some(element);
        (row, column)
    }

    /// Empty the cell at `(row, column)` and return its element.
    pub fn take_cell(&mut self, row: usize, column: usize) -> Option<ElementId> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(column)).and_then(Option::take)
    }

    // =====================================================================
    // Linear indexing
    // =====================================================================

    /// Linear index of `(row, column)` under the current fill order.
    pub fn row_col_to_index(&self, row: usize, column: usize) -> Option<usize> {
        if row >= self.row_count() || column >= self.column_count() {
            tracing::warn!(row, column, "row/column out of range for index mapping");
            return None;
        }
        Some(match self.fill_order {
            FillOrder::RowsFirst => row * self.column_count() + column,
            FillOrder::ColumnsFirst => column * self.row_count() + row,
        })
    }

    /// Cell at linear `index` under the current fill order.
    pub fn index_to_row_col(&self, index: usize) -> Option<(usize, usize)> {
        let rows = self.row_count();
        let columns = self.column_count();
        if index >= rows * columns {
            return None;
        }
        Some(match self.fill_order {
            FillOrder::RowsFirst => (index / columns, index % columns),
            FillOrder::ColumnsFirst => (index % rows, index / rows),
        })
    }

    // =====================================================================
    // Settings
    // =====================================================================

    pub fn column_stretch_factors(&self) -> &[f64] {
        &self.column_stretch
    }

    pub fn row_stretch_factors(&self) -> &[f64] {
        &self.row_stretch
    }

    pub fn set_column_stretch_factor(&mut self, column: usize, factor: f64) -> Result<()> {
        check_stretch(factor)?;
        let len = self.column_stretch.len();
        let slot = self.column_stretch.get_mut(column).ok_or_else(|| {
            tracing::warn!(column, "invalid column");
            LayoutError::IndexOutOfRange { index: column, len }
        })?;
        *slot = factor;
        Ok(())
    }

    pub fn set_column_stretch_factors(&mut self, factors: &[f64]) -> Result<()> {
        check_stretch_list(factors, self.column_stretch.len())?;
        self.column_stretch.copy_from_slice(factors);
        Ok(())
    }

    pub fn set_row_stretch_factor(&mut self, row: usize, factor: f64) -> Result<()> {
        check_stretch(factor)?;
        let len = self.row_stretch.len();
        let slot = self.row_stretch.get_mut(row).ok_or_else(|| {
            tracing::warn!(row, "invalid row");
            LayoutError::IndexOutOfRange { index: row, len }
        })?;
        *slot = factor;
        Ok(())
    }

    pub fn set_row_stretch_factors(&mut self, factors: &[f64]) -> Result<()> {
        check_stretch_list(factors, self.row_stretch.len())?;
        self.row_stretch.copy_from_slice(factors);
        Ok(())
    }

    pub fn row_spacing(&self) -> i32 {
        self.row_spacing
    }

    pub fn set_row_spacing(&mut self, pixels: i32) {
        self.row_spacing = pixels.max(0);
    }

    pub fn column_spacing(&self) -> i32 {
        self.column_spacing
    }

    pub fn set_column_spacing(&mut self, pixels: i32) {
        self.column_spacing = pixels.max(0);
    }

    pub fn wrap(&self) -> usize {
        self.wrap
    }

    /// Wrap auto-placement after `count` cells; 0 disables wrapping.
    pub fn set_wrap(&mut self, count: usize) {
        self.wrap = count;
    }

    pub fn fill_order(&self) -> FillOrder {
        self.fill_order
    }

    /// Change the fill order.
    ///
    /// With `rearrange`, every element is taken out in the old linear order,
    /// the grid is simplified, and the elements are auto-placed again under
    /// the new order (honoring the wrap count).
    pub fn set_fill_order(&mut self, order: FillOrder, rearrange: bool) {
        let elements = if rearrange {
            let elements = self.elements();
            for row in &mut self.cells {
                row.fill(None);
            }
            self.simplify();
            elements
        } else {
            Vec::new()
        };
        self.fill_order = order;
        for element in elements {
            self.auto_place(element);
        }
    }

    pub fn surplus_policy(&self) -> Option<SurplusPolicy> {
        self.surplus_policy
    }

    /// Override the tree-wide surplus policy for this grid (`None` inherits).
    pub fn set_surplus_policy(&mut self, policy: Option<SurplusPolicy>) {
        self.surplus_policy = policy;
    }

    // =====================================================================
    // Sizing
    // =====================================================================

    fn total_row_spacing(&self) -> i64 {
        self.row_count().saturating_sub(1) as i64 * self.row_spacing as i64
    }

    fn total_column_spacing(&self) -> i64 {
        self.column_count().saturating_sub(1) as i64 * self.column_spacing as i64
    }

    /// Per-column and per-row bounds: minima and maxima are max-reduced over
    /// the elements; an empty column or row is unconstrained.
    fn axis_bounds(&self, bounds: &BoundsLookup<'_>) -> (AxisBounds, AxisBounds) {
        let columns = self.column_count();
        let rows = self.row_count();
        let mut column_bounds = AxisBounds {
            minimum: vec![0; columns],
            maximum: vec![0; columns],
        };
        let mut row_bounds = AxisBounds {
            minimum: vec![0; rows],
            maximum: vec![0; rows],
        };
        let mut column_used = vec![false; columns];
        let mut row_used = vec![false; rows];

        for (row, cells) in self.cells.iter().enumerate() {
            for (column, cell) in cells.iter().enumerate() {
                let Some(element) = cell else { continue };
                let b = bounds(*element);
                column_bounds.minimum[column] = column_bounds.minimum[column].max(b.minimum.width);
                column_bounds.maximum[column] = column_bounds.maximum[column].max(b.maximum.width);
                row_bounds.minimum[row] = row_bounds.minimum[row].max(b.minimum.height);
                row_bounds.maximum[row] = row_bounds.maximum[row].max(b.maximum.height);
                column_used[column] = true;
                row_used[row] = true;
            }
        }

        for (axis, used) in [(&mut column_bounds, column_used), (&mut row_bounds, row_used)] {
            for (i, used) in used.into_iter().enumerate() {
                axis.maximum[i] = if used {
                    axis.maximum[i].max(axis.minimum[i])
                } else {
                    MAX_EXTENT
                };
            }
        }
        (column_bounds, row_bounds)
    }
}

fn check_stretch(factor: f64) -> Result<()> {
    if factor > 0.0 && factor.is_finite() {
        Ok(())
    } else {
        tracing::warn!(factor, "invalid stretch factor, must be positive");
        Err(LayoutError::InvalidStretchFactor(factor))
    }
}

fn check_stretch_list(factors: &[f64], expected: usize) -> Result<()> {
    if factors.len() != expected {
        tracing::warn!(expected, actual = factors.len(), "stretch factor count mismatch");
        return Err(LayoutError::LengthMismatch {
            expected,
            actual: factors.len(),
        });
    }
    factors.iter().try_for_each(|&f| check_stretch(f))
}

fn sections(bounds: &AxisBounds, stretch: &[f64]) -> Vec<Section> {
    bounds
        .minimum
        .iter()
        .zip(&bounds.maximum)
        .zip(stretch)
        .map(|((&min, &max), &factor)| Section::new(min, max, factor))
        .collect()
}

/// Space left for the sections of one axis once the gaps between them are taken.
fn space_after_spacing(extent: i32, spacing: i64) -> i32 {
    (extent as i64 - spacing).clamp(0, i32::MAX as i64) as i32
}

impl Layout for GridLayout {
    fn element_count(&self) -> usize {
        self.row_count() * self.column_count()
    }

    fn element_at(&self, index: usize) -> Option<ElementId> {
        let (row, column) = self.index_to_row_col(index)?;
        self.element(row, column)
    }

    fn take_at(&mut self, index: usize) -> Option<ElementId> {
        let (row, column) = self.index_to_row_col(index)?;
        self.take_cell(row, column)
    }

    fn take(&mut self, element: ElementId) -> bool {
        match self.position_of(element) {
            Some((row, column)) => self.take_cell(row, column).is_some(),
            None => false,
        }
    }

    fn arrange(&self, rect: Rect, bounds: &BoundsLookup<'_>, policy: SurplusPolicy) -> Vec<(ElementId, Rect)> {
        if self.element_count() == 0 {
            return Vec::new();
        }
        let policy = self.surplus_policy.unwrap_or(policy);
        let (column_bounds, row_bounds) = self.axis_bounds(bounds);

        let widths = distribute_sections(
            &sections(&column_bounds, &self.column_stretch),
            space_after_spacing(rect.width, self.total_column_spacing()),
            policy,
        );
        let heights = distribute_sections(
            &sections(&row_bounds, &self.row_stretch),
            space_after_spacing(rect.height, self.total_row_spacing()),
            policy,
        );
        if widths.len() != self.column_count() || heights.len() != self.row_count() {
            return Vec::new();
        }

        let mut placed = Vec::new();
        let mut y = rect.y;
        for (row, cells) in self.cells.iter().enumerate() {
            if row > 0 {
                y = y.saturating_add(heights[row - 1]).saturating_add(self.row_spacing);
            }
            let mut x = rect.x;
            for (column, cell) in cells.iter().enumerate() {
                if column > 0 {
                    x = x.saturating_add(widths[column - 1]).saturating_add(self.column_spacing);
                }
                if let Some(element) = cell {
                    placed.push((*element, Rect::new(x, y, widths[column], heights[row])));
                }
            }
        }
        placed
    }

    fn minimum_content_size(&self, bounds: &BoundsLookup<'_>) -> Size {
        let (columns, rows) = self.axis_bounds(bounds);
        let width: i64 = columns.minimum.iter().map(|&w| w as i64).sum::<i64>() + self.total_column_spacing();
        let height: i64 = rows.minimum.iter().map(|&h| h as i64).sum::<i64>() + self.total_row_spacing();
        Size::new(saturating_extent(width), saturating_extent(height))
    }

    fn maximum_content_size(&self, bounds: &BoundsLookup<'_>) -> Size {
        if self.element_count() == 0 {
            return Size::MAX;
        }
        let (columns, rows) = self.axis_bounds(bounds);
        let width: i64 = columns.maximum.iter().map(|&w| w as i64).sum::<i64>() + self.total_column_spacing();
        let height: i64 = rows.maximum.iter().map(|&h| h as i64).sum::<i64>() + self.total_row_spacing();
        Size::new(saturating_extent(width), saturating_extent(height))
    }

    /// Drop trailing rows and columns that hold no element.
    fn simplify(&mut self) {
        while self.cells.last().is_some_and(|row| row.iter().all(Option::is_none)) {
            self.cells.pop();
            self.row_stretch.pop();
        }
        if self.cells.is_empty() {
            self.column_stretch.clear();
            return;
        }
        while self.column_count() > 0 {
            let last = self.column_count() - 1;
            if self.cells.iter().any(|row| row[last].is_some()) {
                break;
            }
            for row in &mut self.cells {
                row.pop();
            }
            self.column_stretch.pop();
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::element::OuterBounds;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<ElementId> {
        let mut map: SlotMap<ElementId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn unbounded(_: ElementId) -> OuterBounds {
        OuterBounds::UNBOUNDED
    }

    fn bare_grid() -> GridLayout {
        GridLayout::with_settings(GridSettings {
            row_spacing: 0,
            column_spacing: 0,
            ..GridSettings::default()
        })
    }

    #[test]
    fn test_auto_place_rows_first_with_wrap() {
        let ids = ids(5);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        for id in &ids {
            grid.auto_place(*id);
        }
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.column_count(), 2);
        assert_eq!(grid.element(2, 0), Some(ids[4]));
        assert_eq!(grid.element(2, 1), None);
        assert_eq!(grid.element(0, 1), Some(ids[1]));
        assert_eq!(grid.element(1, 0), Some(ids[2]));
    }

    #[test]
    fn test_auto_place_columns_first_with_wrap() {
        let ids = ids(5);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        grid.set_fill_order(FillOrder::ColumnsFirst, false);
        for id in &ids {
            grid.auto_place(*id);
        }
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(grid.element(1, 0), Some(ids[1]));
        assert_eq!(grid.element(0, 2), Some(ids[4]));
    }

    #[test]
    fn test_auto_place_without_wrap_extends_first_row() {
        let ids = ids(4);
        let mut grid = GridLayout::new();
        for id in &ids {
            grid.auto_place(*id);
        }
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.column_count(), 4);
    }

    #[test]
    fn test_auto_place_fills_holes_first() {
        let ids = ids(3);
        let mut grid = GridLayout::new();
        grid.place(0, 1, ids[0]).unwrap();
        assert_eq!(grid.auto_place(ids[1]), (0, 0));
        assert_eq!(grid.auto_place(ids[2]), (0, 2));
    }

    #[test]
    fn test_place_into_occupied_cell_fails() {
        let ids = ids(2);
        let mut grid = GridLayout::new();
        grid.place(1, 2, ids[0]).unwrap();
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.column_count(), 3);
        assert_eq!(
            grid.place(1, 2, ids[1]),
            Err(LayoutError::CellOccupied { row: 1, column: 2 })
        );
        assert_eq!(grid.element(1, 2), Some(ids[0]));
    }

    #[test]
    fn test_index_mapping_follows_fill_order() {
        let mut grid = GridLayout::new();
        grid.expand_to(2, 3);
        assert_eq!(grid.row_col_to_index(1, 2), Some(5));
        assert_eq!(grid.index_to_row_col(4), Some((1, 1)));

        grid.set_fill_order(FillOrder::ColumnsFirst, false);
        assert_eq!(grid.row_col_to_index(1, 2), Some(5));
        assert_eq!(grid.row_col_to_index(0, 1), Some(2));
        assert_eq!(grid.index_to_row_col(3), Some((1, 1)));
        assert_eq!(grid.index_to_row_col(6), None);
        assert_eq!(grid.row_col_to_index(2, 0), None);

        for index in 0..grid.element_count() {
            let (row, column) = grid.index_to_row_col(index).unwrap();
            assert_eq!(grid.row_col_to_index(row, column), Some(index));
        }
    }

    #[test]
    fn test_take_at_uses_linear_index() {
        let ids = ids(4);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        for id in &ids {
            grid.auto_place(*id);
        }
        // Row-major: index 2 is (1, 0).
        assert_eq!(grid.take_at(2), Some(ids[2]));
        assert_eq!(grid.element(1, 0), None);
        assert_eq!(grid.take_at(2), None);
        assert!(grid.take(ids[3]));
        assert!(!grid.take(ids[3]));
        assert_eq!(grid.elements(), vec![ids[0], ids[1]]);
    }

    #[test]
    fn test_simplify_drops_trailing_empty_structure() {
        let ids = ids(1);
        let mut grid = GridLayout::new();
        grid.expand_to(4, 4);
        grid.place(1, 1, ids[0]).unwrap();
        grid.simplify();
        assert_eq!((grid.row_count(), grid.column_count()), (2, 2));
        assert_eq!(grid.element(1, 1), Some(ids[0]));
        assert_eq!(grid.row_stretch_factors().len(), 2);
        assert_eq!(grid.column_stretch_factors().len(), 2);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let ids = ids(3);
        let mut grid = GridLayout::new();
        grid.expand_to(5, 6);
        grid.place(0, 4, ids[0]).unwrap();
        grid.place(2, 0, ids[1]).unwrap();
        grid.place(3, 2, ids[2]).unwrap();
        grid.simplify();
        let once = grid.clone();
        grid.simplify();
        assert_eq!(grid, once);

        let mut empty = GridLayout::new();
        empty.expand_to(3, 3);
        empty.simplify();
        assert_eq!((empty.row_count(), empty.column_count()), (0, 0));
        empty.simplify();
        assert_eq!((empty.row_count(), empty.column_count()), (0, 0));
    }

    #[test]
    fn test_insert_then_remove_row_restores_cells() {
        let ids = ids(6);
        let mut grid = GridLayout::new();
        grid.set_wrap(3);
        for id in &ids {
            grid.auto_place(*id);
        }
        grid.set_row_stretch_factor(1, 2.5).unwrap();
        let before = grid.clone();

        for index in 0..=grid.row_count() {
            grid.insert_row(index);
            assert_eq!(grid.row_count(), 3);
            assert!(grid.remove_row(index).unwrap().is_empty());
            assert_eq!(grid, before);
        }
    }

    #[test]
    fn test_insert_then_remove_column_restores_cells() {
        let ids = ids(4);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        for id in &ids {
            grid.auto_place(*id);
        }
        let before = grid.clone();
        grid.insert_column(1);
        assert_eq!(grid.element(0, 2), Some(ids[1]));
        assert!(grid.remove_column(1).unwrap().is_empty());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_remove_row_returns_elements() {
        let ids = ids(4);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        for id in &ids {
            grid.auto_place(*id);
        }
        assert_eq!(grid.remove_row(0).unwrap(), vec![ids[0], ids[1]]);
        assert_eq!(grid.row_count(), 1);
        assert_eq!(grid.element(0, 0), Some(ids[2]));
        assert!(grid.remove_row(5).is_err());
    }

    #[test]
    fn test_insert_into_empty_grid_creates_cell() {
        let mut grid = GridLayout::new();
        grid.insert_row(3);
        assert_eq!((grid.row_count(), grid.column_count()), (1, 1));
    }

    #[test]
    fn test_stretch_factor_validation() {
        let mut grid = GridLayout::new();
        grid.expand_to(2, 2);
        assert_eq!(
            grid.set_column_stretch_factor(0, 0.0),
            Err(LayoutError::InvalidStretchFactor(0.0))
        );
        assert!(grid.set_column_stretch_factor(5, 1.0).is_err());
        assert!(grid.set_row_stretch_factors(&[1.0]).is_err());
        assert!(grid.set_row_stretch_factors(&[1.0, -1.0]).is_err());
        assert_eq!(grid.row_stretch_factors(), &[1.0, 1.0]);
        grid.set_row_stretch_factors(&[1.0, 3.0]).unwrap();
        assert_eq!(grid.row_stretch_factors(), &[1.0, 3.0]);
    }

    #[test]
    fn test_rearrange_on_fill_order_change() {
        let ids = ids(4);
        let mut grid = GridLayout::new();
        grid.set_wrap(2);
        for id in &ids {
            grid.auto_place(*id);
        }
        grid.set_fill_order(FillOrder::ColumnsFirst, true);
        // Same linear order, now column-major: 0,1 down column 0; 2,3 down column 1.
        assert_eq!(grid.element(0, 0), Some(ids[0]));
        assert_eq!(grid.element(1, 0), Some(ids[1]));
        assert_eq!(grid.element(0, 1), Some(ids[2]));
        assert_eq!(grid.element(1, 1), Some(ids[3]));
        assert_eq!(grid.elements(), ids);
    }

    #[test]
    fn test_arrange_with_stretch_and_spacing() {
        let ids = ids(2);
        let mut grid = GridLayout::new();
        grid.set_column_spacing(10);
        grid.place(0, 0, ids[0]).unwrap();
        grid.place(0, 1, ids[1]).unwrap();
        grid.set_column_stretch_factors(&[1.0, 2.0]).unwrap();

        let placed = grid.arrange(Rect::new(5, 7, 310, 100), &unbounded, SurplusPolicy::Distribute);
        assert_eq!(
            placed,
            vec![
                (ids[0], Rect::new(5, 7, 100, 100)),
                (ids[1], Rect::new(115, 7, 200, 100)),
            ]
        );
    }

    #[test]
    fn test_huge_spacing_saturates() {
        let ids = ids(4);
        let mut grid = bare_grid();
        grid.set_column_spacing(800_000_000);
        grid.set_row_spacing(i32::MAX);
        for (column, id) in ids.iter().enumerate() {
            grid.place(0, column, *id).unwrap();
        }

        let placed = grid.arrange(Rect::new(0, 0, 400, 100), &unbounded, SurplusPolicy::Leave);
        assert_eq!(placed.len(), 4);
        assert!(placed.iter().all(|(_, rect)| rect.width == 0 && rect.height == 100));
        assert_eq!(placed[1].1.x, 800_000_000);
        assert_eq!(placed[3].1.x, i32::MAX);
        assert_eq!(grid.minimum_content_size(&unbounded), Size::new(MAX_EXTENT, 0));
    }

    #[test]
    fn test_arrange_respects_element_minimum() {
        let ids = ids(3);
        let mut grid = bare_grid();
        grid.set_wrap(1);
        for id in &ids {
            grid.auto_place(*id);
        }
        let wide = ids[1];
        let bounds = move |id: ElementId| {
            if id == wide {
                OuterBounds {
                    minimum: Size::new(0, 70),
                    maximum: Size::MAX,
                }
            } else {
                OuterBounds::UNBOUNDED
            }
        };
        let placed = grid.arrange(Rect::new(0, 0, 50, 100), &bounds, SurplusPolicy::Distribute);
        let heights: Vec<i32> = placed.iter().map(|(_, r)| r.height).collect();
        assert_eq!(heights, vec![15, 70, 15]);
        let ys: Vec<i32> = placed.iter().map(|(_, r)| r.y).collect();
        assert_eq!(ys, vec![0, 15, 85]);
    }

    #[test]
    fn test_empty_column_still_takes_space() {
        let ids = ids(1);
        let mut grid = bare_grid();
        grid.place(0, 1, ids[0]).unwrap();
        let placed = grid.arrange(Rect::new(0, 0, 200, 50), &unbounded, SurplusPolicy::Distribute);
        assert_eq!(placed, vec![(ids[0], Rect::new(100, 0, 100, 50))]);
    }

    #[test]
    fn test_column_maximum_is_max_reduced() {
        let ids = ids(3);
        let mut grid = bare_grid();
        grid.place(0, 0, ids[0]).unwrap();
        grid.place(1, 0, ids[1]).unwrap();
        grid.place(0, 1, ids[2]).unwrap();
        let (narrow, wider) = (ids[0], ids[1]);
        let bounds = move |id: ElementId| {
            let max_width = if id == narrow {
                40
            } else if id == wider {
                60
            } else {
                MAX_EXTENT
            };
            OuterBounds {
                minimum: Size::ZERO,
                maximum: Size::new(max_width, MAX_EXTENT),
            }
        };
        let placed = grid.arrange(Rect::new(0, 0, 300, 100), &bounds, SurplusPolicy::Distribute);
        let first_column = placed.iter().find(|(id, _)| *id == narrow).unwrap().1;
        assert_eq!(first_column.width, 60);
        let second_column = placed.iter().find(|(id, _)| *id == ids[2]).unwrap().1;
        assert_eq!(second_column, Rect::new(60, 0, 240, 50));
    }

    #[test]
    fn test_content_size_hints() {
        let ids = ids(2);
        let mut grid = GridLayout::new();
        grid.place(0, 0, ids[0]).unwrap();
        grid.place(0, 1, ids[1]).unwrap();
        let bounds = |_: ElementId| OuterBounds {
            minimum: Size::new(30, 20),
            maximum: Size::new(100, 80),
        };
        assert_eq!(grid.minimum_content_size(&bounds), Size::new(65, 20));
        assert_eq!(grid.maximum_content_size(&bounds), Size::new(205, 80));
        assert_eq!(GridLayout::new().maximum_content_size(&bounds), Size::MAX);
    }

    #[test]
    fn test_settings_round_trip_through_grid() {
        let settings = GridSettings {
            row_spacing: 2,
            column_spacing: 3,
            wrap: 4,
            fill_order: FillOrder::ColumnsFirst,
            surplus_policy: Some(SurplusPolicy::Leave),
        };
        let grid = GridLayout::with_settings(settings);
        assert_eq!(grid.settings(), settings);
    }

    #[test]
    fn test_surplus_policy_override() {
        let ids = ids(1);
        let mut grid = bare_grid();
        grid.place(0, 0, ids[0]).unwrap();
        grid.set_surplus_policy(Some(SurplusPolicy::Leave));
        let bounds = |_: ElementId| OuterBounds {
            minimum: Size::ZERO,
            maximum: Size::new(50, 50),
        };
        let placed = grid.arrange(Rect::new(0, 0, 200, 200), &bounds, SurplusPolicy::Distribute);
        assert_eq!(placed, vec![(ids[0], Rect::new(0, 0, 50, 50))]);
    }
}
