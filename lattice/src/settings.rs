//! Configuration for layout trees and grids.
//!
//! Both settings structs deserialize with `#[serde(default)]`, so a host can
//! keep a partial document (JSON, TOML, ...) and load it on top of defaults.

use serde::{Deserialize, Serialize};

use crate::layout::grid::FillOrder;
use crate::layout::sizer::SurplusPolicy;

/// Default distance reported by a successful element hit-test is
/// `selection_tolerance * 0.99`.
pub const DEFAULT_SELECTION_TOLERANCE: f64 = 8.0;

/// Tree-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Pixel tolerance used when reporting element hits.
    pub selection_tolerance: f64,
    /// What the section sizer does with space beyond every section's maximum.
    pub surplus_policy: SurplusPolicy,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            selection_tolerance: DEFAULT_SELECTION_TOLERANCE,
            surplus_policy: SurplusPolicy::Leave,
        }
    }
}

/// Settings of a single grid layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Gap between adjacent rows in pixels.
    pub row_spacing: i32,
    /// Gap between adjacent columns in pixels.
    pub column_spacing: i32,
    /// Auto-placement wraps after this many cells; 0 disables wrapping.
    pub wrap: usize,
    pub fill_order: FillOrder,
    /// Overrides the tree-wide surplus policy for this grid.
    pub surplus_policy: Option<SurplusPolicy>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            row_spacing: 5,
            column_spacing: 5,
            wrap: 0,
            fill_order: FillOrder::RowsFirst,
            surplus_policy: None,
        }
    }
}
