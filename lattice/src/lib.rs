//! Lattice: Layout Engine for Chart Canvases
//!
//! Lattice arranges the pieces of a plotting canvas (axis rects, legends,
//! titles, colour scales) the way a retained-mode chart widget does:
//! - Grids with per-row and per-column stretch factors
//! - Free or border-anchored insets that float over other content
//! - Automatic margins sized from content, shared across margin groups
//! - A three-phase update pass driven by the host's render loop
//!
//! # Usage
//!
//! ```
//! use lattice::{FrameElement, GridSettings, LayoutTree, Rect};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.insert_grid(GridSettings::default());
//! let plot = tree.insert_content(FrameElement::new());
//! tree.grid_add(root, 0, 0, plot).unwrap();
//! tree.relayout(root, Rect::new(0, 0, 640, 480)).unwrap();
//!
//! assert_eq!(tree.element(plot).unwrap().outer_rect(), Rect::new(0, 0, 640, 480));
//! ```

// Core primitives
pub mod primitives;
pub mod error;
pub mod settings;

// Layout system
pub mod layout;

// Re-export core types
pub use error::{LayoutError, Result};
pub use layout::{
    ConstraintTarget, ElementContent, ElementGeometry, ElementId, FillOrder, FrameElement, GridLayout,
    InsetAlignment, InsetLayout, InsetPlacement, Layout, LayoutElement, LayoutTree, MarginGroup, MarginGroupId,
    SizeConstraint, SurplusPolicy, TextElement, UpdateContext, UpdatePhase,
};
pub use primitives::{FractionalRect, MarginSide, MarginSides, Margins, Point, Rect, Size, MAX_EXTENT};
pub use settings::{GridSettings, LayoutSettings};
