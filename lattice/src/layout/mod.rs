//! Layout System for Lattice
//!
//! Retained-mode layout for chart canvases: a tree of elements owned by a
//! `LayoutTree`, arranged by grid and inset containers, with stretch factors
//! and margin groups keeping neighbouring plots aligned.
//!
//! # Architecture
//!
//! ```text
//! host sets root rect -> Preparation -> Margins -> Layout -> host reads inner rects
//! ```
//!
//! Containers never see each other's internals; space is negotiated through
//! minimum/maximum outer sizes and distributed by the section sizer.

use slotmap::new_key_type;

new_key_type! {
    /// Generation-checked handle to an element in a `LayoutTree`.
    pub struct ElementId;

    /// Handle to a margin group in a `LayoutTree`.
    pub struct MarginGroupId;
}

pub mod sizer;
pub mod context;
pub mod element;
pub mod margin_group;
pub mod container;
pub mod grid;
pub mod inset;
pub mod elements;
pub mod tree;

// Re-export core types
pub use container::{BoundsLookup, Layout};
pub use context::UpdateContext;
pub use element::{
    ConstraintTarget, ElementContent, ElementGeometry, LayoutElement, OuterBounds, SizeConstraint, UpdatePhase,
};
pub use elements::{FrameElement, TextElement, CHAR_WIDTH, LINE_HEIGHT};
pub use grid::{FillOrder, GridLayout};
pub use inset::{InsetAlignment, InsetLayout, InsetPlacement};
pub use margin_group::{MarginGroup, MarginRequest};
pub use sizer::{distribute_sections, section_sizes, Section, SurplusPolicy};
pub use tree::{InvalidationCallback, LayoutTree};
