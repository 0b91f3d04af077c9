//! Layout error types.
//!
//! Every error is also reported through `tracing::warn!` where it is raised;
//! the operation that failed leaves the tree untouched.

use thiserror::Error;

use crate::layout::{ElementId, MarginGroupId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    #[error("element handle is stale or was never issued: {0:?}")]
    StaleElement(ElementId),

    #[error("margin group handle is stale or was never issued: {0:?}")]
    StaleMarginGroup(MarginGroupId),

    #[error("element {0:?} is not a layout container")]
    NotAContainer(ElementId),

    #[error("element {0:?} is a layout container, not content")]
    NotContent(ElementId),

    #[error("element {element:?} is not a {expected} layout")]
    WrongLayoutKind {
        element: ElementId,
        expected: &'static str,
    },

    #[error("cell ({row}, {column}) is outside a {rows}x{columns} grid")]
    CellOutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("cell ({row}, {column}) already holds an element")]
    CellOccupied { row: usize, column: usize },

    #[error("index {index} out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("stretch factor must be positive, got {0}")]
    InvalidStretchFactor(f64),

    #[error("expected {expected} entries, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("placing {child:?} into {parent:?} would make it its own ancestor")]
    WouldCreateCycle { parent: ElementId, child: ElementId },

    #[error("a layout pass is already running")]
    ReentrantUpdate,
}

pub type Result<T> = std::result::Result<T, LayoutError>;
