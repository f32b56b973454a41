//! FILENAME: core/crosstab-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Indicator insertion index {index} is out of range for {len} dimensions")]
    IndicatorIndexOutOfRange { index: usize, len: usize },

    #[error("Dimension '{dimension}' does not align to parent but follows an aligned dimension")]
    AlignmentNotTrailing { dimension: String },

    #[error("Indicator item declares no members")]
    EmptyIndicator,

    #[error("Exactly one axis must carry the indicator, found {count}")]
    IndicatorPlacement { count: usize },

    #[error("Cell id {index} is outside an arena of {len} cells")]
    CellOutOfArena { index: usize, len: usize },

    #[error("Grid row {row} has {len} cells, expected {expected}")]
    RaggedGrid { row: usize, len: usize, expected: usize },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
