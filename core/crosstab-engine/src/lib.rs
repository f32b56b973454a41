//! FILENAME: core/crosstab-engine/src/lib.rs
//! Cross table layout engine.
//!
//! Turns a flat fact table and a row/column drill configuration into a
//! fully populated grid for a cross-tabulated report: hierarchical headers,
//! optional header indentation ("alignment"), a corner block and a data
//! region resolved from the facts.
//!
//! Layers:
//! - `definition`: Serializable configuration and fact data (what the table IS)
//! - `tree`, `grid`: Shared forest and rectangular-grid helpers
//! - `builder`, `layout`, `align`, `cross`, `fill`: The layout passes
//! - `view`: Renderable output for the presentation layer (WHAT we display)
//! - `engine`: Composes the passes (HOW we calculate)

pub mod error;
pub mod definition;
pub mod tree;
pub mod grid;
pub mod view;
pub mod builder;
pub mod layout;
pub mod align;
pub mod cross;
pub mod fill;
pub mod engine;

pub use error::{LayoutError, Result};
pub use definition::*;
pub use tree::Tree;
pub use grid::Grid;
pub use view::*;
pub use builder::{build_tree, AllDimensionsValid, DimensionPolicy, IndicatorConstraints, LeafOrder, TreeBuilder};
pub use layout::tree_to_grid;
pub use align::apply_alignment;
pub use cross::assemble;
pub use fill::{fill, fill_with_report, FillReport, UnresolvedCell, UnresolvedReason};
pub use engine::{build_display_grid, CrossTabCalculator};
