//! FILENAME: core/crosstab-engine/src/layout.rs
//! Tree-to-Grid Converter - projects a value tree onto a header grid.
//!
//! The grid has one row per leaf and one column per tree level. Row `r`,
//! column `c` shows the level-`c` node on the branch that owns leaf `r`.
//! Positions below the end of a shallow branch hold an unresolved indicator
//! slot. Repeated ancestors are written out on every row they cover;
//! merging is left to the renderer (see `DisplayGrid::merge_regions`).

use log::debug;

use crate::grid::Grid;
use crate::tree::{forest_depth, forest_leaf_paths};
use crate::view::{Cell, DisplayGrid, ValueTree};

/// Converts `forest` into a `leaves x depth` header grid. Every position
/// gets its own arena slot.
pub fn tree_to_grid<T: Clone, U>(forest: &[ValueTree<T>]) -> DisplayGrid<T, U> {
    let paths = forest_leaf_paths(forest);
    let rows = paths.len();
    let cols = forest_depth(forest);

    let mut arena = Vec::with_capacity(rows * cols);
    let layout = Grid::from_fn(rows, cols, |row, col| {
        let cell = match paths[row].get(col) {
            Some(node) => Cell::Dimension {
                dimension: node.value.clone(),
            },
            None => Cell::unresolved(),
        };
        DisplayGrid::alloc(&mut arena, cell)
    });

    debug!(target: "crosstab", "header grid: {} rows x {} cols", rows, cols);
    DisplayGrid::from_parts(arena, layout)
}
