//! FILENAME: core/crosstab-engine/src/cross.rs
//! Cross Assembler - tiles the row and column header grids into one table.
//!
//! ```text
//!            leftCols        topCols
//!         +-------------+-----------------+
//! topRows | cross area  | column headers  |
//!         +-------------+-----------------+
//! leftRows| row headers | data region     |
//!         +-------------+-----------------+
//! ```
//!
//! The column header grid arrives with one row per leaf and is transposed
//! before tiling. Both arenas are merged into one; the column grid's ids are
//! shifted past the row grid's slots.

use log::debug;

use crate::grid::Grid;
use crate::view::{Cell, CellId, DimensionNodeValue, DisplayGrid};

/// Builds the full table from a row header grid and a column header grid.
/// An empty input collapses its quadrant to zero width or height.
pub fn assemble<T: Clone, U>(left: DisplayGrid<T, U>, head: DisplayGrid<T, U>) -> DisplayGrid<T, U> {
    let (mut arena, left) = left.into_parts();
    let (head_arena, head) = head.into_parts();

    let offset = arena.len();
    let shift = |id: CellId| DisplayGrid::<T, U>::shifted(id, offset);
    arena.extend(head_arena.into_iter().map(|cell| match cell {
        Cell::Aligned { dimension, parent } => Cell::Aligned {
            dimension,
            parent: parent.map(shift),
        },
        other => other,
    }));
    let top = head.map(|id, _, _| shift(*id)).transpose();

    let left_rows = left.row_count();
    let left_cols = left.col_count();
    let top_rows = top.row_count();
    let top_cols = top.col_count();

    debug!(
        target: "crosstab",
        "assembling: left {}x{}, top {}x{} -> {}x{}",
        left_rows,
        left_cols,
        top_rows,
        top_cols,
        top_rows + left_rows,
        left_cols + top_cols
    );

    let mut corner = Vec::with_capacity(top_rows * left_cols);
    for row in 0..top_rows {
        for col in 0..left_cols {
            let column_meta = distinct_nodes(&arena, left.column_below(row, col));
            let row_meta = distinct_nodes(&arena, top.row_to_right(row, col));
            corner.push(Cell::CrossArea {
                column_meta,
                row_meta,
            });
        }
    }
    let mut corner_ids = corner
        .into_iter()
        .map(|cell| DisplayGrid::alloc(&mut arena, cell))
        .collect::<Vec<_>>()
        .into_iter();

    let rows = top_rows + left_rows;
    let cols = left_cols + top_cols;
    let mut data_ids = Vec::with_capacity(left_rows * top_cols);
    for _ in 0..left_rows * top_cols {
        data_ids.push(DisplayGrid::alloc(&mut arena, Cell::unresolved()));
    }
    let mut data_ids = data_ids.into_iter();

    let mut layout_rows = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut cells = Vec::with_capacity(cols);
        for col in 0..cols {
            let id = match (row < top_rows, col < left_cols) {
                (true, true) => corner_ids.next(),
                (true, false) => top.get(row, col - left_cols).copied(),
                (false, true) => left.get(row - top_rows, col).copied(),
                (false, false) => data_ids.next(),
            };
            if let Some(id) = id {
                cells.push(id);
            }
        }
        layout_rows.push(cells);
    }

    DisplayGrid::from_parts(arena, Grid::from_rows(layout_rows, cols))
}

/// Header nodes among `ids`, keeping the first of each kind and meta.
fn distinct_nodes<'a, T: Clone, U>(
    arena: &[Cell<T, U>],
    ids: impl IntoIterator<Item = &'a CellId>,
) -> Vec<DimensionNodeValue<T>> {
    let mut nodes: Vec<DimensionNodeValue<T>> = Vec::new();
    for id in ids {
        if let Some(node) = arena[id.index()].node() {
            if !nodes.iter().any(|seen| seen.same_kind_and_meta(node)) {
                nodes.push(node.clone());
            }
        }
    }
    nodes
}
