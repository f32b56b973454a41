//! FILENAME: core/crosstab-engine/src/align.rs
//! Alignment Transformer - folds aligned dimension columns into their parent.
//!
//! An aligned dimension gives up its own header column. Its values are
//! listed as extra rows under the parent column, each directly below the
//! row of the parent value it belongs to:
//!
//! ```text
//! North | Fruit | Apples          North
//! North | Fruit | Pears    ==>    Fruit
//! North | Veg   | Leeks            Apples
//!                                  Pears
//!                                  Veg
//!                                  Leeks
//! ```
//!
//! Each folded value becomes an `Aligned` cell pointing at the parent cell
//! it is listed under. Columns are folded rightmost first, so deeper values
//! keep pointing at a slot that is itself folded afterwards; the chain to
//! the outermost unaligned ancestor stays intact.

use log::{debug, trace};

use crate::definition::{AxisConfig, DimensionMeta};
use crate::grid::Grid;
use crate::view::{Cell, CellId, DisplayGrid};

/// Folds every aligned dimension of `axis` into its parent column.
///
/// Applying the pass twice gives the same grid: a dimension already folded
/// has no header column left to find.
pub fn apply_alignment<T, U>(grid: DisplayGrid<T, U>, axis: &AxisConfig) -> DisplayGrid<T, U>
where
    T: Clone + PartialEq,
{
    axis.aligned_dimensions()
        .rev()
        .fold(grid, |grid, meta| align_column(grid, meta))
}

fn align_column<T, U>(grid: DisplayGrid<T, U>, meta: &DimensionMeta) -> DisplayGrid<T, U>
where
    T: Clone + PartialEq,
{
    let col = match grid.find_dimension_column(meta) {
        Some(0) => return align_root_column(grid, meta),
        Some(col) => col,
        None => {
            trace!(target: "crosstab", "no header column to align for '{}'", meta.code);
            return grid;
        }
    };

    let trimmed = grid.layout().without_column(col);
    let runs = trimmed.adjacent_row_runs(|a, b| (0..col).all(|c| grid.same_header(a[c], b[c])));

    let mut rows: Vec<Vec<CellId>> = Vec::with_capacity(grid.row_count() * 2);
    let mut folded: Vec<(CellId, CellId)> = Vec::new();

    for run in runs {
        let head = trimmed.row(run.start);
        let parent = head[col - 1];

        // Rows that differ right of the folded column keep a head row each.
        let mut heads: Vec<&[CellId]> = Vec::new();
        for row in run.clone() {
            let candidate = trimmed.row(row);
            if !heads.iter().any(|h| same_row(&grid, h, candidate)) {
                heads.push(candidate);
            }
        }
        rows.extend(heads.iter().map(|h| h.to_vec()));

        let mut last = None;
        for row in run {
            let original = grid.layout().row(row);
            let id = original[col];
            match grid.cell(id) {
                Cell::Dimension { .. } => folded.push((id, parent)),
                Cell::Aligned { .. } => {}
                _ => continue,
            }
            if last == Some(id) {
                continue;
            }
            last = Some(id);

            let mut aligned_row = Vec::with_capacity(trimmed.col_count());
            aligned_row.extend_from_slice(&head[..col - 1]);
            aligned_row.push(id);
            aligned_row.extend_from_slice(&original[col + 1..]);
            rows.push(aligned_row);
        }
    }

    debug!(
        target: "crosstab",
        "aligned '{}' from column {}: {} rows -> {} rows",
        meta.code,
        col,
        grid.row_count(),
        rows.len()
    );

    let col_count = trimmed.col_count();
    let (mut arena, _) = grid.into_parts();
    for (id, parent) in folded {
        to_aligned(&mut arena, id, Some(parent));
    }

    DisplayGrid::from_parts(arena, Grid::from_rows(rows, col_count))
}

/// An aligned dimension in the first column has nothing to fold into: its
/// cells stay in place as aligned cells without a parent.
fn align_root_column<T, U>(grid: DisplayGrid<T, U>, meta: &DimensionMeta) -> DisplayGrid<T, U> {
    let ids: Vec<CellId> = grid
        .layout()
        .rows()
        .filter_map(|row| row.first().copied())
        .filter(|&id| match grid.cell(id) {
            Cell::Dimension { dimension } => dimension.dimension_meta() == Some(meta),
            _ => false,
        })
        .collect();
    debug!(
        target: "crosstab",
        "aligned '{}' in place: {} root cells",
        meta.code,
        ids.len()
    );

    let (mut arena, layout) = grid.into_parts();
    for id in ids {
        to_aligned(&mut arena, id, None);
    }
    DisplayGrid::from_parts(arena, layout)
}

fn to_aligned<T, U>(arena: &mut [Cell<T, U>], id: CellId, parent: Option<CellId>) {
    let slot = &mut arena[id.index()];
    let cell = std::mem::replace(slot, Cell::unresolved());
    *slot = match cell {
        Cell::Dimension { dimension } => Cell::Aligned { dimension, parent },
        other => other,
    };
}

fn same_row<T: PartialEq, U>(grid: &DisplayGrid<T, U>, a: &[CellId], b: &[CellId]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| grid.same_header(x, y))
}
