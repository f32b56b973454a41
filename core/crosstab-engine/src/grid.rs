//! FILENAME: core/crosstab-engine/src/grid.rs
//! PURPOSE: Dense, rectangular two-dimensional storage.
//! CONTEXT: Header grids and the assembled display grid are small and fully
//! populated, so rows are stored densely. The column count is tracked
//! separately so that a grid with zero rows still knows its width.

use std::ops::Range;
use serde::{Deserialize, Serialize};

/// A rectangular table of `T`. Row and column indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T> {
    rows: Vec<Vec<T>>,
    col_count: usize,
}

impl<T> Grid<T> {
    /// Creates a grid with no rows and the given width.
    pub fn empty(col_count: usize) -> Self {
        Grid {
            rows: Vec::new(),
            col_count,
        }
    }

    /// Creates a `row_count` x `col_count` grid, filling cells row by row.
    pub fn from_fn<F>(row_count: usize, col_count: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> T,
    {
        let rows = (0..row_count)
            .map(|row| (0..col_count).map(|col| f(row, col)).collect())
            .collect();
        Grid { rows, col_count }
    }

    /// Wraps pre-built rows. Every row must be `col_count` long.
    pub fn from_rows(rows: Vec<Vec<T>>, col_count: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == col_count));
        Grid { rows, col_count }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.col_count == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Replaces the value at (row, col). Out-of-range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            *slot = value;
        }
    }

    pub fn row(&self, row: usize) -> &[T] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn into_rows(self) -> Vec<Vec<T>> {
        self.rows
    }

    /// Visits every cell in row-major order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T, usize, usize),
    {
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                f(cell, row_idx, col_idx);
            }
        }
    }

    pub fn map<R, F>(&self, mut f: F) -> Grid<R>
    where
        F: FnMut(&T, usize, usize) -> R,
    {
        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(row_idx, row)| {
                row.iter()
                    .enumerate()
                    .map(|(col_idx, cell)| f(cell, row_idx, col_idx))
                    .collect()
            })
            .collect();
        Grid {
            rows,
            col_count: self.col_count,
        }
    }

    /// Cells of `row` strictly left of `col`.
    pub fn row_to_left(&self, row: usize, col: usize) -> &[T] {
        let cells = self.row(row);
        &cells[..col.min(cells.len())]
    }

    /// Cells of `row` from `col` (inclusive) to the right edge.
    pub fn row_to_right(&self, row: usize, col: usize) -> &[T] {
        let cells = self.row(row);
        &cells[col.min(cells.len())..]
    }

    /// Cells of `col` strictly above `row`, top to bottom.
    pub fn column_above(&self, row: usize, col: usize) -> impl Iterator<Item = &T> {
        self.rows[..row.min(self.rows.len())]
            .iter()
            .filter_map(move |r| r.get(col))
    }

    /// Cells of `col` from `row` (inclusive) to the bottom edge.
    pub fn column_below(&self, row: usize, col: usize) -> impl Iterator<Item = &T> {
        self.rows[row.min(self.rows.len())..]
            .iter()
            .filter_map(move |r| r.get(col))
    }

    /// Splits the rows into maximal runs of adjacent rows for which
    /// `same(previous, next)` holds. Every row belongs to exactly one run.
    pub fn adjacent_row_runs<F>(&self, mut same: F) -> Vec<Range<usize>>
    where
        F: FnMut(&[T], &[T]) -> bool,
    {
        let mut runs = Vec::new();
        let mut start = 0;
        for idx in 1..=self.rows.len() {
            let run_ends = idx == self.rows.len() || !same(&self.rows[idx - 1], &self.rows[idx]);
            if run_ends {
                runs.push(start..idx);
                start = idx;
            }
        }
        runs
    }
}

impl<T: Clone> Grid<T> {
    /// Swaps rows and columns.
    pub fn transpose(&self) -> Grid<T> {
        let rows = (0..self.col_count)
            .map(|col| self.rows.iter().map(|r| r[col].clone()).collect())
            .collect();
        Grid {
            rows,
            col_count: self.rows.len(),
        }
    }

    /// Returns a copy of the grid with column `col` removed.
    pub fn without_column(&self, col: usize) -> Grid<T> {
        if col >= self.col_count {
            return self.clone();
        }
        let rows = self
            .rows
            .iter()
            .map(|r| {
                r.iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != col)
                    .map(|(_, cell)| cell.clone())
                    .collect()
            })
            .collect();
        Grid {
            rows,
            col_count: self.col_count - 1,
        }
    }

    /// Keeps only the first row of every run found by `adjacent_row_runs`.
    pub fn collapse_adjacent_rows<F>(&self, same: F) -> Grid<T>
    where
        F: FnMut(&[T], &[T]) -> bool,
    {
        let rows = self
            .adjacent_row_runs(same)
            .into_iter()
            .map(|run| self.rows[run.start].clone())
            .collect();
        Grid {
            rows,
            col_count: self.col_count,
        }
    }
}
