//! FILENAME: core/crosstab-engine/src/view.rs
//! Cross Table View - Renderable output for the presentation layer.
//!
//! A `DisplayGrid` is an arena of `Cell`s plus a `Grid<CellId>` layout that
//! places arena slots on the table. Aligned cells point at their parent by
//! `CellId`, so the chain stays valid while the alignment pass rebuilds the
//! layout: slots are never removed, only dropped from the layout.
//!
//! Besides the cells themselves the view answers the questions a renderer
//! asks: how deep an aligned cell is indented, which filters it stands for,
//! and which header runs can be merged.

use std::fmt::Display;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::definition::{DimensionMeta, DimensionValue, IndicatorMember, IndicatorValue};
use crate::error::LayoutError;
use crate::grid::Grid;
use crate::tree::Tree;

// ============================================================================
// TREE NODE VALUES
// ============================================================================

/// The value carried by one node of a drill-path value tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DimensionNodeValue<T = String> {
    /// A concrete dimension value; acts as a filter on the fact table.
    Filter(DimensionValue<T>),
    /// An indicator standing in as a pseudo-dimension member.
    IndicatorProxy(IndicatorMember),
    /// A dimension that means nothing under the active indicator.
    Placeholder(DimensionMeta),
}

impl<T> DimensionNodeValue<T> {
    /// The dimension this node belongs to. Indicator proxies have none.
    pub fn dimension_meta(&self) -> Option<&DimensionMeta> {
        match self {
            DimensionNodeValue::Filter(value) => Some(&value.meta),
            DimensionNodeValue::Placeholder(meta) => Some(meta),
            DimensionNodeValue::IndicatorProxy(_) => None,
        }
    }

    pub fn as_filter(&self) -> Option<&DimensionValue<T>> {
        match self {
            DimensionNodeValue::Filter(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_indicator(&self) -> Option<&IndicatorMember> {
        match self {
            DimensionNodeValue::IndicatorProxy(member) => Some(member),
            _ => None,
        }
    }

    /// Same node kind and same meta code, regardless of value.
    pub fn same_kind_and_meta(&self, other: &Self) -> bool {
        match (self, other) {
            (DimensionNodeValue::Filter(a), DimensionNodeValue::Filter(b)) => a.meta == b.meta,
            (DimensionNodeValue::IndicatorProxy(a), DimensionNodeValue::IndicatorProxy(b)) => {
                a.meta == b.meta
            }
            (DimensionNodeValue::Placeholder(a), DimensionNodeValue::Placeholder(b)) => a == b,
            _ => false,
        }
    }
}

impl<T: Display> DimensionNodeValue<T> {
    pub fn label(&self) -> String {
        match self {
            DimensionNodeValue::Filter(value) => value.value.to_string(),
            DimensionNodeValue::IndicatorProxy(member) => member.meta.name.clone(),
            DimensionNodeValue::Placeholder(meta) => meta.name.clone(),
        }
    }
}

/// A rooted value tree produced by expanding one drill path.
pub type ValueTree<T = String> = Tree<DimensionNodeValue<T>>;

// ============================================================================
// CELLS
// ============================================================================

/// Index of a cell in its grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(usize);

impl CellId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Data slot state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum IndicatorSlot<U = f64> {
    /// Not filled yet, or no fact matched.
    Unresolved,
    Resolved(IndicatorValue<U>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Cell<T = String, U = f64> {
    /// A header cell showing one tree node.
    Dimension { dimension: DimensionNodeValue<T> },
    /// A header cell folded into its parent's column. `parent` points at the
    /// exact cell this one is indented under; it is not an ownership edge.
    Aligned {
        dimension: DimensionNodeValue<T>,
        parent: Option<CellId>,
    },
    /// A data slot, or a header position past the end of a shallow branch.
    Indicator { indicator: IndicatorSlot<U> },
    /// Corner cell where the row and column headers meet.
    CrossArea {
        column_meta: Vec<DimensionNodeValue<T>>,
        row_meta: Vec<DimensionNodeValue<T>>,
    },
}

impl<T, U> Cell<T, U> {
    pub fn unresolved() -> Self {
        Cell::Indicator {
            indicator: IndicatorSlot::Unresolved,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            Cell::Indicator {
                indicator: IndicatorSlot::Unresolved
            }
        )
    }

    /// The tree node shown by a header cell.
    pub fn node(&self) -> Option<&DimensionNodeValue<T>> {
        match self {
            Cell::Dimension { dimension } | Cell::Aligned { dimension, .. } => Some(dimension),
            _ => None,
        }
    }

    pub fn resolved(&self) -> Option<&IndicatorValue<U>> {
        match self {
            Cell::Indicator {
                indicator: IndicatorSlot::Resolved(value),
            } => Some(value),
            _ => None,
        }
    }
}

impl<T: Display, U: Display> Cell<T, U> {
    /// Plain-text projection of the cell.
    pub fn label(&self) -> String {
        match self {
            Cell::Dimension { dimension } | Cell::Aligned { dimension, .. } => dimension.label(),
            Cell::Indicator { indicator } => match indicator {
                IndicatorSlot::Unresolved => String::new(),
                IndicatorSlot::Resolved(value) => value.value.to_string(),
            },
            Cell::CrossArea {
                column_meta,
                row_meta,
            } => {
                // Column-axis names while the indicator sits on the row axis.
                let (first, second) = if column_meta.iter().any(|n| n.as_indicator().is_some()) {
                    (row_meta, column_meta)
                } else {
                    (column_meta, row_meta)
                };
                let names = meta_names(first);
                if names.is_empty() {
                    meta_names(second)
                } else {
                    names
                }
            }
        }
    }
}

fn meta_names<T>(nodes: &[DimensionNodeValue<T>]) -> String {
    nodes
        .iter()
        .filter_map(DimensionNodeValue::dimension_meta)
        .map(|meta| meta.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// A merged header block, in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRegion {
    pub row: usize,
    pub col: usize,
    pub row_span: usize,
    pub col_span: usize,
}

// ============================================================================
// DISPLAY GRID
// ============================================================================

/// The rendered table: an arena of cells and the layout placing them.
///
/// Deserialization checks that the layout is rectangular and that every id
/// it places or an aligned cell points at lies inside the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DisplayGridRepr<T, U>")]
pub struct DisplayGrid<T = String, U = f64> {
    arena: Vec<Cell<T, U>>,
    layout: Grid<CellId>,
}

#[derive(Deserialize)]
struct DisplayGridRepr<T, U> {
    arena: Vec<Cell<T, U>>,
    layout: Grid<CellId>,
}

impl<T, U> TryFrom<DisplayGridRepr<T, U>> for DisplayGrid<T, U> {
    type Error = LayoutError;

    fn try_from(repr: DisplayGridRepr<T, U>) -> Result<Self, Self::Error> {
        let DisplayGridRepr { arena, layout } = repr;
        let len = arena.len();
        let check = |id: CellId| {
            if id.0 < len {
                Ok(())
            } else {
                Err(LayoutError::CellOutOfArena { index: id.0, len })
            }
        };

        for (row, cells) in layout.rows().enumerate() {
            if cells.len() != layout.col_count() {
                return Err(LayoutError::RaggedGrid {
                    row,
                    len: cells.len(),
                    expected: layout.col_count(),
                });
            }
            cells.iter().copied().try_for_each(check)?;
        }
        for cell in &arena {
            if let Cell::Aligned {
                parent: Some(parent),
                ..
            } = cell
            {
                check(*parent)?;
            }
        }
        Ok(DisplayGrid { arena, layout })
    }
}

impl<T, U> DisplayGrid<T, U> {
    pub fn empty() -> Self {
        DisplayGrid {
            arena: Vec::new(),
            layout: Grid::empty(0),
        }
    }

    pub(crate) fn from_parts(arena: Vec<Cell<T, U>>, layout: Grid<CellId>) -> Self {
        DisplayGrid { arena, layout }
    }

    pub(crate) fn into_parts(self) -> (Vec<Cell<T, U>>, Grid<CellId>) {
        (self.arena, self.layout)
    }

    pub(crate) fn alloc(arena: &mut Vec<Cell<T, U>>, cell: Cell<T, U>) -> CellId {
        arena.push(cell);
        CellId(arena.len() - 1)
    }

    pub(crate) fn shifted(id: CellId, offset: usize) -> CellId {
        CellId(id.0 + offset)
    }

    pub fn row_count(&self) -> usize {
        self.layout.row_count()
    }

    pub fn col_count(&self) -> usize {
        self.layout.col_count()
    }

    pub fn layout(&self) -> &Grid<CellId> {
        &self.layout
    }

    /// The cell stored in arena slot `id`.
    pub fn cell(&self, id: CellId) -> &Cell<T, U> {
        &self.arena[id.0]
    }

    pub fn id_at(&self, row: usize, col: usize) -> Option<CellId> {
        self.layout.get(row, col).copied()
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell<T, U>> {
        self.id_at(row, col).map(|id| self.cell(id))
    }

    /// The layout with every id replaced by its cell.
    pub fn cells(&self) -> Grid<&Cell<T, U>> {
        self.layout.map(|id, _, _| self.cell(*id))
    }

    /// Number of aligned ancestors above `id`: walks the parent chain while
    /// it stays on aligned cells.
    pub fn aligned_depth(&self, id: CellId) -> usize {
        let mut depth = 0;
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            match self.cell(parent) {
                Cell::Aligned { parent: next, .. } => {
                    depth += 1;
                    current = *next;
                }
                _ => break,
            }
        }
        depth
    }

    /// The cell itself followed by every ancestor reachable through the
    /// aligned parent chain, nearest first.
    pub fn aligned_chain(&self, id: CellId) -> Vec<CellId> {
        let mut chain = vec![id];
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            // A well-formed chain is acyclic; guard anyway.
            if chain.contains(&parent) {
                break;
            }
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// The filters an aligned cell stands for: its own value plus every
    /// ancestor's value along the parent chain.
    pub fn aligned_filters(&self, id: CellId) -> Vec<&DimensionValue<T>> {
        self.aligned_chain(id)
            .into_iter()
            .filter_map(|cell_id| self.cell(cell_id).node())
            .filter_map(DimensionNodeValue::as_filter)
            .collect()
    }

    fn parent_of(&self, id: CellId) -> Option<CellId> {
        match self.cell(id) {
            Cell::Aligned { parent, .. } => *parent,
            _ => None,
        }
    }
}

impl<T: PartialEq, U> DisplayGrid<T, U> {
    /// Whether two slots show the same header. Data and corner cells only
    /// equal themselves.
    pub fn same_header(&self, a: CellId, b: CellId) -> bool {
        if a == b {
            return true;
        }
        match (self.cell(a), self.cell(b)) {
            (Cell::Dimension { dimension: x }, Cell::Dimension { dimension: y }) => x == y,
            (
                Cell::Aligned {
                    dimension: x,
                    parent: p,
                },
                Cell::Aligned {
                    dimension: y,
                    parent: q,
                },
            ) => x == y && p == q,
            _ => false,
        }
    }

    /// First column holding an unaligned header cell of `meta`.
    pub fn find_dimension_column(&self, meta: &DimensionMeta) -> Option<usize> {
        (0..self.col_count()).find(|&col| {
            self.layout.rows().any(|row| match self.cell(row[col]) {
                Cell::Dimension { dimension } => dimension.dimension_meta() == Some(meta),
                _ => false,
            })
        })
    }

    /// Runs of identical header cells that a renderer may merge.
    ///
    /// A vertical run continues while the next row shows the same header and
    /// every cell to its left matches too. A horizontal run continues while
    /// the next column shows the same header and every cell above matches.
    /// Only unaligned header cells merge, and only spans above one are
    /// reported.
    pub fn merge_regions(&self) -> Vec<MergeRegion> {
        let rows = self.row_count();
        let cols = self.col_count();
        let mut covered: FxHashSet<(usize, usize)> = FxHashSet::default();
        let mut regions = Vec::new();

        for col in 0..cols {
            let mut row = 0;
            while row < rows {
                let mut end = row + 1;
                if self.is_mergeable(row, col) {
                    while end < rows && self.same_row_prefix(end - 1, end, col) {
                        end += 1;
                    }
                }
                if end - row > 1 {
                    covered.extend((row..end).map(|r| (r, col)));
                    regions.push(MergeRegion {
                        row,
                        col,
                        row_span: end - row,
                        col_span: 1,
                    });
                }
                row = end;
            }
        }

        for row in 0..rows {
            let mut col = 0;
            while col < cols {
                let mut end = col + 1;
                if self.is_mergeable(row, col) && !covered.contains(&(row, col)) {
                    while end < cols
                        && !covered.contains(&(row, end))
                        && self.same_col_prefix(end - 1, end, row)
                    {
                        end += 1;
                    }
                }
                if end - col > 1 {
                    regions.push(MergeRegion {
                        row,
                        col,
                        row_span: 1,
                        col_span: end - col,
                    });
                }
                col = end;
            }
        }

        regions
    }

    fn is_mergeable(&self, row: usize, col: usize) -> bool {
        matches!(self.cell_at(row, col), Some(Cell::Dimension { .. }))
    }

    fn same_row_prefix(&self, upper: usize, lower: usize, col: usize) -> bool {
        let a = self.layout.row(upper);
        let b = self.layout.row(lower);
        (0..=col).all(|c| self.same_header(a[c], b[c]))
    }

    fn same_col_prefix(&self, left: usize, right: usize, row: usize) -> bool {
        (0..=row).all(|r| {
            let a = self.layout.row(r);
            self.same_header(a[left], a[right])
        })
    }
}

impl<T: Display, U: Display> DisplayGrid<T, U> {
    /// Text of every cell, laid out like the grid.
    pub fn labels(&self) -> Grid<String> {
        self.layout.map(|id, _, _| self.cell(*id).label())
    }
}

impl<T, U> Default for DisplayGrid<T, U> {
    fn default() -> Self {
        Self::empty()
    }
}
