//! FILENAME: core/crosstab-engine/src/fill.rs
//! Fill Resolver - looks up the value of every unresolved indicator slot.
//!
//! A slot's context is every cell strictly left of it in its row and
//! strictly above it in its column. From that context:
//! - each filter node contributes its dimension value,
//! - each aligned cell contributes its own value and every value on its
//!   parent chain,
//! - the first indicator proxy met names the indicator to read.
//!
//! The value comes from the first record (in table order) whose dimensions
//! are a superset of the collected filters. Slots that cannot be resolved
//! stay unresolved and are listed in the `FillReport`.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::{DimensionValue, FactTable, IndicatorMeta, IndicatorValue};
use crate::view::{Cell, DimensionNodeValue, DisplayGrid, IndicatorSlot};

/// Why a slot was left unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnresolvedReason {
    /// No indicator proxy in the slot's row or column context. This is a
    /// configuration error for that position.
    NoIndicator,
    /// No record carries every filter together with the indicator.
    NoMatchingRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedCell {
    pub row: usize,
    pub col: usize,
    pub reason: UnresolvedReason,
}

/// Outcome of one fill pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillReport {
    pub resolved: usize,
    pub unresolved: Vec<UnresolvedCell>,
}

impl FillReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }

    pub fn count(&self, reason: UnresolvedReason) -> usize {
        self.unresolved.iter().filter(|c| c.reason == reason).count()
    }
}

type Filters<'a, T> = SmallVec<[&'a DimensionValue<T>; 8]>;

/// Resolves every unresolved slot of `grid` against `facts`.
pub fn fill<T, U>(grid: DisplayGrid<T, U>, facts: &FactTable<T, U>) -> DisplayGrid<T, U>
where
    T: PartialEq,
    U: Clone,
{
    fill_with_report(grid, facts).0
}

/// Like `fill`, and also reports which slots stayed unresolved and why.
pub fn fill_with_report<T, U>(
    grid: DisplayGrid<T, U>,
    facts: &FactTable<T, U>,
) -> (DisplayGrid<T, U>, FillReport)
where
    T: PartialEq,
    U: Clone,
{
    let mut pending = Vec::new();
    grid.layout().for_each(|&id, row, col| {
        if grid.cell(id).is_unresolved() {
            pending.push((row, col));
        }
    });

    let mut report = FillReport::default();
    let mut values = Vec::with_capacity(pending.len());
    for (row, col) in pending {
        match resolve(&grid, facts, row, col) {
            Ok(value) => values.push((row, col, value)),
            Err(reason) => {
                match reason {
                    UnresolvedReason::NoIndicator => warn!(
                        target: "crosstab",
                        "no indicator in context of cell ({}, {})",
                        row,
                        col
                    ),
                    UnresolvedReason::NoMatchingRecord => trace!(
                        target: "crosstab",
                        "no record matches cell ({}, {})",
                        row,
                        col
                    ),
                }
                report.unresolved.push(UnresolvedCell { row, col, reason });
            }
        }
    }
    report.resolved = values.len();

    let (mut arena, mut layout) = grid.into_parts();
    for (row, col, value) in values {
        let id = DisplayGrid::alloc(
            &mut arena,
            Cell::Indicator {
                indicator: IndicatorSlot::Resolved(value),
            },
        );
        layout.set(row, col, id);
    }

    debug!(
        target: "crosstab",
        "fill: {} resolved, {} unresolved",
        report.resolved,
        report.unresolved.len()
    );
    (DisplayGrid::from_parts(arena, layout), report)
}

fn resolve<T, U>(
    grid: &DisplayGrid<T, U>,
    facts: &FactTable<T, U>,
    row: usize,
    col: usize,
) -> Result<IndicatorValue<U>, UnresolvedReason>
where
    T: PartialEq,
    U: Clone,
{
    let layout = grid.layout();
    let mut filters: Filters<'_, T> = SmallVec::new();
    let mut indicator: Option<&IndicatorMeta> = None;

    let context = layout
        .row_to_left(row, col)
        .iter()
        .chain(layout.column_above(row, col));
    for &id in context {
        match grid.cell(id) {
            Cell::Dimension { dimension } => collect(dimension, &mut filters, &mut indicator),
            Cell::Aligned { .. } => {
                for ancestor in grid.aligned_chain(id) {
                    if let Some(node) = grid.cell(ancestor).node() {
                        collect(node, &mut filters, &mut indicator);
                    }
                }
            }
            _ => {}
        }
    }

    let indicator = indicator.ok_or(UnresolvedReason::NoIndicator)?;
    facts
        .lookup(indicator, &filters)
        .cloned()
        .ok_or(UnresolvedReason::NoMatchingRecord)
}

fn collect<'a, T>(
    node: &'a DimensionNodeValue<T>,
    filters: &mut Filters<'a, T>,
    indicator: &mut Option<&'a IndicatorMeta>,
) {
    match node {
        DimensionNodeValue::Filter(value) => filters.push(value),
        DimensionNodeValue::IndicatorProxy(member) => {
            indicator.get_or_insert(&member.meta);
        }
        DimensionNodeValue::Placeholder(_) => {}
    }
}
