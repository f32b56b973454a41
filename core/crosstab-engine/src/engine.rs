//! FILENAME: core/crosstab-engine/src/engine.rs
//! Cross Table Engine - composes the layout passes into one calculation.
//!
//! Per axis: drill path -> value tree -> header grid -> alignment.
//! Then both header grids are assembled into the full table and the data
//! region is filled from the fact table.

use std::hash::Hash;

use log::debug;

use crate::align::apply_alignment;
use crate::builder::{AllDimensionsValid, DimensionPolicy, LeafOrder, TreeBuilder};
use crate::cross::assemble;
use crate::definition::{AxisConfig, AxisSide, FactTable, TableConfig};
use crate::error::Result;
use crate::fill::{fill_with_report, FillReport};
use crate::layout::tree_to_grid;
use crate::view::DisplayGrid;

// ============================================================================
// CROSS TABLE CALCULATOR
// ============================================================================

/// Builds the display grid for one table configuration over one fact table.
///
/// The calculator only borrows its inputs; every call to `calculate`
/// allocates its own trees and grids.
pub struct CrossTabCalculator<'a, T = String, U = f64> {
    config: &'a TableConfig,
    facts: &'a FactTable<T, U>,

    /// Decides whether a dimension expands under an ancestor indicator.
    policy: &'a dyn DimensionPolicy,

    /// Sibling order at every dimension level.
    leaf_order: LeafOrder,
}

impl<'a, T, U> CrossTabCalculator<'a, T, U>
where
    T: Clone + Eq + Hash,
    U: Clone,
{
    pub fn new(config: &'a TableConfig, facts: &'a FactTable<T, U>) -> Self {
        CrossTabCalculator {
            config,
            facts,
            policy: &AllDimensionsValid,
            leaf_order: LeafOrder::default(),
        }
    }

    pub fn with_policy(mut self, policy: &'a dyn DimensionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_leaf_order(mut self, leaf_order: LeafOrder) -> Self {
        self.leaf_order = leaf_order;
        self
    }

    /// Executes the full calculation and returns the rendered grid.
    pub fn calculate(&self) -> Result<DisplayGrid<T, U>> {
        self.calculate_with_report().map(|(grid, _)| grid)
    }

    /// Like `calculate`, and also reports unresolved data slots.
    pub fn calculate_with_report(&self) -> Result<(DisplayGrid<T, U>, FillReport)> {
        // Step 1: Reject structural misconfiguration before building anything
        self.config.validate()?;

        debug!(
            target: "crosstab",
            "calculating cross table: {} records, indicator on {:?}",
            self.facts.len(),
            self.config.indicator_side()
        );

        // Step 2: Header grid per axis
        let left = self.build_axis(&self.config.left, AxisSide::Left);
        let head = self.build_axis(&self.config.head, AxisSide::Head);

        // Step 3: Tile headers, corner and data region
        let grid = assemble(left, head);

        // Step 4: Resolve the data region
        let (grid, report) = fill_with_report(grid, self.facts);

        debug!(
            target: "crosstab",
            "cross table ready: {}x{}, {} unresolved",
            grid.row_count(),
            grid.col_count(),
            report.unresolved.len()
        );
        Ok((grid, report))
    }

    fn build_axis(&self, axis: &AxisConfig, side: AxisSide) -> DisplayGrid<T, U> {
        let path = axis.drill_path();
        let forest = TreeBuilder::new(self.facts)
            .with_policy(self.policy)
            .with_leaf_order(self.leaf_order)
            .build(&path);
        let grid = tree_to_grid(&forest);
        let grid = apply_alignment(grid, axis);
        debug!(
            target: "crosstab",
            "{:?} axis: {} levels -> {}x{} header grid",
            side,
            path.len(),
            grid.row_count(),
            grid.col_count()
        );
        grid
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Builds the display grid for `config` over `facts` with the default policy
/// and discovery order. This is the main entry point for the engine.
pub fn build_display_grid<T, U>(
    config: &TableConfig,
    facts: &FactTable<T, U>,
) -> Result<DisplayGrid<T, U>>
where
    T: Clone + Eq + Hash,
    U: Clone,
{
    CrossTabCalculator::new(config, facts).calculate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::IndicatorConstraints;
    use crate::definition::{
        DimensionItem, DimensionMeta, DimensionValue, IndicatorMember, IndicatorMeta,
        IndicatorValue, Record,
    };
    use crate::error::LayoutError;
    use crate::view::Cell;

    fn region() -> DimensionMeta {
        DimensionMeta::new("region", "Region")
    }

    fn date() -> DimensionMeta {
        DimensionMeta::new("date", "Date")
    }

    fn gmv() -> IndicatorMeta {
        IndicatorMeta::new("gmv", "GMV")
    }

    fn create_test_facts() -> FactTable {
        let rows = [("R1", "2025-09", 1, 100.0), ("R1", "2025-10", 2, 200.0)];
        FactTable::new(
            rows.iter()
                .map(|(r, d, order, amount)| {
                    Record::new(
                        vec![
                            DimensionValue::new(region(), r.to_string(), 0),
                            DimensionValue::new(date(), d.to_string(), *order),
                        ],
                        vec![IndicatorValue::new(gmv(), *amount)],
                    )
                })
                .collect(),
        )
    }

    fn create_test_config() -> TableConfig {
        TableConfig::new(
            AxisConfig::dimensions(vec![DimensionItem::new(region())]),
            AxisConfig::with_indicator(vec![], vec![IndicatorMember::new(gmv())], 0),
        )
    }

    #[test]
    fn test_indicator_only_column_axis() {
        let facts = create_test_facts();
        let grid = build_display_grid(&create_test_config(), &facts).unwrap();

        assert_eq!((grid.row_count(), grid.col_count()), (2, 2));
        assert!(matches!(grid.cell_at(0, 0), Some(Cell::CrossArea { .. })));
        assert_eq!(grid.labels().row(0)[1], "GMV");
        assert_eq!(grid.labels().row(1)[0], "R1");
        assert_eq!(grid.cell_at(1, 1).and_then(Cell::resolved).map(|v| v.value), Some(100.0));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let facts = create_test_facts();
        let config = TableConfig::new(
            AxisConfig::dimensions(vec![DimensionItem::new(region())]),
            AxisConfig::dimensions(vec![DimensionItem::new(date())]),
        );
        assert!(matches!(
            build_display_grid(&config, &facts),
            Err(LayoutError::IndicatorPlacement { count: 0 })
        ));
    }

    #[test]
    fn test_leaf_order_and_policy_are_applied() {
        let facts = create_test_facts();
        let config = TableConfig::new(
            AxisConfig::dimensions(vec![DimensionItem::new(region())]),
            AxisConfig::with_indicator(
                vec![DimensionItem::new(date())],
                vec![IndicatorMember::new(gmv())],
                0,
            ),
        );

        let (grid, report) = CrossTabCalculator::new(&config, &facts)
            .with_leaf_order(LeafOrder::ByOrder)
            .calculate_with_report()
            .unwrap();
        assert_eq!(grid.labels().row(1)[1..], ["2025-09", "2025-10"]);
        assert!(report.is_complete());

        // gmv no longer splits by date: the header stops at the indicator.
        let policy = IndicatorConstraints::new().support(&gmv(), [&region()]);
        let grid = CrossTabCalculator::new(&config, &facts)
            .with_policy(&policy)
            .calculate()
            .unwrap();
        assert_eq!((grid.row_count(), grid.col_count()), (2, 2));
        assert_eq!(grid.cell_at(1, 1).and_then(Cell::resolved).map(|v| v.value), Some(100.0));
    }
}
