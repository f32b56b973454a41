//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for crosstab-engine integration tests.

#![allow(dead_code)]

use crosstab_engine::{
    AxisConfig, Cell, DimensionItem, DimensionMeta, DimensionValue, DisplayGrid, FactTable,
    IndicatorMember, IndicatorMeta, IndicatorValue, Record, TableConfig,
};

// ============================================================================
// BUSINESS FIXTURE
// ============================================================================

/// Monthly GMV and profit by region, business line and sub-business line.
pub struct BizFixture;

impl BizFixture {
    pub fn region() -> DimensionMeta {
        DimensionMeta::new("region", "Region")
    }

    pub fn biz_line() -> DimensionMeta {
        DimensionMeta::new("biz_line", "Business Line")
    }

    pub fn sub_biz_line() -> DimensionMeta {
        DimensionMeta::new("sub_biz_line", "Sub Business Line")
    }

    pub fn date() -> DimensionMeta {
        DimensionMeta::new("date", "Date")
    }

    pub fn gmv() -> IndicatorMeta {
        IndicatorMeta::new("gmv", "GMV")
    }

    pub fn profit() -> IndicatorMeta {
        IndicatorMeta::new("profit", "Profit")
    }

    /// (region, biz line, sub biz line, month, gmv, profit)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, &'static str, f64, f64)> {
        vec![
            ("r1", "bl1", "sbl1", "2025-09", 100.0, 0.1),
            ("r1", "bl1", "sbl1", "2025-10", 200.0, 0.2),
            ("r1", "bl1", "sbl1", "2025-11", 1100.0, 0.11),
            ("r1", "bl1", "sbl2", "2025-09", 300.0, 0.3),
            ("r1", "bl1", "sbl2", "2025-10", 400.0, 0.4),
            ("r1", "bl1", "sbl3", "2025-09", 400.0, 0.99),
            ("r1", "bl1", "sbl3", "2025-10", 1000.0, 0.4),
            ("r1", "bl2", "sbl4", "2025-09", 500.0, 0.5),
            ("r2", "bl3", "sbl5", "2025-09", 500.0, 0.5),
            ("r2", "bl3", "sbl5", "2025-11", 499.0, 0.3),
        ]
    }

    pub fn facts() -> FactTable {
        let records = Self::data()
            .into_iter()
            .map(|(region, bl, sbl, month, gmv, profit)| {
                Record::new(
                    vec![
                        DimensionValue::new(Self::region(), region.to_string(), 0),
                        DimensionValue::new(Self::biz_line(), bl.to_string(), 0),
                        DimensionValue::new(Self::sub_biz_line(), sbl.to_string(), 0),
                        DimensionValue::new(Self::date(), month.to_string(), 0),
                    ],
                    vec![
                        IndicatorValue::new(Self::gmv(), gmv),
                        IndicatorValue::new(Self::profit(), profit),
                    ],
                )
            })
            .collect();
        FactTable::new(records)
    }

    /// Region, business line and sub-business line down the left edge.
    pub fn left_axis() -> AxisConfig {
        AxisConfig::dimensions(vec![
            DimensionItem::new(Self::region()),
            DimensionItem::new(Self::biz_line()),
            DimensionItem::new(Self::sub_biz_line()),
        ])
    }

    /// Same levels, with both business line levels folded under region.
    pub fn aligned_left_axis() -> AxisConfig {
        AxisConfig::dimensions(vec![
            DimensionItem::new(Self::region()),
            DimensionItem::aligned(Self::biz_line()),
            DimensionItem::aligned(Self::sub_biz_line()),
        ])
    }

    /// GMV split by month; profit does not vary by month.
    pub fn head_axis() -> AxisConfig {
        AxisConfig::with_indicator(
            vec![DimensionItem::new(Self::date())],
            vec![
                IndicatorMember::new(Self::gmv()),
                IndicatorMember::ignoring(Self::profit(), vec![Self::date()]),
            ],
            0,
        )
    }

    /// GMV alone, with no column dimensions.
    pub fn gmv_only_head_axis() -> AxisConfig {
        AxisConfig::with_indicator(vec![], vec![IndicatorMember::new(Self::gmv())], 0)
    }

    pub fn config() -> TableConfig {
        TableConfig::new(Self::left_axis(), Self::head_axis())
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that a cell holds a resolved value close to `expected`.
pub fn assert_value(grid: &DisplayGrid, row: usize, col: usize, expected: f64) {
    match grid.cell_at(row, col).and_then(Cell::resolved) {
        Some(value) => assert!(
            (value.value - expected).abs() < 1e-9,
            "Cell ({}, {}) expected {} but got {}",
            row, col, expected, value.value
        ),
        None => panic!(
            "Cell ({}, {}) expected {} but got {:?}",
            row, col, expected, grid.cell_at(row, col)
        ),
    }
}

/// Assert that a cell is an unresolved indicator slot.
pub fn assert_unresolved(grid: &DisplayGrid, row: usize, col: usize) {
    assert!(
        grid.cell_at(row, col).is_some_and(Cell::is_unresolved),
        "Cell ({}, {}) expected unresolved but got {:?}",
        row, col, grid.cell_at(row, col)
    );
}

/// Labels of column `col`, top to bottom.
pub fn column_labels(grid: &DisplayGrid, col: usize) -> Vec<String> {
    grid.labels().rows().map(|row| row[col].clone()).collect()
}
