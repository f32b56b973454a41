//! FILENAME: core/crosstab-engine/src/definition.rs
//! Cross Table Definition - The serializable configuration and fact data.
//!
//! This module contains all the types needed to DESCRIBE a cross table:
//! - Dimension and indicator metadata and values
//! - The fact table the layout is computed from
//! - Per-axis drill configuration (drill order, indicator insertion, alignment)
//!
//! These structures are designed to be:
//! - Serializable (configuration is authored and stored as JSON)
//! - Immutable snapshots of user intent, validated before any layout work

use std::hash::{Hash, Hasher};

use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

// ============================================================================
// DIMENSIONS AND INDICATORS
// ============================================================================

/// A categorical axis for slicing data. Identity is `code`.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct DimensionMeta {
    pub code: String,
    pub name: String,
}

impl DimensionMeta {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        DimensionMeta {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for DimensionMeta {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Hash for DimensionMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// One enumerated value of a dimension.
///
/// `order` is an externally supplied absolute sort key. It is carried
/// through the layout and only consulted by `LeafOrder::ByOrder`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionValue<T = String> {
    pub meta: DimensionMeta,
    pub value: T,
    #[serde(default)]
    pub order: i64,
}

impl<T> DimensionValue<T> {
    pub fn new(meta: DimensionMeta, value: T, order: i64) -> Self {
        DimensionValue { meta, value, order }
    }
}

/// Two values are the same when they belong to the same dimension and carry
/// the same value. `order` does not take part.
impl<T: PartialEq> PartialEq for DimensionValue<T> {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta && self.value == other.value
    }
}

impl<T: Eq> Eq for DimensionValue<T> {}

/// A measured quantity. Identity is `code`.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct IndicatorMeta {
    pub code: String,
    pub name: String,
}

impl IndicatorMeta {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        IndicatorMeta {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl PartialEq for IndicatorMeta {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Hash for IndicatorMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValue<U = f64> {
    pub meta: IndicatorMeta,
    pub value: U,
}

impl<U> IndicatorValue<U> {
    pub fn new(meta: IndicatorMeta, value: U) -> Self {
        IndicatorValue { meta, value }
    }
}

// ============================================================================
// FACT TABLE
// ============================================================================

/// One fact: a set of dimension values and the indicator values measured
/// for that combination. A record is expected to hold at most one value per
/// dimension code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T = String, U = f64> {
    pub dimensions: Vec<DimensionValue<T>>,
    pub indicators: Vec<IndicatorValue<U>>,
}

impl<T: PartialEq, U> Record<T, U> {
    pub fn new(dimensions: Vec<DimensionValue<T>>, indicators: Vec<IndicatorValue<U>>) -> Self {
        Record {
            dimensions,
            indicators,
        }
    }

    /// The value this record carries for the dimension `code`, if any.
    pub fn dimension(&self, code: &str) -> Option<&DimensionValue<T>> {
        self.dimensions.iter().find(|d| d.meta.code == code)
    }

    pub fn indicator(&self, code: &str) -> Option<&IndicatorValue<U>> {
        self.indicators.iter().find(|i| i.meta.code == code)
    }

    /// Whether this record's dimension set is a superset of `filters`.
    pub fn matches_all<'a, I>(&self, filters: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a DimensionValue<T>>,
    {
        filters
            .into_iter()
            .all(|f| self.dimensions.iter().any(|d| d == f))
    }
}

/// The flat fact table. Owned by the caller and read-only to the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactTable<T = String, U = f64> {
    pub records: Vec<Record<T, U>>,
}

impl<T: PartialEq, U> FactTable<T, U> {
    pub fn new(records: Vec<Record<T, U>>) -> Self {
        FactTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record, in table order, whose dimensions contain every filter.
    pub fn first_match(&self, filters: &[&DimensionValue<T>]) -> Option<&Record<T, U>> {
        self.records
            .iter()
            .find(|record| record.matches_all(filters.iter().copied()))
    }

    /// Looks up `indicator` in the first record matching `filters`.
    /// When several records match, table order decides.
    pub fn lookup(
        &self,
        indicator: &IndicatorMeta,
        filters: &[&DimensionValue<T>],
    ) -> Option<&IndicatorValue<U>> {
        self.first_match(filters)
            .and_then(|record| record.indicator(&indicator.code))
    }
}

impl<T: DeserializeOwned, U: DeserializeOwned> FactTable<T, U> {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// DRILL PATH
// ============================================================================

/// A dimension placed on an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionItem {
    pub meta: DimensionMeta,

    /// Fold this dimension's header column into indented rows under its
    /// parent column.
    #[serde(default)]
    pub align_to_parent: bool,
}

impl DimensionItem {
    pub fn new(meta: DimensionMeta) -> Self {
        DimensionItem {
            meta,
            align_to_parent: false,
        }
    }

    pub fn aligned(meta: DimensionMeta) -> Self {
        DimensionItem {
            meta,
            align_to_parent: true,
        }
    }
}

/// One indicator acting as a member of the indicator pseudo-dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorMember {
    pub meta: IndicatorMeta,

    /// Dimensions that carry no meaning for this indicator. Below this
    /// member they collapse into a single placeholder branch.
    #[serde(default)]
    pub ignore_dimensions: Vec<DimensionMeta>,
}

impl IndicatorMember {
    pub fn new(meta: IndicatorMeta) -> Self {
        IndicatorMember {
            meta,
            ignore_dimensions: Vec::new(),
        }
    }

    pub fn ignoring(meta: IndicatorMeta, ignore_dimensions: Vec<DimensionMeta>) -> Self {
        IndicatorMember {
            meta,
            ignore_dimensions,
        }
    }

    pub fn ignores(&self, dimension: &DimensionMeta) -> bool {
        self.ignore_dimensions.contains(dimension)
    }
}

/// The indicator pseudo-dimension: its members are declared, not discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorItem {
    pub members: Vec<IndicatorMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrillPathItem {
    Dimension(DimensionItem),
    Indicator(IndicatorItem),
}

/// Ordered drill levels, outermost first.
pub type DrillPath = Vec<DrillPathItem>;

// ============================================================================
// AXIS AND TABLE CONFIGURATION
// ============================================================================

/// Where the indicator item is spliced into an axis' dimension list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorInsertion {
    pub members: Vec<IndicatorMember>,

    /// Position in the dimension list. Dimensions at or after `index` are
    /// expanded once per indicator member.
    pub index: usize,
}

/// Drill configuration of one axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AxisConfig {
    /// Dimensions only.
    Dimensions { dimensions: Vec<DimensionItem> },
    /// Dimensions plus the indicator pseudo-dimension.
    WithIndicator {
        dimensions: Vec<DimensionItem>,
        indicator: IndicatorInsertion,
    },
}

impl AxisConfig {
    pub fn dimensions(dimensions: Vec<DimensionItem>) -> Self {
        AxisConfig::Dimensions { dimensions }
    }

    pub fn with_indicator(
        dimensions: Vec<DimensionItem>,
        members: Vec<IndicatorMember>,
        index: usize,
    ) -> Self {
        AxisConfig::WithIndicator {
            dimensions,
            indicator: IndicatorInsertion { members, index },
        }
    }

    pub fn dimension_items(&self) -> &[DimensionItem] {
        match self {
            AxisConfig::Dimensions { dimensions } => dimensions,
            AxisConfig::WithIndicator { dimensions, .. } => dimensions,
        }
    }

    pub fn indicator(&self) -> Option<&IndicatorInsertion> {
        match self {
            AxisConfig::Dimensions { .. } => None,
            AxisConfig::WithIndicator { indicator, .. } => Some(indicator),
        }
    }

    pub fn has_indicator(&self) -> bool {
        self.indicator().is_some()
    }

    /// Dimensions flagged `align_to_parent`, in drill order.
    pub fn aligned_dimensions(&self) -> impl DoubleEndedIterator<Item = &DimensionMeta> {
        self.dimension_items()
            .iter()
            .filter(|d| d.align_to_parent)
            .map(|d| &d.meta)
    }

    /// The drill path of this axis, with the indicator item spliced in at
    /// its insertion index.
    pub fn drill_path(&self) -> DrillPath {
        let dimensions = self.dimension_items();
        let mut path: DrillPath = dimensions
            .iter()
            .cloned()
            .map(DrillPathItem::Dimension)
            .collect();
        if let Some(indicator) = self.indicator() {
            let at = indicator.index.min(path.len());
            path.insert(
                at,
                DrillPathItem::Indicator(IndicatorItem {
                    members: indicator.members.clone(),
                }),
            );
        }
        path
    }

    /// Structural checks, run before any tree is built.
    pub fn validate(&self) -> Result<()> {
        let dimensions = self.dimension_items();

        let first_aligned = dimensions.iter().position(|d| d.align_to_parent);
        if let Some(first) = first_aligned {
            if let Some(breaker) = dimensions[first..].iter().find(|d| !d.align_to_parent) {
                return Err(LayoutError::AlignmentNotTrailing {
                    dimension: breaker.meta.code.clone(),
                });
            }
        }

        if let Some(indicator) = self.indicator() {
            if indicator.index > dimensions.len() {
                return Err(LayoutError::IndicatorIndexOutOfRange {
                    index: indicator.index,
                    len: dimensions.len(),
                });
            }
            if indicator.members.is_empty() {
                return Err(LayoutError::EmptyIndicator);
            }
        }

        Ok(())
    }
}

/// Which side of the table an axis sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisSide {
    /// Row headers, drawn down the left edge.
    Left,
    /// Column headers, drawn across the top.
    Head,
}

/// The complete, serializable definition of a cross table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Row axis (ordered from outer to inner).
    pub left: AxisConfig,

    /// Column axis (ordered from outer to inner).
    pub head: AxisConfig,
}

impl TableConfig {
    pub fn new(left: AxisConfig, head: AxisConfig) -> Self {
        TableConfig { left, head }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TableConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let count = [&self.left, &self.head]
            .iter()
            .filter(|axis| axis.has_indicator())
            .count();
        if count != 1 {
            return Err(LayoutError::IndicatorPlacement { count });
        }
        self.left.validate()?;
        self.head.validate()
    }

    /// The axis carrying the indicator pseudo-dimension.
    pub fn indicator_side(&self) -> Option<AxisSide> {
        if self.left.has_indicator() {
            Some(AxisSide::Left)
        } else if self.head.has_indicator() {
            Some(AxisSide::Head)
        } else {
            None
        }
    }

    /// What a data-fetch collaborator must supply for this layout.
    pub fn query(&self) -> FactQuery {
        let mut seen = FxHashSet::default();
        let dimensions = self
            .left
            .dimension_items()
            .iter()
            .chain(self.head.dimension_items())
            .filter(|d| seen.insert(d.meta.code.as_str()))
            .map(|d| d.meta.clone())
            .collect();

        let mut seen = FxHashSet::default();
        let indicators = [&self.left, &self.head]
            .into_iter()
            .filter_map(AxisConfig::indicator)
            .flat_map(|insertion| insertion.members.iter())
            .filter(|m| seen.insert(m.meta.code.as_str()))
            .map(|m| m.meta.clone())
            .collect();

        FactQuery {
            dimensions,
            indicators,
        }
    }
}

/// The dimensions (in drill order) and indicators a layout reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactQuery {
    pub dimensions: Vec<DimensionMeta>,
    pub indicators: Vec<IndicatorMeta>,
}
