//! FILENAME: core/crosstab-engine/src/builder.rs
//! Drill-Path Tree Builder - expands a drill path into a value tree.
//!
//! Each level of the drill path becomes one level of the tree:
//! - A dimension level lists the distinct values found in records that
//!   carry every filter accumulated on the branch so far.
//! - An indicator level lists its declared members, without consulting the
//!   fact table.
//! - A dimension ignored by an ancestor indicator collapses into a single
//!   placeholder node.

use std::hash::Hash;

use log::{debug, trace};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::definition::{
    DimensionMeta, DimensionValue, DrillPathItem, FactTable, IndicatorMember, IndicatorMeta,
};
use crate::tree::{forest_depth, forest_leaf_count, Tree};
use crate::view::{DimensionNodeValue, ValueTree};

/// Node values on the branch currently being expanded, outermost first.
type Ancestors<T> = SmallVec<[DimensionNodeValue<T>; 8]>;

// ============================================================================
// POLICIES
// ============================================================================

/// Decides whether a dimension is meaningful under an indicator.
///
/// A dimension that is not valid for an ancestor indicator yields no
/// children on that branch.
pub trait DimensionPolicy {
    fn is_valid_for(&self, dimension: &DimensionMeta, indicator: &IndicatorMeta) -> bool;
}

/// Every dimension is valid for every indicator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllDimensionsValid;

impl DimensionPolicy for AllDimensionsValid {
    fn is_valid_for(&self, _dimension: &DimensionMeta, _indicator: &IndicatorMeta) -> bool {
        true
    }
}

/// Per-indicator whitelist of supported dimensions. Indicators without an
/// entry accept every dimension.
#[derive(Debug, Clone, Default)]
pub struct IndicatorConstraints {
    supported: FxHashMap<String, FxHashSet<String>>,
}

impl IndicatorConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts `indicator` to `dimensions` (adds to any earlier entry).
    pub fn support<'a, I>(mut self, indicator: &IndicatorMeta, dimensions: I) -> Self
    where
        I: IntoIterator<Item = &'a DimensionMeta>,
    {
        self.supported
            .entry(indicator.code.clone())
            .or_default()
            .extend(dimensions.into_iter().map(|d| d.code.clone()));
        self
    }
}

impl DimensionPolicy for IndicatorConstraints {
    fn is_valid_for(&self, dimension: &DimensionMeta, indicator: &IndicatorMeta) -> bool {
        self.supported
            .get(&indicator.code)
            .map_or(true, |dims| dims.contains(&dimension.code))
    }
}

/// Order of sibling values at each dimension level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeafOrder {
    /// First-discovery order of a linear scan over the records.
    #[default]
    Discovery,
    /// Stable sort by `DimensionValue::order`.
    ByOrder,
}

// ============================================================================
// TREE BUILDER
// ============================================================================

pub struct TreeBuilder<'a, T, U> {
    facts: &'a FactTable<T, U>,
    policy: &'a dyn DimensionPolicy,
    leaf_order: LeafOrder,
}

impl<'a, T, U> TreeBuilder<'a, T, U>
where
    T: Clone + Eq + Hash,
{
    pub fn new(facts: &'a FactTable<T, U>) -> Self {
        TreeBuilder {
            facts,
            policy: &AllDimensionsValid,
            leaf_order: LeafOrder::Discovery,
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

    /// Expands `path` into a forest. An empty path gives an empty forest.
    pub fn build(&self, path: &[DrillPathItem]) -> Vec<ValueTree<T>> {
        let mut ancestors = Ancestors::new();
        let forest = self.build_level(path, &mut ancestors);
        debug!(
            target: "crosstab",
            "built value tree: levels={} trees={} leaves={} depth={}",
            path.len(),
            forest.len(),
            forest_leaf_count(&forest),
            forest_depth(&forest)
        );
        forest
    }

    fn build_level(&self, path: &[DrillPathItem], ancestors: &mut Ancestors<T>) -> Vec<ValueTree<T>> {
        let Some((first, rest)) = path.split_first() else {
            return Vec::new();
        };

        match first {
            DrillPathItem::Dimension(item) => {
                if is_ignored(&item.meta, ancestors) {
                    trace!(
                        target: "crosstab",
                        "dimension '{}' ignored under active indicator, using placeholder",
                        item.meta.code
                    );
                    let node = DimensionNodeValue::Placeholder(item.meta.clone());
                    return vec![self.grow(node, rest, ancestors)];
                }

                self.distinct_values(&item.meta, ancestors)
                    .into_iter()
                    .map(|value| self.grow(DimensionNodeValue::Filter(value), rest, ancestors))
                    .collect()
            }
            DrillPathItem::Indicator(item) => item
                .members
                .iter()
                .map(|member| {
                    self.grow(DimensionNodeValue::IndicatorProxy(member.clone()), rest, ancestors)
                })
                .collect(),
        }
    }

    /// Creates a node and expands the rest of the path beneath it.
    fn grow(
        &self,
        node: DimensionNodeValue<T>,
        rest: &[DrillPathItem],
        ancestors: &mut Ancestors<T>,
    ) -> ValueTree<T> {
        ancestors.push(node.clone());
        let children = self.build_level(rest, ancestors);
        ancestors.pop();
        Tree::new(node, children)
    }

    /// Distinct values of `meta` among records that carry every filter on
    /// the branch, provided `meta` is valid for every ancestor indicator.
    fn distinct_values(&self, meta: &DimensionMeta, ancestors: &[DimensionNodeValue<T>]) -> Vec<DimensionValue<T>> {
        let valid = ancestors
            .iter()
            .filter_map(DimensionNodeValue::as_indicator)
            .all(|member| self.policy.is_valid_for(meta, &member.meta));
        if !valid {
            trace!(
                target: "crosstab",
                "dimension '{}' not valid for an ancestor indicator, branch ends",
                meta.code
            );
            return Vec::new();
        }

        let filters: SmallVec<[&DimensionValue<T>; 8]> = ancestors
            .iter()
            .filter_map(DimensionNodeValue::as_filter)
            .collect();

        let mut seen: FxHashSet<&T> = FxHashSet::default();
        let mut values = Vec::new();
        for record in &self.facts.records {
            if !record.matches_all(filters.iter().copied()) {
                continue;
            }
            if let Some(value) = record.dimension(&meta.code) {
                if seen.insert(&value.value) {
                    values.push(value.clone());
                }
            }
        }

        if self.leaf_order == LeafOrder::ByOrder {
            values.sort_by_key(|v| v.order);
        }
        values
    }
}

fn is_ignored<T>(meta: &DimensionMeta, ancestors: &[DimensionNodeValue<T>]) -> bool {
    ancestors
        .iter()
        .filter_map(DimensionNodeValue::as_indicator)
        .any(|member: &IndicatorMember| member.ignores(meta))
}

/// Expands `path` with the default policy and discovery order.
pub fn build_tree<T, U>(path: &[DrillPathItem], facts: &FactTable<T, U>) -> Vec<ValueTree<T>>
where
    T: Clone + Eq + Hash,
{
    TreeBuilder::new(facts).build(path)
}
