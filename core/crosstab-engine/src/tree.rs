//! FILENAME: core/crosstab-engine/src/tree.rs
//! Rooted-forest helpers shared by the tree builder and the grid converter.
//!
//! A forest is a plain `[Tree<T>]` slice. Sizing a header grid only needs
//! two measurements: the number of leaves (one grid line per leaf) and the
//! maximum depth (one grid column per drill level).

use serde::{Deserialize, Serialize};

/// A node with an owned list of children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree<T> {
    pub value: T,
    pub children: Vec<Tree<T>>,
}

impl<T> Tree<T> {
    pub fn new(value: T, children: Vec<Tree<T>>) -> Self {
        Tree { value, children }
    }

    pub fn leaf(value: T) -> Self {
        Tree {
            value,
            children: Vec::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order traversal. The callback receives the node and the path
    /// from the root down to (and including) that node.
    pub fn walk<'a, F>(&'a self, callback: &mut F)
    where
        F: FnMut(&'a Tree<T>, &[&'a Tree<T>]),
    {
        let mut path = Vec::new();
        self.walk_with_path(&mut path, callback);
    }

    fn walk_with_path<'a, F>(&'a self, path: &mut Vec<&'a Tree<T>>, callback: &mut F)
    where
        F: FnMut(&'a Tree<T>, &[&'a Tree<T>]),
    {
        path.push(self);
        callback(self, path);
        for child in &self.children {
            child.walk_with_path(path, callback);
        }
        path.pop();
    }

    /// Number of leaves below (or at) this node. A leaf counts as one.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node, _| {
            if node.is_leaf() {
                count += 1;
            }
        });
        count
    }

    /// Number of levels from this node down to its deepest leaf, inclusive.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Tree::depth)
            .max()
            .unwrap_or(0)
    }
}

pub fn forest_leaf_count<T>(forest: &[Tree<T>]) -> usize {
    forest.iter().map(Tree::leaf_count).sum()
}

pub fn forest_depth<T>(forest: &[Tree<T>]) -> usize {
    forest.iter().map(Tree::depth).max().unwrap_or(0)
}

/// Root-to-leaf paths of every leaf in the forest, left to right. Path `r`
/// is the branch of grid row `r`.
pub fn forest_leaf_paths<T>(forest: &[Tree<T>]) -> Vec<Vec<&Tree<T>>> {
    let mut paths = Vec::new();
    for tree in forest {
        tree.walk(&mut |node, path| {
            if node.is_leaf() {
                paths.push(path.to_vec());
            }
        });
    }
    paths
}

/// Finds the node at `depth` on the branch that owns leaf number `row`.
///
/// Each tree owns the half-open leaf range `[before, before + leaf_count)`,
/// where `before` is the accumulated leaf count of its left siblings.
/// Returns `None` when the branch ends above `depth`, or `row` is past the
/// last leaf.
pub fn find_node_by_row_and_depth<T>(
    forest: &[Tree<T>],
    row: usize,
    depth: usize,
) -> Option<&Tree<T>> {
    let mut offset = row;
    for tree in forest {
        let count = tree.leaf_count();
        if offset < count {
            return if depth == 0 {
                Some(tree)
            } else {
                find_node_by_row_and_depth(&tree.children, offset, depth - 1)
            };
        }
        offset -= count;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_forest() -> Vec<Tree<&'static str>> {
        vec![
            Tree::new(
                "north",
                vec![
                    Tree::new("apples", vec![Tree::leaf("q1"), Tree::leaf("q2")]),
                    Tree::leaf("oranges"),
                ],
            ),
            Tree::leaf("south"),
        ]
    }

    #[test]
    fn test_leaf_count_and_depth() {
        let forest = create_test_forest();
        assert_eq!(forest[0].leaf_count(), 3);
        assert_eq!(forest[1].leaf_count(), 1);
        assert_eq!(forest_leaf_count(&forest), 4);
        assert_eq!(forest[0].depth(), 3);
        assert_eq!(forest[1].depth(), 1);
        assert_eq!(forest_depth(&forest), 3);
    }

    #[test]
    fn test_empty_forest() {
        let forest: Vec<Tree<u8>> = Vec::new();
        assert_eq!(forest_leaf_count(&forest), 0);
        assert_eq!(forest_depth(&forest), 0);
        assert!(find_node_by_row_and_depth(&forest, 0, 0).is_none());
    }

    #[test]
    fn test_forest_leaf_paths() {
        let forest = create_test_forest();
        let paths: Vec<Vec<&str>> = forest_leaf_paths(&forest)
            .iter()
            .map(|path| path.iter().map(|n| n.value).collect())
            .collect();
        assert_eq!(paths.len(), forest_leaf_count(&forest));
        assert_eq!(paths[2], vec!["north", "oranges"]);
        assert_eq!(paths[3], vec!["south"]);
    }

    #[test]
    fn test_walk_reports_paths() {
        let forest = create_test_forest();
        let mut paths = Vec::new();
        forest[0].walk(&mut |node, path| {
            if node.is_leaf() {
                paths.push(path.iter().map(|n| n.value).collect::<Vec<_>>());
            }
        });
        assert_eq!(
            paths,
            vec![
                vec!["north", "apples", "q1"],
                vec!["north", "apples", "q2"],
                vec!["north", "oranges"],
            ]
        );
    }

    #[test]
    fn test_find_node_by_row_and_depth() {
        let forest = create_test_forest();
        let at = |row, depth| find_node_by_row_and_depth(&forest, row, depth).map(|n| n.value);

        assert_eq!(at(0, 0), Some("north"));
        assert_eq!(at(2, 0), Some("north"));
        assert_eq!(at(3, 0), Some("south"));
        assert_eq!(at(1, 1), Some("apples"));
        assert_eq!(at(2, 1), Some("oranges"));
        assert_eq!(at(1, 2), Some("q2"));
        // Shallow branches end before the last column.
        assert_eq!(at(2, 2), None);
        assert_eq!(at(3, 1), None);
        // Past the last leaf.
        assert_eq!(at(4, 0), None);
    }
}
