//! Depth-first dumps of a tree's shape, for debugging and tests.

use core::fmt;

use alloc::vec::Vec;

use super::BTree;
use crate::raw::Node;

/// One node of a [`BTree`], as reported by [`BTree::nodes`].
///
/// `height` is the node's distance from the root, which sits at height `0`.
#[derive(Debug, Eq, PartialEq)]
pub enum NodeView<'a, T> {
    /// A routing node.
    Internal {
        /// Distance from the root.
        height: usize,
        /// Separator keys, ascending.
        keys: &'a [T],
        /// Number of children; always `keys.len() + 1`.
        children: usize,
    },
    /// A leaf holding stored values.
    Leaf {
        /// Distance from the root.
        height: usize,
        /// Stored values, ascending.
        values: &'a [T],
    },
}

impl<'a, T> NodeView<'a, T> {
    fn new(height: usize, node: &'a Node<T>) -> Self {
        match node {
            Node::Internal(internal) => NodeView::Internal {
                height,
                keys: internal.keys(),
                children: internal.child_count(),
            },
            Node::Leaf(leaf) => NodeView::Leaf {
                height,
                values: leaf.values(),
            },
        }
    }

    /// Distance from the root.
    #[must_use]
    pub fn height(&self) -> usize {
        match *self {
            NodeView::Internal { height, .. } | NodeView::Leaf { height, .. } => height,
        }
    }

    /// Returns `true` for a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, NodeView::Leaf { .. })
    }

    /// Elements counted against the fan-out: keys or values.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            NodeView::Internal { keys, .. } => keys.len(),
            NodeView::Leaf { values, .. } => values.len(),
        }
    }

    /// Returns `true` if the node holds no keys or values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Clone for NodeView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeView<'_, T> {}

/// Leaf contents in order, each leaf closed by `"| "`. Created by [`BTree::print`].
pub struct Values<'a, T> {
    tree: &'a BTree<T>,
}

/// Every node depth-first with its height. Created by [`BTree::print_keys`].
pub struct Keys<'a, T> {
    tree: &'a BTree<T>,
}

/// One line per leaf with an `x` per stored value. Created by [`BTree::print_histogram`].
pub struct Histogram<'a, T> {
    tree: &'a BTree<T>,
}

impl<T> BTree<T> {
    /// Returns every node in depth-first pre-order: a node comes before its children,
    /// children left to right.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::{BTree, NodeView};
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend(1..=5);
    ///
    /// assert_eq!(
    ///     tree.nodes(),
    ///     [
    ///         NodeView::Internal { height: 0, keys: &[3][..], children: 2 },
    ///         NodeView::Leaf { height: 1, values: &[1, 2][..] },
    ///         NodeView::Leaf { height: 1, values: &[3, 4, 5][..] },
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeView<'_, T>> {
        self.raw.walk().map(|(height, node)| NodeView::new(height, node)).collect()
    }

    /// Separator keys of every internal node, grouped by height and ordered left to right
    /// within a level. Empty while the root is a leaf.
    #[must_use]
    pub fn levels(&self) -> Vec<Vec<&[T]>> {
        let mut levels: Vec<Vec<&[T]>> = Vec::new();
        for (height, node) in self.raw.walk() {
            if let Node::Internal(internal) = node {
                if levels.len() <= height {
                    levels.resize_with(height + 1, Vec::new);
                }
                levels[height].push(internal.keys());
            }
        }
        levels
    }

    /// Number of values in each leaf, left to right.
    #[must_use]
    pub fn histogram(&self) -> Vec<usize> {
        self.raw
            .walk()
            .filter_map(|(_, node)| match node {
                Node::Leaf(leaf) => Some(leaf.len()),
                Node::Internal(_) => None,
            })
            .collect()
    }

    /// Displays leaf contents in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend(1..=5);
    /// assert_eq!(tree.print().to_string(), "1 2 | 3 4 5 | ");
    /// ```
    pub fn print(&self) -> Values<'_, T> {
        Values { tree: self }
    }

    /// Displays every node with its height and keys (internal) or values (leaf).
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend(1..=5);
    /// assert_eq!(
    ///     tree.print_keys().to_string(),
    ///     "Node at height: 0\nKeys: 3 \n\
    ///      Leaf at height: 1\n| 1 2 | \n\
    ///      Leaf at height: 1\n| 3 4 5 | \n"
    /// );
    /// ```
    pub fn print_keys(&self) -> Keys<'_, T> {
        Keys { tree: self }
    }

    /// Displays the occupancy of each leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend(1..=5);
    /// assert_eq!(tree.print_histogram().to_string(), "x x \nx x x \n");
    /// ```
    pub fn print_histogram(&self) -> Histogram<'_, T> {
        Histogram { tree: self }
    }
}

fn write_values<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for value in values {
        write!(f, "{value} ")?;
    }
    f.write_str("| ")
}

impl<T: fmt::Display> fmt::Display for Values<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, node) in self.tree.raw.walk() {
            if let Node::Leaf(leaf) = node {
                write_values(f, leaf.values())?;
            }
        }
        Ok(())
    }
}

impl<T: fmt::Display> fmt::Display for Keys<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (height, node) in self.tree.raw.walk() {
            match node {
                Node::Internal(internal) => {
                    write!(f, "Node at height: {height}\nKeys: ")?;
                    for key in internal.keys() {
                        write!(f, "{key} ")?;
                    }
                    f.write_str("\n")?;
                }
                Node::Leaf(leaf) => {
                    write!(f, "Leaf at height: {height}\n| ")?;
                    write_values(f, leaf.values())?;
                    f.write_str("\n")?;
                }
            }
        }
        Ok(())
    }
}

impl<T> fmt::Display for Histogram<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for count in self.tree.histogram() {
            for _ in 0..count {
                f.write_str("x ")?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}
