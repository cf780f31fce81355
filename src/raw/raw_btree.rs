use core::borrow::Borrow;
use core::iter::FusedIterator;

use log::{debug, trace};
use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{INLINE_CHILDREN, InternalNode, Node, SearchResult};

/// The core B+Tree implementation backing `BTree`.
#[derive(Clone)]
pub(crate) struct RawBTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node. A fresh or cleared tree has an empty leaf here.
    root: Handle,
    /// Maximum number of elements a node holds at rest.
    fan_out: usize,
    /// Number of values stored in the leaves, duplicates included.
    len: usize,
}

/// Stack of handles still to visit during a depth-first walk.
type Pending = SmallVec<[(Handle, usize); 16]>;

impl<T> RawBTree<T> {
    /// Creates a tree whose root is an empty leaf. `fan_out` is validated by the caller.
    pub(crate) fn new(fan_out: usize) -> Self {
        debug_assert!(fan_out >= 2, "`RawBTree::new()` - `fan_out` < 2!");
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new_leaf());
        Self {
            nodes,
            root,
            fan_out,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn fan_out(&self) -> usize {
        self.fan_out
    }

    pub(crate) const fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<T> {
        self.nodes.get(handle)
    }

    /// Number of internal levels above the leaves. All leaves sit at the same depth.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(0);
            height += 1;
        }
        height
    }

    /// Releases every node and starts over with an empty leaf root.
    pub(crate) fn clear(&mut self) {
        let released = self.nodes.len();
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf());
        self.len = 0;
        debug!("cleared tree, released {released} nodes");
    }

    /// Pre-order walk over every node with its distance from the root.
    pub(crate) fn walk(&self) -> Walk<'_, T> {
        let mut pending = Pending::new();
        pending.push((self.root, 0));
        Walk { tree: self, pending }
    }

    /// In-order iterator over every stored value.
    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter {
            walk: self.walk(),
            current: Default::default(),
            remaining: self.len,
        }
    }
}

impl<T: Ord + Clone> RawBTree<T> {
    /// Returns the handle of a leaf holding `value`, if any.
    pub(crate) fn search<Q>(&self, value: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search_from(self.root, value)
    }

    fn search_from<Q>(&self, handle: Handle, value: &Q) -> Option<Handle>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.nodes.get(handle) {
            Node::Leaf(leaf) => match leaf.search(value) {
                SearchResult::Found(_) => Some(handle),
                SearchResult::NotFound(_) => None,
            },
            Node::Internal(internal) => internal
                .search_children(value)
                .find_map(|idx| self.search_from(internal.child(idx), value)),
        }
    }

    /// Inserts `value`, splitting the receiving leaf and its ancestors as needed.
    pub(crate) fn insert(&mut self, value: T) {
        let mut current = self.root;
        while let Node::Internal(internal) = self.nodes.get(current) {
            current = internal.child(internal.insert_child(&value));
        }

        self.nodes.get_mut(current).as_leaf_mut().insert(value);
        self.len += 1;
        self.split(current);
    }

    /// Removes one copy of `value`. Returns false, leaving the tree untouched, when absent.
    /// Leaves are never merged, so an erase can leave a leaf empty.
    pub(crate) fn erase<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(leaf) = self.search(value) else {
            return false;
        };
        let removed = self.nodes.get_mut(leaf).as_leaf_mut().remove(value).is_some();
        debug_assert!(removed, "`RawBTree::erase()` - search returned a leaf without the value!");
        self.len -= 1;
        true
    }

    /// Split engine. Splits `handle` while it holds more than `fan_out` elements, then
    /// moves on to its parent, which just gained a separator and may overflow in turn.
    fn split(&mut self, mut handle: Handle) {
        let fan_out = self.fan_out;

        while self.nodes.get(handle).len() > fan_out {
            let (separator, sibling) = match self.nodes.get_mut(handle) {
                Node::Leaf(leaf) => {
                    let (separator, right) = leaf.split(fan_out);
                    (separator, Node::Leaf(right))
                }
                Node::Internal(internal) => {
                    let (separator, right) = internal.split(fan_out);
                    (separator, Node::Internal(right))
                }
            };
            let sibling = self.nodes.alloc(sibling);

            let adopted: SmallVec<[Handle; INLINE_CHILDREN]> = match self.nodes.get(sibling) {
                Node::Internal(internal) => SmallVec::from_slice(internal.children()),
                Node::Leaf(_) => SmallVec::new(),
            };
            for child in adopted {
                self.nodes.get_mut(child).set_parent(Some(sibling));
            }

            let parent = self.parent_or_new_root(handle);
            self.nodes.get_mut(sibling).set_parent(Some(parent));

            let parent_node = self.nodes.get_mut(parent).as_internal_mut();
            let index = parent_node
                .position_of(handle)
                .expect("`RawBTree::split()` - node is missing from its parent!");
            parent_node.insert_separator(index, separator, sibling);

            trace!(
                "split node {} into {} (leaf: {}), parent {} now holds {} keys",
                handle.to_index(),
                sibling.to_index(),
                self.nodes.get(sibling).is_leaf(),
                parent.to_index(),
                self.nodes.get(parent).len()
            );

            handle = parent;
        }
    }

    /// Returns the parent of `handle`. A parentless node is the root: it gets a new
    /// internal root above it, and the tree's root is replaced in the same step.
    fn parent_or_new_root(&mut self, handle: Handle) -> Handle {
        if let Some(parent) = self.nodes.get(handle).parent() {
            return parent;
        }

        debug_assert_eq!(handle, self.root, "`RawBTree::split()` - parentless node is not the root!");
        let root = self.nodes.alloc(Node::Internal(InternalNode::with_first_child(handle)));
        self.nodes.get_mut(handle).set_parent(Some(root));
        self.root = root;
        trace!("promoted node {} to root, height is now {}", root.to_index(), self.height());
        root
    }
}

/// Pre-order node walk, see [`RawBTree::walk`].
pub(crate) struct Walk<'a, T> {
    tree: &'a RawBTree<T>,
    pending: Pending,
}

impl<'a, T> Iterator for Walk<'a, T> {
    type Item = (usize, &'a Node<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let (handle, height) = self.pending.pop()?;
        let tree = self.tree;
        let node = tree.nodes.get(handle);
        if let Node::Internal(internal) = node {
            self.pending.extend(internal.children().iter().rev().map(|&child| (child, height + 1)));
        }
        Some((height, node))
    }
}

impl<T> FusedIterator for Walk<'_, T> {}

/// In-order value iterator, see [`RawBTree::iter`].
pub(crate) struct Iter<'a, T> {
    walk: Walk<'a, T>,
    current: core::slice::Iter<'a, T>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(value) = self.current.next() {
                self.remaining -= 1;
                return Some(value);
            }
            match self.walk.next()? {
                (_, Node::Leaf(leaf)) => self.current = leaf.values().iter(),
                (_, Node::Internal(_)) => {}
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            walk: Walk {
                tree: self.walk.tree,
                pending: self.walk.pending.clone(),
            },
            current: self.current.clone(),
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    impl<T: Ord + Clone + core::fmt::Debug> RawBTree<T> {
        /// Validates every structural invariant, panicking with a description of the
        /// first violation. Intended to catch tree corruption in tests.
        pub(crate) fn validate_invariants(&self) {
            assert_eq!(self.nodes.get(self.root).parent(), None, "root has a parent");

            let mut leaf_depths = Vec::new();
            let count = self.validate_node(self.root, None, None, 0, &mut leaf_depths);
            assert_eq!(count, self.len, "stored values disagree with len");

            leaf_depths.dedup();
            assert_eq!(leaf_depths.len(), 1, "leaves at different depths: {leaf_depths:?}");
            assert_eq!(leaf_depths[0], self.height(), "height disagrees with leaf depth");

            let walked = self.walk().count();
            assert_eq!(walked, self.nodes.len(), "arena holds unreachable nodes");
        }

        fn validate_node(
            &self,
            handle: Handle,
            lower: Option<&T>,
            upper: Option<&T>,
            depth: usize,
            leaf_depths: &mut Vec<usize>,
        ) -> usize {
            let node = self.nodes.get(handle);
            assert!(node.len() <= self.fan_out, "node {handle:?} holds {} > {}", node.len(), self.fan_out);

            let elements: &[T] = match node {
                Node::Leaf(leaf) => leaf.values(),
                Node::Internal(internal) => internal.keys(),
            };
            assert!(elements.is_sorted(), "node {handle:?} out of order: {elements:?}");
            for element in elements {
                assert!(lower.is_none_or(|lo| lo <= element), "{element:?} below bound {lower:?}");
                assert!(upper.is_none_or(|hi| element <= hi), "{element:?} above bound {upper:?}");
            }

            match node {
                Node::Leaf(leaf) => {
                    leaf_depths.push(depth);
                    leaf.len()
                }
                Node::Internal(internal) => {
                    assert_eq!(internal.child_count(), internal.key_count() + 1, "arity broken at {handle:?}");
                    let keys = internal.keys();
                    let mut count = 0;
                    for (idx, &child) in internal.children().iter().enumerate() {
                        assert_eq!(self.nodes.get(child).parent(), Some(handle), "stale parent link");
                        let lo = if idx == 0 { lower } else { Some(&keys[idx - 1]) };
                        let hi = keys.get(idx).or(upper);
                        count += self.validate_node(child, lo, hi, depth + 1, leaf_depths);
                    }
                    count
                }
            }
        }

        fn leaf_sizes(&self) -> Vec<usize> {
            self.walk()
                .filter_map(|(_, node)| match node {
                    Node::Leaf(leaf) => Some(leaf.len()),
                    Node::Internal(_) => None,
                })
                .collect()
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Erase(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..200).prop_map(Op::Insert),
            1 => (0i32..200).prop_map(Op::Erase),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_operation(
            fan_out in 2usize..9,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree: RawBTree<i32> = RawBTree::new(fan_out);
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(value) => {
                        tree.insert(value);
                        let idx = model.partition_point(|&v| v < value);
                        model.insert(idx, value);
                    }
                    Op::Erase(value) => {
                        let expected = model.binary_search(&value).ok().map(|idx| model.remove(idx));
                        prop_assert_eq!(tree.erase(&value), expected.is_some());
                    }
                }
                tree.validate_invariants();
            }

            let contents: Vec<i32> = tree.iter().copied().collect();
            prop_assert_eq!(contents, model.clone());
            for value in 0..200 {
                prop_assert_eq!(tree.search(&value).is_some(), model.contains(&value));
            }
        }

        #[test]
        fn duplicate_runs_stay_searchable(fan_out in 2usize..6, copies in 1usize..40) {
            let mut tree: RawBTree<i32> = RawBTree::new(fan_out);
            for _ in 0..copies {
                tree.insert(1);
                tree.insert(7);
            }
            tree.validate_invariants();

            for remaining in (0..copies).rev() {
                prop_assert!(tree.erase(&7));
                prop_assert_eq!(tree.search(&7).is_some(), remaining > 0);
                tree.validate_invariants();
            }
            prop_assert!(!tree.erase(&7));
            prop_assert_eq!(tree.len(), copies);
        }
    }

    #[test]
    fn fresh_tree_is_single_empty_leaf() {
        let tree: RawBTree<i32> = RawBTree::new(4);
        tree.validate_invariants();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.node_count(), 1);
        assert!(tree.node(tree.root).is_leaf());
        assert!(tree.search(&1).is_none());
    }

    #[test]
    fn fifth_insert_splits_root_leaf() {
        let mut tree: RawBTree<i32> = RawBTree::new(4);
        for value in 1..=4 {
            tree.insert(value);
        }
        assert_eq!(tree.height(), 0);

        tree.insert(5);
        tree.validate_invariants();
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node_count(), 3);

        let Node::Internal(root) = tree.node(tree.root) else {
            panic!("root should be internal after a split");
        };
        assert_eq!(root.keys(), &[3]);
        assert_eq!(tree.leaf_sizes(), [2, 3]);
        assert!(tree.search(&3).is_some());
        assert!(tree.search(&6).is_none());
    }

    #[test]
    fn ascending_inserts_split_internal_nodes() {
        let mut tree: RawBTree<i32> = RawBTree::new(4);
        for value in 1..=20 {
            tree.insert(value);
            tree.validate_invariants();
        }
        assert_eq!(tree.height(), 2);
        assert!(tree.iter().copied().eq(1..=20));
        assert!(tree.leaf_sizes().iter().all(|&n| n <= 4));
    }

    #[test]
    fn search_finds_leaf_that_holds_value() {
        let mut tree: RawBTree<i32> = RawBTree::new(3);
        for value in (0..50).rev() {
            tree.insert(value);
        }
        for value in 0..50 {
            let leaf = tree.search(&value).expect("value should be present");
            assert!(tree.node(leaf).as_leaf().values().contains(&value));
        }
    }

    #[test]
    fn erase_leaves_empty_leaf_in_place() {
        let mut tree: RawBTree<i32> = RawBTree::new(2);
        for value in 1..=6 {
            tree.insert(value);
        }
        let nodes = tree.node_count();
        for value in 1..=6 {
            assert!(tree.erase(&value));
        }
        tree.validate_invariants();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.node_count(), nodes);
        assert!(tree.leaf_sizes().iter().all(|&n| n == 0));
        assert_eq!(tree.iter().next(), None);
    }

    #[test]
    fn clear_resets_to_single_leaf() {
        let mut tree: RawBTree<i32> = RawBTree::new(2);
        for value in 0..100 {
            tree.insert(value);
        }
        tree.clear();
        tree.validate_invariants();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.height(), 0);

        tree.insert(42);
        assert!(tree.search(&42).is_some());
    }

    #[test]
    fn iter_reports_exact_size() {
        let mut tree: RawBTree<i32> = RawBTree::new(3);
        for value in 0..25 {
            tree.insert(value % 5);
        }
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 25);
        iter.next();
        assert_eq!(iter.len(), 24);
        assert_eq!(iter.clone().count(), 24);
    }

    #[test]
    fn walk_reports_heights_in_pre_order() {
        let mut tree: RawBTree<i32> = RawBTree::new(4);
        for value in 1..=5 {
            tree.insert(value);
        }
        let heights: Vec<usize> = tree.walk().map(|(height, _)| height).collect();
        assert_eq!(heights, [0, 1, 1]);
    }
}
