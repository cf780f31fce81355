use core::borrow::Borrow;
use core::ops::RangeInclusive;

use smallvec::SmallVec;

use super::handle::Handle;

/// Elements stored inline before a node spills to the heap. Fan-out is a runtime value,
/// so this only sizes the common case of small trees.
pub(crate) const INLINE_KEYS: usize = 8;
pub(crate) const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

#[allow(clippy::large_enum_variant)]
#[derive(Clone)]
pub(crate) enum Node<T> {
    Internal(InternalNode<T>),
    Leaf(LeafNode<T>),
}

// B+Tree: internal nodes store separator keys and child handles.
//
// Routing: keys[i - 1] <= everything under children[i] <= keys[i]. A value equal to a
// separator is inserted on its right side.
#[derive(Clone)]
pub(crate) struct InternalNode<T> {
    parent: Option<Handle>,
    // Holds one extra key/child between an overflowing insert and the split that follows.
    keys: SmallVec<[T; INLINE_KEYS]>,
    children: SmallVec<[Handle; INLINE_CHILDREN]>,
}

// B+Tree: leaf nodes store the values themselves, ascending, duplicates adjacent.
#[derive(Clone)]
pub(crate) struct LeafNode<T> {
    parent: Option<Handle>,
    values: SmallVec<[T; INLINE_KEYS]>,
}

/// Result of searching for a value in a leaf.
pub(crate) enum SearchResult {
    /// Value was found at the given index (the first of any duplicates).
    Found(usize),
    /// Value was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<T> Node<T> {
    /// Creates a new empty leaf node.
    pub(crate) fn new_leaf() -> Self {
        Node::Leaf(LeafNode::new())
    }

    /// Returns true if this is a leaf node.
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Returns the leaf node, panicking if this is not a leaf.
    pub(crate) fn as_leaf(&self) -> &LeafNode<T> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the leaf node mutably, panicking if this is not a leaf.
    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<T> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Internal(_) => panic!("expected leaf node"),
        }
    }

    /// Returns the internal node mutably, panicking if this is not internal.
    pub(crate) fn as_internal_mut(&mut self) -> &mut InternalNode<T> {
        match self {
            Node::Internal(internal) => internal,
            Node::Leaf(_) => panic!("expected internal node"),
        }
    }

    /// Number of elements counted against the fan-out: values for a leaf, separator keys
    /// for an internal node.
    pub(crate) fn len(&self) -> usize {
        match self {
            Node::Internal(internal) => internal.key_count(),
            Node::Leaf(leaf) => leaf.len(),
        }
    }

    pub(crate) fn parent(&self) -> Option<Handle> {
        match self {
            Node::Internal(internal) => internal.parent,
            Node::Leaf(leaf) => leaf.parent,
        }
    }

    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        match self {
            Node::Internal(internal) => internal.parent = parent,
            Node::Leaf(leaf) => leaf.parent = parent,
        }
    }
}

impl<T> InternalNode<T> {
    /// Creates a parentless internal node whose only child is `child`. Used when the root
    /// splits; the separator and right sibling are attached right after.
    pub(crate) fn with_first_child(child: Handle) -> Self {
        let mut children = SmallVec::new();
        children.push(child);
        Self {
            parent: None,
            keys: SmallVec::new(),
            children,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn keys(&self) -> &[T] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[Handle] {
        &self.children
    }

    /// Position of `child` among this node's children.
    pub(crate) fn position_of(&self, child: Handle) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }

    /// Child an insertion of `value` descends into: the first separator strictly greater
    /// than `value`, so values equal to a separator go right.
    #[inline]
    pub(crate) fn insert_child<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() <= value)
    }

    /// Children whose key range can hold `value`. A single child unless `value` equals
    /// one or more separators, in which case a run of duplicates may straddle them.
    #[inline]
    pub(crate) fn search_children<Q>(&self, value: &Q) -> RangeInclusive<usize>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let first = self.keys.partition_point(|k| k.borrow() < value);
        first..=self.insert_child(value)
    }

    /// Inserts `key` at `index` and `child` right after it, at `index + 1`.
    pub(crate) fn insert_separator(&mut self, index: usize, key: T, child: Handle) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
        debug_assert_eq!(self.children.len(), self.keys.len() + 1);
    }

    /// Splits an overflowing node around `keys[fan_out / 2]`. Returns the promoted key,
    /// which neither half keeps, and the new right sibling. The caller fixes the parent
    /// links of the sibling and of the children it took over.
    pub(crate) fn split(&mut self, fan_out: usize) -> (T, InternalNode<T>) {
        let mid = fan_out / 2;
        debug_assert!(mid < self.keys.len(), "split of an internal node that is not overfull");

        let right = InternalNode {
            parent: self.parent,
            keys: self.keys.drain(mid + 1..).collect(),
            children: self.children.drain(mid + 1..).collect(),
        };
        let median = self.keys.pop().expect("`InternalNode::split()` - no median key!");

        assert_eq!(self.children.len(), self.keys.len() + 1, "left half lost child/key arity");
        assert_eq!(right.children.len(), right.keys.len() + 1, "right half lost child/key arity");

        (median, right)
    }
}

impl<T> LeafNode<T> {
    /// Creates a new empty, parentless leaf node.
    pub(crate) fn new() -> Self {
        Self {
            parent: None,
            values: SmallVec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    pub(crate) fn values(&self) -> &[T] {
        &self.values
    }

    /// Searches for a value in this leaf. Duplicates resolve to the leftmost copy.
    #[inline]
    pub(crate) fn search<Q>(&self, value: &Q) -> SearchResult
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let idx = self.values.partition_point(|v| v.borrow() < value);
        match self.values.get(idx) {
            Some(v) if v.borrow() == value => SearchResult::Found(idx),
            _ => SearchResult::NotFound(idx),
        }
    }

    /// Inserts `value` at its lower-bound position, ahead of any equal values.
    pub(crate) fn insert(&mut self, value: T)
    where
        T: Ord,
    {
        let idx = match self.search(&value) {
            SearchResult::Found(idx) | SearchResult::NotFound(idx) => idx,
        };
        self.values.insert(idx, value);
    }

    /// Removes the first copy of `value`, if any.
    pub(crate) fn remove<Q>(&mut self, value: &Q) -> Option<T>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(value) {
            SearchResult::Found(idx) => Some(self.values.remove(idx)),
            SearchResult::NotFound(_) => None,
        }
    }

    /// Splits an overflowing leaf. `values[fan_out / 2..]` move to the returned right
    /// sibling and a copy of its first value becomes the separator. No stored value is
    /// duplicated.
    pub(crate) fn split(&mut self, fan_out: usize) -> (T, LeafNode<T>)
    where
        T: Clone,
    {
        let mid = fan_out / 2;
        debug_assert!(mid < self.values.len(), "split of a leaf that is not overfull");

        let right = LeafNode {
            parent: self.parent,
            values: self.values.drain(mid..).collect(),
        };
        let separator = right.values[0].clone();

        (separator, right)
    }
}
