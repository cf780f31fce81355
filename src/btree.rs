//! The tree, its search handle and its iterator.

use core::borrow::Borrow;
use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::config::{Config, DEFAULT_FAN_OUT};
use crate::error::Result;
use crate::raw::{self, RawBTree};

mod diagnostics;

pub use diagnostics::{Histogram, Keys, NodeView, Values};

/// An ordered multiset stored in a B+Tree with a configurable fan-out.
///
/// Values live in the leaves, ascending, with duplicates kept next to each other.
/// Internal nodes only route. Every node holds at most `fan_out` elements at rest; an
/// insertion that overflows a leaf splits it, and the split travels up through every
/// ancestor that overflows in turn, growing a new root when it reaches the top.
///
/// Erasing never merges or rebalances nodes. A tree that shrinks a lot keeps its shape
/// and can end up with many sparse or empty leaves; [`clear`](BTree::clear) starts over.
///
/// # Examples
///
/// ```
/// use splitting_btree::BTree;
///
/// let mut tree = BTree::new(4).unwrap();
/// for value in [5, 1, 4, 2, 3] {
///     tree.insert(value);
/// }
///
/// assert!(tree.contains(&3));
/// assert!(tree.search(&6).is_none());
/// assert_eq!(tree.to_vec(), [1, 2, 3, 4, 5]);
///
/// // The fifth insert overflowed the root leaf.
/// assert_eq!(tree.height(), 1);
///
/// tree.erase(&3);
/// assert!(!tree.contains(&3));
/// ```
#[derive(Clone)]
pub struct BTree<T> {
    raw: RawBTree<T>,
}

/// Read-only view of the leaf a [`BTree::search`] landed in.
///
/// The view borrows the tree, so it cannot be held across a mutation.
///
/// # Examples
///
/// ```
/// use splitting_btree::BTree;
///
/// let mut tree: BTree<u32> = BTree::new(2).unwrap();
/// tree.extend([10, 20, 20, 30]);
///
/// let leaf = tree.search(&20).unwrap();
/// assert!(leaf.contains(&20));
/// assert!(leaf.len() <= tree.fan_out());
/// ```
pub struct LeafRef<'a, T> {
    values: &'a [T],
}

/// An iterator over the values of a [`BTree`] in ascending order.
///
/// This `struct` is created by the [`iter`](BTree::iter) method on [`BTree`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: raw::Iter<'a, T>,
}

impl<T> BTree<T> {
    /// Creates an empty tree whose nodes split once they exceed `fan_out` elements.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFanOut`](crate::Error::InvalidFanOut) if `fan_out < 2`.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::{BTree, Error};
    ///
    /// assert!(BTree::<i32>::new(3).is_ok());
    /// assert_eq!(BTree::<i32>::new(1).err(), Some(Error::InvalidFanOut { fan_out: 1, min: 2 }));
    /// ```
    pub fn new(fan_out: usize) -> Result<Self> {
        Self::with_config(Config::new(fan_out))
    }

    /// Creates an empty tree from a [`Config`].
    ///
    /// # Errors
    ///
    /// Whatever [`Config::validate`] reports.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            raw: RawBTree::new(config.fan_out),
        })
    }

    /// Returns the configuration the tree was built with.
    #[must_use]
    pub fn config(&self) -> Config {
        Config::new(self.raw.fan_out())
    }

    /// Returns the maximum number of elements a node holds at rest.
    #[must_use]
    pub fn fan_out(&self) -> usize {
        self.raw.fan_out()
    }

    /// Returns the number of stored values, counting every duplicate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree stores no values.
    ///
    /// An empty tree may still have many (empty) nodes after erasures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.len() == 0
    }

    /// Returns the number of internal levels above the leaves; `0` while the root is a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Returns the number of nodes, leaves and internal nodes alike.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    /// Releases every node and leaves the tree as freshly constructed: one empty leaf.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(2).unwrap();
    /// tree.extend(0..100);
    /// tree.clear();
    ///
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.node_count(), 1);
    /// tree.insert(7);
    /// assert!(tree.contains(&7));
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Gets an iterator that visits the values in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(3).unwrap();
    /// tree.extend([3, 1, 2, 1]);
    ///
    /// let values: Vec<_> = tree.iter().copied().collect();
    /// assert_eq!(values, [1, 1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { inner: self.raw.iter() }
    }

    /// Copies every value into a `Vec`, in ascending order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: Ord + Clone> BTree<T> {
    /// Inserts `value`. Duplicates are kept: inserting a value twice stores two copies.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.insert(9);
    /// tree.insert(9);
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn insert(&mut self, value: T) {
        self.raw.insert(value);
    }

    /// Finds the leaf holding `value`. `None` is the normal answer for an absent value.
    pub fn search<Q>(&self, value: &Q) -> Option<LeafRef<'_, T>>
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let leaf = self.raw.search(value)?;
        Some(LeafRef {
            values: self.raw.node(leaf).as_leaf().values(),
        })
    }

    /// Returns `true` if at least one copy of `value` is stored.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.search(value).is_some()
    }

    /// Removes one copy of `value`. Returns whether a copy was removed; erasing an absent
    /// value changes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use splitting_btree::BTree;
    ///
    /// let mut tree = BTree::new(4).unwrap();
    /// tree.extend([1, 1]);
    ///
    /// assert!(tree.erase(&1));
    /// assert_eq!(tree.to_vec(), [1]);
    /// assert!(!tree.erase(&5));
    /// ```
    pub fn erase<Q>(&mut self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.erase(value)
    }
}

impl<T> Default for BTree<T> {
    /// Creates an empty tree with [`DEFAULT_FAN_OUT`].
    fn default() -> Self {
        Self {
            raw: RawBTree::new(DEFAULT_FAN_OUT),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for BTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: Ord + Clone> Extend<T> for BTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}

impl<'a, T: Ord + Copy + 'a> Extend<&'a T> for BTree<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: Ord + Clone> FromIterator<T> for BTree<T> {
    /// Builds a tree with [`DEFAULT_FAN_OUT`].
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, T> IntoIterator for &'a BTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> LeafRef<'a, T> {
    /// The leaf's values, ascending.
    #[must_use]
    pub fn values(&self) -> &'a [T] {
        self.values
    }

    /// Number of values in the leaf.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the leaf is empty. A leaf returned by a search never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if the leaf holds `value`.
    pub fn contains<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.count(value) > 0
    }

    /// Number of copies of `value` in this leaf. A long run of duplicates can span
    /// several leaves, so this is not the count for the whole tree.
    pub fn count<Q>(&self, value: &Q) -> usize
    where
        T: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let start = self.values.partition_point(|v| v.borrow() < value);
        let end = self.values.partition_point(|v| v.borrow() <= value);
        end - start
    }
}

impl<T> Clone for LeafRef<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LeafRef<'_, T> {}

impl<T: fmt::Debug> fmt::Debug for LeafRef<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LeafRef").field(&self.values).finish()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
