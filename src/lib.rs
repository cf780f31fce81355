//! An arena-backed B+Tree with a configurable fan-out.
//!
//! [`BTree`] is an ordered multiset: values live in the leaves in ascending order, internal
//! nodes hold separator keys that route searches and insertions. A node that grows past
//! the fan-out splits in two and promotes a separator to its parent; the split propagates
//! upward until an ancestor has room, growing a new root when it reaches the top.
//!
//! # Example
//!
//! ```
//! use splitting_btree::BTree;
//!
//! let mut tree = BTree::new(4).unwrap();
//! tree.extend(1..=20);
//!
//! assert!(tree.contains(&13));
//! assert!(!tree.contains(&21));
//! assert_eq!(tree.height(), 2);
//!
//! // Erasing is a plain removal from the leaf; nodes are never merged.
//! assert!(tree.erase(&13));
//! assert_eq!(tree.len(), 19);
//!
//! // Diagnostic dumps of the shape.
//! assert_eq!(tree.histogram().iter().sum::<usize>(), 19);
//! println!("{}", tree.print_keys());
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Duplicates allowed** - Equal values are stored side by side and erased one at a time
//! - **Index-based nodes** - Nodes live in an arena and refer to their parent and children
//!   by handle, so splits reach ancestors in O(1) per level
//!
//! # Logging
//!
//! Splits and root promotions are reported at `trace` level and clears at `debug` level
//! through the [`log`] facade. Nothing is printed unless the application installs a logger.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;
#[cfg(test)]
#[macro_use]
extern crate std;

mod raw;

pub mod btree;
pub mod config;
pub mod error;

pub use btree::{BTree, LeafRef, NodeView};
pub use config::Config;
pub use error::{Error, Result};
