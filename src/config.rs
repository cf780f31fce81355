//! Tree configuration.

use crate::error::{Error, Result};

/// Smallest fan-out for which a split leaves both halves non-empty.
pub const MIN_FAN_OUT: usize = 2;

/// Fan-out used by [`Config::default`].
pub const DEFAULT_FAN_OUT: usize = 4;

/// Construction parameters of a [`BTree`](crate::BTree).
///
/// # Examples
///
/// ```
/// use splitting_btree::{BTree, Config};
///
/// let tree: BTree<u32> = BTree::with_config(Config::new(8)).unwrap();
/// assert_eq!(tree.fan_out(), 8);
///
/// assert!(Config::new(1).validate().is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Config {
    /// Maximum number of elements a node holds at rest: values in a leaf, separator keys
    /// in an internal node. Inserting one more splits the node.
    pub fan_out: usize,
}

impl Config {
    /// Creates a configuration with the given fan-out. Nothing is checked until
    /// [`validate`](Config::validate) or tree construction.
    #[must_use]
    pub const fn new(fan_out: usize) -> Self {
        Self { fan_out }
    }

    /// Checks that the configuration can build a well-formed tree.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFanOut`] if `fan_out` is below [`MIN_FAN_OUT`].
    pub const fn validate(&self) -> Result<()> {
        if self.fan_out < MIN_FAN_OUT {
            return Err(Error::InvalidFanOut {
                fan_out: self.fan_out,
                min: MIN_FAN_OUT,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_OUT)
    }
}
