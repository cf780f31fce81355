//! Error types for the tree.
//!
//! Only configuration can fail. A value missing from the tree is an ordinary outcome and
//! is reported through `Option`/`bool`, never through [`Error`].

use thiserror::Error;

/// Convenient result alias for fallible tree operations.
pub type Result<T> = core::result::Result<T, Error>;

/// All errors a tree can report.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// The requested fan-out cannot hold a split: a node must keep at least one element
    /// on each side of the promoted separator.
    #[error("fan-out {fan_out} is below the minimum of {min}")]
    InvalidFanOut {
        /// The rejected fan-out.
        fan_out: usize,
        /// The smallest accepted fan-out.
        min: usize,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn invalid_fan_out_display() {
        let err = Error::InvalidFanOut { fan_out: 1, min: 2 };
        assert_eq!(err.to_string(), "fan-out 1 is below the minimum of 2");
    }

    #[test]
    fn error_is_core_error() {
        fn assert_error<E: core::error::Error + Send + Sync + 'static>() {}
        assert_error::<Error>();
    }
}
