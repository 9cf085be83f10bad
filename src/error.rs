//! Error types shared by construction and growth.

use core::fmt;
use thiserror::Error;

/// Failures surfaced by `ProbeTable` and its builders.
///
/// Lookups never fail; a miss is reported as `None`/`false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// A required callback (`hash`, `equals` or `print`) was not supplied.
    #[error("missing required behavior: {0}")]
    MissingBehavior(&'static str),

    /// A `TableConfig` value is outside its domain.
    #[error("invalid table configuration: {reason}")]
    InvalidConfig {
        /// What was wrong with the configuration
        reason: &'static str,
    },

    /// Growing the table would overflow `usize`.
    #[error("capacity overflow: {capacity} slots x {factor}")]
    CapacityOverflow {
        /// Capacity at the time of the failed growth
        capacity: usize,
        /// Configured resize factor
        factor: usize,
    },

    /// The slot arrays could not be allocated.
    #[error("failed to allocate {capacity} slots")]
    AllocationFailed {
        /// Requested slot count
        capacity: usize,
    },
}

/// A `put` whose growth failed. Carries the rejected pair back to the
/// caller; the table is left as it was before the call.
#[derive(Error)]
#[error("{error}")]
pub struct PutError<K, V> {
    /// Why the table could not grow
    pub error: TableError,
    /// The key that was not stored
    pub key: K,
    /// The value that was not stored
    pub value: V,
}

impl<K, V> PutError<K, V> {
    /// Take back the rejected pair.
    pub fn into_inner(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> fmt::Debug for PutError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutError")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
