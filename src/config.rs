//! Growth parameters for `ProbeTable`.

use crate::error::TableError;

/// Slot count of a freshly constructed table.
pub const INITIAL_CAPACITY: usize = 8;
/// Load factor above which an insert triggers a rehash.
pub const LOAD_THRESHOLD: f64 = 0.75;
/// Multiplier applied to the capacity on each rehash.
pub const RESIZE_FACTOR: usize = 2;

/// Capacity and growth settings, copied into the table at construction.
///
/// ```
/// use probe_table::TableConfig;
///
/// let config = TableConfig::new()
///     .with_initial_capacity(4)
///     .with_resize_factor(3);
/// assert_eq!(config.initial_capacity(), 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub(crate) initial_capacity: usize,
    pub(crate) load_threshold: f64,
    pub(crate) resize_factor: usize,
}

impl TableConfig {
    pub const fn new() -> Self {
        Self {
            initial_capacity: INITIAL_CAPACITY,
            load_threshold: LOAD_THRESHOLD,
            resize_factor: RESIZE_FACTOR,
        }
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }

    pub fn with_resize_factor(mut self, factor: usize) -> Self {
        self.resize_factor = factor;
        self
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    pub fn load_threshold(&self) -> f64 {
        self.load_threshold
    }

    pub fn resize_factor(&self) -> usize {
        self.resize_factor
    }

    /// Check the settings keep linear probing terminating and the load factor
    /// bounded.
    ///
    /// A threshold below one guarantees an empty slot after every insert. One
    /// growth step must also bring the table back under the threshold: before
    /// the triggering insert `size <= threshold * capacity`, so after it
    /// `size + 1 <= threshold * capacity * factor` needs
    /// `capacity * threshold * (factor - 1) >= 1`. Capacity only grows, so
    /// checking the initial capacity covers every later state.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.initial_capacity == 0 {
            return Err(TableError::InvalidConfig {
                reason: "initial capacity must be at least 1",
            });
        }
        if !(self.load_threshold > 0.0 && self.load_threshold < 1.0) {
            return Err(TableError::InvalidConfig {
                reason: "load threshold must lie strictly between 0 and 1",
            });
        }
        if self.resize_factor < 2 {
            return Err(TableError::InvalidConfig {
                reason: "resize factor must be at least 2",
            });
        }
        let headroom = self.initial_capacity as f64
            * self.load_threshold
            * (self.resize_factor - 1) as f64;
        if headroom < 1.0 {
            return Err(TableError::InvalidConfig {
                reason: "one growth step cannot restore the load threshold",
            });
        }
        Ok(())
    }

    /// Whether `size` occupied slots out of `capacity` exceed the threshold.
    pub(crate) fn exceeds_threshold(&self, size: usize, capacity: usize) -> bool {
        size as f64 / capacity as f64 > self.load_threshold
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let c = TableConfig::default();
        assert_eq!(c.initial_capacity(), 8);
        assert_eq!(c.load_threshold(), 0.75);
        assert_eq!(c.resize_factor(), 2);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_domain_values() {
        let zero = TableConfig::new().with_initial_capacity(0);
        assert!(matches!(
            zero.validate(),
            Err(TableError::InvalidConfig { .. })
        ));

        for t in [0.0, 1.0, 1.5, -0.25, f64::NAN] {
            let c = TableConfig::new().with_load_threshold(t);
            assert!(c.validate().is_err(), "threshold {t} accepted");
        }

        let flat = TableConfig::new().with_resize_factor(1);
        assert!(flat.validate().is_err());
    }

    /// Invariant: configs where a single growth step can leave the table above
    /// the threshold are rejected; the boundary `headroom == 1` is accepted.
    #[test]
    fn rejects_configs_one_growth_cannot_satisfy() {
        // 1 slot at 0.3: the first insert grows to 2 slots, still at 0.5.
        let shallow = TableConfig::new()
            .with_initial_capacity(1)
            .with_load_threshold(0.3);
        assert_eq!(
            shallow.validate(),
            Err(TableError::InvalidConfig {
                reason: "one growth step cannot restore the load threshold",
            })
        );

        let boundary = TableConfig::new()
            .with_initial_capacity(1)
            .with_load_threshold(0.5)
            .with_resize_factor(3);
        assert!(boundary.validate().is_ok());

        let tripled = TableConfig::new()
            .with_initial_capacity(1)
            .with_resize_factor(3);
        assert!(tripled.validate().is_ok());
        assert!(TableConfig::new().with_initial_capacity(2).validate().is_ok());
        assert!(TableConfig::new().with_initial_capacity(1).validate().is_err());
    }

    /// Threshold comparison is strict: 6/8 == 0.75 does not grow, 7/8 does.
    #[test]
    fn threshold_is_strict() {
        let c = TableConfig::default();
        assert!(!c.exceeds_threshold(6, 8));
        assert!(c.exceeds_threshold(7, 8));
    }
}
