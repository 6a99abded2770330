//! Pool configuration

/// Configuration for [`SharedPool`](super::SharedPool)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of idle objects kept for reuse.
    ///
    /// Returns beyond this bound are declined. Zero disables retention.
    pub max_retained: usize,

    /// Fill the pool with `max_retained` objects on construction
    pub pre_warm: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained: default_retained(),
            pre_warm: false,
        }
    }
}

impl PoolConfig {
    /// Pool that retains at most `max_retained` idle objects
    #[must_use]
    pub fn bounded(max_retained: usize) -> Self {
        Self {
            max_retained,
            pre_warm: false,
        }
    }

    /// Enable pre-warming
    #[must_use = "builder methods must be chained or built"]
    pub fn with_pre_warm(mut self) -> Self {
        self.pre_warm = true;
        self
    }
}

/// Configuration for [`BucketArrayPool`](super::BucketArrayPool)
///
/// Arrays are grouped in power-of-two size classes between
/// `min_array_len` and `max_array_len`. Requests above the largest class
/// are served with a fresh, unpooled allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayPoolConfig {
    /// Smallest size class (rounded up to a power of two)
    pub min_array_len: usize,
    /// Largest size class (rounded up to a power of two)
    pub max_array_len: usize,
    /// Idle arrays retained per size class
    pub arrays_per_bucket: usize,
}

impl Default for ArrayPoolConfig {
    fn default() -> Self {
        Self {
            min_array_len: 16,
            max_array_len: 1024 * 1024,
            arrays_per_bucket: default_retained() * 4,
        }
    }
}

impl ArrayPoolConfig {
    /// Sets the number of idle arrays kept per size class.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_arrays_per_bucket(mut self, count: usize) -> Self {
        self.arrays_per_bucket = count;
        self
    }

    /// Sets the size class range.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_len_range(mut self, min: usize, max: usize) -> Self {
        self.min_array_len = min;
        self.max_array_len = max;
        self
    }
}

/// Twice the available parallelism, the default retention for shared pools.
#[must_use]
pub fn default_retained() -> usize {
    std::thread::available_parallelism().map_or(8, |n| n.get() * 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded() {
        let config = PoolConfig::bounded(4).with_pre_warm();
        assert_eq!(config.max_retained, 4);
        assert!(config.pre_warm);
    }

    #[test]
    fn test_default_retained_is_positive() {
        assert!(default_retained() >= 2);
        assert_eq!(PoolConfig::default().max_retained, default_retained());
    }

    #[test]
    fn test_array_config_builder() {
        let config = ArrayPoolConfig::default()
            .with_arrays_per_bucket(3)
            .with_len_range(8, 64);
        assert_eq!(config.arrays_per_bucket, 3);
        assert_eq!(config.min_array_len, 8);
        assert_eq!(config.max_array_len, 64);
    }
}
