//! Size-bucketed array pool
//!
//! Arrays are plain `Vec<T>` values whose *capacity* is the array length.
//! A rented array is always empty with `capacity() >= min_len`; callers
//! that need a hard bound treat the capacity as the limit and never grow
//! past it.

use crossbeam_queue::ArrayQueue;

use super::{ArrayPool, ArrayPoolConfig, PoolStats};

/// Thread-safe array pool with power-of-two size classes
///
/// # Example
/// ```
/// use nebula_memory::pool::{ArrayPool, BucketArrayPool};
///
/// let pool = BucketArrayPool::<u64>::new();
/// let buf = pool.rent(10);
/// assert!(buf.capacity() >= 10);
/// let ptr = buf.as_ptr();
/// pool.give_back(buf);
///
/// // Same size class, same allocation
/// assert_eq!(pool.rent(12).as_ptr(), ptr);
/// ```
pub struct BucketArrayPool<T> {
    buckets: Vec<ArrayQueue<Vec<T>>>,
    min_shift: u32,
    stats: PoolStats,
}

impl<T: Send> BucketArrayPool<T> {
    /// Pool with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ArrayPoolConfig::default())
    }

    /// Pool with custom configuration
    #[must_use]
    pub fn with_config(config: ArrayPoolConfig) -> Self {
        let min = config.min_array_len.max(1).next_power_of_two();
        let max = config.max_array_len.max(min).next_power_of_two();
        let min_shift = min.trailing_zeros();
        let classes = (max.trailing_zeros() - min_shift + 1) as usize;
        let per_bucket = config.arrays_per_bucket.max(1);

        Self {
            buckets: (0..classes).map(|_| ArrayQueue::new(per_bucket)).collect(),
            min_shift,
            stats: PoolStats::default(),
        }
    }

    /// Pool statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Length of the smallest size class
    #[must_use]
    pub fn min_array_len(&self) -> usize {
        1 << self.min_shift
    }

    fn class_len(&self, index: usize) -> usize {
        1 << (self.min_shift as usize + index)
    }

    fn bucket_for_request(&self, min_len: usize) -> Option<usize> {
        let len = min_len.max(1).checked_next_power_of_two()?;
        let shift = len.trailing_zeros().max(self.min_shift);
        let index = (shift - self.min_shift) as usize;
        (index < self.buckets.len()).then_some(index)
    }

    fn bucket_for_return(&self, capacity: usize) -> Option<usize> {
        if !capacity.is_power_of_two() {
            return None;
        }
        let shift = capacity.trailing_zeros();
        if shift < self.min_shift {
            return None;
        }
        let index = (shift - self.min_shift) as usize;
        (index < self.buckets.len()).then_some(index)
    }
}

impl<T: Send> Default for BucketArrayPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> ArrayPool<T> for BucketArrayPool<T> {
    fn rent(&self, min_len: usize) -> Vec<T> {
        let Some(index) = self.bucket_for_request(min_len) else {
            // Larger than any size class
            self.stats.record_rent(false);
            return Vec::with_capacity(min_len);
        };

        if let Some(array) = self.buckets[index].pop() {
            self.stats.record_rent(true);
            return array;
        }

        self.stats.record_rent(false);
        Vec::with_capacity(self.class_len(index))
    }

    fn give_back(&self, mut array: Vec<T>) {
        let Some(index) = self.bucket_for_return(array.capacity()) else {
            self.stats.record_return(false);
            return;
        };

        array.clear();
        let accepted = self.buckets[index].push(array).is_ok();
        self.stats.record_return(accepted);
    }
}

impl<T> core::fmt::Debug for BucketArrayPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BucketArrayPool")
            .field("classes", &self.buckets.len())
            .field("min_shift", &self.min_shift)
            .finish()
    }
}
