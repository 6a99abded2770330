//! Thread-safe object pool
//!
//! [`SharedPool`] keeps a bounded set of idle objects in a lock-free
//! [`ArrayQueue`]. Renting never fails: when the queue is empty a fresh
//! object is built by the factory. Returning may be declined (queue full,
//! or the object reports itself as not reusable); a declined object is
//! simply dropped.

use crossbeam_queue::ArrayQueue;

use super::{ObjectPool, PoolConfig, PoolStats, Poolable};

/// Bounded, thread-safe object pool
///
/// # Example
/// ```
/// use nebula_memory::pool::{ObjectPool, SharedPool};
///
/// let pool = SharedPool::new(4, || String::with_capacity(256));
///
/// let mut s = pool.rent();
/// s.push_str("Hello, World!");
/// assert!(pool.give_back(s));
///
/// // The next rent reuses the cleared string
/// assert!(pool.rent().is_empty());
/// ```
pub struct SharedPool<T: Poolable> {
    idle: Option<ArrayQueue<T>>,
    factory: Box<dyn Fn() -> T + Send + Sync>,
    stats: PoolStats,
}

impl<T: Poolable> SharedPool<T> {
    /// Create new pool retaining at most `max_retained` idle objects
    pub fn new<F>(max_retained: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self::with_config(PoolConfig::bounded(max_retained), factory)
    }

    /// Create pool with custom configuration
    pub fn with_config<F>(config: PoolConfig, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let idle = (config.max_retained > 0).then(|| ArrayQueue::new(config.max_retained));

        if config.pre_warm
            && let Some(queue) = &idle
        {
            while !queue.is_full() {
                if queue.push(factory()).is_err() {
                    break;
                }
            }
        }

        Self {
            idle,
            factory: Box::new(factory),
            stats: PoolStats::default(),
        }
    }

    /// Number of idle objects ready to be rented
    #[must_use]
    pub fn available(&self) -> usize {
        self.idle.as_ref().map_or(0, ArrayQueue::len)
    }

    /// Maximum number of idle objects the pool retains
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.idle.as_ref().map_or(0, ArrayQueue::capacity)
    }

    /// Pool statistics
    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    /// Drop all idle objects
    pub fn clear(&self) {
        if let Some(queue) = &self.idle {
            while queue.pop().is_some() {}
        }
    }
}

impl<T: Poolable> ObjectPool<T> for SharedPool<T> {
    fn rent(&self) -> T {
        match self.idle.as_ref().and_then(ArrayQueue::pop) {
            Some(obj) => {
                self.stats.record_rent(true);
                obj
            }
            None => {
                self.stats.record_rent(false);
                tracing::trace!(pool = core::any::type_name::<T>(), "pool empty, allocating");
                (self.factory)()
            }
        }
    }

    fn give_back(&self, mut obj: T) -> bool {
        let Some(queue) = &self.idle else {
            self.stats.record_return(false);
            return false;
        };

        if !obj.is_reusable() {
            self.stats.record_return(false);
            return false;
        }

        obj.reset();
        let accepted = queue.push(obj).is_ok();
        if !accepted {
            tracing::trace!(pool = core::any::type_name::<T>(), "pool full, declining return");
        }
        self.stats.record_return(accepted);
        accepted
    }
}

impl<T: Poolable> core::fmt::Debug for SharedPool<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedPool")
            .field("available", &self.available())
            .field("capacity", &self.capacity())
            .field("factory", &"<function>")
            .finish()
    }
}
