//! Object and array pooling
//!
//! Two contracts sit at the center of this module:
//!
//! - [`ObjectPool`]: `rent() -> T` and `give_back(T) -> bool`, where `false`
//!   means the pool declined the item (it is then simply dropped).
//! - [`ArrayPool`]: `rent(min_len) -> Vec<T>` with `capacity() >= min_len`,
//!   and `give_back(Vec<T>)`.
//!
//! [`SharedPool`] and [`BucketArrayPool`] are the lock-free implementations.
//! Both are safe to share across threads; callers are expected to hold
//! them behind an `Arc` or in a `static`.

mod array_pool;
mod config;
mod object_pool;
mod poolable;
mod stats;

pub use array_pool::BucketArrayPool;
pub use config::{ArrayPoolConfig, PoolConfig, default_retained};
pub use object_pool::SharedPool;
pub use poolable::Poolable;
pub use stats::{PoolStats, PoolStatsSnapshot};

/// Pool of reusable objects
pub trait ObjectPool<T>: Send + Sync {
    /// Take an object from the pool, allocating when none is idle.
    fn rent(&self) -> T;

    /// Hand an object back. Returns `false` when the pool declined it.
    fn give_back(&self, item: T) -> bool;
}

/// Pool of reusable arrays
pub trait ArrayPool<T>: Send + Sync {
    /// Take an empty array with `capacity() >= min_len`.
    fn rent(&self, min_len: usize) -> Vec<T>;

    /// Hand an array back. Its contents are dropped.
    fn give_back(&self, array: Vec<T>);
}

impl<T, P: ObjectPool<T> + ?Sized> ObjectPool<T> for std::sync::Arc<P> {
    fn rent(&self) -> T {
        (**self).rent()
    }

    fn give_back(&self, item: T) -> bool {
        (**self).give_back(item)
    }
}

impl<T, P: ArrayPool<T> + ?Sized> ArrayPool<T> for std::sync::Arc<P> {
    fn rent(&self, min_len: usize) -> Vec<T> {
        (**self).rent(min_len)
    }

    fn give_back(&self, array: Vec<T>) {
        (**self).give_back(array);
    }
}
