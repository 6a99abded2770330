//! # nebula-memory
//!
//! Pooling primitives for allocation-sensitive hot paths in Nebula.
//!
//! This crate provides:
//! - [`ObjectPool`](pool::ObjectPool) and [`ArrayPool`](pool::ArrayPool),
//!   the rent/return contracts consumed by higher layers
//! - [`SharedPool`](pool::SharedPool), a bounded lock-free object pool
//! - [`BucketArrayPool`](pool::BucketArrayPool), a power-of-two bucketed array pool
//! - [`PoolStats`](pool::PoolStats) counters for hit-rate monitoring
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_memory::prelude::*;
//!
//! let pool = SharedPool::new(8, || String::with_capacity(64));
//! let mut item = pool.rent();
//! item.push_str("scratch");
//! pool.give_back(item);
//!
//! let arrays = BucketArrayPool::<u32>::new();
//! let buf = arrays.rent(10);
//! assert!(buf.capacity() >= 10);
//! arrays.give_back(buf);
//! ```

#![warn(rust_2018_idioms)]

pub mod pool;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::pool::{
        ArrayPool, ArrayPoolConfig, BucketArrayPool, ObjectPool, PoolConfig, PoolStats,
        PoolStatsSnapshot, Poolable, SharedPool,
    };
}
