//! Outcome pools
//!
//! Every [`Outcome`] is a pooled shell plus two pooled arrays: its messages
//! and its child field outcomes. [`OutcomePools`] owns the three pools and
//! hands out outcomes; dropping an outcome gives everything back.
//!
//! The pools are pluggable so hosts can share them or observe them:
//!
//! ```rust
//! use std::sync::Arc;
//! use nebula_memory::pool::BucketArrayPool;
//! use nebula_validator::prelude::*;
//!
//! let messages = Arc::new(BucketArrayPool::<Message>::new());
//! let pools = OutcomePools::builder(&ValidatorOptions::default())
//!     .messages(messages.clone())
//!     .build();
//!
//! drop(pools.create(0));
//! assert_eq!(messages.stats().snapshot().returned, 1);
//! ```

use std::fmt;
use std::sync::Arc;

use nebula_memory::pool::{ArrayPool, BucketArrayPool, ObjectPool, PoolConfig, Poolable, SharedPool};
use tracing::trace;

use super::outcome::{FieldOutcome, Outcome};
use crate::foundation::Message;
use crate::options::ValidatorOptions;

/// Poolable body of an [`Outcome`].
///
/// Only the arrays' *contents* belong to an outcome; the arrays themselves
/// are rented separately so they can be reused at their own size classes.
#[derive(Debug, Default)]
pub struct OutcomeShell {
    pub(super) messages: Vec<Message>,
    pub(super) fields: Vec<FieldOutcome>,
}

impl Poolable for OutcomeShell {
    fn reset(&mut self) {
        self.messages = Vec::new();
        self.fields = Vec::new();
    }

    fn memory_usage(&self) -> usize {
        std::mem::size_of::<Self>()
    }
}

pub(super) struct PoolSet {
    shells: Arc<dyn ObjectPool<Box<OutcomeShell>>>,
    messages: Arc<dyn ArrayPool<Message>>,
    fields: Arc<dyn ArrayPool<FieldOutcome>>,
    global_message_capacity: usize,
    field_message_capacity: usize,
}

impl PoolSet {
    pub(super) fn release(&self, mut shell: Box<OutcomeShell>) {
        let messages = std::mem::take(&mut shell.messages);
        if messages.capacity() > 0 {
            self.messages.give_back(messages);
        }

        let mut fields = std::mem::take(&mut shell.fields);
        // Children release their own buffers as they drop
        fields.clear();
        if fields.capacity() > 0 {
            self.fields.give_back(fields);
        }

        if !self.shells.give_back(shell) {
            trace!("outcome shell declined by pool");
        }
    }
}

// ============================================================================
// OUTCOME POOLS
// ============================================================================

/// Factory for pooled [`Outcome`]s.
///
/// Cloning is cheap; clones share the same pools.
#[derive(Clone)]
pub struct OutcomePools {
    inner: Arc<PoolSet>,
}

impl OutcomePools {
    /// Pools sized from `options`.
    #[must_use]
    pub fn new(options: &ValidatorOptions) -> Self {
        Self::builder(options).build()
    }

    /// Builder for overriding individual pools.
    #[must_use]
    pub fn builder(options: &ValidatorOptions) -> OutcomePoolsBuilder {
        OutcomePoolsBuilder {
            shells: None,
            messages: None,
            fields: None,
            global_message_capacity: options.global_message_capacity,
            field_message_capacity: options.field_message_capacity,
            outcome_pool_size: options.outcome_pool_size,
        }
    }

    /// Object-level outcome with room for `expected_fields` child fields.
    #[must_use]
    pub fn create(&self, expected_fields: usize) -> Outcome {
        self.create_sized(self.inner.global_message_capacity, expected_fields)
    }

    /// Field-level outcome labeled `path`, with room for `expected_fields` children.
    #[must_use]
    pub fn create_field(&self, path: Arc<str>, expected_fields: usize) -> FieldOutcome {
        FieldOutcome::new(
            path,
            self.create_sized(self.inner.field_message_capacity, expected_fields),
        )
    }

    /// Message buffer length of object-level outcomes.
    #[must_use]
    pub fn global_message_capacity(&self) -> usize {
        self.inner.global_message_capacity
    }

    /// Message buffer length of field-level outcomes.
    #[must_use]
    pub fn field_message_capacity(&self) -> usize {
        self.inner.field_message_capacity
    }

    fn create_sized(&self, message_capacity: usize, field_capacity: usize) -> Outcome {
        let set = &self.inner;
        let mut shell = set.shells.rent();
        if message_capacity > 0 {
            shell.messages = set.messages.rent(message_capacity);
        }
        if field_capacity > 0 {
            shell.fields = set.fields.rent(field_capacity);
        }
        Outcome::from_parts(shell, Arc::clone(&self.inner))
    }
}

impl fmt::Debug for OutcomePools {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutcomePools")
            .field("global_message_capacity", &self.inner.global_message_capacity)
            .field("field_message_capacity", &self.inner.field_message_capacity)
            .finish_non_exhaustive()
    }
}

/// Builder for [`OutcomePools`].
#[must_use = "builder methods must be chained or built"]
pub struct OutcomePoolsBuilder {
    shells: Option<Arc<dyn ObjectPool<Box<OutcomeShell>>>>,
    messages: Option<Arc<dyn ArrayPool<Message>>>,
    fields: Option<Arc<dyn ArrayPool<FieldOutcome>>>,
    global_message_capacity: usize,
    field_message_capacity: usize,
    outcome_pool_size: usize,
}

impl OutcomePoolsBuilder {
    /// Uses a custom pool for outcome shells.
    pub fn shells(mut self, pool: Arc<dyn ObjectPool<Box<OutcomeShell>>>) -> Self {
        self.shells = Some(pool);
        self
    }

    /// Uses a custom pool for message arrays.
    pub fn messages(mut self, pool: Arc<dyn ArrayPool<Message>>) -> Self {
        self.messages = Some(pool);
        self
    }

    /// Uses a custom pool for child field arrays.
    pub fn fields(mut self, pool: Arc<dyn ArrayPool<FieldOutcome>>) -> Self {
        self.fields = Some(pool);
        self
    }

    /// Builds the pools, filling in defaults.
    #[must_use]
    pub fn build(self) -> OutcomePools {
        let retained = self.outcome_pool_size;
        let shells = self.shells.unwrap_or_else(|| {
            Arc::new(SharedPool::with_config(PoolConfig::bounded(retained), Box::<OutcomeShell>::default))
        });
        let messages = self
            .messages
            .unwrap_or_else(|| Arc::new(BucketArrayPool::<Message>::new()));
        let fields = self
            .fields
            .unwrap_or_else(|| Arc::new(BucketArrayPool::<FieldOutcome>::new()));

        OutcomePools {
            inner: Arc::new(PoolSet {
                shells,
                messages,
                fields,
                global_message_capacity: self.global_message_capacity,
                field_message_capacity: self.field_message_capacity,
            }),
        }
    }
}
