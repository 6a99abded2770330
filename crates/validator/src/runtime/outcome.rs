//! Validation outcomes
//!
//! An [`Outcome`] collects object-level messages and one [`FieldOutcome`]
//! per validated field. Field outcomes are themselves outcomes, so nested
//! objects produce a tree addressed by dotted paths.
//!
//! Buffers are bounded: an outcome never grows past the capacity of the
//! arrays it rented, and writes beyond it are dropped. Dropping an outcome
//! returns its buffers (and its children's) to the pools it came from.

use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::trace;

use super::pools::{OutcomeShell, PoolSet};
use crate::foundation::Message;

// ============================================================================
// OUTCOME
// ============================================================================

/// Aggregated result of validating one object (or one field).
pub struct Outcome {
    shell: Option<Box<OutcomeShell>>,
    pools: Arc<PoolSet>,
}

impl Outcome {
    pub(super) fn from_parts(shell: Box<OutcomeShell>, pools: Arc<PoolSet>) -> Self {
        Self {
            shell: Some(shell),
            pools,
        }
    }

    /// Whether there are no messages here or in any field.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.messages().is_empty() && self.fields().iter().all(FieldOutcome::is_success)
    }

    /// Object-level messages, in insertion order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.shell.as_deref().map_or(&[][..], |s| s.messages.as_slice())
    }

    /// Field outcomes, in insertion order.
    #[must_use]
    pub fn fields(&self) -> &[FieldOutcome] {
        self.shell.as_deref().map_or(&[][..], |s| s.fields.as_slice())
    }

    /// Field outcome by dotted path, searching nested outcomes.
    ///
    /// ```rust
    /// # use nebula_validator::prelude::*;
    /// let pools = OutcomePools::new(&ValidatorOptions::default());
    /// let mut root = pools.create(1);
    /// let mut address = pools.create_field("address".into(), 1);
    /// address.outcome_mut().add_field_outcome(pools.create_field("address.zip".into(), 0));
    /// root.add_field_outcome(address);
    ///
    /// assert!(root.field("address.zip").is_some());
    /// assert!(root.field("zip").is_none());
    /// ```
    #[must_use]
    pub fn field(&self, path: &str) -> Option<&FieldOutcome> {
        self.fields().iter().find_map(|f| {
            if f.path() == path {
                Some(f)
            } else if path.starts_with(f.path()) && path[f.path().len()..].starts_with('.') {
                f.outcome().field(path)
            } else {
                None
            }
        })
    }

    /// Every message in the tree, object-level first, then fields depth-first.
    #[must_use]
    pub fn all_messages(&self) -> Vec<&Message> {
        let mut out = Vec::new();
        self.collect_messages(&mut out);
        out
    }

    /// Maximum number of messages this outcome can hold.
    #[must_use]
    pub fn message_capacity(&self) -> usize {
        self.shell.as_deref().map_or(0, |s| s.messages.capacity())
    }

    /// Maximum number of field outcomes this outcome can hold.
    #[must_use]
    pub fn field_capacity(&self) -> usize {
        self.shell.as_deref().map_or(0, |s| s.fields.capacity())
    }

    /// Appends a message. Returns `false` when the buffer is full and the
    /// message was dropped.
    pub fn add_message(&mut self, message: Message) -> bool {
        let Some(shell) = self.shell.as_deref_mut() else {
            return false;
        };
        if shell.messages.len() < shell.messages.capacity() {
            shell.messages.push(message);
            true
        } else {
            trace!(key = %message.key, "message buffer full, dropping message");
            false
        }
    }

    /// Appends a field outcome. Returns `false` when the buffer is full; the
    /// field outcome is then released.
    pub fn add_field_outcome(&mut self, field: FieldOutcome) -> bool {
        let Some(shell) = self.shell.as_deref_mut() else {
            return false;
        };
        if shell.fields.len() < shell.fields.capacity() {
            shell.fields.push(field);
            true
        } else {
            trace!(path = %field.path, "field buffer full, dropping field outcome");
            false
        }
    }

    /// Moves `child`'s messages and field outcomes into `self`, in order.
    ///
    /// `child` is left empty but keeps its buffers until it is dropped.
    pub fn combine(&mut self, child: &mut Outcome) {
        self.absorb(child, None);
    }

    /// Like [`combine`](Self::combine), prefixing every moved field path
    /// (recursively) with `name.`.
    pub fn combine_nested(&mut self, child: &mut Outcome, name: &str) {
        self.absorb(child, Some(name));
    }

    /// Releases the outcome's buffers now. Equivalent to dropping it.
    pub fn dispose(self) {}

    fn absorb(&mut self, child: &mut Outcome, prefix: Option<&str>) {
        let Some(source) = child.shell.as_deref_mut() else {
            return;
        };
        for message in source.messages.drain(..) {
            self.add_message(message);
        }
        for mut field in source.fields.drain(..) {
            if let Some(prefix) = prefix {
                field.prefix_path(prefix);
            }
            self.add_field_outcome(field);
        }
    }

    fn collect_messages<'s>(&'s self, out: &mut Vec<&'s Message>) {
        out.extend(self.messages());
        for field in self.fields() {
            field.outcome().collect_messages(out);
        }
    }

    fn prefix_paths(&mut self, prefix: &str) {
        if let Some(shell) = self.shell.as_deref_mut() {
            for field in &mut shell.fields {
                field.prefix_path(prefix);
            }
        }
    }
}

impl Drop for Outcome {
    fn drop(&mut self) {
        if let Some(shell) = self.shell.take() {
            self.pools.release(shell);
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("success", &self.is_success())
            .field("messages", &self.messages())
            .field("fields", &self.fields())
            .finish()
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Outcome", 3)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("messages", self.messages())?;
        state.serialize_field("fields", self.fields())?;
        state.end()
    }
}

// ============================================================================
// FIELD OUTCOME
// ============================================================================

/// An [`Outcome`] labeled with the dotted path of the field it belongs to.
pub struct FieldOutcome {
    path: Arc<str>,
    outcome: Outcome,
}

impl FieldOutcome {
    pub(super) fn new(path: Arc<str>, outcome: Outcome) -> Self {
        Self { path, outcome }
    }

    /// Dotted path from the validated root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The field's own outcome.
    #[must_use]
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Mutable access to the field's outcome.
    pub fn outcome_mut(&mut self) -> &mut Outcome {
        &mut self.outcome
    }

    /// The field's own messages.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        self.outcome.messages()
    }

    /// Whether the field and everything under it passed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    fn prefix_path(&mut self, prefix: &str) {
        self.path = Arc::from(format!("{prefix}.{}", self.path));
        self.outcome.prefix_paths(prefix);
    }
}

impl fmt::Debug for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOutcome")
            .field("path", &self.path)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl Serialize for FieldOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldOutcome", 4)?;
        state.serialize_field("path", self.path())?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("messages", self.messages())?;
        state.serialize_field("fields", self.outcome.fields())?;
        state.end()
    }
}
