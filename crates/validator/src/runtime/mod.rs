//! Validation runtime: pooled outcomes and the plan executor.

mod executor;
mod outcome;
mod pools;

pub(crate) use executor::Executor;
pub use outcome::{FieldOutcome, Outcome};
pub use pools::{OutcomePools, OutcomePoolsBuilder, OutcomeShell};
