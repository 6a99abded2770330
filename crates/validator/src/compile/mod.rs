//! Plan compilation
//!
//! Turns an extracted [`TypeModel`](crate::model::TypeModel) into an
//! [`InvocationPlan`]: parameters resolved to [`ArgSource`]s, return types
//! classified into [`ReturnShape`]s, calls grouped, dependencies deduplicated.
//! [`PlanRegistry`] caches the result per type.

mod dependency;
mod plan;
mod registry;
mod shape;

pub use dependency::{
    ArgSource, DependencyKey, DependencyRef, DependencyTracker, IMPLICIT_PARAMETERS,
    resolve_parameters,
};
pub use plan::{FieldStep, InvocationPlan, PlannedCall, build_plan};
pub use registry::PlanRegistry;
pub use shape::{ReturnShape, Shape, Wrapper};
