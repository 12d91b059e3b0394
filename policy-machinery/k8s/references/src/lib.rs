//! Policy references on Gateway API resources
//!
//! Policies attach to network resources, and this crate records those
//! attachments on the resources themselves, using annotations as the only
//! storage:
//!
//! - A target resource carries a forward reference naming the one policy of a
//!   given kind attached to it (see [`TargetRefReconciler::link`]).
//! - A gateway carries, per policy kind, a list of every policy that affects
//!   it directly or through an attached resource (see [`back_references`]).
//!
//! ```text
//! [ Policy ] -> [ HTTPRoute ] -> [ Gateway ]
//!      ^             |               |
//!      +-------------+---------------+
//!        forward ref     back refs
//! ```
//!
//! Target resolution (which gateways a policy affects) happens elsewhere and
//! arrives as a [`GatewayDiff`]. Every update is a single version-checked
//! write; conflicts and other failures are returned to the caller, which
//! retries the whole pass from freshly read objects. All operations are
//! idempotent so that such retries converge.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod args;
pub mod back_references;
mod client;
mod error;
mod gateways;
mod metrics;
mod target_ref;

#[cfg(test)]
mod tests;

pub use self::{
    args::ReferenceArgs,
    back_references::PolicyRefs,
    client::{KubeClient, ObjectClient},
    error::{Error, Result},
    gateways::GatewayDiff,
    metrics::ReferenceMetrics,
    target_ref::TargetRefReconciler,
};
