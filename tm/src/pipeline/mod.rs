//! Stage pipeline
//!
//! The fixed-topology coordinator and its six stages:
//!
//! ```text
//! lodging -> {dining, transportation, activities} -> budgeting -> assembly
//!                     (concurrent fan-out)
//! ```
//!
//! Stages communicate only through the typed [`StageContext`]; there is no
//! generic state map. Fan-out branch failures are converted to empty stage
//! results at the branch boundary and never abort the run.

pub mod activities;
pub mod assembly;
pub mod budget;
mod context;
mod coordinator;
pub mod dining;
pub mod lodging;
pub mod transport;

pub use context::StageContext;
pub use coordinator::Pipeline;
pub use transport::TransportOutput;
