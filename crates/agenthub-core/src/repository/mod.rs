//! Repository trait definitions (ports).
//!
//! These traits define the storage interface that the infrastructure layer
//! (agenthub-infra) implements. The core crate never depends on any
//! specific storage technology.

pub mod agent;
pub mod prompt;
pub mod run;
pub mod tool;
