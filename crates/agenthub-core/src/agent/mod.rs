//! Agent assembly and execution.
//!
//! - `AgentAssembler`: configuration + prompt fragments into a `ResolvedAgent`
//! - `AgentExecutor`: runs a resolved agent for one turn and reduces the
//!   runner's event stream into a single output

pub mod assembler;
pub mod executor;
