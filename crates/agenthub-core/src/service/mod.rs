//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, agent execution, and business
//! rules. They depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod agent;
pub mod assist;
pub mod library;

#[cfg(test)]
pub(crate) mod testing;
