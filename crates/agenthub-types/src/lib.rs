//! Shared domain types for AgentHub.
//!
//! This crate contains the core domain types used across the AgentHub platform:
//! agents and their prompt/tool bindings, library prompts and tools, runner
//! events, LLM request shapes, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod agent;
pub mod assist;
pub mod config;
pub mod error;
pub mod id;
pub mod library;
pub mod llm;
pub mod runner;
