//! Infrastructure layer for AgentHub.
//!
//! Contains implementations of the ports defined in `agenthub-core`: SQLite
//! repositories, the OpenAI-compatible LLM provider and runner factory, and
//! the global configuration loader.

pub mod config;
pub mod llm;
pub mod sqlite;
