//! Business logic and port definitions for AgentHub.
//!
//! This crate defines the "ports" (repository, runner, and LLM provider
//! traits) that the infrastructure layer implements, plus the agent assembler,
//! the execution adapter, and the services built on them. It depends only on
//! `agenthub-types` -- never on `agenthub-infra` or any database/IO crate.

pub mod agent;
pub mod llm;
pub mod repository;
pub mod runner;
pub mod service;
