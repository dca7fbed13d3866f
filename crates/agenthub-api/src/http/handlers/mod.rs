//! HTTP request handlers for the REST API.

pub mod agent;
pub mod assist;
pub mod library;
