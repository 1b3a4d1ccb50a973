// src/models/mod.rs

//! Domain models for the registry crawler.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod context;
mod field;
mod record;

// Re-export all public types
pub use config::{
    Config, LoggingConfig, OutputConfig, RIP_PLACEHOLDER, RegistryConfig, SessionConfig,
};
pub use context::RunContext;
pub use field::{FieldDefinition, FieldSelection, TraversalRule, TypeHint};
pub use record::Record;
