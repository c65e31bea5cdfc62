//! Configuration management for the SWSOC pipeline
//!
//! This crate reads the pipeline YAML configuration into a manifest, derives the
//! bucket and repository lists from key naming conventions, and validates the
//! result before any resource is declared.

pub mod loader;
pub mod naming;
pub mod schema;
pub mod signals;
pub mod validation;

pub use loader::ConfigLoader;
pub use schema::*;
pub use signals::EnvironmentSignals;
pub use validation::*;
