//! Shared types for the SWSOC pipeline manifest
//!
//! This crate contains the domain types passed between the configuration loader,
//! the environment resolver and the provisioning layer.

pub mod environment;
pub mod error;
pub mod keys;
pub mod manifest;
pub mod raw;
pub mod resource;
pub mod tags;

// Re-export commonly used types
pub use environment::*;
pub use error::{ConfigError, PipelineError, Result};
pub use manifest::ConfigManifest;
pub use raw::{ConfigValue, RawConfig};
pub use resource::*;
pub use tags::ResourceTagSet;
