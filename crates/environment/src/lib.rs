//! Environment resolution for the SWSOC pipeline
//!
//! Turns an environment context into resource names, removal policies, tag sets
//! and the lifecycle rules attached to registries and tables.

pub mod lifecycle;
pub mod resolver;

pub use lifecycle::*;
pub use resolver::*;
