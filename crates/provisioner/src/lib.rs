//! Resource declaration for the SWSOC pipeline
//!
//! This crate turns a validated manifest and an environment context into an
//! ordered plan of resource declarations, and hands them to a provisioner.

pub mod plan;
pub mod traits;

pub use plan::*;
pub use traits::*;
