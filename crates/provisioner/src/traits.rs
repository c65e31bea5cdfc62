//! Provisioner traits and interfaces

use types::{PipelineError, ResourceKind, ResourceSpec, Result};

/// Capability to declare a resource with the provisioning layer.
///
/// Implementations translate a resolved [`ResourceSpec`] into whatever the
/// provisioning toolkit needs. Declarations arrive in plan order.
pub trait ResourceProvisioner {
    /// Declare a single resource
    fn declare(&mut self, spec: &ResourceSpec) -> Result<()>;

    /// Get the name of the provisioner
    fn name(&self) -> &str;
}

/// Provisioner that records every declaration in memory
#[derive(Debug, Default)]
pub struct RecordingProvisioner {
    declared: Vec<ResourceSpec>,
}

impl RecordingProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations in the order they were received
    pub fn declared(&self) -> &[ResourceSpec] {
        &self.declared
    }

    pub fn declared_of(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceSpec> {
        self.declared.iter().filter(move |spec| spec.kind == kind)
    }

    pub fn into_declared(self) -> Vec<ResourceSpec> {
        self.declared
    }
}

impl ResourceProvisioner for RecordingProvisioner {
    fn declare(&mut self, spec: &ResourceSpec) -> Result<()> {
        if self
            .declared
            .iter()
            .any(|existing| existing.logical_id == spec.logical_id)
        {
            return Err(PipelineError::Provisioning {
                resource: spec.logical_id.clone(),
                message: "logical ID already declared".to_string(),
            });
        }

        self.declared.push(spec.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
