//! Deployment environment and the per-run context derived from it

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name prefix applied to every non-production resource name
pub const DEV_NAME_PREFIX: &str = "dev-";

/// Deployment environment of a synthesis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeploymentEnvironment {
    Production,
    Development,
}

impl DeploymentEnvironment {
    /// Signal value that selects production
    pub const PRODUCTION_MARKER: &'static str = "PRODUCTION";

    /// Production only when the signal is exactly the production marker
    pub fn from_signal(signal: Option<&str>) -> Self {
        match signal {
            Some(Self::PRODUCTION_MARKER) => DeploymentEnvironment::Production,
            _ => DeploymentEnvironment::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, DeploymentEnvironment::Production)
    }

    /// Value exported to functions as `LAMBDA_ENVIRONMENT`
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentEnvironment::Production => "PRODUCTION",
            DeploymentEnvironment::Development => "DEVELOPMENT",
        }
    }

    /// Human readable label used for the `Environment` tag
    pub fn label(&self) -> &'static str {
        match self {
            DeploymentEnvironment::Production => "Production",
            DeploymentEnvironment::Development => "Development",
        }
    }
}

impl fmt::Display for DeploymentEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to a resource when it leaves the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemovalPolicy {
    Retain,
    Destroy,
}

/// Removal policy paired with the auto-delete flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePolicy {
    pub removal_policy: RemovalPolicy,
    pub auto_delete: bool,
}

impl ResourcePolicy {
    /// Retain and never auto-delete
    pub const RETAIN: ResourcePolicy = ResourcePolicy {
        removal_policy: RemovalPolicy::Retain,
        auto_delete: false,
    };

    /// Destroy and auto-delete contents
    pub const DESTROY: ResourcePolicy = ResourcePolicy {
        removal_policy: RemovalPolicy::Destroy,
        auto_delete: true,
    };
}

/// Immutable environment state shared by every naming and tagging decision.
///
/// Built once per run from the [`DeploymentEnvironment`]; the fields are only
/// reachable through accessors so the production/destroy pairing cannot be broken
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    environment: DeploymentEnvironment,
    name_prefix: &'static str,
    policy: ResourcePolicy,
}

impl EnvironmentContext {
    pub fn new(environment: DeploymentEnvironment) -> Self {
        match environment {
            DeploymentEnvironment::Production => Self {
                environment,
                name_prefix: "",
                policy: ResourcePolicy::RETAIN,
            },
            DeploymentEnvironment::Development => Self {
                environment,
                name_prefix: DEV_NAME_PREFIX,
                policy: ResourcePolicy::DESTROY,
            },
        }
    }

    pub fn production() -> Self {
        Self::new(DeploymentEnvironment::Production)
    }

    pub fn development() -> Self {
        Self::new(DeploymentEnvironment::Development)
    }

    pub fn environment(&self) -> DeploymentEnvironment {
        self.environment
    }

    pub fn is_production(&self) -> bool {
        self.environment.is_production()
    }

    pub fn name_prefix(&self) -> &'static str {
        self.name_prefix
    }

    pub fn removal_policy(&self) -> RemovalPolicy {
        self.policy.removal_policy
    }

    pub fn auto_delete(&self) -> bool {
        self.policy.auto_delete
    }

    pub fn policy(&self) -> ResourcePolicy {
        self.policy
    }
}
