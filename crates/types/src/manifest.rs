//! Normalized configuration manifest

use crate::environment::DeploymentEnvironment;
use crate::error::ConfigError;
use crate::keys;
use crate::raw::{ConfigValue, RawConfig};
use serde::Serialize;

/// Configuration manifest handed to the provisioning layer.
///
/// Scalar settings stay in `values` under their original keys and are exposed
/// through accessors. Derived lists hold base names only; environment prefixes are
/// applied later, per resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigManifest {
    /// Every entry of the source, in source order
    pub values: RawConfig,
    /// Explicit bucket names followed by `instrument_bucket_list`
    pub bucket_list: Vec<String>,
    /// `{mission_name}-{instrument}` for each instrument, in instrument order
    pub instrument_bucket_list: Vec<String>,
    /// Public ECR repository names
    pub ecr_public_repo_list: Vec<String>,
    /// Private ECR repository names
    pub ecr_private_repo_list: Vec<String>,
    /// Environment this manifest was resolved for
    pub deployment_environment: DeploymentEnvironment,
}

impl ConfigManifest {
    /// Scalar value for `key`, if present and scalar
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(ConfigValue::as_scalar)
    }

    /// List value for `key`; a scalar is read as a one-element list
    pub fn list(&self, key: &str) -> Vec<&str> {
        self.values
            .get(key)
            .map(|value| value.values().collect())
            .unwrap_or_default()
    }

    /// Scalar value for `key`, or `MissingField`
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.scalar(key).ok_or_else(|| ConfigError::MissingField {
            field: key.to_string(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn deployment_region(&self) -> Option<&str> {
        self.scalar(keys::DEPLOYMENT_REGION)
    }

    pub fn mission_name(&self) -> Option<&str> {
        self.scalar(keys::MISSION_NAME)
    }

    pub fn mission_pkg(&self) -> Option<&str> {
        self.scalar(keys::MISSION_PKG)
    }

    pub fn valid_data_levels(&self) -> Vec<&str> {
        self.list(keys::VALID_DATA_LEVELS)
    }

    pub fn instrument_names(&self) -> Vec<&str> {
        self.list(keys::INSTR_NAMES)
    }

    pub fn incoming_bucket_name(&self) -> Option<&str> {
        self.scalar(keys::INCOMING_BUCKET_NAME)
    }

    pub fn sorting_lambda_bucket_name(&self) -> Option<&str> {
        self.scalar(keys::SORTING_LAMBDA_BUCKET_NAME)
    }

    pub fn server_access_logs_bucket_name(&self) -> Option<&str> {
        self.scalar(keys::S3_SERVER_ACCESS_LOGS_BUCKET_NAME)
    }

    pub fn processing_lambda_ecr_name(&self) -> Option<&str> {
        self.scalar(keys::PROCESSING_LAMBDA_PRIVATE_ECR_NAME)
    }

    pub fn docker_base_ecr_name(&self) -> Option<&str> {
        self.scalar(keys::DOCKER_BASE_PUBLIC_ECR_NAME)
    }

    pub fn timestream_database_name(&self) -> Option<&str> {
        self.scalar(keys::TIMESTREAM_DATABASE_NAME)
    }

    pub fn timestream_table_name(&self) -> Option<&str> {
        self.scalar(keys::TIMESTREAM_S3_LOGS_TABLE_NAME)
    }
}
