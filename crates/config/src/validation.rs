//! Manifest validation

use crate::naming::{check_bucket_name, check_repository_name};
use crate::schema::REQUIRED_KEYS;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{error, warn};
use types::{ConfigError, ConfigManifest};

/// Manifest validator
pub struct ManifestValidator;

impl ManifestValidator {
    /// Validate a manifest. Never fails: every problem found is recorded in the
    /// returned report and the caller decides whether to stop.
    pub fn validate(manifest: &ConfigManifest) -> ValidationReport {
        let mut report = ValidationReport::new();

        Self::validate_required_keys(manifest, &mut report);
        Self::validate_bucket_names(manifest, &mut report);
        Self::validate_repository_names(manifest, &mut report);
        Self::validate_data_levels(manifest, &mut report);

        report
    }

    fn validate_required_keys(manifest: &ConfigManifest, report: &mut ValidationReport) {
        for required in REQUIRED_KEYS {
            if !manifest.contains_key(required.key) {
                error!("{} not found in configuration", required.key);
                report.add_missing(required.key);
            }
        }
    }

    fn validate_bucket_names(manifest: &ConfigManifest, report: &mut ValidationReport) {
        let mut seen = HashSet::new();
        for bucket in &manifest.bucket_list {
            if let Err(message) = check_bucket_name(bucket) {
                report.add_error("bucket_list", &format!("Bucket name '{}' {}", bucket, message));
            }

            if !seen.insert(bucket.as_str()) {
                warn!("Bucket {} is listed more than once", bucket);
                report.add_warning(
                    "bucket_list",
                    &format!("Duplicate bucket name: {}", bucket),
                );
            }
        }

        for bucket in &manifest.instrument_bucket_list {
            if !manifest.bucket_list.contains(bucket) {
                report.add_error(
                    "instrument_bucket_list",
                    &format!("Instrument bucket '{}' is not in bucket_list", bucket),
                );
            }
        }
    }

    fn validate_repository_names(manifest: &ConfigManifest, report: &mut ValidationReport) {
        let repositories = manifest
            .ecr_private_repo_list
            .iter()
            .map(|name| ("ecr_private_repo_list", name))
            .chain(
                manifest
                    .ecr_public_repo_list
                    .iter()
                    .map(|name| ("ecr_public_repo_list", name)),
            );

        for (field, name) in repositories {
            if let Err(message) = check_repository_name(name) {
                report.add_error(field, &format!("Repository name '{}' {}", name, message));
            }
        }
    }

    fn validate_data_levels(manifest: &ConfigManifest, report: &mut ValidationReport) {
        if manifest.contains_key(types::keys::VALID_DATA_LEVELS)
            && manifest.valid_data_levels().is_empty()
        {
            report.add_warning(
                types::keys::VALID_DATA_LEVELS,
                "No data levels configured, instrument buckets will not publish notifications",
            );
        }

        if manifest.contains_key(types::keys::INSTR_NAMES) && manifest.instrument_names().is_empty()
        {
            report.add_warning(types::keys::INSTR_NAMES, "No instruments configured");
        }
    }
}

/// Validation report: missing required keys, other errors, and warnings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Required keys absent from the manifest, in required-key order
    pub missing_keys: Vec<String>,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            missing_keys: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_missing(&mut self, key: &str) {
        self.missing_keys.push(key.to_string());
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.errors.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn add_warning(&mut self, field: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.missing_keys.is_empty() || !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// Turn a failing report into an error. Missing keys take precedence over
    /// other errors.
    pub fn into_result(self) -> Result<(), ConfigError> {
        if !self.missing_keys.is_empty() {
            return Err(ConfigError::Validation {
                missing: self.missing_keys,
            });
        }

        match self.errors.into_iter().next() {
            Some(issue) => Err(ConfigError::InvalidValue {
                field: issue.field,
                value: issue.message,
            }),
            None => Ok(()),
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} missing keys, {} errors, {} warnings",
            self.missing_keys.len(),
            self.errors.len(),
            self.warnings.len()
        )
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}
