//! Configuration loader implementation

use crate::schema::{classify_key, example_config, instrument_bucket_name, ManifestList};
use crate::signals::EnvironmentSignals;
use anyhow::{Context, Result};
use serde_yaml::Value;
use std::path::Path;
use tracing::{info, warn};
use types::{keys, ConfigError, ConfigManifest, ConfigValue, RawConfig};

/// Loads the pipeline YAML configuration into a [`ConfigManifest`]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Path used when the caller does not provide one
    pub const DEFAULT_PATH: &'static str = "config.yaml";

    /// Load the manifest from a YAML file
    pub fn load<P: AsRef<Path>>(
        config_path: P,
        signals: &EnvironmentSignals,
    ) -> std::result::Result<ConfigManifest, ConfigError> {
        let config_path = config_path.as_ref();

        if !config_path.exists() {
            return Err(ConfigError::FileNotFound {
                path: config_path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            ConfigError::ParseError(format!("Failed to read {}: {}", config_path.display(), e))
        })?;

        let manifest = Self::load_from_str(&content, signals)?;
        info!("Configuration loaded from {}", config_path.display());
        Ok(manifest)
    }

    /// Load the manifest from YAML text
    pub fn load_from_str(
        yaml_content: &str,
        signals: &EnvironmentSignals,
    ) -> std::result::Result<ConfigManifest, ConfigError> {
        let raw = Self::parse_raw(yaml_content)?;
        Ok(Self::build_manifest(raw, signals))
    }

    /// Parse YAML text into a flat, order preserving mapping.
    ///
    /// Scalars become text, sequences of scalars become lists. Keys with a null
    /// value are dropped so that validation reports them as missing.
    pub fn parse_raw(yaml_content: &str) -> std::result::Result<RawConfig, ConfigError> {
        let document: Value = serde_yaml::from_str(yaml_content)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => {
                return Err(ConfigError::ParseError(
                    "Configuration is empty".to_string(),
                ))
            }
            _ => {
                return Err(ConfigError::ParseError(
                    "Configuration must be a mapping of keys to values".to_string(),
                ))
            }
        };

        let mut raw = RawConfig::new();
        for (key, value) in &mapping {
            let key = scalar_text(key).ok_or_else(|| ConfigError::InvalidValue {
                field: "<key>".to_string(),
                value: format!("{:?}", key),
            })?;

            if value.is_null() {
                warn!("Ignoring {} with no value", key);
                continue;
            }

            let value = convert_value(&key, value)?;
            raw.insert(key, value);
        }

        Ok(raw)
    }

    /// Classify keys and derive the manifest lists
    pub fn build_manifest(raw: RawConfig, signals: &EnvironmentSignals) -> ConfigManifest {
        let mut bucket_list = Vec::new();
        let mut ecr_public_repo_list = Vec::new();
        let mut ecr_private_repo_list = Vec::new();

        for (key, value) in raw.iter() {
            for list in classify_key(key) {
                let target = match list {
                    ManifestList::Buckets => &mut bucket_list,
                    ManifestList::PublicEcrRepos => &mut ecr_public_repo_list,
                    ManifestList::PrivateEcrRepos => &mut ecr_private_repo_list,
                };
                target.extend(value.values().map(str::to_string));
            }
        }

        let instrument_bucket_list: Vec<String> =
            match raw.get(keys::MISSION_NAME).and_then(ConfigValue::as_scalar) {
                Some(mission_name) => raw
                    .get(keys::INSTR_NAMES)
                    .map(|instruments| {
                        instruments
                            .values()
                            .map(|instrument| instrument_bucket_name(mission_name, instrument))
                            .collect()
                    })
                    .unwrap_or_default(),
                None => Vec::new(),
            };

        bucket_list.extend(instrument_bucket_list.iter().cloned());

        ConfigManifest {
            values: raw,
            bucket_list,
            instrument_bucket_list,
            ecr_public_repo_list,
            ecr_private_repo_list,
            deployment_environment: signals.deployment_environment(),
        }
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let yaml_content = serde_yaml::to_string(&example_config())
            .context("Failed to serialize example configuration")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example configuration file")?;

        Ok(())
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn convert_value(key: &str, value: &Value) -> std::result::Result<ConfigValue, ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        field: key.to_string(),
        value: format!("{:?}", value),
    };

    match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| scalar_text(item).ok_or_else(invalid))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(ConfigValue::List),
        other => scalar_text(other).map(ConfigValue::Scalar).ok_or_else(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use types::DeploymentEnvironment;

    const HERMES_CONFIG: &str = r#"
DEPLOYMENT_REGION: us-east-1
MISSION_NAME: hermes
MISSION_PKG: hermes_core
VALID_DATA_LEVELS: ["l0", "l1", "ql", "l2"]
INSTR_NAMES: ["eea", "merit"]
INCOMING_BUCKET_NAME: swsoc-incoming
SORTING_LAMBDA_BUCKET_NAME: swsoc-sorting-lambda-bucket
S3_SERVER_ACCESS_LOGS_BUCKET_NAME: swsoc-s3-server-access-logs
PROCESSING_LAMBDA_PRIVATE_ECR_NAME: sdc_aws_processing_lambda
DOCKER_BASE_PUBLIC_ECR_NAME: swsoc-docker-lambda-base
TIMESTREAM_DATABASE_NAME: sdc_aws_logs
TIMESTREAM_S3_LOGS_TABLE_NAME: sdc_aws_s3_bucket_log_table
"#;

    #[test]
    fn test_load_from_string() {
        let manifest =
            ConfigLoader::load_from_str(HERMES_CONFIG, &EnvironmentSignals::development()).unwrap();

        assert_eq!(manifest.mission_name(), Some("hermes"));
        assert_eq!(manifest.deployment_region(), Some("us-east-1"));
        assert_eq!(manifest.valid_data_levels(), vec!["l0", "l1", "ql", "l2"]);
        assert_eq!(manifest.ecr_private_repo_list, vec!["sdc_aws_processing_lambda"]);
        assert_eq!(manifest.ecr_public_repo_list, vec!["swsoc-docker-lambda-base"]);
        assert_eq!(manifest.deployment_environment, DeploymentEnvironment::Development);
    }

    #[test]
    fn test_bucket_list_is_explicit_then_instruments() {
        let manifest =
            ConfigLoader::load_from_str(HERMES_CONFIG, &EnvironmentSignals::development()).unwrap();

        assert_eq!(manifest.instrument_bucket_list, vec!["hermes-eea", "hermes-merit"]);
        assert_eq!(
            manifest.bucket_list,
            vec![
                "swsoc-incoming",
                "swsoc-sorting-lambda-bucket",
                "swsoc-s3-server-access-logs",
                "hermes-eea",
                "hermes-merit",
            ]
        );
    }

    #[test]
    fn test_bucket_list_follows_file_order() {
        let yaml = r#"
MISSION_NAME: hermes
INSTR_NAMES: [spani]
Z_BUCKET_NAME: zulu
A_BUCKET_NAME: alpha
"#;
        let manifest = ConfigLoader::load_from_str(yaml, &EnvironmentSignals::development()).unwrap();
        assert_eq!(manifest.bucket_list, vec!["zulu", "alpha", "hermes-spani"]);
    }

    #[test]
    fn test_instrument_list_matches_instrument_order() {
        let yaml = r#"
MISSION_NAME: padre
INSTR_NAMES: [meddea, sharp, craft]
"#;
        let manifest = ConfigLoader::load_from_str(yaml, &EnvironmentSignals::development()).unwrap();
        let instruments = manifest.instrument_names();

        assert_eq!(manifest.instrument_bucket_list.len(), instruments.len());
        for (bucket, instrument) in manifest.instrument_bucket_list.iter().zip(instruments) {
            assert_eq!(bucket, &format!("padre-{}", instrument));
        }
    }

    #[test]
    fn test_duplicate_bucket_names_are_preserved() {
        let yaml = r#"
MISSION_NAME: hermes
INSTR_NAMES: [eea]
EEA_BUCKET_NAME: hermes-eea
"#;
        let manifest = ConfigLoader::load_from_str(yaml, &EnvironmentSignals::development()).unwrap();
        assert_eq!(manifest.bucket_list, vec!["hermes-eea", "hermes-eea"]);
    }

    #[test]
    fn test_missing_mission_name_yields_no_instrument_buckets() {
        let yaml = r#"
INSTR_NAMES: [eea]
INCOMING_BUCKET_NAME: swsoc-incoming
"#;
        let manifest = ConfigLoader::load_from_str(yaml, &EnvironmentSignals::development()).unwrap();
        assert!(manifest.instrument_bucket_list.is_empty());
        assert_eq!(manifest.bucket_list, vec!["swsoc-incoming"]);
    }

    #[test]
    fn test_production_signal_recorded_on_manifest() {
        let manifest =
            ConfigLoader::load_from_str(HERMES_CONFIG, &EnvironmentSignals::production()).unwrap();
        assert_eq!(manifest.deployment_environment, DeploymentEnvironment::Production);
    }

    #[test]
    fn test_parse_raw_converts_scalars_and_drops_nulls() {
        let raw = ConfigLoader::parse_raw("RETRIES: 3\nENABLED: true\nEMPTY:\nLEVELS: [0, 1]\n")
            .unwrap();

        assert_eq!(raw.get("RETRIES"), Some(&ConfigValue::from("3")));
        assert_eq!(raw.get("ENABLED"), Some(&ConfigValue::from("true")));
        assert_eq!(raw.get("LEVELS"), Some(&ConfigValue::from(vec!["0", "1"])));
        assert!(!raw.contains_key("EMPTY"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            ConfigLoader::parse_raw(""),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ConfigLoader::parse_raw("- just\n- a list\n"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            ConfigLoader::parse_raw("NESTED:\n  inner: value\n"),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "NESTED"
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::load(
            "/nonexistent/swsoc/config.yaml",
            &EnvironmentSignals::development(),
        );
        assert!(matches!(result, Err(ConfigError::FileNotFound { ref path }) if path.contains("nonexistent")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(HERMES_CONFIG.as_bytes()).unwrap();

        let manifest = ConfigLoader::load(file.path(), &EnvironmentSignals::development()).unwrap();
        assert_eq!(manifest.instrument_bucket_list, vec!["hermes-eea", "hermes-merit"]);
    }

    #[test]
    fn test_create_example() {
        let temp_file = NamedTempFile::new().unwrap();
        ConfigLoader::create_example(temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(content.contains("MISSION_NAME: hermes"));

        let manifest =
            ConfigLoader::load(temp_file.path(), &EnvironmentSignals::development()).unwrap();
        assert_eq!(manifest.instrument_bucket_list.len(), 4);
    }
}
