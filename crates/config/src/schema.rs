//! Configuration schema: key classification and required keys

use types::keys;
use types::{ConfigValue, RawConfig};

/// Derived manifest list a configuration key can feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestList {
    Buckets,
    PublicEcrRepos,
    PrivateEcrRepos,
}

/// Maps a key-name marker to the list its values are collected into
#[derive(Debug, Clone, Copy)]
pub struct KeyRule {
    pub marker: &'static str,
    pub list: ManifestList,
}

/// Classification table. A key may match several markers; its value is then
/// collected into every matching list.
pub const KEY_RULES: [KeyRule; 3] = [
    KeyRule {
        marker: keys::BUCKET_NAME_MARKER,
        list: ManifestList::Buckets,
    },
    KeyRule {
        marker: keys::PUBLIC_ECR_NAME_MARKER,
        list: ManifestList::PublicEcrRepos,
    },
    KeyRule {
        marker: keys::PRIVATE_ECR_NAME_MARKER,
        list: ManifestList::PrivateEcrRepos,
    },
];

/// Lists fed by `key`, in table order
pub fn classify_key(key: &str) -> Vec<ManifestList> {
    KEY_RULES
        .iter()
        .filter(|rule| key.contains(rule.marker))
        .map(|rule| rule.list)
        .collect()
}

/// Bucket base name for one instrument of a mission
pub fn instrument_bucket_name(mission_name: &str, instrument: &str) -> String {
    format!("{}-{}", mission_name, instrument)
}

/// A key that must be present before any resource is declared
#[derive(Debug, Clone, Copy)]
pub struct RequiredKey {
    pub key: &'static str,
    pub description: &'static str,
}

pub const REQUIRED_KEYS: [RequiredKey; 12] = [
    RequiredKey {
        key: keys::DEPLOYMENT_REGION,
        description: "region the stacks are deployed to",
    },
    RequiredKey {
        key: keys::MISSION_NAME,
        description: "mission name, prefix of every instrument bucket",
    },
    RequiredKey {
        key: keys::MISSION_PKG,
        description: "mission package name",
    },
    RequiredKey {
        key: keys::VALID_DATA_LEVELS,
        description: "ordered data levels, each one a key prefix in instrument buckets",
    },
    RequiredKey {
        key: keys::INSTR_NAMES,
        description: "instrument names",
    },
    RequiredKey {
        key: keys::INCOMING_BUCKET_NAME,
        description: "bucket receiving incoming files",
    },
    RequiredKey {
        key: keys::SORTING_LAMBDA_BUCKET_NAME,
        description: "bucket holding the sorting function archive",
    },
    RequiredKey {
        key: keys::S3_SERVER_ACCESS_LOGS_BUCKET_NAME,
        description: "bucket receiving server access logs",
    },
    RequiredKey {
        key: keys::PROCESSING_LAMBDA_PRIVATE_ECR_NAME,
        description: "private repository of the processing function image",
    },
    RequiredKey {
        key: keys::DOCKER_BASE_PUBLIC_ECR_NAME,
        description: "public repository of the base docker image",
    },
    RequiredKey {
        key: keys::TIMESTREAM_DATABASE_NAME,
        description: "timestream database name",
    },
    RequiredKey {
        key: keys::TIMESTREAM_S3_LOGS_TABLE_NAME,
        description: "timestream table for bucket logs",
    },
];

/// Complete example configuration, written by `ConfigLoader::create_example`
pub fn example_config() -> RawConfig {
    [
        (keys::DEPLOYMENT_REGION, ConfigValue::from("us-east-1")),
        (keys::MISSION_NAME, ConfigValue::from("hermes")),
        (keys::MISSION_PKG, ConfigValue::from("hermes_core")),
        (
            keys::VALID_DATA_LEVELS,
            ConfigValue::from(vec!["l0", "l1", "ql", "l2"]),
        ),
        (
            keys::INSTR_NAMES,
            ConfigValue::from(vec!["eea", "nemisis", "merit", "spani"]),
        ),
        (keys::INCOMING_BUCKET_NAME, ConfigValue::from("swsoc-incoming")),
        (
            keys::SORTING_LAMBDA_BUCKET_NAME,
            ConfigValue::from("swsoc-sorting-lambda-bucket"),
        ),
        (
            keys::S3_SERVER_ACCESS_LOGS_BUCKET_NAME,
            ConfigValue::from("swsoc-s3-server-access-logs"),
        ),
        (
            keys::PROCESSING_LAMBDA_PRIVATE_ECR_NAME,
            ConfigValue::from("sdc_aws_processing_lambda"),
        ),
        (
            keys::DOCKER_BASE_PUBLIC_ECR_NAME,
            ConfigValue::from("swsoc-docker-lambda-base"),
        ),
        (keys::TIMESTREAM_DATABASE_NAME, ConfigValue::from("sdc_aws_logs")),
        (
            keys::TIMESTREAM_S3_LOGS_TABLE_NAME,
            ConfigValue::from("sdc_aws_s3_bucket_log_table"),
        ),
    ]
    .into_iter()
    .collect()
}
