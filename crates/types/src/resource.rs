//! Resource declarations handed to a provisioner

use crate::environment::ResourcePolicy;
use crate::tags::ResourceTagSet;
use serde::Serialize;
use std::fmt;

/// Kinds of cloud resources the pipeline declares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Bucket,
    Topic,
    Queue,
    PrivateRepository,
    PublicRepository,
    TimestreamDatabase,
    TimestreamTable,
    Function,
    ScheduleRule,
    Secret,
    Database,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Bucket => "S3 Bucket",
            ResourceKind::Topic => "SNS Topic",
            ResourceKind::Queue => "SQS Queue",
            ResourceKind::PrivateRepository => "Private ECR Repo",
            ResourceKind::PublicRepository => "Public ECR Repo",
            ResourceKind::TimestreamDatabase => "Timestream Database",
            ResourceKind::TimestreamTable => "Timestream Table",
            ResourceKind::Function => "Lambda Function",
            ResourceKind::ScheduleRule => "Schedule Rule",
            ResourceKind::Secret => "Secrets Manager Secret",
            ResourceKind::Database => "RDS Database",
        };
        f.write_str(name)
    }
}

/// A single resource, fully resolved for one environment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSpec {
    pub kind: ResourceKind,
    /// Logical identifier inside the stack
    pub logical_id: String,
    /// Physical resource name
    pub name: String,
    /// Removal policy, for kinds that carry one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<ResourcePolicy>,
    pub tags: ResourceTagSet,
    pub properties: ResourceProperties,
}

/// Kind specific settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceProperties {
    Bucket(BucketProperties),
    Topic,
    Queue(QueueProperties),
    Repository { lifecycle_rules: Vec<LifecycleRule> },
    PublicRepository,
    TimestreamDatabase,
    TimestreamTable(TableProperties),
    Function(FunctionProperties),
    ScheduleRule(ScheduleProperties),
    Secret(SecretProperties),
    Database(DatabaseProperties),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketProperties {
    pub versioned: bool,
    /// Bucket receiving server access logs, if any
    pub server_access_logs_bucket: Option<String>,
    pub server_access_logs_prefix: Option<String>,
    pub notifications: Vec<BucketNotification>,
}

/// S3 object event types that trigger notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectEvent {
    ObjectCreated,
    ObjectCreatedPut,
    ObjectCreatedCopy,
}

/// Where a bucket notification is delivered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum NotificationTarget {
    Topic(String),
    Queue(String),
    Function(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketNotification {
    pub event: ObjectEvent,
    pub target: NotificationTarget,
    /// Object key prefix filter
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueProperties {
    pub encrypted: bool,
    /// Topic this queue subscribes to
    pub subscribed_topic: String,
    pub raw_message_delivery: bool,
    /// Source ARNs (by resource name) allowed to send messages
    pub allowed_senders: Vec<String>,
}

/// Single ECR lifecycle rule. Rules are evaluated by ascending priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LifecycleRule {
    pub priority: u32,
    pub description: Option<String>,
    pub tag_prefixes: Vec<String>,
    pub max_image_count: Option<u32>,
    pub max_image_age_days: Option<u32>,
}

/// Timestream table retention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetentionProperties {
    pub magnetic_store_retention_days: u32,
    pub memory_store_retention_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableProperties {
    pub database_name: String,
    pub retention: RetentionProperties,
}

/// Deployable code of a function
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FunctionCode {
    ContainerImage { repository: String, tag: String },
    Archive { bucket: String, key: Option<String> },
}

/// Value of a function environment variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentValue {
    Literal { value: String },
    /// Attribute of another declared resource, resolved at deploy time
    Reference { logical_id: String, attribute: String },
}

impl EnvironmentValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvironmentValue::Literal {
            value: value.into(),
        }
    }

    pub fn reference(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        EnvironmentValue::Reference {
            logical_id: logical_id.into(),
            attribute: attribute.into(),
        }
    }

    pub fn as_literal(&self) -> Option<&str> {
        match self {
            EnvironmentValue::Literal { value } => Some(value),
            EnvironmentValue::Reference { .. } => None,
        }
    }
}

/// IAM statement allowing `actions` on `resources`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermissionGrant {
    pub actions: Vec<String>,
    /// Resource names or logical IDs, `*` for any
    pub resources: Vec<String>,
}

impl PermissionGrant {
    pub fn new(actions: &[&str], resources: Vec<String>) -> Self {
        Self {
            actions: actions.iter().map(|action| action.to_string()).collect(),
            resources,
        }
    }

    pub fn allows(&self, action: &str) -> bool {
        self.actions.iter().any(|granted| granted == action)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionProperties {
    pub description: String,
    pub code: FunctionCode,
    pub timeout_minutes: u32,
    pub memory_mb: Option<u32>,
    pub environment: Vec<(String, EnvironmentValue)>,
    /// Topics this function subscribes to
    pub subscriptions: Vec<String>,
    /// Buckets the function may read and write
    pub bucket_access: Vec<String>,
    pub permissions: Vec<PermissionGrant>,
}

impl FunctionProperties {
    pub fn env(&self, name: &str) -> Option<&EnvironmentValue> {
        self.environment
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

/// Generated credentials secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretProperties {
    pub description: String,
    pub username: String,
    /// JSON key the generated password is stored under
    pub generate_string_key: String,
    pub password_length: u32,
    pub exclude_characters: String,
}

/// Managed relational database instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseProperties {
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub allocated_storage_gb: u32,
    pub database_name: String,
    /// Logical ID of the secret holding the master credentials
    pub credentials_secret: String,
    pub storage_encrypted: bool,
    pub multi_az: bool,
    pub publicly_accessible: bool,
    pub deletion_protection: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleProperties {
    pub description: String,
    pub schedule: String,
    pub target_function: String,
    pub enabled: bool,
}
