//! Resource plan: every resource of the pipeline, resolved for one environment

use crate::traits::ResourceProvisioner;
use chrono::{DateTime, Utc};
use config::EnvironmentSignals;
use environment::{ecr_lifecycle_rules, timestream_retention, EnvironmentResolver};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use types::{
    keys, BucketNotification, BucketProperties, ConfigManifest, DatabaseProperties,
    DeploymentEnvironment, EnvironmentContext, EnvironmentValue, FunctionCode,
    FunctionProperties, NotificationTarget, ObjectEvent, PermissionGrant, QueueProperties,
    ResourceKind, ResourcePolicy, ResourceProperties, ResourceSpec, Result, ScheduleProperties,
    SecretProperties, TableProperties,
};

/// Base name of the pipeline stack
pub const PIPELINE_STACK_NAME: &str = "SDCAWSPipelineArchitectureStack";

const SORTING_FUNCTION_NAME: &str = "aws_sdc_sorting_lambda_function";
const SORTING_SCHEDULE_NAME: &str = "aws_sdc_lambda_cw_event";
/// Twice a day, picks up any files the bucket trigger missed
const SORTING_SCHEDULE: &str = "cron(0 0,12 * * ? *)";

const PROCESSING_TIMEOUT_MINUTES: u32 = 15;
const SORTING_TIMEOUT_MINUTES: u32 = 10;
const SORTING_MEMORY_MB: u32 = 128;

const RDS_SECRET_NAME: &str = "RDSCredentialsSecret";
const RDS_USERNAME: &str = "cdftracker_user";
const RDS_PASSWORD_LENGTH: u32 = 20;
const RDS_PASSWORD_EXCLUDED: &str = r#"{}[]:;"<>?,./\|`~!@#$%^&*()-=_+"#;
const RDS_ALLOCATED_STORAGE_GB: u32 = 30;

const TIMESTREAM_ACTIONS: &[&str] = &[
    "timestream:WriteRecords",
    "timestream:DescribeEndpoints",
    "timestream:DescribeDatabase",
    "timestream:DescribeTable",
];
const RDS_DATA_ACTIONS: &[&str] = &["rds-data:ExecuteStatement", "rds-data:BatchExecuteStatement"];
const SECRET_READ_ACTIONS: &[&str] = &["secretsmanager:GetSecretValue", "secretsmanager:DescribeSecret"];
const ECR_PULL_PUSH_ACTIONS: &[&str] = &[
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "ecr:PutImage",
    "ecr:InitiateLayerUpload",
    "ecr:UploadLayerPart",
    "ecr:CompleteLayerUpload",
];

/// Resource kinds in declaration order. Each kind's step may also declare
/// dependent kinds: tables come with databases, topics and queues with buckets,
/// the credentials secret, database and schedule rule with functions.
const DECLARATION_ORDER: [ResourceKind; 5] = [
    ResourceKind::TimestreamDatabase,
    ResourceKind::Bucket,
    ResourceKind::PrivateRepository,
    ResourceKind::PublicRepository,
    ResourceKind::Function,
];

/// Ordered resource declarations for one synthesis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourcePlan {
    pub stack_name: String,
    pub environment: DeploymentEnvironment,
    pub resources: Vec<ResourceSpec>,
}

impl ResourcePlan {
    /// Build the plan for a validated manifest, stamping tags with the current time
    pub fn build(
        manifest: &ConfigManifest,
        context: &EnvironmentContext,
        signals: &EnvironmentSignals,
    ) -> Result<Self> {
        Self::build_at(manifest, context, signals, Utc::now())
    }

    /// Build the plan with a fixed tag timestamp
    pub fn build_at(
        manifest: &ConfigManifest,
        context: &EnvironmentContext,
        signals: &EnvironmentSignals,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let mut builder = PlanBuilder {
            manifest,
            context,
            signals,
            timestamp,
            resources: Vec::new(),
        };

        for kind in DECLARATION_ORDER {
            debug!("Planning {} resources", kind);
            builder.declare(kind)?;
        }

        Ok(Self {
            stack_name: EnvironmentResolver::stack_name(PIPELINE_STACK_NAME, context),
            environment: context.environment(),
            resources: builder.resources,
        })
    }

    /// Declare every resource in plan order, stopping at the first failure.
    /// Returns the number of declared resources.
    pub fn provision(&self, provisioner: &mut dyn ResourceProvisioner) -> Result<usize> {
        info!(
            "Provisioning {} resources for {} with {} provisioner",
            self.resources.len(),
            self.stack_name,
            provisioner.name()
        );

        for spec in &self.resources {
            provisioner.declare(spec)?;
            info!("Created the {} {}", spec.name, spec.kind);
        }

        Ok(self.resources.len())
    }

    pub fn resources_of(&self, kind: ResourceKind) -> impl Iterator<Item = &ResourceSpec> {
        self.resources.iter().filter(move |spec| spec.kind == kind)
    }

    pub fn find(&self, kind: ResourceKind, name: &str) -> Option<&ResourceSpec> {
        self.resources_of(kind).find(|spec| spec.name == name)
    }
}

/// Storage resources the processing function reads its connection from
struct ProcessingStorage {
    secret_id: String,
    /// Absent on dry runs
    database_id: Option<String>,
    database_name: String,
}

impl ProcessingStorage {
    fn secret_arn(&self) -> EnvironmentValue {
        match self.database_id {
            Some(_) => EnvironmentValue::reference(self.secret_id.as_str(), "secret_arn"),
            None => EnvironmentValue::literal(""),
        }
    }

    fn endpoint(&self, attribute: &str) -> EnvironmentValue {
        match &self.database_id {
            Some(database_id) => EnvironmentValue::reference(database_id.as_str(), attribute),
            None => EnvironmentValue::literal(""),
        }
    }
}

struct PlanBuilder<'a> {
    manifest: &'a ConfigManifest,
    context: &'a EnvironmentContext,
    signals: &'a EnvironmentSignals,
    timestamp: DateTime<Utc>,
    resources: Vec<ResourceSpec>,
}

impl<'a> PlanBuilder<'a> {
    fn name(&self, base_name: &str) -> String {
        EnvironmentResolver::resolve_name(base_name, self.context)
    }

    fn id(&self, base_id: &str) -> String {
        EnvironmentResolver::resolve_id(base_id, self.context)
    }

    fn policy(&self) -> ResourcePolicy {
        EnvironmentResolver::policy_for(self.context)
    }

    fn push(
        &mut self,
        kind: ResourceKind,
        logical_id: String,
        name: String,
        policy: Option<ResourcePolicy>,
        properties: ResourceProperties,
    ) {
        let tags =
            EnvironmentResolver::tags_for_at(self.context, self.signals.version(), self.timestamp);
        self.resources.push(ResourceSpec {
            kind,
            logical_id,
            name,
            policy,
            tags,
            properties,
        });
    }

    fn declare(&mut self, kind: ResourceKind) -> Result<()> {
        match kind {
            ResourceKind::TimestreamDatabase => self.declare_timestream(),
            ResourceKind::Bucket => self.declare_buckets(),
            ResourceKind::PrivateRepository => self.declare_private_repositories(),
            ResourceKind::PublicRepository => self.declare_public_repositories(),
            ResourceKind::Function => self.declare_functions(),
            ResourceKind::TimestreamTable
            | ResourceKind::Topic
            | ResourceKind::Queue
            | ResourceKind::ScheduleRule
            | ResourceKind::Secret
            | ResourceKind::Database => Ok(()),
        }
    }

    fn declare_timestream(&mut self) -> Result<()> {
        let manifest = self.manifest;
        let database_name = self.name(manifest.require(keys::TIMESTREAM_DATABASE_NAME)?);
        let table_name = self.name(manifest.require(keys::TIMESTREAM_S3_LOGS_TABLE_NAME)?);

        self.push(
            ResourceKind::TimestreamDatabase,
            self.id("timestream_database"),
            database_name.clone(),
            Some(self.policy()),
            ResourceProperties::TimestreamDatabase,
        );

        self.push(
            ResourceKind::TimestreamTable,
            self.id("timestream_table"),
            table_name,
            Some(self.policy()),
            ResourceProperties::TimestreamTable(TableProperties {
                database_name,
                retention: timestream_retention(),
            }),
        );

        Ok(())
    }

    fn declare_buckets(&mut self) -> Result<()> {
        let manifest = self.manifest;
        let mission_name = manifest.require(keys::MISSION_NAME)?;
        let access_logs_base = manifest.require(keys::S3_SERVER_ACCESS_LOGS_BUCKET_NAME)?;
        let incoming_base = manifest.require(keys::INCOMING_BUCKET_NAME)?;
        let data_levels = manifest.valid_data_levels();

        // Access logs are only collected in production
        let access_logs_bucket = if self.context.is_production() {
            let name = self.name(access_logs_base);
            self.push(
                ResourceKind::Bucket,
                self.id(&format!("aws_sdc_{}_bucket", access_logs_base)),
                name.clone(),
                Some(self.policy()),
                ResourceProperties::Bucket(BucketProperties {
                    versioned: true,
                    server_access_logs_bucket: None,
                    server_access_logs_prefix: None,
                    notifications: Vec::new(),
                }),
            );
            Some(name)
        } else {
            None
        };

        let mut declared = HashSet::new();
        for bucket in &manifest.bucket_list {
            if bucket == access_logs_base {
                continue;
            }
            if !declared.insert(bucket.as_str()) {
                warn!("Skipping repeated bucket {}", bucket);
                continue;
            }

            let name = self.name(bucket);
            let is_mission_bucket = bucket.contains(mission_name);
            let topic_name = format!("{}-sns-topic", name);
            let queue_name = format!("{}-sqs-queue", name);

            let mut notifications = Vec::new();
            if is_mission_bucket {
                notifications = level_notifications(&data_levels, &topic_name, &queue_name);
            }
            if bucket == incoming_base {
                notifications.push(BucketNotification {
                    event: ObjectEvent::ObjectCreated,
                    target: NotificationTarget::Function(self.name(SORTING_FUNCTION_NAME)),
                    prefix: None,
                });
            }

            self.push(
                ResourceKind::Bucket,
                self.id(&format!("aws_sdc_{}_bucket", bucket)),
                name.clone(),
                Some(self.policy()),
                ResourceProperties::Bucket(BucketProperties {
                    versioned: true,
                    server_access_logs_bucket: access_logs_bucket.clone(),
                    server_access_logs_prefix: access_logs_bucket
                        .as_ref()
                        .map(|_| format!("{}/", bucket)),
                    notifications,
                }),
            );

            if is_mission_bucket {
                self.push(
                    ResourceKind::Topic,
                    self.id(&format!("{}-sns-topic", bucket)),
                    topic_name.clone(),
                    None,
                    ResourceProperties::Topic,
                );

                self.push(
                    ResourceKind::Queue,
                    self.id(&format!("{}-sqs-queue", bucket)),
                    queue_name,
                    None,
                    ResourceProperties::Queue(QueueProperties {
                        encrypted: false,
                        subscribed_topic: topic_name.clone(),
                        raw_message_delivery: true,
                        allowed_senders: vec![topic_name, name],
                    }),
                );
            }
        }

        Ok(())
    }

    fn declare_private_repositories(&mut self) -> Result<()> {
        let manifest = self.manifest;
        for repository in &manifest.ecr_private_repo_list {
            self.push(
                ResourceKind::PrivateRepository,
                self.id(&format!("aws_sdc_{}_private_repo", repository)),
                self.name(repository),
                Some(self.policy()),
                ResourceProperties::Repository {
                    lifecycle_rules: ecr_lifecycle_rules(),
                },
            );
        }
        Ok(())
    }

    fn declare_public_repositories(&mut self) -> Result<()> {
        let manifest = self.manifest;
        for repository in &manifest.ecr_public_repo_list {
            self.push(
                ResourceKind::PublicRepository,
                self.id(&format!("aws_sdc_{}_public_repo", repository)),
                self.name(repository),
                Some(self.policy()),
                ResourceProperties::PublicRepository,
            );
        }
        Ok(())
    }

    /// Credentials secret and database backing the processing function
    fn declare_processing_storage(&mut self) -> Result<ProcessingStorage> {
        let manifest = self.manifest;
        let mission_name = manifest.require(keys::MISSION_NAME)?;

        // The secret keeps the name-style prefix on its logical ID
        let secret_id = self.name(RDS_SECRET_NAME);
        self.push(
            ResourceKind::Secret,
            secret_id.clone(),
            secret_id.clone(),
            None,
            ResourceProperties::Secret(SecretProperties {
                description: "RDS master user credentials for CDFTracker".to_string(),
                username: RDS_USERNAME.to_string(),
                generate_string_key: "password".to_string(),
                password_length: RDS_PASSWORD_LENGTH,
                exclude_characters: RDS_PASSWORD_EXCLUDED.to_string(),
            }),
        );

        let database_name = self.id(&format!("{}_db", mission_name));
        let database_id = if self.signals.is_dry_run() {
            info!("Dry run, skipping the {} {}", database_name, ResourceKind::Database);
            None
        } else {
            // Always retained, whatever the environment
            self.push(
                ResourceKind::Database,
                database_name.clone(),
                database_name.clone(),
                Some(ResourcePolicy::RETAIN),
                ResourceProperties::Database(DatabaseProperties {
                    engine: "postgres".to_string(),
                    engine_version: "14".to_string(),
                    instance_class: "t3.micro".to_string(),
                    allocated_storage_gb: RDS_ALLOCATED_STORAGE_GB,
                    database_name: database_name.clone(),
                    credentials_secret: secret_id.clone(),
                    storage_encrypted: false,
                    multi_az: false,
                    publicly_accessible: true,
                    deletion_protection: true,
                }),
            );
            Some(database_name.clone())
        };

        Ok(ProcessingStorage {
            secret_id,
            database_id,
            database_name,
        })
    }

    fn declare_functions(&mut self) -> Result<()> {
        let manifest = self.manifest;
        let processing_repository = manifest.require(keys::PROCESSING_LAMBDA_PRIVATE_ECR_NAME)?;
        let sorting_bucket = manifest.require(keys::SORTING_LAMBDA_BUCKET_NAME)?;
        let lambda_environment = (
            "LAMBDA_ENVIRONMENT".to_string(),
            EnvironmentValue::literal(self.context.environment().as_str()),
        );

        let storage = self.declare_processing_storage()?;

        let mut instrument_buckets: Vec<String> = Vec::new();
        for bucket in &manifest.instrument_bucket_list {
            let name = self.name(bucket);
            if !instrument_buckets.contains(&name) {
                instrument_buckets.push(name);
            }
        }
        let mut all_buckets: Vec<String> = Vec::new();
        for bucket in &manifest.bucket_list {
            let name = self.name(bucket);
            if !all_buckets.contains(&name) {
                all_buckets.push(name);
            }
        }

        let repository_name = self.name(processing_repository);
        let processing_base = format!("{}_function", processing_repository);
        self.push(
            ResourceKind::Function,
            self.id(&processing_base),
            self.name(&processing_base),
            None,
            ResourceProperties::Function(FunctionProperties {
                description: "SWSOC Processing Lambda function".to_string(),
                code: FunctionCode::ContainerImage {
                    repository: repository_name.clone(),
                    tag: self.signals.image_tag().to_string(),
                },
                timeout_minutes: PROCESSING_TIMEOUT_MINUTES,
                memory_mb: None,
                environment: vec![
                    lambda_environment.clone(),
                    ("RDS_SECRET_ARN".to_string(), storage.secret_arn()),
                    ("RDS_HOST".to_string(), storage.endpoint("endpoint_address")),
                    ("RDS_PORT".to_string(), storage.endpoint("endpoint_port")),
                    (
                        "RDS_DATABASE".to_string(),
                        EnvironmentValue::literal(storage.database_name.as_str()),
                    ),
                ],
                subscriptions: instrument_buckets
                    .iter()
                    .map(|bucket| format!("{}-sns-topic", bucket))
                    .collect(),
                bucket_access: instrument_buckets,
                permissions: vec![
                    PermissionGrant::new(SECRET_READ_ACTIONS, vec![storage.secret_id.clone()]),
                    PermissionGrant::new(TIMESTREAM_ACTIONS, vec!["*".to_string()]),
                    PermissionGrant::new(
                        RDS_DATA_ACTIONS,
                        vec![storage
                            .database_id
                            .clone()
                            .unwrap_or_else(|| "*".to_string())],
                    ),
                    PermissionGrant::new(ECR_PULL_PUSH_ACTIONS, vec![repository_name]),
                ],
            }),
        );

        let sorting_function = self.name(SORTING_FUNCTION_NAME);
        self.push(
            ResourceKind::Function,
            self.id("aws_sdc_sorting_function"),
            sorting_function.clone(),
            None,
            ResourceProperties::Function(FunctionProperties {
                description: "SWSOC Sorting Lambda function".to_string(),
                code: FunctionCode::Archive {
                    bucket: self.name(sorting_bucket),
                    key: self.signals.archive_key().map(str::to_string),
                },
                timeout_minutes: SORTING_TIMEOUT_MINUTES,
                memory_mb: Some(SORTING_MEMORY_MB),
                environment: vec![lambda_environment],
                subscriptions: Vec::new(),
                bucket_access: all_buckets,
                permissions: vec![PermissionGrant::new(TIMESTREAM_ACTIONS, vec!["*".to_string()])],
            }),
        );

        self.push(
            ResourceKind::ScheduleRule,
            self.id(SORTING_SCHEDULE_NAME),
            self.name(SORTING_SCHEDULE_NAME),
            None,
            ResourceProperties::ScheduleRule(ScheduleProperties {
                description: "CloudWatch event trigger for the AWS Sorting Lambda, runs every 12 hours"
                    .to_string(),
                schedule: SORTING_SCHEDULE.to_string(),
                target_function: sorting_function,
                enabled: true,
            }),
        );

        Ok(())
    }
}

/// PUT and COPY notifications for every data level prefix. Levels equal to the
/// last one go straight to the queue, the rest fan out through the topic.
fn level_notifications(levels: &[&str], topic: &str, queue: &str) -> Vec<BucketNotification> {
    let mut notifications = Vec::new();
    let last = levels.last();
    for level in levels {
        let target = if Some(level) == last {
            NotificationTarget::Queue(queue.to_string())
        } else {
            NotificationTarget::Topic(topic.to_string())
        };

        for event in [ObjectEvent::ObjectCreatedCopy, ObjectEvent::ObjectCreatedPut] {
            notifications.push(BucketNotification {
                event,
                target: target.clone(),
                prefix: Some(format!("{}/", level)),
            });
        }
    }
    notifications
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RecordingProvisioner;
    use chrono::TimeZone;
    use config::{ConfigLoader, ManifestValidator};
    use types::{PipelineError, RemovalPolicy};

    const HERMES_CONFIG: &str = r#"
DEPLOYMENT_REGION: us-east-1
MISSION_NAME: hermes
MISSION_PKG: hermes_core
VALID_DATA_LEVELS: ["l0", "l1", "ql"]
INSTR_NAMES: ["eea", "merit"]
INCOMING_BUCKET_NAME: swsoc-incoming
SORTING_LAMBDA_BUCKET_NAME: swsoc-sorting-lambda-bucket
S3_SERVER_ACCESS_LOGS_BUCKET_NAME: swsoc-s3-server-access-logs
PROCESSING_LAMBDA_PRIVATE_ECR_NAME: sdc_aws_processing_lambda
DOCKER_BASE_PUBLIC_ECR_NAME: swsoc-docker-lambda-base
TIMESTREAM_DATABASE_NAME: sdc_aws_logs
TIMESTREAM_S3_LOGS_TABLE_NAME: sdc_aws_s3_bucket_log_table
"#;

    fn plan_for(signals: &EnvironmentSignals) -> ResourcePlan {
        let manifest = ConfigLoader::load_from_str(HERMES_CONFIG, signals).unwrap();
        assert!(ManifestValidator::validate(&manifest).is_valid());

        let context = EnvironmentContext::new(manifest.deployment_environment);
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        ResourcePlan::build_at(&manifest, &context, signals, timestamp).unwrap()
    }

    fn bucket_names(plan: &ResourcePlan) -> Vec<&str> {
        plan.resources_of(ResourceKind::Bucket)
            .map(|spec| spec.name.as_str())
            .collect()
    }

    fn bucket_properties(spec: &ResourceSpec) -> &BucketProperties {
        match &spec.properties {
            ResourceProperties::Bucket(properties) => properties,
            other => panic!("expected bucket properties, got {:?}", other),
        }
    }

    #[test]
    fn test_development_end_to_end() {
        let yaml = r#"
MISSION_NAME: hermes
INSTR_NAMES: ["eea", "merit"]
INCOMING_BUCKET_NAME: swsoc-incoming
"#;
        let signals = EnvironmentSignals::development();
        let manifest = ConfigLoader::load_from_str(yaml, &signals).unwrap();
        assert_eq!(
            manifest.bucket_list,
            vec!["swsoc-incoming", "hermes-eea", "hermes-merit"]
        );

        let context = EnvironmentContext::new(manifest.deployment_environment);
        let resolved: Vec<String> = manifest
            .bucket_list
            .iter()
            .map(|bucket| EnvironmentResolver::resolve_name(bucket, &context))
            .collect();
        assert_eq!(
            resolved,
            vec!["dev-swsoc-incoming", "dev-hermes-eea", "dev-hermes-merit"]
        );

        let policy = EnvironmentResolver::policy_for(&context);
        assert_eq!(policy.removal_policy, RemovalPolicy::Destroy);
        assert!(policy.auto_delete);
    }

    #[test]
    fn test_production_end_to_end() {
        let yaml = r#"
MISSION_NAME: hermes
INSTR_NAMES: ["eea", "merit"]
INCOMING_BUCKET_NAME: swsoc-incoming
"#;
        let signals = EnvironmentSignals::production();
        let manifest = ConfigLoader::load_from_str(yaml, &signals).unwrap();
        let context = EnvironmentContext::new(manifest.deployment_environment);

        let resolved: Vec<String> = manifest
            .bucket_list
            .iter()
            .map(|bucket| EnvironmentResolver::resolve_name(bucket, &context))
            .collect();
        assert_eq!(resolved, manifest.bucket_list);

        let policy = EnvironmentResolver::policy_for(&context);
        assert_eq!(policy.removal_policy, RemovalPolicy::Retain);
        assert!(!policy.auto_delete);
    }

    #[test]
    fn test_development_plan_buckets() {
        let plan = plan_for(&EnvironmentSignals::development());

        assert_eq!(plan.stack_name, "Dev-SDCAWSPipelineArchitectureStack");
        assert_eq!(
            bucket_names(&plan),
            vec![
                "dev-swsoc-incoming",
                "dev-swsoc-sorting-lambda-bucket",
                "dev-hermes-eea",
                "dev-hermes-merit",
            ]
        );

        for spec in plan.resources_of(ResourceKind::Bucket) {
            assert_eq!(spec.policy, Some(ResourcePolicy::DESTROY));
            assert!(spec.logical_id.starts_with("dev_"));
            assert!(bucket_properties(spec).server_access_logs_bucket.is_none());
        }
    }

    #[test]
    fn test_production_plan_buckets() {
        let plan = plan_for(&EnvironmentSignals::production());

        assert_eq!(plan.stack_name, PIPELINE_STACK_NAME);
        assert_eq!(
            bucket_names(&plan),
            vec![
                "swsoc-s3-server-access-logs",
                "swsoc-incoming",
                "swsoc-sorting-lambda-bucket",
                "hermes-eea",
                "hermes-merit",
            ]
        );

        let incoming = plan.find(ResourceKind::Bucket, "swsoc-incoming").unwrap();
        let properties = bucket_properties(incoming);
        assert_eq!(
            properties.server_access_logs_bucket.as_deref(),
            Some("swsoc-s3-server-access-logs")
        );
        assert_eq!(properties.server_access_logs_prefix.as_deref(), Some("swsoc-incoming/"));
    }

    #[test]
    fn test_production_never_destroys() {
        let plan = plan_for(&EnvironmentSignals::production());
        for spec in &plan.resources {
            if let Some(policy) = spec.policy {
                assert_eq!(policy, ResourcePolicy::RETAIN, "{}", spec.name);
            }
        }
    }

    #[test]
    fn test_instrument_buckets_publish_level_notifications() {
        let plan = plan_for(&EnvironmentSignals::development());
        let eea = plan.find(ResourceKind::Bucket, "dev-hermes-eea").unwrap();
        let notifications = &bucket_properties(eea).notifications;

        // Two events per level
        assert_eq!(notifications.len(), 6);
        assert_eq!(notifications[0].event, ObjectEvent::ObjectCreatedCopy);
        assert_eq!(notifications[1].event, ObjectEvent::ObjectCreatedPut);
        assert_eq!(notifications[0].prefix.as_deref(), Some("l0/"));
        assert_eq!(
            notifications[0].target,
            NotificationTarget::Topic("dev-hermes-eea-sns-topic".to_string())
        );
        assert_eq!(notifications[5].prefix.as_deref(), Some("ql/"));
        assert_eq!(
            notifications[5].target,
            NotificationTarget::Queue("dev-hermes-eea-sqs-queue".to_string())
        );

        assert!(plan.find(ResourceKind::Topic, "dev-hermes-eea-sns-topic").is_some());
        let queue = plan.find(ResourceKind::Queue, "dev-hermes-eea-sqs-queue").unwrap();
        match &queue.properties {
            ResourceProperties::Queue(properties) => {
                assert!(!properties.encrypted);
                assert!(properties.raw_message_delivery);
                assert_eq!(properties.subscribed_topic, "dev-hermes-eea-sns-topic");
            }
            other => panic!("expected queue properties, got {:?}", other),
        }
    }

    #[test]
    fn test_incoming_bucket_triggers_sorting_function() {
        let plan = plan_for(&EnvironmentSignals::development());
        let incoming = plan.find(ResourceKind::Bucket, "dev-swsoc-incoming").unwrap();

        assert_eq!(
            bucket_properties(incoming).notifications,
            vec![BucketNotification {
                event: ObjectEvent::ObjectCreated,
                target: NotificationTarget::Function(
                    "dev-aws_sdc_sorting_lambda_function".to_string()
                ),
                prefix: None,
            }]
        );
        assert_eq!(plan.resources_of(ResourceKind::Topic).count(), 2);
    }

    #[test]
    fn test_repositories_and_timestream() {
        let plan = plan_for(&EnvironmentSignals::development());

        let private = plan
            .find(ResourceKind::PrivateRepository, "dev-sdc_aws_processing_lambda")
            .unwrap();
        match &private.properties {
            ResourceProperties::Repository { lifecycle_rules } => assert_eq!(lifecycle_rules.len(), 3),
            other => panic!("expected repository properties, got {:?}", other),
        }
        assert!(plan
            .find(ResourceKind::PublicRepository, "dev-swsoc-docker-lambda-base")
            .is_some());

        let table = plan
            .find(ResourceKind::TimestreamTable, "dev-sdc_aws_s3_bucket_log_table")
            .unwrap();
        assert_eq!(table.logical_id, "dev_timestream_table");
        match &table.properties {
            ResourceProperties::TimestreamTable(properties) => {
                assert_eq!(properties.database_name, "dev-sdc_aws_logs");
                assert_eq!(properties.retention.magnetic_store_retention_days, 30);
            }
            other => panic!("expected table properties, got {:?}", other),
        }
    }

    #[test]
    fn test_functions_follow_signals() {
        let signals = EnvironmentSignals {
            tag: Some("v2.0.1".to_string()),
            zip_name: Some("sorting_lambda.zip".to_string()),
            ..EnvironmentSignals::production()
        };
        let plan = plan_for(&signals);

        let processing = plan
            .find(ResourceKind::Function, "sdc_aws_processing_lambda_function")
            .unwrap();
        match &processing.properties {
            ResourceProperties::Function(properties) => {
                assert_eq!(
                    properties.code,
                    FunctionCode::ContainerImage {
                        repository: "sdc_aws_processing_lambda".to_string(),
                        tag: "v2.0.1".to_string(),
                    }
                );
                assert_eq!(
                    properties.env("LAMBDA_ENVIRONMENT"),
                    Some(&EnvironmentValue::literal("PRODUCTION"))
                );
                assert_eq!(
                    properties.subscriptions,
                    vec!["hermes-eea-sns-topic", "hermes-merit-sns-topic"]
                );
            }
            other => panic!("expected function properties, got {:?}", other),
        }

        let sorting = plan
            .find(ResourceKind::Function, "aws_sdc_sorting_lambda_function")
            .unwrap();
        match &sorting.properties {
            ResourceProperties::Function(properties) => {
                assert_eq!(
                    properties.code,
                    FunctionCode::Archive {
                        bucket: "swsoc-sorting-lambda-bucket".to_string(),
                        key: Some("sorting_lambda.zip".to_string()),
                    }
                );
                assert_eq!(properties.memory_mb, Some(128));
            }
            other => panic!("expected function properties, got {:?}", other),
        }

        let schedule = plan.resources_of(ResourceKind::ScheduleRule).next().unwrap();
        match &schedule.properties {
            ResourceProperties::ScheduleRule(properties) => {
                assert_eq!(properties.schedule, "cron(0 0,12 * * ? *)");
                assert_eq!(properties.target_function, "aws_sdc_sorting_lambda_function");
            }
            other => panic!("expected schedule properties, got {:?}", other),
        }
    }

    #[test]
    fn test_every_resource_is_tagged() {
        let plan = plan_for(&EnvironmentSignals::development().with_version("v1.0.0"));
        for spec in &plan.resources {
            assert_eq!(spec.tags.get("Environment"), Some("Development"));
            assert_eq!(spec.tags.get("Version"), Some("v1.0.0"));
            assert_eq!(spec.tags.get("Last-Modified"), Some("2024-05-01T00:00:00+00:00"));
        }
    }

    #[test]
    fn test_repeated_bucket_declared_once() {
        let yaml = format!("{}EEA_BUCKET_NAME: hermes-eea\n", HERMES_CONFIG);
        let signals = EnvironmentSignals::development();
        let manifest = ConfigLoader::load_from_str(&yaml, &signals).unwrap();
        assert_eq!(
            manifest.bucket_list.iter().filter(|b| *b == "hermes-eea").count(),
            2
        );

        let plan = ResourcePlan::build(&manifest, &EnvironmentContext::development(), &signals).unwrap();
        assert_eq!(
            bucket_names(&plan).iter().filter(|b| **b == "dev-hermes-eea").count(),
            1
        );
    }

    #[test]
    fn test_missing_key_fails_build() {
        let yaml = "MISSION_NAME: hermes\nINSTR_NAMES: [eea]\n";
        let signals = EnvironmentSignals::development();
        let manifest = ConfigLoader::load_from_str(yaml, &signals).unwrap();

        let result = ResourcePlan::build(&manifest, &EnvironmentContext::development(), &signals);
        assert!(matches!(result, Err(PipelineError::Config(ref msg)) if msg.contains("TIMESTREAM_DATABASE_NAME")));
    }

    #[test]
    fn test_provision_declares_in_plan_order() {
        let plan = plan_for(&EnvironmentSignals::development());
        let mut provisioner = RecordingProvisioner::new();

        let declared = plan.provision(&mut provisioner).unwrap();
        assert_eq!(declared, plan.resources.len());
        assert_eq!(provisioner.declared(), plan.resources.as_slice());
        assert_eq!(
            provisioner.declared()[0].kind,
            ResourceKind::TimestreamDatabase
        );
        assert_eq!(provisioner.declared_of(ResourceKind::Function).count(), 2);
    }

    #[test]
    fn test_provision_stops_at_first_failure() {
        let plan = plan_for(&EnvironmentSignals::development());
        let mut provisioner = RecordingProvisioner::new();
        plan.provision(&mut provisioner).unwrap();

        // Declaring the same plan again collides on the first logical ID
        let result = plan.provision(&mut provisioner);
        assert!(matches!(result, Err(PipelineError::Provisioning { .. })));
        assert_eq!(provisioner.into_declared().len(), plan.resources.len());
    }

    fn function_properties<'p>(plan: &'p ResourcePlan, name: &str) -> &'p FunctionProperties {
        match &plan.find(ResourceKind::Function, name).unwrap().properties {
            ResourceProperties::Function(properties) => properties,
            other => panic!("expected function properties, got {:?}", other),
        }
    }

    #[test]
    fn test_repeated_last_level_goes_to_queue() {
        let notifications = level_notifications(&["l0", "l1", "l0"], "topic", "queue");
        let queue = NotificationTarget::Queue("queue".to_string());
        let topic = NotificationTarget::Topic("topic".to_string());

        let targets: Vec<&NotificationTarget> =
            notifications.iter().map(|n| &n.target).collect();
        assert_eq!(
            targets,
            vec![&queue, &queue, &topic, &topic, &queue, &queue]
        );
    }

    #[test]
    fn test_repeated_instruments_subscribe_once() {
        let yaml = HERMES_CONFIG.replace(r#"["eea", "merit"]"#, r#"["eea", "eea", "merit"]"#);
        let signals = EnvironmentSignals::development();
        let manifest = ConfigLoader::load_from_str(&yaml, &signals).unwrap();
        assert_eq!(manifest.instrument_bucket_list.len(), 3);

        let plan = ResourcePlan::build(&manifest, &EnvironmentContext::development(), &signals).unwrap();
        let processing = function_properties(&plan, "dev-sdc_aws_processing_lambda_function");
        assert_eq!(
            processing.subscriptions,
            vec!["dev-hermes-eea-sns-topic", "dev-hermes-merit-sns-topic"]
        );
        assert_eq!(processing.bucket_access, vec!["dev-hermes-eea", "dev-hermes-merit"]);
    }

    #[test]
    fn test_processing_database_and_secret() {
        let plan = plan_for(&EnvironmentSignals::development());

        let secret = plan
            .find(ResourceKind::Secret, "dev-RDSCredentialsSecret")
            .unwrap();
        assert_eq!(secret.logical_id, "dev-RDSCredentialsSecret");
        match &secret.properties {
            ResourceProperties::Secret(properties) => {
                assert_eq!(properties.username, "cdftracker_user");
                assert_eq!(properties.password_length, 20);
            }
            other => panic!("expected secret properties, got {:?}", other),
        }

        let database = plan.find(ResourceKind::Database, "dev_hermes_db").unwrap();
        assert_eq!(database.policy, Some(ResourcePolicy::RETAIN));
        match &database.properties {
            ResourceProperties::Database(properties) => {
                assert!(properties.deletion_protection);
                assert_eq!(properties.engine, "postgres");
                assert_eq!(properties.credentials_secret, "dev-RDSCredentialsSecret");
            }
            other => panic!("expected database properties, got {:?}", other),
        }

        let processing = function_properties(&plan, "dev-sdc_aws_processing_lambda_function");
        assert_eq!(
            processing.env("RDS_HOST"),
            Some(&EnvironmentValue::reference("dev_hermes_db", "endpoint_address"))
        );
        assert_eq!(
            processing.env("RDS_SECRET_ARN"),
            Some(&EnvironmentValue::reference("dev-RDSCredentialsSecret", "secret_arn"))
        );
        assert_eq!(
            processing.env("RDS_DATABASE"),
            Some(&EnvironmentValue::literal("dev_hermes_db"))
        );
    }

    #[test]
    fn test_production_database_name() {
        let plan = plan_for(&EnvironmentSignals::production());
        assert!(plan.find(ResourceKind::Database, "hermes_db").is_some());
        assert!(plan.find(ResourceKind::Secret, "RDSCredentialsSecret").is_some());
    }

    #[test]
    fn test_dry_run_skips_database() {
        let plan = plan_for(&EnvironmentSignals::development().with_dry_run());

        assert_eq!(plan.resources_of(ResourceKind::Database).count(), 0);
        assert_eq!(plan.resources_of(ResourceKind::Secret).count(), 1);

        let processing = function_properties(&plan, "dev-sdc_aws_processing_lambda_function");
        for variable in ["RDS_SECRET_ARN", "RDS_HOST", "RDS_PORT"] {
            assert_eq!(processing.env(variable), Some(&EnvironmentValue::literal("")));
        }
        assert_eq!(
            processing.env("RDS_DATABASE"),
            Some(&EnvironmentValue::literal("dev_hermes_db"))
        );

        let rds_data = processing
            .permissions
            .iter()
            .find(|grant| grant.allows("rds-data:ExecuteStatement"))
            .unwrap();
        assert_eq!(rds_data.resources, vec!["*"]);
    }

    #[test]
    fn test_function_permissions() {
        let plan = plan_for(&EnvironmentSignals::production());

        let processing = function_properties(&plan, "sdc_aws_processing_lambda_function");
        let grant_for = |action: &str| {
            processing
                .permissions
                .iter()
                .find(|grant| grant.allows(action))
                .map(|grant| grant.resources.clone())
        };
        assert_eq!(grant_for("timestream:WriteRecords"), Some(vec!["*".to_string()]));
        assert_eq!(
            grant_for("secretsmanager:GetSecretValue"),
            Some(vec!["RDSCredentialsSecret".to_string()])
        );
        assert_eq!(grant_for("rds-data:ExecuteStatement"), Some(vec!["hermes_db".to_string()]));
        assert_eq!(
            grant_for("ecr:PutImage"),
            Some(vec!["sdc_aws_processing_lambda".to_string()])
        );

        let sorting = function_properties(&plan, "aws_sdc_sorting_lambda_function");
        assert_eq!(sorting.permissions.len(), 1);
        assert!(sorting.permissions[0].allows("timestream:DescribeTable"));
    }
}
