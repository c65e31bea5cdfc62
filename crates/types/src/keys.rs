//! Configuration key names

pub const DEPLOYMENT_REGION: &str = "DEPLOYMENT_REGION";
pub const MISSION_NAME: &str = "MISSION_NAME";
pub const MISSION_PKG: &str = "MISSION_PKG";
pub const VALID_DATA_LEVELS: &str = "VALID_DATA_LEVELS";
pub const INSTR_NAMES: &str = "INSTR_NAMES";
pub const INCOMING_BUCKET_NAME: &str = "INCOMING_BUCKET_NAME";
pub const SORTING_LAMBDA_BUCKET_NAME: &str = "SORTING_LAMBDA_BUCKET_NAME";
pub const S3_SERVER_ACCESS_LOGS_BUCKET_NAME: &str = "S3_SERVER_ACCESS_LOGS_BUCKET_NAME";
pub const PROCESSING_LAMBDA_PRIVATE_ECR_NAME: &str = "PROCESSING_LAMBDA_PRIVATE_ECR_NAME";
pub const DOCKER_BASE_PUBLIC_ECR_NAME: &str = "DOCKER_BASE_PUBLIC_ECR_NAME";
pub const TIMESTREAM_DATABASE_NAME: &str = "TIMESTREAM_DATABASE_NAME";
pub const TIMESTREAM_S3_LOGS_TABLE_NAME: &str = "TIMESTREAM_S3_LOGS_TABLE_NAME";

/// Marker contained in every key whose value is a bucket base name
pub const BUCKET_NAME_MARKER: &str = "BUCKET_NAME";
/// Marker contained in every key whose value is a public ECR repository name
pub const PUBLIC_ECR_NAME_MARKER: &str = "PUBLIC_ECR_NAME";
/// Marker contained in every key whose value is a private ECR repository name
pub const PRIVATE_ECR_NAME_MARKER: &str = "PRIVATE_ECR_NAME";
