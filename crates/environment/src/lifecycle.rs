//! Image lifecycle and data retention rules

use types::{LifecycleRule, RetentionProperties};

/// Images kept per protected tag prefix
pub const PROTECTED_IMAGE_COUNT: u32 = 9999;
/// Age after which unprotected images expire
pub const IMAGE_EXPIRY_DAYS: u32 = 30;

/// Lifecycle rules for private container repositories.
///
/// Order matters: the registry evaluates rules by priority, so the two keep rules
/// for version and `latest` tags come before the age based expiry.
pub fn ecr_lifecycle_rules() -> Vec<LifecycleRule> {
    vec![
        LifecycleRule {
            priority: 1,
            description: Some("Keeps images prefixed with version tag (e.i. v0.0.1)".to_string()),
            tag_prefixes: vec!["v".to_string()],
            max_image_count: Some(PROTECTED_IMAGE_COUNT),
            max_image_age_days: None,
        },
        LifecycleRule {
            priority: 2,
            description: Some("Keeps images prefixed with latest".to_string()),
            tag_prefixes: vec!["latest".to_string()],
            max_image_count: Some(PROTECTED_IMAGE_COUNT),
            max_image_age_days: None,
        },
        LifecycleRule {
            priority: 3,
            description: None,
            tag_prefixes: Vec::new(),
            max_image_count: None,
            max_image_age_days: Some(IMAGE_EXPIRY_DAYS),
        },
    ]
}

/// Retention of the bucket log table
pub fn timestream_retention() -> RetentionProperties {
    RetentionProperties {
        magnetic_store_retention_days: 30,
        memory_store_retention_hours: 24,
    }
}
