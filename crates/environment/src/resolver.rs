//! Environment scoped naming, removal policy and tagging

use chrono::{DateTime, Utc};
use types::tags::{PIPELINE_PURPOSE, TAG_ENVIRONMENT, TAG_LAST_MODIFIED, TAG_PURPOSE, TAG_VERSION};
use types::{EnvironmentContext, ResourcePolicy, ResourceTagSet};

/// Logical ID prefix outside production
pub const DEV_ID_PREFIX: &str = "dev_";
/// Stack name prefix outside production
pub const DEV_STACK_PREFIX: &str = "Dev-";

/// Derives per-resource names, policies and tags from an [`EnvironmentContext`].
///
/// Every function is a pure function of its arguments.
pub struct EnvironmentResolver;

impl EnvironmentResolver {
    /// Physical resource name: unchanged in production, prefixed otherwise
    pub fn resolve_name(base_name: &str, context: &EnvironmentContext) -> String {
        format!("{}{}", context.name_prefix(), base_name)
    }

    /// Logical identifier inside a stack
    pub fn resolve_id(base_id: &str, context: &EnvironmentContext) -> String {
        if context.is_production() {
            base_id.to_string()
        } else {
            format!("{}{}", DEV_ID_PREFIX, base_id)
        }
    }

    /// Stack name for a deployment
    pub fn stack_name(base_name: &str, context: &EnvironmentContext) -> String {
        if context.is_production() {
            base_name.to_string()
        } else {
            format!("{}{}", DEV_STACK_PREFIX, base_name)
        }
    }

    /// Production retains and never auto-deletes; everything else is disposable
    pub fn policy_for(context: &EnvironmentContext) -> ResourcePolicy {
        if context.is_production() {
            ResourcePolicy::RETAIN
        } else {
            ResourcePolicy::DESTROY
        }
    }

    /// Standard tags stamped with the current time
    pub fn tags_for(context: &EnvironmentContext, git_version: Option<&str>) -> ResourceTagSet {
        Self::tags_for_at(context, git_version, Utc::now())
    }

    /// Standard tags stamped with `timestamp`. An empty version is treated as absent.
    pub fn tags_for_at(
        context: &EnvironmentContext,
        git_version: Option<&str>,
        timestamp: DateTime<Utc>,
    ) -> ResourceTagSet {
        let mut tags = ResourceTagSet::new();
        tags.insert(TAG_PURPOSE, PIPELINE_PURPOSE);
        tags.insert(TAG_LAST_MODIFIED, timestamp.to_rfc3339());
        tags.insert(TAG_ENVIRONMENT, context.environment().label());

        if let Some(version) = git_version.filter(|v| !v.is_empty()) {
            tags.insert(TAG_VERSION, version);
        }

        tags
    }
}
