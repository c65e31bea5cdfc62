//! Subcommand implementations

use crate::cli::OutputFormat;
use anyhow::{bail, Context, Result};
use config::{ConfigLoader, EnvironmentSignals, ManifestValidator, ValidationReport};
use environment::EnvironmentResolver;
use provisioner::{RecordingProvisioner, ResourcePlan};
use serde::Serialize;
use std::path::Path;
use tracing::{error, info, warn};
use types::{ConfigManifest, EnvironmentContext, ResourcePolicy};

/// Manifest with its names resolved for the current environment
#[derive(Debug, Serialize)]
pub struct ManifestSummary<'a> {
    pub environment: &'static str,
    pub policy: ResourcePolicy,
    pub buckets: Vec<String>,
    pub private_repositories: Vec<String>,
    pub public_repositories: Vec<String>,
    pub manifest: &'a ConfigManifest,
    pub validation: &'a ValidationReport,
}

/// Load and validate the configuration, halting on any validation error
pub fn load_validated(
    config_path: &Path,
    signals: &EnvironmentSignals,
) -> Result<(ConfigManifest, ValidationReport)> {
    let manifest = ConfigLoader::load(config_path, signals)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let report = ManifestValidator::validate(&manifest);
    for issue in &report.warnings {
        warn!("{}: {}", issue.field, issue.message);
    }
    for issue in &report.errors {
        error!("{}: {}", issue.field, issue.message);
    }
    info!("{}", report.summary());

    if !report.is_valid() {
        report
            .clone()
            .into_result()
            .context("Configuration validation failed")?;
    }

    Ok((manifest, report))
}

pub fn validate(config_path: &Path, signals: &EnvironmentSignals, format: OutputFormat) -> Result<String> {
    let (manifest, report) = load_validated(config_path, signals)?;
    let context = EnvironmentContext::new(manifest.deployment_environment);

    let summary = ManifestSummary {
        environment: context.environment().label(),
        policy: EnvironmentResolver::policy_for(&context),
        buckets: resolve_all(&manifest.bucket_list, &context),
        private_repositories: resolve_all(&manifest.ecr_private_repo_list, &context),
        public_repositories: resolve_all(&manifest.ecr_public_repo_list, &context),
        manifest: &manifest,
        validation: &report,
    };

    render(&summary, format)
}

pub fn plan(config_path: &Path, signals: &EnvironmentSignals, format: OutputFormat) -> Result<String> {
    let (manifest, _) = load_validated(config_path, signals)?;
    let context = EnvironmentContext::new(manifest.deployment_environment);

    let plan = ResourcePlan::build(&manifest, &context, signals)
        .context("Failed to build resource plan")?;

    let mut provisioner = RecordingProvisioner::new();
    let declared = plan
        .provision(&mut provisioner)
        .context("Failed to declare resources")?;
    info!("Declared {} resources for {}", declared, plan.stack_name);

    render(&plan, format)
}

pub fn init(path: &Path, force: bool) -> Result<String> {
    if path.exists() && !force {
        bail!(
            "{} already exists, pass --force to overwrite it",
            path.display()
        );
    }

    ConfigLoader::create_example(path)?;
    info!("Example configuration written to {}", path.display());
    Ok(format!("Wrote example configuration to {}", path.display()))
}

fn resolve_all(names: &[String], context: &EnvironmentContext) -> Vec<String> {
    names
        .iter()
        .map(|name| EnvironmentResolver::resolve_name(name, context))
        .collect()
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to serialize output as JSON")
        }
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).context("Failed to serialize output as YAML")
        }
    }
}
