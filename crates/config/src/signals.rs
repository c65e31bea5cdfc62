//! External environment signals read once per run

use figment::providers::Env;
use serde::Serialize;
use types::DeploymentEnvironment;

/// Image tag used when no `TAG` signal is set
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Opaque string signals taken from the process environment.
///
/// These are read at the edge of the program and passed down explicitly; nothing
/// below the binary consults the process environment on its own. Values are kept
/// verbatim: `GIT_TAG=1.10` stays `1.10` and `TAG=007` stays `007`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnvironmentSignals {
    /// `CDK_ENVIRONMENT`: production iff exactly `PRODUCTION`
    pub cdk_environment: Option<String>,
    /// `GIT_TAG`: version recorded in the `Version` tag
    pub git_tag: Option<String>,
    /// `TAG`: container image tag of the processing function
    pub tag: Option<String>,
    /// `ZIP_NAME`: object key of the sorting function archive
    pub zip_name: Option<String>,
    /// `DRY_RUN`: any non-empty value skips the processing database
    pub dry_run: Option<String>,
}

impl EnvironmentSignals {
    /// Environment variables consulted by [`EnvironmentSignals::from_env`]
    pub const VARIABLES: [&'static str; 5] =
        ["CDK_ENVIRONMENT", "GIT_TAG", "TAG", "ZIP_NAME", "DRY_RUN"];

    /// Read signals from the process environment.
    ///
    /// Uses the raw text of each variable; figment's value parsing would turn
    /// version-like strings into numbers.
    pub fn from_env() -> Self {
        let env = Env::raw().only(&Self::VARIABLES);
        Self::from_pairs(env.iter().map(|(key, value)| (key.as_str().to_string(), value)))
    }

    /// Build signals from `(variable, value)` pairs. Variable names match
    /// case-insensitively and unknown variables are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut signals = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref().trim().to_ascii_uppercase().as_str() {
                "CDK_ENVIRONMENT" => &mut signals.cdk_environment,
                "GIT_TAG" => &mut signals.git_tag,
                "TAG" => &mut signals.tag,
                "ZIP_NAME" => &mut signals.zip_name,
                "DRY_RUN" => &mut signals.dry_run,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        signals
    }

    /// Signals selecting production
    pub fn production() -> Self {
        Self {
            cdk_environment: Some(DeploymentEnvironment::PRODUCTION_MARKER.to_string()),
            ..Self::default()
        }
    }

    /// Signals selecting development
    pub fn development() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.git_tag = Some(version.into());
        self
    }

    pub fn deployment_environment(&self) -> DeploymentEnvironment {
        DeploymentEnvironment::from_signal(self.cdk_environment.as_deref())
    }

    /// Version signal; an empty value counts as absent
    pub fn version(&self) -> Option<&str> {
        self.git_tag.as_deref().filter(|v| !v.is_empty())
    }

    pub fn image_tag(&self) -> &str {
        self.tag
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_IMAGE_TAG)
    }

    pub fn archive_key(&self) -> Option<&str> {
        self.zip_name.as_deref().filter(|k| !k.is_empty())
    }

    pub fn with_dry_run(mut self) -> Self {
        self.dry_run = Some("true".to_string());
        self
    }

    /// Dry runs skip resources that need a live account lookup
    pub fn is_dry_run(&self) -> bool {
        self.dry_run.as_deref().map_or(false, |v| !v.is_empty())
    }
}
