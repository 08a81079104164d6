//! Installer configuration.
//!
//! Settings come from an optional TOML file, overridden by command-line
//! flags, and are resolved into an immutable [`InstallSettings`] before the
//! pipeline starts. Resolution fails fast on anything required but missing.

use crate::descriptor::AggregateSpec;
use crate::error::{InstallerError, Result};
use crate::manifest::DEFAULT_MANIFEST_FILE;
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Scope applied to every generated dependency unless configured otherwise.
pub const DEFAULT_DEPENDENCY_SCOPE: &str = "test";

/// Name of the aggregate descriptor unless configured otherwise.
pub const DEFAULT_AGGREGATE_NAME: &str = "Third-party dependencies";

/// Destination of the aggregate descriptor unless configured otherwise.
pub const DEFAULT_AGGREGATE_OUTPUT: &str = "target/generated-pom.xml";

/// Raw configuration as read from TOML and command-line overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallerConfig {
    /// Inclusion patterns keyed by sub-directory.
    #[serde(default)]
    pub include: BTreeMap<String, String>,
    /// Directory holding the manifest and vendored sub-directories.
    pub lib_dir: Option<Utf8PathBuf>,
    /// Manifest file name inside `lib_dir`.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Prefix for derived group ids.
    pub group_prefix: Option<String>,
    /// Scope applied to every dependency in the aggregate descriptor.
    #[serde(default = "default_scope")]
    pub dependency_scope: String,
    /// Repository root; defaults to the local user repository.
    pub repository: Option<Utf8PathBuf>,
    /// Aggregate descriptor settings.
    #[serde(default)]
    pub aggregate: AggregateConfig,
}

/// Aggregate descriptor settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateConfig {
    /// Artifact id of the aggregate descriptor.
    pub artifact_id: Option<String>,
    /// Group id of the aggregate descriptor; defaults to the group prefix.
    pub group_id: Option<String>,
    /// Human-readable name.
    #[serde(default = "default_aggregate_name")]
    pub name: String,
    /// Version of the aggregate descriptor.
    pub version: Option<String>,
    /// Where the aggregate descriptor is written.
    #[serde(default = "default_aggregate_output")]
    pub output: Utf8PathBuf,
    /// Whether the aggregate descriptor is also installed into the repository.
    #[serde(default = "default_true")]
    pub install: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            include: BTreeMap::new(),
            lib_dir: None,
            manifest_file: default_manifest_file(),
            group_prefix: None,
            dependency_scope: default_scope(),
            repository: None,
            aggregate: AggregateConfig::default(),
        }
    }
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            artifact_id: None,
            group_id: None,
            name: default_aggregate_name(),
            version: None,
            output: default_aggregate_output(),
            install: true,
        }
    }
}

fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_owned()
}

fn default_scope() -> String {
    DEFAULT_DEPENDENCY_SCOPE.to_owned()
}

fn default_aggregate_name() -> String {
    DEFAULT_AGGREGATE_NAME.to_owned()
}

fn default_aggregate_output() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_AGGREGATE_OUTPUT)
}

const fn default_true() -> bool {
    true
}

/// Fully resolved settings consumed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSettings {
    /// Inclusion patterns keyed by sub-directory, not yet compiled.
    pub include: BTreeMap<String, String>,
    /// Directory holding the manifest and vendored sub-directories.
    pub lib_dir: Utf8PathBuf,
    /// Manifest file name inside `lib_dir`.
    pub manifest_file: String,
    /// Prefix for derived group ids.
    pub group_prefix: String,
    /// Scope applied to every generated dependency.
    pub dependency_scope: String,
    /// Repository root.
    pub repository: Utf8PathBuf,
    /// Identity of the aggregate descriptor.
    pub aggregate: AggregateSpec,
    /// Where the aggregate descriptor is written.
    pub aggregate_output: Utf8PathBuf,
    /// Whether the aggregate descriptor is installed into the repository.
    pub install_aggregate: bool,
}

impl InstallSettings {
    /// Full path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.lib_dir.join(&self.manifest_file)
    }
}

impl InstallerConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] if the file cannot be read
    /// or is not valid configuration.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| InstallerError::Configuration {
                reason: format!("failed to read {path}: {e}"),
            })?;
        Self::from_toml(&contents).map_err(|e| InstallerError::Configuration {
            reason: format!("{path}: {e}"),
        })
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error if the text is malformed or has unknown keys.
    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Resolve into [`InstallSettings`].
    ///
    /// `default_repository` is used when no repository is configured.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] naming the first required
    /// value that is missing.
    pub fn resolve(self, default_repository: Option<Utf8PathBuf>) -> Result<InstallSettings> {
        let lib_dir = required(self.lib_dir, "lib_dir")?;
        let group_prefix = required(non_blank(self.group_prefix), "group_prefix")?;
        let artifact_id = required(non_blank(self.aggregate.artifact_id), "aggregate.artifact_id")?;
        let version = required(non_blank(self.aggregate.version), "aggregate.version")?;
        let repository = self
            .repository
            .or(default_repository)
            .ok_or_else(|| InstallerError::Configuration {
                reason: "could not determine the local repository; set `repository`".to_owned(),
            })?;
        let group_id = non_blank(self.aggregate.group_id).unwrap_or_else(|| group_prefix.clone());

        Ok(InstallSettings {
            include: self.include,
            lib_dir,
            manifest_file: self.manifest_file,
            group_prefix,
            dependency_scope: self.dependency_scope,
            repository,
            aggregate: AggregateSpec {
                artifact_id,
                group_id,
                name: self.aggregate.name,
                version,
            },
            aggregate_output: self.aggregate.output,
            install_aggregate: self.aggregate.install,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required<T>(value: Option<T>, key: &str) -> Result<T> {
    value.ok_or_else(|| InstallerError::Configuration {
        reason: format!("`{key}` is required"),
    })
}
