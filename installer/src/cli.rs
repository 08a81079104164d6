//! CLI argument definitions for the third-party installer.
//!
//! Every setting can come from the TOML configuration file; flags given on
//! the command line override the file.

use crate::config::InstallerConfig;
use crate::error::Result;
use camino::Utf8PathBuf;
use clap::Parser;

/// Install vendored third-party libraries into a local repository.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "thirdparty-installer")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install vendored third-party libraries into a local repository.\n\n",
    "The installer reads the library manifest (versions.xml) from the library ",
    "directory, keeps the entries whose file names match the inclusion patterns ",
    "configured for their sub-directory, installs each one under a derived ",
    "coordinate, and writes an aggregate descriptor listing every installed ",
    "library as a dependency.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install using a configuration file:\n",
    "    $ thirdparty-installer --config thirdparty.toml\n\n",
    "  Configure everything on the command line:\n",
    "    $ thirdparty-installer --lib-dir lib --group-prefix com.example.thirdparty \\\n",
    "        --include 'development=jsf-.*,derby.*' --include 'global=.*' \\\n",
    "        --artifact-id thirdparty-deps --aggregate-version 1.0.0\n\n",
    "  Preview without installing:\n",
    "    $ thirdparty-installer --config thirdparty.toml --dry-run",
))]
pub struct Cli {
    /// TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// Directory holding the manifest and vendored sub-directories.
    #[arg(long, value_name = "DIR")]
    pub lib_dir: Option<Utf8PathBuf>,

    /// Manifest file name inside the library directory [default: versions.xml].
    #[arg(long, value_name = "NAME")]
    pub manifest_file: Option<String>,

    /// Inclusion patterns for a sub-directory (repeatable).
    #[arg(short, long, value_name = "SUBDIR=REGEX", value_parser = parse_include)]
    pub include: Vec<(String, String)>,

    /// Prefix for derived group ids.
    #[arg(short, long, value_name = "PREFIX")]
    pub group_prefix: Option<String>,

    /// Scope of every generated dependency [default: test].
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// Artifact id of the aggregate descriptor.
    #[arg(long, value_name = "ID")]
    pub artifact_id: Option<String>,

    /// Group id of the aggregate descriptor [default: the group prefix].
    #[arg(long, value_name = "ID")]
    pub aggregate_group_id: Option<String>,

    /// Name of the aggregate descriptor.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Version of the aggregate descriptor.
    #[arg(long, value_name = "VERSION")]
    pub aggregate_version: Option<String>,

    /// Destination of the aggregate descriptor [default: target/generated-pom.xml].
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,

    /// Repository root [default: ~/.m2/repository].
    #[arg(short, long, value_name = "DIR")]
    pub repository: Option<Utf8PathBuf>,

    /// Write the aggregate descriptor without installing it.
    #[arg(long)]
    pub skip_aggregate_install: bool,

    /// Show what would be installed and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl Cli {
    /// Load the configuration file, if any, and apply command-line overrides.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::InstallerError::Configuration`] if the
    /// configuration file cannot be read or parsed.
    pub fn load_config(&self) -> Result<InstallerConfig> {
        let mut config = match &self.config {
            Some(path) => InstallerConfig::load(path)?,
            None => InstallerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    /// Overlay the flags that were given onto `config`.
    ///
    /// `--include` entries replace the file's list for the same
    /// sub-directory and leave the others in place.
    pub fn apply_overrides(&self, config: &mut InstallerConfig) {
        config
            .include
            .extend(self.include.iter().cloned());
        override_with(&mut config.lib_dir, &self.lib_dir);
        override_with(&mut config.group_prefix, &self.group_prefix);
        override_with(&mut config.repository, &self.repository);
        override_with(&mut config.aggregate.artifact_id, &self.artifact_id);
        override_with(&mut config.aggregate.group_id, &self.aggregate_group_id);
        override_with(&mut config.aggregate.version, &self.aggregate_version);
        if let Some(manifest_file) = &self.manifest_file {
            config.manifest_file.clone_from(manifest_file);
        }
        if let Some(scope) = &self.scope {
            config.dependency_scope.clone_from(scope);
        }
        if let Some(name) = &self.name {
            config.aggregate.name.clone_from(name);
        }
        if let Some(output) = &self.output {
            config.aggregate.output.clone_from(output);
        }
        if self.skip_aggregate_install {
            config.aggregate.install = false;
        }
    }
}

fn override_with<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        target.clone_from(value);
    }
}

/// Parse a `SUBDIR=REGEX[,REGEX...]` inclusion argument.
///
/// # Errors
///
/// Returns a message for clap when the argument has no `=` or names no
/// sub-directory.
///
/// # Examples
///
/// ```
/// use thirdparty_installer::cli::parse_include;
///
/// let (subdirectory, patterns) = parse_include("development=jsf-.*,derby")?;
/// assert_eq!(subdirectory, "development");
/// assert_eq!(patterns, "jsf-.*,derby");
/// # Ok::<(), String>(())
/// ```
pub fn parse_include(value: &str) -> std::result::Result<(String, String), String> {
    let (subdirectory, patterns) = value
        .split_once('=')
        .ok_or_else(|| format!("expected SUBDIR=REGEX, got `{value}`"))?;
    let subdirectory = subdirectory.trim();
    if subdirectory.is_empty() {
        return Err(format!("missing sub-directory in `{value}`"));
    }
    Ok((subdirectory.to_owned(), patterns.to_owned()))
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
