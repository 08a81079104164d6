//! Selection and installation pipeline.
//!
//! The pipeline compiles the inclusion patterns, parses the manifest, and
//! then walks its records in order. Each admitted record is located on disk,
//! turned into a coordinate and descriptor, validated, and installed. Once
//! every record is processed the aggregate descriptor is generated from the
//! accumulated [`InstalledSet`] and reconciled against the install count.

use crate::config::InstallSettings;
use crate::coordinate::Coordinate;
use crate::descriptor::{Dependency, Descriptor};
use crate::error::{InstallerError, Result};
use crate::installed_set::InstalledSet;
use crate::manifest::{LibraryRecord, parse_manifest};
use crate::patterns::PatternSet;
use crate::repository::{ArtifactInstaller, InstallError};
use crate::validation::DescriptorValidator;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, trace, warn};
use std::fmt;
use std::fs;
use std::io::Write;

const TEMP_DESCRIPTOR_PREFIX: &str = "thirdparty-install";
const TEMP_DESCRIPTOR_SUFFIX: &str = ".pom";

/// Pipeline states, logged at trace level as the run advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Compiling inclusion patterns.
    Init,
    /// Reading and parsing the manifest.
    Parsing,
    /// Checking a record against the inclusion patterns.
    Filtering,
    /// Computing a record's coordinate and descriptor.
    Deriving,
    /// Validating a record's descriptor.
    Validating,
    /// Placing a record's artifact into the repository.
    Installing,
    /// Building the aggregate descriptor.
    Aggregating,
    /// Validating the aggregate descriptor.
    AggregateValidating,
    /// Installing the aggregate descriptor.
    AggregateInstalling,
    /// The run completed.
    Done,
    /// The run aborted.
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Parsing => "parsing",
            Self::Filtering => "filtering",
            Self::Deriving => "deriving",
            Self::Validating => "validating",
            Self::Installing => "installing",
            Self::Aggregating => "aggregating",
            Self::AggregateValidating => "aggregate-validating",
            Self::AggregateInstalling => "aggregate-installing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallSummary {
    /// Number of artifacts installed.
    pub installed: usize,
    /// Number of manifest records skipped by the inclusion patterns.
    pub skipped: usize,
    /// Where the aggregate descriptor was written, if any artifact was installed.
    pub aggregate: Option<Utf8PathBuf>,
}

/// A record that a real run would install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstall {
    /// Coordinate the artifact would be installed under.
    pub coordinate: Coordinate,
    /// Location of the backing file.
    pub source: Utf8PathBuf,
    /// Whether the backing file exists.
    pub present: bool,
}

/// What a run would do, computed without touching the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallPlan {
    /// Admitted records in manifest order.
    pub entries: Vec<PlannedInstall>,
    /// Number of records the inclusion patterns would skip.
    pub skipped: usize,
}

/// Orchestrates one installation run.
pub struct InstallPipeline<'a> {
    settings: &'a InstallSettings,
    validator: &'a dyn DescriptorValidator,
    installer: &'a dyn ArtifactInstaller,
}

impl<'a> InstallPipeline<'a> {
    /// Create a pipeline over resolved settings and its collaborators.
    #[must_use]
    pub fn new(
        settings: &'a InstallSettings,
        validator: &'a dyn DescriptorValidator,
        installer: &'a dyn ArtifactInstaller,
    ) -> Self {
        Self {
            settings,
            validator,
            installer,
        }
    }

    /// Install every admitted manifest record and write the aggregate
    /// descriptor.
    ///
    /// Installs performed before a failure remain in the repository.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; see [`InstallerError`] for the
    /// failure classes. Patterns are compiled before the manifest is read,
    /// so configuration errors surface before any file work.
    pub fn run(&self) -> Result<InstallSummary> {
        self.execute().inspect_err(|err| {
            trace!("stage: {}", Stage::Failed);
            debug!("run aborted: {err}");
        })
    }

    /// Compute what [`InstallPipeline::run`] would install.
    ///
    /// # Errors
    ///
    /// Returns configuration and manifest errors as [`InstallPipeline::run`]
    /// would; a missing backing file is reported in the plan instead.
    pub fn plan(&self) -> Result<InstallPlan> {
        let patterns = PatternSet::build(&self.settings.include)?;
        let records = self.read_manifest()?;

        let mut plan = InstallPlan::default();
        for record in &records {
            if !patterns.matches(record.subdirectory(), record.file_name()) {
                plan.skipped += 1;
                continue;
            }
            let source = self.source_path(record);
            plan.entries.push(PlannedInstall {
                coordinate: Coordinate::derive(record, &self.settings.group_prefix),
                present: source.is_file(),
                source,
            });
        }
        Ok(plan)
    }

    fn execute(&self) -> Result<InstallSummary> {
        enter(Stage::Init);
        let patterns = PatternSet::build(&self.settings.include)?;

        enter(Stage::Parsing);
        let records = self.read_manifest()?;

        let mut installed_set = InstalledSet::new();
        let mut installed = 0;
        let mut skipped = 0;
        for record in &records {
            enter(Stage::Filtering);
            if !patterns.matches(record.subdirectory(), record.file_name()) {
                debug!("skipping {}", record.full_file_name());
                skipped += 1;
                continue;
            }
            warn_incomplete(record);
            self.install_record(record, &mut installed_set)?;
            installed += 1;
        }

        let aggregate = if installed_set.is_empty() {
            info!("no libraries matched the inclusion patterns");
            None
        } else {
            Some(self.install_aggregate(installed_set, installed)?)
        };

        enter(Stage::Done);
        Ok(InstallSummary {
            installed,
            skipped,
            aggregate,
        })
    }

    fn read_manifest(&self) -> Result<Vec<LibraryRecord>> {
        let path = self.settings.manifest_path();
        if !path.is_file() {
            return Err(InstallerError::ManifestFormat {
                reason: format!("{path} doesn't exist"),
            });
        }
        debug!("reading manifest {path}");
        parse_manifest(&fs::read_to_string(&path)?)
    }

    fn source_path(&self, record: &LibraryRecord) -> Utf8PathBuf {
        self.settings
            .lib_dir
            .join(record.subdirectory())
            .join(record.file_name())
    }

    fn install_record(&self, record: &LibraryRecord, installed_set: &mut InstalledSet) -> Result<()> {
        let binary = self.source_path(record);
        if !binary.is_file() {
            return Err(InstallerError::ManifestFormat {
                reason: format!("File: {binary} not found"),
            });
        }

        enter(Stage::Deriving);
        let coordinate = Coordinate::derive(record, &self.settings.group_prefix);
        let descriptor = Descriptor::for_artifact(&coordinate, record);

        enter(Stage::Validating);
        self.check(&descriptor, &coordinate)?;
        installed_set.insert(
            coordinate.group_id(),
            record.file_name(),
            Dependency::new(&coordinate, &self.settings.dependency_scope),
        );

        enter(Stage::Installing);
        let temporary = write_temporary(&descriptor)?;
        let installed_at = self
            .installer
            .install(&binary, &coordinate, temp_path(&temporary)?)
            .map_err(|err| installation_error(err, &coordinate))?;
        info!("installed {coordinate} to {installed_at}");
        Ok(())
    }

    fn install_aggregate(&self, installed_set: InstalledSet, installed: usize) -> Result<Utf8PathBuf> {
        enter(Stage::Aggregating);
        let dependencies = installed_set.len();
        let aggregate = Descriptor::aggregate(&self.settings.aggregate, installed_set.into_dependencies());
        let coordinate = aggregate.coordinate();

        enter(Stage::AggregateValidating);
        self.check(&aggregate, &coordinate)?;
        let output = &self.settings.aggregate_output;
        aggregate.write_to(output)?;
        info!("wrote aggregate descriptor with {dependencies} dependencies to {output}");

        if dependencies != installed {
            return Err(InstallerError::Consistency {
                dependencies,
                installed,
            });
        }

        if self.settings.install_aggregate {
            enter(Stage::AggregateInstalling);
            let installed_at = self
                .installer
                .install_descriptor(&coordinate, output)
                .map_err(|err| installation_error(err, &coordinate))?;
            info!("installed {coordinate} to {installed_at}");
        }

        Ok(output.clone())
    }

    fn check(&self, descriptor: &Descriptor, coordinate: &Coordinate) -> Result<()> {
        let complaints = self.validator.validate(descriptor);
        if complaints.is_empty() {
            return Ok(());
        }
        Err(InstallerError::Validation {
            subject: coordinate.conflict_id(),
            complaints,
        })
    }
}

// Only admitted records are reported; skipped entries stay quiet.
fn warn_incomplete(record: &LibraryRecord) {
    if record.version_defaulted() {
        warn!("Version of: {} is missing", record.full_file_name());
        warn!("Setting version to {}", record.version());
    }
    if !record.has_license_block() {
        warn!("Library: {} has no license", record.full_file_name());
    }
}

fn enter(stage: Stage) {
    trace!("stage: {stage}");
}

// The file is removed when the handle drops, whichever way the install ends.
fn write_temporary(descriptor: &Descriptor) -> Result<tempfile::NamedTempFile> {
    let xml = descriptor.to_xml()?;
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_DESCRIPTOR_PREFIX)
        .suffix(TEMP_DESCRIPTOR_SUFFIX)
        .tempfile()?;
    file.write_all(xml.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn temp_path(file: &tempfile::NamedTempFile) -> Result<&Utf8Path> {
    Utf8Path::from_path(file.path()).ok_or_else(|| InstallerError::DescriptorWrite {
        reason: format!("temporary path {} is not valid UTF-8", file.path().display()),
    })
}

fn installation_error(error: InstallError, coordinate: &Coordinate) -> InstallerError {
    match error {
        InstallError::Collision {
            artifact_id,
            directory,
        } => InstallerError::ArtifactCollision {
            artifact_id,
            directory,
        },
        InstallError::Io(source) => InstallerError::Installation {
            conflict_id: coordinate.conflict_id(),
            source,
        },
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
