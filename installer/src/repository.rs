//! Local repository installation.
//!
//! Artifacts are laid out the way a Maven local repository expects:
//! `<root>/<group as path>/<artifact>/<version>/<artifact>-<version>.<type>`,
//! with the descriptor stored beside the binary as
//! `<artifact>-<version>.pom`.

use crate::coordinate::Coordinate;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::fs;

/// Extension used for descriptor files in the repository.
pub const DESCRIPTOR_EXTENSION: &str = "pom";

/// Places artifacts into a repository keyed by coordinate.
#[cfg_attr(test, mockall::automock)]
pub trait ArtifactInstaller {
    /// Install `binary` with its `descriptor` under `coordinate`.
    ///
    /// Any earlier install of the same artifact is evicted first. Returns the
    /// repository path of the installed binary.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Collision`] if the existing install directory
    /// belongs to a different artifact, or [`InstallError::Io`] if the
    /// repository cannot be written.
    fn install(
        &self,
        binary: &Utf8Path,
        coordinate: &Coordinate,
        descriptor: &Utf8Path,
    ) -> Result<Utf8PathBuf, InstallError>;

    /// Install a descriptor-only artifact, such as the aggregate `pom`.
    ///
    /// # Errors
    ///
    /// Same as [`ArtifactInstaller::install`].
    fn install_descriptor(
        &self,
        coordinate: &Coordinate,
        descriptor: &Utf8Path,
    ) -> Result<Utf8PathBuf, InstallError>;
}

/// Errors arising from repository installation.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// The directory at the artifact's location is named for another artifact.
    #[error("name of artifact '{artifact_id}' differs from artifact directory: {directory}")]
    Collision {
        /// Artifact id being installed.
        artifact_id: String,
        /// Directory that would have been replaced.
        directory: Utf8PathBuf,
    },

    /// Reading the source files or writing the repository failed.
    #[error("repository I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A repository rooted at a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    root: Utf8PathBuf,
}

impl LocalRepository {
    /// Create a repository rooted at `root`.
    #[must_use]
    pub fn new(root: Utf8PathBuf) -> Self {
        Self { root }
    }

    /// Return the repository root.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Directory holding every version of the coordinate's artifact.
    #[must_use]
    pub fn artifact_dir(&self, coordinate: &Coordinate) -> Utf8PathBuf {
        coordinate
            .group_id()
            .split('.')
            .fold(self.root.clone(), |path, segment| path.join(segment))
            .join(coordinate.artifact_id())
    }

    /// Repository path of the coordinate's binary.
    ///
    /// ```
    /// use camino::Utf8PathBuf;
    /// use thirdparty_installer::coordinate::Coordinate;
    /// use thirdparty_installer::repository::LocalRepository;
    ///
    /// let repository = LocalRepository::new(Utf8PathBuf::from("/repo"));
    /// let coordinate = Coordinate::new("com.example.dev", "foo-1.0", "jar", "2.3");
    /// assert_eq!(
    ///     repository.artifact_path(&coordinate),
    ///     Utf8PathBuf::from("/repo/com/example/dev/foo-1.0/2.3/foo-1.0-2.3.jar"),
    /// );
    /// ```
    #[must_use]
    pub fn artifact_path(&self, coordinate: &Coordinate) -> Utf8PathBuf {
        self.file_path(coordinate, coordinate.kind())
    }

    /// Repository path of the coordinate's descriptor.
    #[must_use]
    pub fn descriptor_path(&self, coordinate: &Coordinate) -> Utf8PathBuf {
        self.file_path(coordinate, DESCRIPTOR_EXTENSION)
    }

    fn file_path(&self, coordinate: &Coordinate, extension: &str) -> Utf8PathBuf {
        self.artifact_dir(coordinate)
            .join(coordinate.version())
            .join(format!(
                "{}-{}.{extension}",
                coordinate.artifact_id(),
                coordinate.version()
            ))
    }

    /// Remove an earlier install of the coordinate's artifact.
    ///
    /// When a file already exists at the artifact path, the artifact
    /// directory two levels above it is deleted, provided it is named after
    /// the artifact.
    ///
    /// # Errors
    ///
    /// Returns [`InstallError::Collision`] if the directory is named for a
    /// different artifact, or [`InstallError::Io`] if deletion fails.
    pub fn evict_existing(&self, coordinate: &Coordinate) -> Result<(), InstallError> {
        let existing = self.artifact_path(coordinate);
        if !existing.exists() {
            return Ok(());
        }

        let Some(artifact_dir) = existing.parent().and_then(Utf8Path::parent) else {
            return Ok(());
        };
        if artifact_dir.file_name() != Some(coordinate.artifact_id()) {
            return Err(InstallError::Collision {
                artifact_id: coordinate.artifact_id().to_owned(),
                directory: artifact_dir.to_owned(),
            });
        }

        debug!("removing previous install at {artifact_dir}");
        fs::remove_dir_all(artifact_dir)?;
        Ok(())
    }

    fn prepare_version_dir(&self, coordinate: &Coordinate) -> Result<(), InstallError> {
        self.evict_existing(coordinate)?;
        fs::create_dir_all(self.artifact_dir(coordinate).join(coordinate.version()))?;
        Ok(())
    }
}

impl ArtifactInstaller for LocalRepository {
    fn install(
        &self,
        binary: &Utf8Path,
        coordinate: &Coordinate,
        descriptor: &Utf8Path,
    ) -> Result<Utf8PathBuf, InstallError> {
        self.prepare_version_dir(coordinate)?;

        let artifact_path = self.artifact_path(coordinate);
        fs::copy(binary, &artifact_path)?;
        if coordinate.kind() != DESCRIPTOR_EXTENSION {
            fs::copy(descriptor, self.descriptor_path(coordinate))?;
        }

        Ok(artifact_path)
    }

    fn install_descriptor(
        &self,
        coordinate: &Coordinate,
        descriptor: &Utf8Path,
    ) -> Result<Utf8PathBuf, InstallError> {
        self.prepare_version_dir(coordinate)?;

        let descriptor_path = self.descriptor_path(coordinate);
        fs::copy(descriptor, &descriptor_path)?;
        Ok(descriptor_path)
    }
}

/// Return the default local repository, `~/.m2/repository`.
///
/// Returns `None` when the home directory cannot be determined or is not
/// valid UTF-8.
#[must_use]
pub fn default_repository_root() -> Option<Utf8PathBuf> {
    directories_next::BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::try_from(dirs.home_dir().to_path_buf()).ok())
        .map(|home| home.join(".m2").join("repository"))
}
