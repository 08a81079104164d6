//! Error types for the third-party dependency installer.
//!
//! Every failure is terminal for a run: the pipeline performs no retries, so
//! each variant carries enough context to point at the offending manifest
//! entry, pattern or artifact.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while installing third-party libraries.
#[derive(Debug, Error)]
pub enum InstallerError {
    /// Required configuration is missing or malformed.
    #[error("invalid configuration: {reason}")]
    Configuration {
        /// Description of the configuration problem.
        reason: String,
    },

    /// An inclusion pattern failed to compile.
    #[error("invalid inclusion pattern `{pattern}` for sub-directory {subdirectory}: {source}")]
    InvalidPattern {
        /// Sub-directory the pattern was configured for.
        subdirectory: String,
        /// The rejected pattern text.
        pattern: String,
        /// Compilation error reported by the regex engine.
        #[source]
        source: regex::Error,
    },

    /// The manifest, or the vendored tree it describes, is structurally broken.
    #[error("invalid manifest: {reason}")]
    ManifestFormat {
        /// Description of the structural problem.
        reason: String,
    },

    /// An existing install directory does not belong to the artifact being
    /// installed over it.
    #[error("name of artifact '{artifact_id}' differs from artifact directory: {directory}")]
    ArtifactCollision {
        /// Artifact id derived from the manifest entry.
        artifact_id: String,
        /// Directory found at the artifact's repository location.
        directory: Utf8PathBuf,
    },

    /// A generated descriptor failed structural validation.
    #[error("the artifact information for {subject} is incomplete or not valid:\n{}", render_complaints(.complaints))]
    Validation {
        /// Coordinate of the descriptor that was rejected.
        subject: String,
        /// Complaints reported by the validator, verbatim.
        complaints: Vec<String>,
    },

    /// Writing an artifact into the repository failed.
    #[error("error installing artifact '{conflict_id}': {source}")]
    Installation {
        /// `group:artifact:type` of the artifact being installed.
        conflict_id: String,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The aggregate dependency count does not match the number of installs.
    #[error("dependency count: {dependencies} differs from number of installations: {installed}")]
    Consistency {
        /// Number of dependencies in the aggregate descriptor.
        dependencies: usize,
        /// Number of successful installations.
        installed: usize,
    },

    /// A descriptor could not be serialised.
    #[error("failed to serialise descriptor: {reason}")]
    DescriptorWrite {
        /// Description of the serialisation failure.
        reason: String,
    },

    /// Failed to write a generated file.
    #[error("failed to write {path}")]
    WriteFailed {
        /// Destination that could not be written.
        path: Utf8PathBuf,
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn render_complaints(complaints: &[String]) -> String {
    complaints
        .iter()
        .map(|complaint| format!("  - {complaint}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Result type alias using [`InstallerError`].
pub type Result<T> = std::result::Result<T, InstallerError>;
