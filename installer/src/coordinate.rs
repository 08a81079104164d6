//! Repository coordinates derived from manifest entries.
//!
//! Coordinates follow a fixed convention: the group is the configured prefix
//! joined with the library's sub-directory, the artifact id is the file name
//! without its final extension, and the type is that extension.

use crate::manifest::{LibraryRecord, extract_last};
use std::fmt;

/// Package coordinates identifying one artifact in a repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    group_id: String,
    artifact_id: String,
    kind: String,
    version: String,
}

impl Coordinate {
    /// Create a coordinate from its parts.
    #[must_use]
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        kind: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            kind: kind.into(),
            version: version.into(),
        }
    }

    /// Derive the coordinate for a manifest entry.
    ///
    /// The file name is split at its last `.`, so `foo.bar.jar` yields
    /// artifact `foo.bar` of type `jar`. A name without any `.` keeps the
    /// whole name as artifact id and an empty type, which validation rejects.
    ///
    /// # Examples
    ///
    /// ```
    /// use thirdparty_installer::coordinate::Coordinate;
    /// use thirdparty_installer::manifest::LibraryRecord;
    ///
    /// let record = LibraryRecord::new("dev/foo-1.0.jar", "2.3")?;
    /// let coordinate = Coordinate::derive(&record, "com.example");
    /// assert_eq!(coordinate.group_id(), "com.example.dev");
    /// assert_eq!(coordinate.artifact_id(), "foo-1.0");
    /// assert_eq!(coordinate.kind(), "jar");
    /// assert_eq!(coordinate.version(), "2.3");
    /// # Ok::<(), thirdparty_installer::error::InstallerError>(())
    /// ```
    #[must_use]
    pub fn derive(record: &LibraryRecord, group_prefix: &str) -> Self {
        let file_name = record.file_name();
        let kind = extract_last(file_name, '.').unwrap_or_default();
        let artifact_id = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem);

        Self::new(
            group_id_for(group_prefix, record.subdirectory()),
            artifact_id,
            kind,
            record.version(),
        )
    }

    /// Group id, e.g. `com.example.development`.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id, e.g. `derby`.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Packaging type, e.g. `jar` or `pom`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Version string, copied verbatim from the manifest.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// `group:artifact:type`, the identity used when reporting conflicts.
    #[must_use]
    pub fn conflict_id(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.kind)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.group_id, self.artifact_id, self.kind, self.version
        )
    }
}

/// Join the configured group prefix and a vendored sub-directory.
#[must_use]
pub fn group_id_for(group_prefix: &str, subdirectory: &str) -> String {
    format!("{group_prefix}.{subdirectory}")
}
