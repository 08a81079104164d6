//! Parsing of the `versions.xml` library manifest.
//!
//! The manifest is all-or-nothing: every top-level element must be a
//! `library` entry, and every entry must name its file as
//! `sub-directory/file.ext`. Cosmetic gaps (missing version or licence block)
//! are tolerated and flagged on the record; the pipeline warns about them
//! for the entries it actually installs.
//!
//! ```xml
//! <libraries>
//!   <library>
//!     <file-name>development/derby.jar</file-name>
//!     <version>10.2</version>
//!     <project-name>Apache Derby</project-name>
//!     <project-url>http://db.apache.org/derby</project-url>
//!     <licenses>
//!       <license>
//!         <license-name>Apache License 2.0</license-name>
//!         <copyright-notice>Copyright (c) Apache</copyright-notice>
//!       </license>
//!     </licenses>
//!   </library>
//! </libraries>
//! ```

use crate::error::{InstallerError, Result};
use roxmltree::{Document, Node, ParsingOptions};

/// Default manifest file name inside the library directory.
pub const DEFAULT_MANIFEST_FILE: &str = "versions.xml";

/// Version recorded for entries that omit one.
pub const DEFAULT_VERSION: &str = "1.0";

const LIBRARY_TAG: &str = "library";

/// One licence declared for a library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    /// Licence name, e.g. "Apache License 2.0".
    pub name: Option<String>,
    /// Copyright notice accompanying the licence.
    pub notice: Option<String>,
}

/// A single `library` entry from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRecord {
    full_file_name: String,
    project_name: Option<String>,
    project_url: Option<String>,
    version: String,
    licenses: Vec<License>,
    has_license_block: bool,
    version_defaulted: bool,
}

impl LibraryRecord {
    /// Create a record for `sub-directory/file` with the given version.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::ManifestFormat`] if `full_file_name` does not
    /// consist of exactly one sub-directory and one file name.
    pub fn new(full_file_name: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let full_file_name = full_file_name.into();
        check_file_name(&full_file_name)?;
        Ok(Self {
            full_file_name,
            project_name: None,
            project_url: None,
            version: version.into(),
            licenses: Vec::new(),
            has_license_block: false,
            version_defaulted: false,
        })
    }

    /// Attach upstream project metadata.
    #[must_use]
    pub fn with_project(mut self, name: Option<String>, url: Option<String>) -> Self {
        self.project_name = name;
        self.project_url = url;
        self
    }

    /// Mark the record as carrying [`DEFAULT_VERSION`] because the manifest
    /// gave none.
    #[must_use]
    pub fn with_defaulted_version(mut self) -> Self {
        DEFAULT_VERSION.clone_into(&mut self.version);
        self.version_defaulted = true;
        self
    }

    /// Attach a licence block.
    #[must_use]
    pub fn with_licenses(mut self, licenses: Vec<License>) -> Self {
        self.licenses = licenses;
        self.has_license_block = true;
        self
    }

    /// The manifest's `file-name`, e.g. `development/derby.jar`.
    #[must_use]
    pub fn full_file_name(&self) -> &str {
        &self.full_file_name
    }

    /// The sub-directory part of the file name.
    #[must_use]
    pub fn subdirectory(&self) -> &str {
        extract_first(&self.full_file_name, '/').unwrap_or_default()
    }

    /// The bare file name without its sub-directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        extract_last(&self.full_file_name, '/').unwrap_or_default()
    }

    /// Upstream project name.
    #[must_use]
    pub fn project_name(&self) -> Option<&str> {
        self.project_name.as_deref()
    }

    /// Upstream project URL.
    #[must_use]
    pub fn project_url(&self) -> Option<&str> {
        self.project_url.as_deref()
    }

    /// Declared version, or [`DEFAULT_VERSION`] when the manifest omitted it.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared licences in manifest order.
    #[must_use]
    pub fn licenses(&self) -> &[License] {
        &self.licenses
    }

    /// Whether the entry carried a `licenses` block at all.
    #[must_use]
    pub fn has_license_block(&self) -> bool {
        self.has_license_block
    }

    /// Whether the manifest omitted the version.
    #[must_use]
    pub fn version_defaulted(&self) -> bool {
        self.version_defaulted
    }
}

/// Return the text before the first occurrence of `delimiter`.
///
/// ```
/// use thirdparty_installer::manifest::extract_first;
///
/// assert_eq!(extract_first("portal/spring.jar", '/'), Some("portal"));
/// assert_eq!(extract_first("spring.jar", '/'), None);
/// ```
#[must_use]
pub fn extract_first(value: &str, delimiter: char) -> Option<&str> {
    value.split_once(delimiter).map(|(first, _)| first)
}

/// Return the text after the last occurrence of `delimiter`.
///
/// ```
/// use thirdparty_installer::manifest::extract_last;
///
/// assert_eq!(extract_last("foo.bar.jar", '.'), Some("jar"));
/// assert_eq!(extract_last("README", '.'), None);
/// ```
#[must_use]
pub fn extract_last(value: &str, delimiter: char) -> Option<&str> {
    value.rsplit_once(delimiter).map(|(_, last)| last)
}

/// Parse manifest content into library records, in document order.
///
/// # Errors
///
/// Returns [`InstallerError::ManifestFormat`] when the document is not
/// well-formed XML, when a top-level element is not a `library`, or when a
/// library's `file-name` is empty or lacks its sub-directory.
pub fn parse_manifest(content: &str) -> Result<Vec<LibraryRecord>> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let document =
        Document::parse_with_options(content, options).map_err(|e| InstallerError::ManifestFormat {
            reason: format!("malformed XML: {e}"),
        })?;

    document
        .root_element()
        .children()
        .filter(Node::is_element)
        .map(parse_library)
        .collect()
}

fn parse_library(element: Node<'_, '_>) -> Result<LibraryRecord> {
    let tag = element.tag_name().name();
    if tag != LIBRARY_TAG {
        return Err(InstallerError::ManifestFormat {
            reason: format!("not suitable xml definition: unexpected element <{tag}>"),
        });
    }

    let project_name = child_text(element, "project-name");
    let Some(full_file_name) = child_text(element, "file-name") else {
        return Err(InstallerError::ManifestFormat {
            reason: format!(
                "file-name of '{}' must not be empty",
                project_name.as_deref().unwrap_or("null")
            ),
        });
    };

    let record = match child_text(element, "version") {
        Some(version) => LibraryRecord::new(full_file_name, version)?,
        None => LibraryRecord::new(full_file_name, DEFAULT_VERSION)?.with_defaulted_version(),
    }
    .with_project(project_name, child_text(element, "project-url"));

    Ok(match child_element(element, "licenses") {
        Some(block) => record.with_licenses(
            block
                .children()
                .filter(Node::is_element)
                .map(parse_license)
                .collect(),
        ),
        None => record,
    })
}

fn parse_license(element: Node<'_, '_>) -> License {
    License {
        name: child_text(element, "license-name"),
        notice: child_text(element, "copyright-notice"),
    }
}

fn child_element<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    parent
        .children()
        .find(|child| child.is_element() && child.tag_name().name() == name)
}

fn child_text(parent: Node<'_, '_>, name: &str) -> Option<String> {
    let text: String = child_element(parent, name)?
        .descendants()
        .filter(Node::is_text)
        .filter_map(|node| node.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn check_file_name(full_file_name: &str) -> Result<()> {
    let malformed = || InstallerError::ManifestFormat {
        reason: format!("file-name '{full_file_name}' must have the form sub-directory/file"),
    };
    let (subdirectory, file_name) = full_file_name.split_once('/').ok_or_else(malformed)?;
    if subdirectory.is_empty() || file_name.is_empty() || file_name.contains('/') {
        return Err(malformed());
    }
    Ok(())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
