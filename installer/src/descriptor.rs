//! Package descriptors (POM-shaped metadata) for installed artifacts.
//!
//! Two kinds of descriptor are produced: one per installed library, carrying
//! its coordinate, upstream project metadata and licences, and one aggregate
//! `pom` descriptor whose dependency list names every library installed in
//! the run.

use crate::coordinate::Coordinate;
use crate::error::{InstallerError, Result};
use crate::manifest::LibraryRecord;
use camino::Utf8Path;
use serde::Serialize;
use std::fs;

/// Model version written into every descriptor.
pub const MODEL_VERSION: &str = "4.0.0";

/// Description stamped on generated descriptors.
pub const GENERATED_DESCRIPTION: &str = "POM generated by thirdparty-installer";

/// Packaging type of the aggregate descriptor.
pub const AGGREGATE_PACKAGING: &str = "pom";

const POM_NAMESPACE: &str = "http://maven.apache.org/POM/4.0.0";
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A dependency entry in the aggregate descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    group_id: String,
    artifact_id: String,
    version: String,
    #[serde(rename = "type")]
    kind: String,
    scope: String,
}

impl Dependency {
    /// Create a dependency on `coordinate` with the given scope.
    #[must_use]
    pub fn new(coordinate: &Coordinate, scope: &str) -> Self {
        Self {
            group_id: coordinate.group_id().to_owned(),
            artifact_id: coordinate.artifact_id().to_owned(),
            version: coordinate.version().to_owned(),
            kind: coordinate.kind().to_owned(),
            scope: scope.to_owned(),
        }
    }

    /// Group id of the dependency.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id of the dependency.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Version of the dependency.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Packaging type of the dependency.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Scope applied to the dependency.
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// `group:artifact:type` of the dependency.
    #[must_use]
    pub fn conflict_id(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.kind)
    }
}

/// A licence as written into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DescriptorLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comments: Option<String>,
}

impl DescriptorLicense {
    /// Licence name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Copyright notice, stored in the licence comments.
    #[must_use]
    pub fn comments(&self) -> Option<&str> {
        self.comments.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct Licenses {
    license: Vec<DescriptorLicense>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
struct Dependencies {
    dependency: Vec<Dependency>,
}

/// Identity and naming of the aggregate descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateSpec {
    /// Artifact id of the aggregate descriptor.
    pub artifact_id: String,
    /// Group id of the aggregate descriptor.
    pub group_id: String,
    /// Human-readable name.
    pub name: String,
    /// Version of the aggregate descriptor.
    pub version: String,
}

impl AggregateSpec {
    /// Coordinate under which the aggregate descriptor is installed.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(
            &self.group_id,
            &self.artifact_id,
            AGGREGATE_PACKAGING,
            &self.version,
        )
    }
}

/// Minimal package descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "project", rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(rename = "@xmlns")]
    namespace: &'static str,
    model_version: String,
    group_id: String,
    artifact_id: String,
    packaging: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    version: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<Licenses>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Dependencies>,
}

impl Descriptor {
    /// Build the descriptor for one library installed at `coordinate`.
    ///
    /// The descriptor never carries dependencies.
    #[must_use]
    pub fn for_artifact(coordinate: &Coordinate, record: &LibraryRecord) -> Self {
        let licenses: Vec<DescriptorLicense> = record
            .licenses()
            .iter()
            .map(|license| DescriptorLicense {
                name: license.name.clone(),
                comments: license.notice.clone(),
            })
            .collect();

        Self {
            namespace: POM_NAMESPACE,
            model_version: MODEL_VERSION.to_owned(),
            group_id: coordinate.group_id().to_owned(),
            artifact_id: coordinate.artifact_id().to_owned(),
            packaging: coordinate.kind().to_owned(),
            name: record.project_name().map(str::to_owned),
            version: coordinate.version().to_owned(),
            description: GENERATED_DESCRIPTION.to_owned(),
            url: record.project_url().map(str::to_owned),
            licenses: (!licenses.is_empty()).then_some(Licenses { license: licenses }),
            dependencies: None,
        }
    }

    /// Build the aggregate `pom` descriptor listing `dependencies` in order.
    ///
    /// The aggregate never carries licences.
    #[must_use]
    pub fn aggregate(spec: &AggregateSpec, dependencies: Vec<Dependency>) -> Self {
        Self {
            namespace: POM_NAMESPACE,
            model_version: MODEL_VERSION.to_owned(),
            group_id: spec.group_id.clone(),
            artifact_id: spec.artifact_id.clone(),
            packaging: AGGREGATE_PACKAGING.to_owned(),
            name: Some(spec.name.clone()),
            version: spec.version.clone(),
            description: GENERATED_DESCRIPTION.to_owned(),
            url: None,
            licenses: None,
            dependencies: Some(Dependencies {
                dependency: dependencies,
            }),
        }
    }

    /// Model version of the descriptor format.
    #[must_use]
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Group id.
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Packaging type.
    #[must_use]
    pub fn packaging(&self) -> &str {
        &self.packaging
    }

    /// Version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Human-readable name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fixed machine-generated description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Upstream project URL.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Licences, empty for the aggregate descriptor.
    #[must_use]
    pub fn licenses(&self) -> &[DescriptorLicense] {
        self.licenses
            .as_ref()
            .map(|licenses| licenses.license.as_slice())
            .unwrap_or_default()
    }

    /// Dependency list; only the aggregate descriptor has one.
    #[must_use]
    pub fn dependencies(&self) -> Option<&[Dependency]> {
        self.dependencies
            .as_ref()
            .map(|dependencies| dependencies.dependency.as_slice())
    }

    /// `group:artifact:packaging:version` of the descriptor itself.
    #[must_use]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(
            &self.group_id,
            &self.artifact_id,
            &self.packaging,
            &self.version,
        )
    }

    /// Render the descriptor as an indented XML document.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::DescriptorWrite`] if serialisation fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut body = String::new();
        let mut serializer =
            quick_xml::se::Serializer::with_root(&mut body, Some("project")).map_err(write_error)?;
        serializer.indent(' ', 2);
        self.serialize(serializer).map_err(write_error)?;
        Ok(format!("{XML_DECLARATION}\n{body}\n"))
    }

    /// Write the rendered descriptor to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::WriteFailed`] if the file cannot be written.
    pub fn write_to(&self, path: &Utf8Path) -> Result<()> {
        let xml = self.to_xml()?;
        let write_failed = |source: std::io::Error| InstallerError::WriteFailed {
            path: path.to_owned(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }
        fs::write(path, xml).map_err(write_failed)
    }
}

fn write_error(error: impl std::fmt::Display) -> InstallerError {
    InstallerError::DescriptorWrite {
        reason: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::License;
    use tempfile::TempDir;

    fn derby() -> LibraryRecord {
        LibraryRecord::new("development/derby.jar", "10.2")
            .expect("valid record")
            .with_project(
                Some("Apache Derby".to_owned()),
                Some("http://db.apache.org/derby".to_owned()),
            )
            .with_licenses(vec![License {
                name: Some("Apache License 2.0".to_owned()),
                notice: Some("Copyright & co".to_owned()),
            }])
    }

    fn aggregate_spec() -> AggregateSpec {
        AggregateSpec {
            artifact_id: "thirdparty-deps".to_owned(),
            group_id: "com.example".to_owned(),
            name: "Third-party dependencies".to_owned(),
            version: "1.0.0".to_owned(),
        }
    }

    #[test]
    fn artifact_descriptor_mirrors_coordinate_and_record() {
        let record = derby();
        let coordinate = Coordinate::derive(&record, "com.example");
        let descriptor = Descriptor::for_artifact(&coordinate, &record);

        assert_eq!(descriptor.coordinate(), coordinate);
        assert_eq!(descriptor.name(), Some("Apache Derby"));
        assert_eq!(descriptor.url(), Some("http://db.apache.org/derby"));
        assert_eq!(descriptor.description(), GENERATED_DESCRIPTION);
        assert_eq!(descriptor.model_version(), MODEL_VERSION);
        assert_eq!(descriptor.licenses().len(), 1);
        assert_eq!(descriptor.licenses()[0].name(), Some("Apache License 2.0"));
        assert_eq!(descriptor.licenses()[0].comments(), Some("Copyright & co"));
        assert!(descriptor.dependencies().is_none());
    }

    #[test]
    fn aggregate_descriptor_is_a_pom_without_licenses() {
        let record = derby();
        let dependency = Dependency::new(&Coordinate::derive(&record, "com.example"), "test");
        let descriptor = Descriptor::aggregate(&aggregate_spec(), vec![dependency.clone()]);

        assert_eq!(descriptor.packaging(), AGGREGATE_PACKAGING);
        assert_eq!(descriptor.name(), Some("Third-party dependencies"));
        assert!(descriptor.licenses().is_empty());
        assert_eq!(descriptor.dependencies(), Some(&[dependency][..]));
        assert_eq!(descriptor.coordinate(), aggregate_spec().coordinate());
    }

    #[test]
    fn xml_contains_pom_elements_and_escapes_text() {
        let record = derby();
        let descriptor = Descriptor::for_artifact(&Coordinate::derive(&record, "com.example"), &record);
        let xml = descriptor.to_xml().expect("serialisable descriptor");

        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains(r#"<project xmlns="http://maven.apache.org/POM/4.0.0">"#));
        assert!(xml.contains("<modelVersion>4.0.0</modelVersion>"));
        assert!(xml.contains("<groupId>com.example.development</groupId>"));
        assert!(xml.contains("<artifactId>derby</artifactId>"));
        assert!(xml.contains("<packaging>jar</packaging>"));
        assert!(xml.contains("<comments>Copyright &amp; co</comments>"));
        assert!(!xml.contains("<dependencies>"));
    }

    #[test]
    fn aggregate_xml_lists_dependencies_with_scope_and_type() {
        let coordinate = Coordinate::new("com.example.dev", "foo-1.0", "jar", "2.3");
        let descriptor =
            Descriptor::aggregate(&aggregate_spec(), vec![Dependency::new(&coordinate, "test")]);
        let xml = descriptor.to_xml().expect("serialisable descriptor");

        assert!(xml.contains("<dependencies>"));
        assert!(xml.contains("<artifactId>foo-1.0</artifactId>"));
        assert!(xml.contains("<type>jar</type>"));
        assert!(xml.contains("<scope>test</scope>"));
        assert!(!xml.contains("<licenses>"));
    }

    #[test]
    fn write_to_creates_parent_directories() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let root = Utf8Path::from_path(temp_dir.path()).expect("temp dir path not UTF-8");
        let path = root.join("target").join("generated-pom.xml");

        Descriptor::aggregate(&aggregate_spec(), Vec::new())
            .write_to(&path)
            .expect("descriptor should be written");

        let written = fs::read_to_string(&path).expect("descriptor should be readable");
        assert!(written.contains("<artifactId>thirdparty-deps</artifactId>"));
    }
}
