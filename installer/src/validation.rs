//! Structural validation of generated descriptors.
//!
//! A descriptor that fails validation points at a derivation bug rather than
//! bad input, so the pipeline treats any complaint as fatal.

use crate::descriptor::{Descriptor, Dependency};
use std::collections::BTreeSet;

/// Scopes a repository accepts on a dependency.
pub const VALID_SCOPES: [&str; 5] = ["provided", "compile", "runtime", "test", "system"];

/// Checks a descriptor for structural completeness.
#[cfg_attr(test, mockall::automock)]
pub trait DescriptorValidator {
    /// Return every complaint about `descriptor`; an empty list means valid.
    fn validate(&self, descriptor: &Descriptor) -> Vec<String>;
}

/// Default validator modelled on the rules a repository applies to POMs.
///
/// # Examples
///
/// ```
/// use thirdparty_installer::coordinate::Coordinate;
/// use thirdparty_installer::descriptor::Descriptor;
/// use thirdparty_installer::manifest::LibraryRecord;
/// use thirdparty_installer::validation::{DescriptorValidator, ModelValidator};
///
/// let record = LibraryRecord::new("dev/foo-1.0.jar", "2.3")?;
/// let descriptor = Descriptor::for_artifact(&Coordinate::derive(&record, "com.example"), &record);
/// assert!(ModelValidator.validate(&descriptor).is_empty());
/// # Ok::<(), thirdparty_installer::error::InstallerError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelValidator;

impl DescriptorValidator for ModelValidator {
    fn validate(&self, descriptor: &Descriptor) -> Vec<String> {
        let mut complaints = Vec::new();

        require(&mut complaints, "modelVersion", descriptor.model_version());
        require_id(&mut complaints, "groupId", descriptor.group_id());
        require_id(&mut complaints, "artifactId", descriptor.artifact_id());
        require(&mut complaints, "packaging", descriptor.packaging());
        require(&mut complaints, "version", descriptor.version());

        if let Some(dependencies) = descriptor.dependencies() {
            validate_dependencies(&mut complaints, dependencies);
        }

        complaints
    }
}

fn validate_dependencies(complaints: &mut Vec<String>, dependencies: &[Dependency]) {
    let mut seen = BTreeSet::new();
    for dependency in dependencies {
        let key = dependency.conflict_id();
        for (field, value) in [
            ("groupId", dependency.group_id()),
            ("artifactId", dependency.artifact_id()),
            ("version", dependency.version()),
            ("type", dependency.kind()),
        ] {
            if value.trim().is_empty() {
                complaints.push(format!(
                    "'dependencies.dependency.{field}' for {key} is missing."
                ));
            }
        }
        let scope = dependency.scope();
        if !VALID_SCOPES.contains(&scope) {
            complaints.push(format!(
                "'dependencies.dependency.scope' for {key} must be one of [{}] but is '{scope}'.",
                VALID_SCOPES.join(", ")
            ));
        }
        if !seen.insert(key.clone()) {
            complaints.push(format!(
                "'dependencies.dependency.(groupId:artifactId:type:classifier)' must be unique: {key} -> duplicate declaration of version {}",
                dependency.version()
            ));
        }
    }
}

fn require(complaints: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        complaints.push(format!("'{field}' is missing."));
    }
}

fn require_id(complaints: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        complaints.push(format!("'{field}' is missing."));
    } else if !is_valid_id(value) {
        complaints.push(format!(
            "'{field}' with value '{value}' does not match a valid id pattern."
        ));
    }
}

// Ids are limited to `[A-Za-z0-9_\-.]+`.
fn is_valid_id(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
