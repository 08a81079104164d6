//! Per-sub-directory inclusion patterns.
//!
//! Each vendored sub-directory is configured with a comma-separated list of
//! regular expressions. A file is eligible for installation only when one of
//! its sub-directory's patterns matches the whole file name.

use crate::error::{InstallerError, Result};
use log::debug;
use regex::Regex;
use std::collections::BTreeMap;

/// Compiled inclusion patterns keyed by sub-directory name.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: BTreeMap<String, Vec<Regex>>,
}

impl PatternSet {
    /// Compile the inclusion configuration.
    ///
    /// Entries whose pattern list is blank are ignored. Every pattern is
    /// compiled eagerly so that a typo surfaces before any file is touched.
    ///
    /// # Errors
    ///
    /// Returns [`InstallerError::Configuration`] when no sub-directory ends up
    /// with a pattern, and [`InstallerError::InvalidPattern`] when any pattern
    /// fails to compile.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use thirdparty_installer::patterns::PatternSet;
    ///
    /// let include = BTreeMap::from([("development".to_owned(), "jsf-.*, derby".to_owned())]);
    /// let patterns = PatternSet::build(&include)?;
    /// assert!(patterns.matches("development", "jsf-api.jar"));
    /// assert!(!patterns.matches("development", "derby.jar"));
    /// # Ok::<(), thirdparty_installer::error::InstallerError>(())
    /// ```
    pub fn build(include: &BTreeMap<String, String>) -> Result<Self> {
        if include.is_empty() {
            return Err(InstallerError::Configuration {
                reason: "specify sub-directories with inclusion patterns".to_owned(),
            });
        }

        let mut patterns = BTreeMap::new();
        for (subdirectory, list) in include {
            let compiled = compile_list(subdirectory, list)?;
            if compiled.is_empty() {
                debug!("no inclusion patterns configured for {subdirectory}; ignoring it");
                continue;
            }
            patterns.insert(subdirectory.clone(), compiled);
        }

        if patterns.is_empty() {
            return Err(InstallerError::Configuration {
                reason: "specify inclusion regexp for sub-directories".to_owned(),
            });
        }

        Ok(Self { patterns })
    }

    /// Return true if `file_name` is eligible for installation from
    /// `subdirectory`.
    #[must_use]
    pub fn matches(&self, subdirectory: &str, file_name: &str) -> bool {
        self.patterns
            .get(subdirectory)
            .is_some_and(|list| list.iter().any(|pattern| pattern.is_match(file_name)))
    }

    /// Return the configured sub-directory names in sorted order.
    pub fn subdirectories(&self) -> impl Iterator<Item = &str> {
        self.patterns.keys().map(String::as_str)
    }
}

fn compile_list(subdirectory: &str, list: &str) -> Result<Vec<Regex>> {
    list.split(',')
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(|pattern| compile_anchored(subdirectory, pattern))
        .collect()
}

// Anchoring turns `is_match` into a whole-string match.
fn compile_anchored(subdirectory: &str, pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{pattern})$")).map_err(|source| InstallerError::InvalidPattern {
        subdirectory: subdirectory.to_owned(),
        pattern: pattern.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn include(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[rstest]
    #[case::prefix_wildcard("foo-.*", "foo-1.0.jar", true)]
    #[case::substring_is_not_enough("foo", "foo-1.0.jar", false)]
    #[case::exact_name("derby\\.jar", "derby.jar", true)]
    #[case::alternation_is_grouped("a|b", "ab", false)]
    fn matches_whole_file_name(#[case] pattern: &str, #[case] file: &str, #[case] expected: bool) {
        let patterns = PatternSet::build(&include(&[("dev", pattern)])).expect("valid patterns");
        assert_eq!(patterns.matches("dev", file), expected);
    }

    #[test]
    fn any_pattern_in_the_list_admits_the_file() {
        let patterns = PatternSet::build(&include(&[("portal", "spring-.*, commons-.*")]))
            .expect("valid patterns");
        assert!(patterns.matches("portal", "commons-io.jar"));
        assert!(patterns.matches("portal", "spring-core.jar"));
        assert!(!patterns.matches("portal", "jackrabbit.jar"));
    }

    #[test]
    fn unconfigured_subdirectory_never_matches() {
        let patterns = PatternSet::build(&include(&[("global", ".*")])).expect("valid patterns");
        assert!(!patterns.matches("development", "anything.jar"));
    }

    #[test]
    fn empty_configuration_is_rejected() {
        let err = PatternSet::build(&BTreeMap::new()).expect_err("empty config must fail");
        assert!(matches!(err, InstallerError::Configuration { .. }));
    }

    #[test]
    fn blank_pattern_lists_are_ignored() {
        let patterns = PatternSet::build(&include(&[("dev", " , "), ("global", ".*")]))
            .expect("valid patterns");
        assert_eq!(patterns.subdirectories().collect::<Vec<_>>(), vec!["global"]);
    }

    #[test]
    fn configuration_with_only_blank_lists_is_rejected() {
        let err = PatternSet::build(&include(&[("dev", "")])).expect_err("must fail");
        assert!(matches!(err, InstallerError::Configuration { .. }));
    }

    #[test]
    fn invalid_regex_is_reported_with_its_subdirectory() {
        let err = PatternSet::build(&include(&[("dev", "ok-.*, broken(")]))
            .expect_err("invalid regex must fail");
        match err {
            InstallerError::InvalidPattern {
                subdirectory,
                pattern,
                ..
            } => {
                assert_eq!(subdirectory, "dev");
                assert_eq!(pattern, "broken(");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
