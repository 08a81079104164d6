//! Third-party library installer.
//!
//! This crate installs vendored third-party libraries into a local artifact
//! repository. It reads the library manifest, admits entries through
//! per-sub-directory inclusion patterns, derives a coordinate and descriptor
//! for each one, installs them, and writes an aggregate descriptor that lists
//! every installed library as a dependency. It is used by the
//! `thirdparty-installer` CLI binary.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Configuration file loading and resolution
//! - [`coordinate`] - Coordinate derivation from manifest entries
//! - [`descriptor`] - Package descriptor model and XML rendering
//! - [`error`] - Semantic error types
//! - [`installed_set`] - Ordered accumulation of installed dependencies
//! - [`manifest`] - Library manifest parsing
//! - [`output`] - Summary and dry-run formatting
//! - [`patterns`] - Per-sub-directory inclusion patterns
//! - [`pipeline`] - Selection and installation orchestration
//! - [`repository`] - Local repository layout and installation
//! - [`validation`] - Structural descriptor validation

pub mod cli;
pub mod config;
pub mod coordinate;
pub mod descriptor;
pub mod error;
pub mod installed_set;
pub mod manifest;
pub mod output;
pub mod patterns;
pub mod pipeline;
pub mod repository;
pub mod validation;
