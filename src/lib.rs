//! Changelog generation from git tags and conventional commit history.
//!
//! The pipeline reads and orders tags ([tag_reader]), picks the ones named by
//! a query ([tag_selector]), parses the commits of each tag's revision range
//! ([commit_parser]) and groups them for rendering ([commit_extractor]).
//! [generator::Generator] runs all of it and returns a [domain::Changelog].

pub mod boundary;
pub mod commit_extractor;
pub mod commit_filter;
pub mod commit_parser;
pub mod config;
pub mod domain;
pub mod error;
pub mod fields;
pub mod generator;
pub mod git;
pub mod processor;
pub mod tag_reader;
pub mod tag_selector;
pub mod ui;

pub use error::{ChangelogError, Result};
pub use generator::Generator;
