//! Git command abstraction layer
//!
//! The changelog pipeline only ever needs stdout of a handful of git
//! commands. This module hides how those commands are run behind the
//! [GitClient] trait so that the pipeline can be driven by a real `git`
//! binary or by canned output in tests.
//!
//! # Overview
//!
//! - [command::CommandClient]: spawns the configured git binary
//! - [mock::MockClient]: returns canned output for testing
//! - [repository::discover_workdir]: finds the working tree with `git2`
//!
//! # Usage
//!
//! ```rust
//! # use git_changelog::git::GitClient;
//! # fn example<C: GitClient>(client: &C) -> git_changelog::Result<()> {
//! let out = client.exec("log", &["HEAD", "--no-decorate", "--pretty=%s"])?;
//! println!("{}", out);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod mock;
pub mod repository;

pub use command::CommandClient;
pub use mock::MockClient;
pub use repository::discover_workdir;

use crate::error::Result;
use std::sync::Arc;

/// Runs one git subcommand and returns its standard output
///
/// ## Thread Safety
///
/// All implementors must be `Send + Sync` to allow safe sharing across threads.
///
/// ## Error Handling
///
/// Failures to spawn the binary and non-zero exits are reported as
/// [crate::error::ChangelogError::Vcs]. There is no retry.
pub trait GitClient: Send + Sync {
    /// Execute `git <subcommand> <args...>`
    ///
    /// # Arguments
    /// * `subcommand` - The git subcommand (e.g., "log", "for-each-ref")
    /// * `args` - Arguments following the subcommand
    ///
    /// # Returns
    /// * `Ok(String)` - Standard output of the command
    /// * `Err` - If the command could not be run or exited unsuccessfully
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String>;
}

impl<T: GitClient + ?Sized> GitClient for &T {
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        (**self).exec(subcommand, args)
    }
}

impl<T: GitClient + ?Sized> GitClient for Box<T> {
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        (**self).exec(subcommand, args)
    }
}

impl<T: GitClient + ?Sized> GitClient for Arc<T> {
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        (**self).exec(subcommand, args)
    }
}
