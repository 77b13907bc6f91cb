use crate::error::{ChangelogError, Result};
use crate::git::GitClient;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs git by spawning the configured binary
#[derive(Debug, Clone)]
pub struct CommandClient {
    bin: String,
    working_dir: Option<PathBuf>,
}

impl CommandClient {
    /// Create a client for `bin` (usually "git") in the current directory
    pub fn new(bin: impl Into<String>) -> Self {
        CommandClient {
            bin: bin.into(),
            working_dir: None,
        }
    }

    /// Run every command inside `dir`
    pub fn with_working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }
}

impl Default for CommandClient {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitClient for CommandClient {
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg(subcommand).args(args);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        tracing::debug!(bin = %self.bin, subcommand, ?args, "running git");

        let output = cmd.output().map_err(|e| {
            ChangelogError::vcs(format!("Failed to execute {} {}: {}", self.bin, subcommand, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ChangelogError::vcs(format!(
                "{} {} failed with exit code {}: {}",
                self.bin,
                subcommand,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_fails() {
        let client = CommandClient::new("/nonexistent/path/to/git");
        let result = client.exec("log", &["HEAD"]);
        assert!(matches!(result, Err(ChangelogError::Vcs(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to execute"));
    }

    #[test]
    fn test_default_uses_git() {
        assert_eq!(CommandClient::default().bin(), "git");
    }
}
