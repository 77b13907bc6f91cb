use crate::error::{ChangelogError, Result};
use crate::git::GitClient;
use std::sync::Mutex;

struct CannedOutput {
    subcommand: String,
    required_arg: Option<String>,
    output: Result<String>,
}

/// Mock git client for testing without a repository
///
/// Responses are matched in insertion order on the subcommand and, when
/// given, on one argument that must appear verbatim in the invocation.
pub struct MockClient {
    responses: Vec<CannedOutput>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockClient {
    /// Create a new mock without any responses
    pub fn new() -> Self {
        MockClient {
            responses: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answer any invocation of `subcommand` with `output`
    pub fn with_output(mut self, subcommand: &str, output: impl Into<String>) -> Self {
        self.responses.push(CannedOutput {
            subcommand: subcommand.to_string(),
            required_arg: None,
            output: Ok(output.into()),
        });
        self
    }

    /// Answer `subcommand` invocations containing `arg` with `output`
    pub fn with_output_for(
        mut self,
        subcommand: &str,
        arg: &str,
        output: impl Into<String>,
    ) -> Self {
        self.responses.push(CannedOutput {
            subcommand: subcommand.to_string(),
            required_arg: Some(arg.to_string()),
            output: Ok(output.into()),
        });
        self
    }

    /// Fail any invocation of `subcommand`
    pub fn with_failure(mut self, subcommand: &str, message: &str) -> Self {
        self.responses.push(CannedOutput {
            subcommand: subcommand.to_string(),
            required_arg: None,
            output: Err(ChangelogError::vcs(message)),
        });
        self
    }

    /// Every invocation so far, subcommand first
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GitClient for MockClient {
    fn exec(&self, subcommand: &str, args: &[&str]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            let mut call = vec![subcommand.to_string()];
            call.extend(args.iter().map(|a| a.to_string()));
            calls.push(call);
        }

        let canned = self.responses.iter().find(|r| {
            r.subcommand == subcommand
                && r
                    .required_arg
                    .as_ref()
                    .map_or(true, |arg| args.contains(&arg.as_str()))
        });

        match canned {
            Some(CannedOutput {
                output: Ok(out), ..
            }) => Ok(out.clone()),
            Some(CannedOutput {
                output: Err(err), ..
            }) => Err(ChangelogError::vcs(err.to_string())),
            None => Err(ChangelogError::vcs(format!(
                "no canned output for git {} {}",
                subcommand,
                args.join(" ")
            ))),
        }
    }
}
