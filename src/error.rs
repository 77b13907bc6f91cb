use thiserror::Error;

/// Unified error type for changelog generation
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Git command failed: {0}")]
    Vcs(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    #[error("Failed to parse the query: {0}")]
    QueryParse(String),

    #[error("Could not find the tag: {0}")]
    NotFound(String),

    #[error("Tag \"{0}\" already exists")]
    TagCollision(String),

    #[error("Timestamp parsing error: {0}")]
    TimestampParse(String),

    #[error("Comparison error: {0}")]
    Compare(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in git-changelog
pub type Result<T> = std::result::Result<T, ChangelogError>;

impl ChangelogError {
    /// Create a VCS command error with context
    pub fn vcs(msg: impl Into<String>) -> Self {
        ChangelogError::Vcs(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ChangelogError::Config(msg.into())
    }

    /// Create a query parse error with context
    pub fn query_parse(msg: impl Into<String>) -> Self {
        ChangelogError::QueryParse(msg.into())
    }

    /// Create a tag-not-found error with context
    pub fn not_found(msg: impl Into<String>) -> Self {
        ChangelogError::NotFound(msg.into())
    }

    /// Create a comparison error with context
    pub fn compare(msg: impl Into<String>) -> Self {
        ChangelogError::Compare(msg.into())
    }

    /// Whether this error came from the tag query rather than the repository.
    ///
    /// Callers use this to print query-specific help.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            ChangelogError::QueryParse(_) | ChangelogError::NotFound(_)
        )
    }
}
