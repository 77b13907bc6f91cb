use crate::error::{ChangelogError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Represents the complete configuration for git-changelog.
///
/// Contains the git binary, hosting style, repository info and the parsing,
/// grouping and sorting options for the commit pipeline.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_bin")]
    pub bin: String,

    #[serde(default)]
    pub style: Style,

    #[serde(default)]
    pub info: Info,

    #[serde(default)]
    pub options: Options,
}

/// Hosting service whose conventions are applied to defaults and links
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    None,
    Github,
    Gitlab,
    Bitbucket,
}

/// How tags are ordered before range selection
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TagSort {
    /// Position of the tagged commit in history, newest first
    #[default]
    Date,
    /// Semantic version precedence, highest first
    Semver,
}

impl FromStr for TagSort {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "date" => Ok(TagSort::Date),
            "semver" => Ok(TagSort::Semver),
            other => Err(ChangelogError::config(format!(
                "Unknown tag sort mode '{}', expected 'date' or 'semver'",
                other
            ))),
        }
    }
}

impl TryFrom<String> for TagSort {
    type Error = ChangelogError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TagSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagSort::Date => write!(f, "date"),
            TagSort::Semver => write!(f, "semver"),
        }
    }
}

/// Metadata about the changelog and the repository it describes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Info {
    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub repository_url: String,
}

impl Default for Info {
    fn default() -> Self {
        Info {
            title: default_title(),
            repository_url: String::new(),
        }
    }
}

/// Options driving tag selection, commit parsing and classification
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Options {
    /// Only tags whose name matches this pattern take part
    #[serde(default)]
    pub tag_filter_pattern: String,

    #[serde(default)]
    pub sort: TagSort,

    /// Treat unreleased commits as belonging to this not-yet-created tag
    #[serde(default)]
    pub next_tag: Option<String>,

    /// Compare commit filter values case-insensitively
    #[serde(default)]
    pub no_case_sensitive: bool,

    /// Restrict the log to commits touching these paths
    #[serde(default)]
    pub paths: Vec<String>,

    /// Treat header-shaped body lines as squashed commits
    #[serde(default)]
    pub multiline_commit: bool,

    #[serde(default)]
    pub commits: CommitOptions,

    #[serde(default)]
    pub commit_groups: CommitGroupOptions,

    #[serde(default)]
    pub header: PatternOptions,

    #[serde(default)]
    pub issues: IssueOptions,

    #[serde(default)]
    pub refs: RefOptions,

    #[serde(default)]
    pub merges: PatternOptions,

    #[serde(default)]
    pub reverts: PatternOptions,

    #[serde(default)]
    pub notes: NoteOptions,
}

/// Commit filtering and sorting
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitOptions {
    /// Field name to allowed values, e.g. `Type = ["feat", "fix"]`
    #[serde(default)]
    pub filters: BTreeMap<String, Vec<String>>,

    #[serde(default = "default_commit_sort_by")]
    pub sort_by: String,
}

impl Default for CommitOptions {
    fn default() -> Self {
        CommitOptions {
            filters: BTreeMap::new(),
            sort_by: default_commit_sort_by(),
        }
    }
}

/// Commit grouping, group ordering and display titles
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitGroupOptions {
    #[serde(default = "default_group_by")]
    pub group_by: String,

    /// Field to sort groups by, or `Custom` to follow `title_order`
    #[serde(default = "default_group_sort_by")]
    pub sort_by: String,

    #[serde(default)]
    pub title_order: Vec<String>,

    #[serde(default)]
    pub title_maps: HashMap<String, String>,
}

impl Default for CommitGroupOptions {
    fn default() -> Self {
        CommitGroupOptions {
            group_by: default_group_by(),
            sort_by: default_group_sort_by(),
            title_order: Vec::new(),
            title_maps: HashMap::new(),
        }
    }
}

/// A regular expression and the field names its capture groups map to
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct PatternOptions {
    #[serde(default)]
    pub pattern: String,

    #[serde(default)]
    pub pattern_maps: Vec<String>,
}

impl PatternOptions {
    pub fn new(pattern: &str, maps: &[&str]) -> Self {
        PatternOptions {
            pattern: pattern.to_string(),
            pattern_maps: maps.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn is_unset(&self) -> bool {
        self.pattern.is_empty() && self.pattern_maps.is_empty()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct IssueOptions {
    /// Issue prefixes such as `#` or `gh-`
    #[serde(default)]
    pub prefix: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct RefOptions {
    /// Words that qualify a reference, such as `closes`
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct NoteOptions {
    /// Keywords opening a note, such as `BREAKING CHANGE`
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_bin() -> String {
    "git".to_string()
}

fn default_title() -> String {
    "CHANGELOG".to_string()
}

fn default_commit_sort_by() -> String {
    "Scope".to_string()
}

fn default_group_by() -> String {
    "Type".to_string()
}

fn default_group_sort_by() -> String {
    "Title".to_string()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bin: default_bin(),
            style: Style::default(),
            info: Info::default(),
            options: Options::default(),
        }
    }
}

impl Config {
    /// Fill in style conventions and pattern defaults.
    ///
    /// Only values the user left empty are touched, so calling this twice
    /// is harmless.
    pub fn normalize(&mut self) {
        self.info.repository_url = self.info.repository_url.trim_end_matches('/').to_string();

        match self.style {
            Style::Github => self.apply_style_defaults(
                &["#", "gh-"],
                &[
                    "close", "closes", "closed", "fix", "fixes", "fixed", "resolve", "resolves",
                    "resolved",
                ],
                PatternOptions::new(r"^Merge pull request #(\d+) from (.*)$", &["Ref", "Source"]),
            ),
            Style::Gitlab => self.apply_style_defaults(
                &["#"],
                &[
                    "close", "closes", "closed", "closing", "fix", "fixes", "fixed", "fixing",
                    "resolve", "resolves", "resolved", "resolving",
                ],
                PatternOptions::new(r"^Merge branch '.*' into '(.*)'$", &["Source"]),
            ),
            Style::Bitbucket => self.apply_style_defaults(
                &["#"],
                &[
                    "close", "closes", "closed", "closing", "fix", "fixed", "fixes", "fixing",
                    "resolve", "resolves", "resolved", "resolving", "reopen", "reopens",
                    "reopening", "hold", "holds", "holding", "wontfix", "invalidate",
                    "invalidates", "invalidated", "invalidating", "addresses", "re",
                    "references", "ref", "refs", "see",
                ],
                PatternOptions::new(r"^Merged in (.*) \(pull request #(\d+)\)$", &["Source", "Ref"]),
            ),
            Style::None => {}
        }

        let opts = &mut self.options;

        if opts.header.pattern.is_empty() {
            opts.header = PatternOptions::new("^(.*)$", &["Subject"]);
        }

        if opts.merges.pattern.is_empty() {
            opts.merges = PatternOptions::new(r"^Merge branch '(\w+)'$", &["Source"]);
        }

        if opts.reverts.pattern.is_empty() {
            opts.reverts = PatternOptions::new(r#"^Revert "([\s\S]*)"$"#, &["Header"]);
        }
    }

    fn apply_style_defaults(&mut self, prefix: &[&str], actions: &[&str], merges: PatternOptions) {
        let opts = &mut self.options;

        if opts.issues.prefix.is_empty() {
            opts.issues.prefix = words(prefix);
        }

        if opts.refs.actions.is_empty() {
            opts.refs.actions = words(actions);
        }

        if opts.merges.is_unset() {
            opts.merges = merges;
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `.chglog.toml` in current directory
/// 3. `git-changelog/config.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new("./.chglog.toml").exists() {
        fs::read_to_string("./.chglog.toml")?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join("git-changelog").join("config.toml");
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}
