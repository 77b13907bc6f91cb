use std::fmt;

/// Warnings that occur when resolving tags and revision ranges.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryWarning {
    /// The repository has no tags (after filtering)
    NoTags,
    /// A single-tag query matched no tag
    NoMatchingTags { query: String },
    /// Tag was dropped because it is not a semantic version
    NonSemverTag { tag: String },
    /// A revision range produced no commits
    EmptyRange { rev: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoTags => {
                write!(f, "No tags found, all commits are treated as unreleased")
            }
            BoundaryWarning::NoMatchingTags { query } => {
                write!(f, "No tag matches '{}', nothing to generate", query)
            }
            BoundaryWarning::NonSemverTag { tag } => {
                write!(f, "Tag '{}' is not a semantic version and was skipped", tag)
            }
            BoundaryWarning::EmptyRange { rev } => {
                write!(f, "No commits in range '{}'", rev)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_tags_display() {
        let warning = BoundaryWarning::NoMatchingTags {
            query: "v9.9.9".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("v9.9.9"), "got: {}", msg);
    }

    #[test]
    fn test_non_semver_display() {
        let warning = BoundaryWarning::NonSemverTag {
            tag: "release-candidate".to_string(),
        };
        assert!(warning.to_string().contains("release-candidate"));
        assert!(warning.to_string().contains("semantic version"));
    }

    #[test]
    fn test_empty_range_display() {
        let warning = BoundaryWarning::EmptyRange {
            rev: "v1.0.0..v1.1.0".to_string(),
        };
        assert_eq!(warning.to_string(), "No commits in range 'v1.0.0..v1.1.0'");
    }
}
