use crate::boundary::BoundaryWarning;
use crate::domain::commit::Commit;
use crate::domain::group::{CommitGroup, NoteGroup};
use crate::domain::tag::Tag;
use serde::Serialize;

/// Classified commits of one revision range
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub commit_groups: Vec<CommitGroup>,
    pub merge_commits: Vec<Commit>,
    pub revert_commits: Vec<Commit>,
    pub note_groups: Vec<NoteGroup>,
}

/// One released version and everything that went into it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Version {
    pub tag: Tag,
    pub commit_groups: Vec<CommitGroup>,
    pub commits: Vec<Commit>,
    pub merge_commits: Vec<Commit>,
    pub revert_commits: Vec<Commit>,
    pub note_groups: Vec<NoteGroup>,
}

impl Version {
    pub fn new(tag: Tag, commits: Vec<Commit>, extraction: Extraction) -> Self {
        Version {
            tag,
            commit_groups: extraction.commit_groups,
            commits,
            merge_commits: extraction.merge_commits,
            revert_commits: extraction.revert_commits,
            note_groups: extraction.note_groups,
        }
    }
}

/// Commits newer than the newest selected tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Unreleased {
    pub commit_groups: Vec<CommitGroup>,
    pub commits: Vec<Commit>,
    pub merge_commits: Vec<Commit>,
    pub revert_commits: Vec<Commit>,
    pub note_groups: Vec<NoteGroup>,
}

impl Unreleased {
    pub fn new(commits: Vec<Commit>, extraction: Extraction) -> Self {
        Unreleased {
            commit_groups: extraction.commit_groups,
            commits,
            merge_commits: extraction.merge_commits,
            revert_commits: extraction.revert_commits,
            note_groups: extraction.note_groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Output of one generation run, handed to whatever renders it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Changelog {
    pub unreleased: Unreleased,
    pub versions: Vec<Version>,
    #[serde(skip)]
    pub warnings: Vec<BoundaryWarning>,
}
