//! Changelog data model - pure records independent of git operations

pub mod changelog;
pub mod commit;
pub mod group;
pub mod tag;

pub use changelog::{Changelog, Extraction, Unreleased, Version};
pub use commit::{Commit, Hash, Merge, Note, Ref, Revert, Signature};
pub use group::{CommitGroup, NoteGroup};
pub use tag::{RelatedTag, Tag};
