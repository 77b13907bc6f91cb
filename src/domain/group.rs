use crate::domain::commit::{Commit, Note};
use crate::fields::{FieldValue, Fields};
use serde::Serialize;

/// Commits sharing one value of the grouping field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitGroup {
    pub raw_title: String,
    pub title: String,
    pub commits: Vec<Commit>,
}

/// Notes sharing one title, collected across all commits of a release
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NoteGroup {
    pub title: String,
    pub notes: Vec<Note>,
}

impl Fields for CommitGroup {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "rawtitle" => Some(FieldValue::Str(&self.raw_title)),
            "title" => Some(FieldValue::Str(&self.title)),
            _ => None,
        }
    }
}

impl Fields for NoteGroup {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Str(&self.title)),
            _ => None,
        }
    }
}
