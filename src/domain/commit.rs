use crate::fields::{normalize_field_name, AssignFields, FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Full and abbreviated commit hash
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Hash {
    pub long: String,
    pub short: String,
}

/// Author or committer identity with the time they acted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: DateTime<Utc>,
}

/// Fields captured from a merge commit header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Merge {
    #[serde(rename = "ref")]
    pub reference: String,
    pub source: String,
}

/// Fields captured from a revert commit header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Revert {
    pub header: String,
    pub subject: String,
    pub hash: String,
}

/// A cross-reference to an issue or pull request, e.g. `Closes owner/repo#12`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ref {
    pub action: String,
    pub source: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Ref {
    pub fn new(
        action: impl Into<String>,
        source: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Ref {
            action: action.into(),
            source: source.into(),
            reference: reference.into(),
        }
    }
}

/// A titled block from a commit body, such as `BREAKING CHANGE`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Note {
    pub title: String,
    pub body: String,
}

impl Note {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Note {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// A parsed commit.
///
/// `r#type`, `scope` and `subject` are filled from the configured header
/// pattern. Captures mapped to any other name land in `extra`, where they are
/// still reachable by name for grouping, sorting and filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Commit {
    pub hash: Hash,
    pub author: Signature,
    pub committer: Signature,
    pub header: String,
    #[serde(rename = "type")]
    pub r#type: String,
    pub scope: String,
    pub subject: String,
    pub body: String,
    pub trimmed_body: String,
    pub merge: Option<Merge>,
    pub revert: Option<Revert>,
    pub refs: Vec<Ref>,
    pub mentions: Vec<String>,
    pub notes: Vec<Note>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
    /// Secondary headers found in a squashed commit body
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub all_headers: Vec<Commit>,
}

impl Commit {
    /// Whether this commit is a merge or a revert
    pub fn is_merge_or_revert(&self) -> bool {
        self.merge.is_some() || self.revert.is_some()
    }
}

impl Fields for Hash {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "long" => Some(FieldValue::Str(&self.long)),
            "short" => Some(FieldValue::Str(&self.short)),
            _ => None,
        }
    }
}

impl Fields for Signature {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Str(&self.name)),
            "email" => Some(FieldValue::Str(&self.email)),
            "time" | "date" => Some(FieldValue::Time(self.time)),
            _ => None,
        }
    }
}

impl Fields for Merge {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "ref" => Some(FieldValue::Str(&self.reference)),
            "source" => Some(FieldValue::Str(&self.source)),
            _ => None,
        }
    }
}

impl AssignFields for Merge {
    fn assign_field(&mut self, name: &str, value: String) -> bool {
        match normalize_field_name(name).as_str() {
            "ref" => self.reference = value,
            "source" => self.source = value,
            _ => return false,
        }
        true
    }
}

impl Fields for Revert {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "header" => Some(FieldValue::Str(&self.header)),
            "subject" => Some(FieldValue::Str(&self.subject)),
            "hash" => Some(FieldValue::Str(&self.hash)),
            _ => None,
        }
    }
}

impl AssignFields for Revert {
    fn assign_field(&mut self, name: &str, value: String) -> bool {
        match normalize_field_name(name).as_str() {
            "header" => self.header = value,
            "subject" => self.subject = value,
            "hash" => self.hash = value,
            _ => return false,
        }
        true
    }
}

impl Fields for Ref {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "action" => Some(FieldValue::Str(&self.action)),
            "source" => Some(FieldValue::Str(&self.source)),
            "ref" => Some(FieldValue::Str(&self.reference)),
            _ => None,
        }
    }
}

impl Fields for Note {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "title" => Some(FieldValue::Str(&self.title)),
            "body" => Some(FieldValue::Str(&self.body)),
            _ => None,
        }
    }
}

impl Fields for Commit {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "hash" => Some(FieldValue::Record(&self.hash)),
            "author" => Some(FieldValue::Record(&self.author)),
            "committer" => Some(FieldValue::Record(&self.committer)),
            "merge" => self.merge.as_ref().map(|m| FieldValue::Record(m)),
            "revert" => self.revert.as_ref().map(|r| FieldValue::Record(r)),
            "header" => Some(FieldValue::Str(&self.header)),
            "type" => Some(FieldValue::Str(&self.r#type)),
            "scope" => Some(FieldValue::Str(&self.scope)),
            "subject" => Some(FieldValue::Str(&self.subject)),
            "body" => Some(FieldValue::Str(&self.body)),
            "trimmedbody" => Some(FieldValue::Str(&self.trimmed_body)),
            _ => self
                .extra
                .iter()
                .find(|(key, _)| normalize_field_name(key) == name)
                .map(|(_, value)| FieldValue::Str(value)),
        }
    }
}

impl AssignFields for Commit {
    fn assign_field(&mut self, name: &str, value: String) -> bool {
        match normalize_field_name(name).as_str() {
            "header" => self.header = value,
            "type" => self.r#type = value,
            "scope" => self.scope = value,
            "subject" => self.subject = value,
            "body" => self.body = value,
            "" => return false,
            _ => {
                self.extra.insert(name.trim().to_string(), value);
            }
        }
        true
    }
}
