use crate::fields::{FieldValue, Fields};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lightweight reference to a neighboring tag
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelatedTag {
    pub name: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
}

/// Represents a git tag taking part in the changelog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub name: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    /// Position of the tagged commit in history, 0 being the newest.
    /// Only known when tags are ordered by date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
    /// The next older tag
    pub previous: Option<RelatedTag>,
    /// The next newer tag
    pub next: Option<RelatedTag>,
}

impl Tag {
    /// Create a new tag with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Tag {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Neighbor reference pointing at this tag
    pub fn related(&self) -> RelatedTag {
        RelatedTag {
            name: self.name.clone(),
            subject: self.subject.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Extract version number from tag (e.g., "v1.2.3" -> "1.2.3")
    pub fn version_part(&self) -> &str {
        self.name.strip_prefix('v').unwrap_or(&self.name)
    }

    /// Parse the tag name as a semantic version, ignoring a leading `v`
    pub fn semver(&self) -> Option<semver::Version> {
        semver::Version::parse(self.version_part()).ok()
    }
}

impl Fields for RelatedTag {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Str(&self.name)),
            "subject" => Some(FieldValue::Str(&self.subject)),
            "timestamp" | "date" => Some(FieldValue::Time(self.timestamp)),
            _ => None,
        }
    }
}

impl Fields for Tag {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "name" => Some(FieldValue::Str(&self.name)),
            "subject" => Some(FieldValue::Str(&self.subject)),
            "timestamp" | "date" => Some(FieldValue::Time(self.timestamp)),
            "order" => self.order.map(|order| FieldValue::Int(order as i64)),
            "previous" => self.previous.as_ref().map(|t| FieldValue::Record(t)),
            "next" => self.next.as_ref().map(|t| FieldValue::Record(t)),
            _ => None,
        }
    }
}
