//! Reads every tag of the repository and orders it for range selection.

use crate::config::TagSort;
use crate::domain::Tag;
use crate::error::{ChangelogError, Result};
use crate::git::GitClient;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::collections::HashMap;

const SEPARATOR: &str = "@@__CHANGELOG_TAG__@@";

/// Tags returned by [TagReader::read], plus the names dropped by semver sorting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagListing {
    pub tags: Vec<Tag>,
    pub skipped: Vec<String>,
}

/// Lists, filters and orders the repository's tags
pub struct TagReader<C> {
    client: C,
    filter: Option<Regex>,
    sort: TagSort,
}

struct RawTag {
    tag: Tag,
    commit: String,
}

impl<C: GitClient> TagReader<C> {
    /// Create a reader; an empty `filter_pattern` keeps every tag.
    ///
    /// # Returns
    /// * `Err` - If `filter_pattern` is not a valid regular expression
    pub fn new(client: C, filter_pattern: &str, sort: TagSort) -> Result<Self> {
        let filter = if filter_pattern.is_empty() {
            None
        } else {
            Some(Regex::new(filter_pattern)?)
        };

        Ok(TagReader {
            client,
            filter,
            sort,
        })
    }

    /// Read all tags, newest first, with neighbor links assigned.
    pub fn read_all(&self) -> Result<Vec<Tag>> {
        Ok(self.read()?.tags)
    }

    /// Like [TagReader::read_all] but also reports tags dropped as non-semver.
    pub fn read(&self) -> Result<TagListing> {
        let format = [
            "%(refname)",
            "%(subject)",
            "%(taggerdate:iso-strict)",
            "%(authordate:iso-strict)",
            "%(objectname)",
            "%(*objectname)",
        ]
        .join(SEPARATOR);

        let out = self
            .client
            .exec("for-each-ref", &[&format!("--format={}", format), "refs/tags"])
            .map_err(|e| ChangelogError::vcs(format!("failed to list tags: {}", e)))?;

        let mut raw = Vec::new();
        for line in out.lines() {
            let tokens: Vec<&str> = line.split(SEPARATOR).collect();
            if tokens.len() != 6 {
                continue;
            }

            let name = parse_refname(tokens[0]);
            if let Some(filter) = &self.filter {
                if !filter.is_match(&name) {
                    continue;
                }
            }

            let timestamp = match parse_timestamp(tokens[2]) {
                Some(ts) => ts,
                None => parse_timestamp(tokens[3]).ok_or_else(|| {
                    ChangelogError::TimestampParse(format!(
                        "tag '{}' has no usable date ('{}', '{}')",
                        name, tokens[2], tokens[3]
                    ))
                })?,
            };

            // Annotated tags point at a tag object; the peeled id is the commit
            let commit = if tokens[5].trim().is_empty() {
                tokens[4].trim().to_string()
            } else {
                tokens[5].trim().to_string()
            };

            raw.push(RawTag {
                tag: Tag {
                    name,
                    subject: tokens[1].trim().to_string(),
                    timestamp,
                    ..Default::default()
                },
                commit,
            });
        }

        let mut listing = match self.sort {
            TagSort::Date => TagListing {
                tags: self.sort_by_history(raw)?,
                skipped: Vec::new(),
            },
            TagSort::Semver => sort_by_semver(raw.into_iter().map(|r| r.tag).collect()),
        };

        for name in &listing.skipped {
            tracing::info!(tag = %name, "skipping tag that is not a semantic version");
        }

        assign_neighbors(&mut listing.tags);
        tracing::debug!(count = listing.tags.len(), sort = %self.sort, "read tags");

        Ok(listing)
    }

    /// Order tags by where their commit sits in history, newest first.
    ///
    /// Tagger dates can be rewritten, so history position decides and the
    /// timestamp only breaks ties between tags on the same commit.
    fn sort_by_history(&self, raw: Vec<RawTag>) -> Result<Vec<Tag>> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }

        let out = self.client.exec("rev-list", &["--topo-order", "--all"])?;
        let positions: HashMap<&str, usize> = out
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate()
            .map(|(i, hash)| (hash, i))
            .collect();
        let unknown = positions.len();

        let mut tags: Vec<Tag> = raw
            .into_iter()
            .map(|r| Tag {
                order: Some(positions.get(r.commit.as_str()).copied().unwrap_or(unknown)),
                ..r.tag
            })
            .collect();

        tags.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(tags)
    }
}

/// Drop non-semver tags and order the rest by precedence, highest first.
fn sort_by_semver(tags: Vec<Tag>) -> TagListing {
    let mut skipped = Vec::new();
    let mut versioned: Vec<(semver::Version, Tag)> = Vec::new();

    for tag in tags {
        match tag.semver() {
            Some(version) => versioned.push((version, tag)),
            None => skipped.push(tag.name),
        }
    }

    versioned.sort_by(|(a, _), (b, _)| b.cmp(a));

    TagListing {
        tags: versioned.into_iter().map(|(_, tag)| tag).collect(),
        skipped,
    }
}

/// Link each tag to its older (`previous`) and newer (`next`) neighbor.
pub fn assign_neighbors(tags: &mut [Tag]) {
    let related: Vec<_> = tags.iter().map(Tag::related).collect();

    for (i, tag) in tags.iter_mut().enumerate() {
        tag.next = if i > 0 {
            Some(related[i - 1].clone())
        } else {
            None
        };
        tag.previous = related.get(i + 1).cloned();
    }
}

fn parse_refname(input: &str) -> String {
    input.trim().replacen("refs/tags/", "", 1)
}

fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input.trim())
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
