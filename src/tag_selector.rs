//! Range queries over the ordered tag list.
//!
//! A query is either a single tag name or `old..new` with either side
//! optional. Tags are expected newest first, the way
//! [TagReader](crate::tag_reader::TagReader) returns them.

use crate::domain::Tag;
use crate::error::{ChangelogError, Result};

/// Tags picked by a query, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub tags: Vec<Tag>,
    /// Name of the tag just older than the oldest selected one, or empty
    pub boundary: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagSelector;

impl TagSelector {
    pub fn new() -> Self {
        TagSelector
    }

    /// Select the tags named by `query`.
    ///
    /// # Returns
    /// * `Err(QueryParse)` - If the query has more than one `..`
    /// * `Err(NotFound)` - If a range endpoint does not exist
    pub fn select(&self, tags: &[Tag], query: &str) -> Result<Selection> {
        let tokens: Vec<&str> = query.split("..").collect();

        match tokens.as_slice() {
            [name] => Ok(select_single(tags, name)),
            ["", ""] => Ok(Selection::default()),
            ["", new] => select_before(tags, new),
            [old, ""] => select_after(tags, old),
            [old, new] => select_range(tags, old, new),
            _ => Err(ChangelogError::query_parse(format!(
                "'{}' is not a tag name or a 'old..new' range",
                query
            ))),
        }
    }
}

fn position(tags: &[Tag], name: &str) -> Option<usize> {
    tags.iter().position(|tag| tag.name == name)
}

/// Select `tags[start..=end]` and bound it by the tag after `end`.
fn slice(tags: &[Tag], start: usize, end: usize) -> Selection {
    Selection {
        tags: tags[start..=end].to_vec(),
        boundary: tags
            .get(end + 1)
            .map(|tag| tag.name.clone())
            .unwrap_or_default(),
    }
}

fn select_single(tags: &[Tag], name: &str) -> Selection {
    match position(tags, name) {
        Some(i) => slice(tags, i, i),
        None => Selection::default(),
    }
}

fn select_before(tags: &[Tag], new: &str) -> Result<Selection> {
    let start = position(tags, new).ok_or_else(|| ChangelogError::not_found(new))?;
    Ok(slice(tags, start, tags.len() - 1))
}

fn select_after(tags: &[Tag], old: &str) -> Result<Selection> {
    let end = position(tags, old).ok_or_else(|| ChangelogError::not_found(old))?;
    Ok(slice(tags, 0, end))
}

fn select_range(tags: &[Tag], old: &str, new: &str) -> Result<Selection> {
    let start = position(tags, new).ok_or_else(|| ChangelogError::not_found(new))?;
    let end = position(tags, old).ok_or_else(|| ChangelogError::not_found(old))?;

    if end < start {
        return Err(ChangelogError::not_found(format!(
            "'{}' is newer than '{}'",
            old, new
        )));
    }

    Ok(slice(tags, start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> Vec<Tag> {
        ["2.2.12-rc.12", "2.1.0", "v2.0.0-beta.1", "v1.2.9", "v1.0.0"]
            .iter()
            .map(|name| Tag::new(*name))
            .collect()
    }

    fn run(query: &str) -> (Vec<String>, String) {
        let selection = TagSelector::new().select(&fixtures(), query).unwrap();
        (
            selection.tags.into_iter().map(|t| t.name).collect(),
            selection.boundary,
        )
    }

    fn expect(names: &[&str], boundary: &str) -> (Vec<String>, String) {
        (
            names.iter().map(|n| n.to_string()).collect(),
            boundary.to_string(),
        )
    }

    #[test]
    fn test_single_tag() {
        assert_eq!(run("2.2.12-rc.12"), expect(&["2.2.12-rc.12"], "2.1.0"));
        assert_eq!(run("v2.0.0-beta.1"), expect(&["v2.0.0-beta.1"], "v1.2.9"));
        assert_eq!(run("v1.0.0"), expect(&["v1.0.0"], ""));
    }

    #[test]
    fn test_single_tag_without_match_is_empty() {
        assert_eq!(run("v9.9.9"), expect(&[], ""));
    }

    #[test]
    fn test_up_to_new() {
        assert_eq!(
            run("..2.1.0"),
            expect(&["2.1.0", "v2.0.0-beta.1", "v1.2.9", "v1.0.0"], "")
        );
        assert_eq!(run("..v1.0.0"), expect(&["v1.0.0"], ""));
    }

    #[test]
    fn test_from_old() {
        assert_eq!(
            run("v2.0.0-beta.1.."),
            expect(&["2.2.12-rc.12", "2.1.0", "v2.0.0-beta.1"], "v1.2.9")
        );
        assert_eq!(run("2.2.12-rc.12.."), expect(&["2.2.12-rc.12"], "2.1.0"));
        assert_eq!(
            run("v1.0.0.."),
            expect(
                &["2.2.12-rc.12", "2.1.0", "v2.0.0-beta.1", "v1.2.9", "v1.0.0"],
                ""
            )
        );
    }

    #[test]
    fn test_between() {
        assert_eq!(
            run("v1.2.9..2.1.0"),
            expect(&["2.1.0", "v2.0.0-beta.1", "v1.2.9"], "v1.0.0")
        );
        assert_eq!(
            run("v1.0.0..v2.0.0-beta.1"),
            expect(&["v2.0.0-beta.1", "v1.2.9", "v1.0.0"], "")
        );
        assert_eq!(run("2.1.0..2.1.0"), expect(&["2.1.0"], "v2.0.0-beta.1"));
    }

    #[test]
    fn test_bare_range_selects_nothing() {
        assert_eq!(run(".."), expect(&[], ""));
    }

    #[test]
    fn test_malformed_query() {
        let err = TagSelector::new()
            .select(&fixtures(), "v1.0.0..2.1.0..2.2.12-rc.12")
            .unwrap_err();
        assert!(matches!(err, ChangelogError::QueryParse(_)));
    }

    #[test]
    fn test_missing_endpoints() {
        let selector = TagSelector::new();
        for query in ["..v9.0.0", "v9.0.0..", "v1.0.0..v9.0.0", "v9.0.0..2.1.0", "2.1.0..v1.0.0"] {
            let err = selector.select(&fixtures(), query).unwrap_err();
            assert!(matches!(err, ChangelogError::NotFound(_)), "query {}", query);
        }
    }

    #[test]
    fn test_ranges_on_empty_list_are_not_found() {
        let err = TagSelector::new().select(&[], "..v1.0.0").unwrap_err();
        assert!(err.is_query_error());
    }
}
