use crate::domain::Commit;
use crate::fields::dot_get;
use std::collections::BTreeMap;

/// Keep the commits whose fields all hold one of the allowed values.
///
/// Squashed sub-headers in [Commit::all_headers] are expanded first and
/// filtered as commits of their own. A field that does not resolve to a
/// string excludes the commit. With `no_case_sensitive` the comparison
/// ignores case. An empty `filters` map keeps everything.
pub fn filter_commits(
    commits: &[Commit],
    filters: &BTreeMap<String, Vec<String>>,
    no_case_sensitive: bool,
) -> Vec<Commit> {
    commits
        .iter()
        .flat_map(|commit| std::iter::once(commit).chain(commit.all_headers.iter()))
        .filter(|commit| matches_all(commit, filters, no_case_sensitive))
        .cloned()
        .collect()
}

fn matches_all(commit: &Commit, filters: &BTreeMap<String, Vec<String>>, no_case: bool) -> bool {
    filters.iter().all(|(field, allowed)| {
        let Some(value) = dot_get(commit, field).and_then(|v| v.as_str()) else {
            return false;
        };

        if no_case {
            let value = value.to_lowercase();
            allowed.iter().any(|a| a.to_lowercase() == value)
        } else {
            allowed.iter().any(|a| a == value)
        }
    })
}
