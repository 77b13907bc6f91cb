//! Classifies the commits of one revision range into groups.

use crate::commit_filter::filter_commits;
use crate::config::Options;
use crate::domain::{Commit, CommitGroup, Extraction, Note, NoteGroup};
use crate::fields::{dot_get, normalize_field_name, sort_by_field, title_case};
use std::collections::{BTreeMap, HashMap};

/// Group sort mode that follows `commit_groups.title_order`
const CUSTOM_ORDER: &str = "custom";

pub struct CommitExtractor {
    filters: BTreeMap<String, Vec<String>>,
    no_case_sensitive: bool,
    commit_sort_by: String,
    group_by: String,
    group_sort_by: String,
    title_order: Vec<String>,
    title_maps: HashMap<String, String>,
}

impl CommitExtractor {
    pub fn new(opts: &Options) -> Self {
        CommitExtractor {
            filters: opts.commits.filters.clone(),
            no_case_sensitive: opts.no_case_sensitive,
            commit_sort_by: opts.commits.sort_by.clone(),
            group_by: opts.commit_groups.group_by.clone(),
            group_sort_by: opts.commit_groups.sort_by.clone(),
            title_order: opts.commit_groups.title_order.clone(),
            title_maps: opts.commit_groups.title_maps.clone(),
        }
    }

    /// Split `commits` into commit groups, merges, reverts and note groups.
    ///
    /// Merges and reverts keep their original order and never join a commit
    /// group. Notes are collected from every commit, filtered or not.
    pub fn extract(&self, commits: &[Commit]) -> Extraction {
        let mut merge_commits = Vec::new();
        let mut revert_commits = Vec::new();

        for commit in commits {
            if commit.merge.is_some() {
                merge_commits.push(commit.clone());
            } else if commit.revert.is_some() {
                revert_commits.push(commit.clone());
            }
        }

        let mut commit_groups: Vec<CommitGroup> = Vec::new();
        for commit in filter_commits(commits, &self.filters, self.no_case_sensitive) {
            if !commit.is_merge_or_revert() {
                self.add_to_group(&mut commit_groups, commit);
            }
        }

        let mut note_groups: Vec<NoteGroup> = Vec::new();
        for note in commits.iter().flat_map(|c| c.notes.iter()) {
            add_note(&mut note_groups, note);
        }

        self.sort_commit_groups(&mut commit_groups);
        sort_note_groups(&mut note_groups);

        Extraction {
            commit_groups,
            merge_commits,
            revert_commits,
            note_groups,
        }
    }

    fn add_to_group(&self, groups: &mut Vec<CommitGroup>, commit: Commit) {
        let raw = match dot_get(&commit, &self.group_by).and_then(|v| v.as_str()) {
            Some(raw) if !raw.is_empty() => raw.to_string(),
            _ => {
                tracing::debug!(hash = %commit.hash.short, field = %self.group_by, "commit has no group");
                return;
            }
        };

        match groups.iter_mut().find(|g| g.raw_title == raw) {
            Some(group) => group.commits.push(commit),
            None => groups.push(CommitGroup {
                title: self.group_title(&raw),
                raw_title: raw,
                commits: vec![commit],
            }),
        }
    }

    fn group_title(&self, raw: &str) -> String {
        self.title_maps
            .get(raw)
            .cloned()
            .unwrap_or_else(|| title_case(raw))
    }

    fn sort_commit_groups(&self, groups: &mut Vec<CommitGroup>) {
        if normalize_field_name(&self.group_sort_by) == CUSTOM_ORDER {
            let rank = |raw: &str| {
                self.title_order
                    .iter()
                    .position(|t| t == raw)
                    .unwrap_or(self.title_order.len())
            };
            groups.sort_by_key(|g| rank(&g.raw_title));
        } else {
            sort_by_field(groups, &self.group_sort_by);
        }

        for group in groups.iter_mut() {
            sort_by_field(&mut group.commits, &self.commit_sort_by);
        }
    }
}

fn add_note(groups: &mut Vec<NoteGroup>, note: &Note) {
    match groups.iter_mut().find(|g| g.title == note.title) {
        Some(group) => group.notes.push(note.clone()),
        None => groups.push(NoteGroup {
            title: note.title.clone(),
            notes: vec![note.clone()],
        }),
    }
}

/// Groups by case-insensitive title; notes keep discovery order.
fn sort_note_groups(groups: &mut [NoteGroup]) {
    groups.sort_by_key(|g| g.title.to_lowercase());

    for group in groups.iter_mut() {
        group.notes.sort_by_key(|n| n.title.to_lowercase());
    }
}
