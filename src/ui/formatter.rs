//! Pure formatting functions for UI output.
//!
//! Status lines are colored with `console`; the changelog summary is plain
//! text so it can be written to a file or compared in tests.

use crate::boundary::BoundaryWarning;
use crate::domain::{Changelog, Commit, CommitGroup, NoteGroup};
use console::style;
use std::fmt::Write;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    eprintln!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    eprintln!("{} {}", style("→").yellow(), message);
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Extra help printed after a query error.
pub fn display_query_help(query: &str) {
    eprintln!(
        "{} '{}' should be a tag name or a range: <old>..<new>, <old>.. or ..<new>",
        style("→").yellow(),
        query
    );
}

fn commit_line(commit: &Commit) -> String {
    let subject = if commit.subject.is_empty() {
        &commit.header
    } else {
        &commit.subject
    };

    if commit.scope.is_empty() {
        format!("{} ({})", subject, commit.hash.short)
    } else {
        format!("{}: {} ({})", commit.scope, subject, commit.hash.short)
    }
}

fn write_groups(out: &mut String, commit_groups: &[CommitGroup], note_groups: &[NoteGroup]) {
    for group in commit_groups {
        let _ = writeln!(out, "  {}", group.title);
        for commit in &group.commits {
            let _ = writeln!(out, "    - {}", commit_line(commit));
        }
    }

    for group in note_groups {
        let _ = writeln!(out, "  {}", group.title);
        for note in &group.notes {
            let first = note.body.lines().next().unwrap_or_default();
            let _ = writeln!(out, "    - {}", first);
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "commit"
    } else {
        "commits"
    }
}

/// Render a plain-text overview of `changelog`, one section per version.
///
/// # Arguments
/// * `title` - Heading printed above everything else
/// * `changelog` - Generated changelog
pub fn format_summary(title: &str, changelog: &Changelog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", title);

    let unreleased = &changelog.unreleased;
    if !unreleased.is_empty() {
        let count = unreleased.commits.len();
        let _ = writeln!(out, "\nUnreleased ({} {})", count, plural(count));
        write_groups(&mut out, &unreleased.commit_groups, &unreleased.note_groups);
    }

    for version in &changelog.versions {
        let count = version.commits.len();
        let _ = writeln!(
            out,
            "\n{} - {} ({} {})",
            version.tag.name,
            version.tag.timestamp.format("%Y-%m-%d"),
            count,
            plural(count)
        );
        write_groups(&mut out, &version.commit_groups, &version.note_groups);

        if !version.merge_commits.is_empty() {
            let _ = writeln!(out, "  Merges");
            for commit in &version.merge_commits {
                let _ = writeln!(out, "    - {} ({})", commit.header, commit.hash.short);
            }
        }

        if !version.revert_commits.is_empty() {
            let _ = writeln!(out, "  Reverts");
            for commit in &version.revert_commits {
                let _ = writeln!(out, "    - {} ({})", commit.header, commit.hash.short);
            }
        }
    }

    out
}
