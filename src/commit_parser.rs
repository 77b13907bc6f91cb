//! Turns `git log` output into [Commit] records.
//!
//! Each commit is requested as one record made of labelled fields. The
//! subject line is matched against the configured header, merge and revert
//! patterns; the body is scanned line by line for notes, issue references
//! and mentions, skipping anything inside a Markdown code block.

use crate::config::{Config, PatternOptions};
use crate::domain::{Commit, Hash, Merge, Note, Ref, Revert, Signature};
use crate::error::{ChangelogError, Result};
use crate::fields::{assign_by_name, AssignFields};
use crate::git::GitClient;
use crate::processor::Processor;
use chrono::DateTime;
use regex::Regex;

const SEPARATOR: &str = "@@__CHANGELOG__@@";
const DELIMITER: &str = "@@__CHANGELOG_DELIMITER__@@";

const HASH_FIELD: &str = "HASH";
const AUTHOR_FIELD: &str = "AUTHOR";
const COMMITTER_FIELD: &str = "COMMITTER";
const SUBJECT_FIELD: &str = "SUBJECT";
const BODY_FIELD: &str = "BODY";

fn log_format() -> String {
    let fields = [
        format!("{}:%H\t%h", HASH_FIELD),
        format!("{}:%an\t%ae\t%at", AUTHOR_FIELD),
        format!("{}:%cn\t%ce\t%ct", COMMITTER_FIELD),
        format!("{}:%s", SUBJECT_FIELD),
        format!("{}:%b", BODY_FIELD),
    ];
    format!("{}{}", SEPARATOR, fields.join(DELIMITER))
}

/// Regex-escape every word and join them as alternatives
fn alternation(words: &[String]) -> String {
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

/// A compiled pattern plus the field names of its capture groups
struct CapturePattern {
    regex: Regex,
    names: Vec<String>,
}

impl CapturePattern {
    /// `None` for an empty pattern
    fn compile(opts: &PatternOptions) -> Result<Option<Self>> {
        if opts.pattern.is_empty() {
            return Ok(None);
        }

        Ok(Some(CapturePattern {
            regex: Regex::new(&opts.pattern)?,
            names: opts.pattern_maps.clone(),
        }))
    }

    /// Capture groups of the first match; unmatched groups become empty
    fn captures(&self, input: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(input)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                .collect(),
        )
    }

    fn assign<T: AssignFields>(&self, record: &mut T, input: &str) -> bool {
        match self.captures(input) {
            Some(values) => {
                assign_by_name(record, &self.names, &values);
                true
            }
            None => false,
        }
    }
}

const FENCES: [&str; 4] = ["```", "~~~", "    ", "\t"];

/// Tracks whether a line sits inside a Markdown code block.
///
/// A block opens on a line starting with any fence marker and only closes on
/// a line starting with the same marker.
#[derive(Debug, Default)]
struct FenceDetector {
    open: Option<usize>,
}

impl FenceDetector {
    fn update(&mut self, line: &str) {
        match self.open {
            None => self.open = FENCES.iter().position(|fence| line.starts_with(fence)),
            Some(i) if line.starts_with(FENCES[i]) => self.open = None,
            Some(_) => {}
        }
    }

    fn in_code_block(&self) -> bool {
        self.open.is_some()
    }
}

/// Parses commit ranges through a [GitClient]
pub struct CommitParser<C> {
    client: C,
    header: Option<CapturePattern>,
    merge: Option<CapturePattern>,
    revert: Option<CapturePattern>,
    re_ref: Option<Regex>,
    re_issue: Option<Regex>,
    re_notes: Option<Regex>,
    re_mention: Regex,
    paths: Vec<String>,
    multiline_commit: bool,
    processor: Option<Box<dyn Processor>>,
}

impl<C: GitClient> CommitParser<C> {
    /// Compile every configured pattern.
    ///
    /// # Returns
    /// * `Err(Regex)` - If any configured pattern is malformed
    pub fn new(client: C, config: &Config) -> Result<Self> {
        let opts = &config.options;

        let prefixes = alternation(&opts.issues.prefix);
        let actions = alternation(&opts.refs.actions);
        let keywords = alternation(&opts.notes.keywords);

        let re_ref = if prefixes.is_empty() || actions.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"(?i)({})\s?([\w/\.\-]+)?(?:{})(\d+)",
                actions, prefixes
            ))?)
        };

        let re_issue = if prefixes.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"(?:{})(\d+)", prefixes))?)
        };

        let re_notes = if keywords.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(r"^(?i)\s*({})[:\s]+(.*)", keywords))?)
        };

        Ok(CommitParser {
            client,
            header: CapturePattern::compile(&opts.header)?,
            merge: CapturePattern::compile(&opts.merges)?,
            revert: CapturePattern::compile(&opts.reverts)?,
            re_ref,
            re_issue,
            re_notes,
            re_mention: Regex::new(r"@([\w-]+)")?,
            paths: opts.paths.clone(),
            multiline_commit: opts.multiline_commit,
            processor: None,
        })
    }

    /// Run every parsed commit through `processor`
    pub fn with_processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Parse all commits reachable through the revision range `rev`.
    pub fn parse(&self, rev: &str) -> Result<Vec<Commit>> {
        let format = format!("--pretty={}", log_format());
        let mut args = vec![rev, "--no-decorate", format.as_str()];
        if !self.paths.is_empty() {
            args.push("--");
            args.extend(self.paths.iter().map(String::as_str));
        }

        let out = self
            .client
            .exec("log", &args)
            .map_err(|e| ChangelogError::vcs(format!("failed to read log for '{}': {}", rev, e)))?;

        let mut commits = Vec::new();
        for record in out.split(SEPARATOR).skip(1) {
            let commit = self.parse_commit(record);

            let commit = match &self.processor {
                Some(processor) => match processor.process_commit(commit) {
                    Some(commit) => commit,
                    None => {
                        tracing::debug!(rev = %rev, "commit dropped by processor");
                        continue;
                    }
                },
                None => commit,
            };

            commits.push(commit);
        }

        tracing::debug!(rev = %rev, count = commits.len(), "parsed commits");
        Ok(commits)
    }

    fn parse_commit(&self, input: &str) -> Commit {
        let mut commit = Commit::default();

        for token in input.split(DELIMITER) {
            let Some((field, value)) = token.split_once(':') else {
                continue;
            };
            let value = value.trim();

            match field.trim() {
                HASH_FIELD => commit.hash = parse_hash(value),
                AUTHOR_FIELD => commit.author = parse_signature(value),
                COMMITTER_FIELD => commit.committer = parse_signature(value),
                SUBJECT_FIELD => self.process_header(&mut commit, value),
                BODY_FIELD => self.process_body(&mut commit, value),
                _ => {}
            }
        }

        commit.refs = unique(commit.refs);
        commit.mentions = unique(commit.mentions);
        commit
    }

    fn process_header(&self, commit: &mut Commit, input: &str) {
        commit.header = input.to_string();

        if let Some(header) = &self.header {
            header.assign(commit, input);
        }

        if let Some(pattern) = &self.merge {
            let mut merge = Merge::default();
            if pattern.assign(&mut merge, input) {
                commit.merge = Some(merge);
            }
        }

        if let Some(pattern) = &self.revert {
            let mut revert = Revert::default();
            if pattern.assign(&mut revert, input) {
                commit.revert = Some(revert);
            }
        }

        commit.refs = self.parse_refs(input);
        commit.mentions = self.parse_mentions(input);
    }

    fn process_body(&self, commit: &mut Commit, input: &str) {
        let body = input.replace("\r\n", "\n").replace('\r', "\n");

        let mut fence = FenceDetector::default();
        let mut in_note = false;
        let mut notes: Vec<Note> = Vec::new();
        let mut kept: Vec<&str> = Vec::new();
        let mut children = Vec::new();

        for line in body.split('\n') {
            fence.update(line);

            if fence.in_code_block() {
                match notes.last_mut() {
                    Some(note) if in_note => push_line(&mut note.body, line),
                    _ => kept.push(line),
                }
                continue;
            }

            let refs = self.parse_refs(line);
            let mentions = self.parse_mentions(line);
            let is_reference_line = !refs.is_empty() || !mentions.is_empty();
            if is_reference_line {
                in_note = false;
                commit.refs.extend(refs);
                commit.mentions.extend(mentions);
            }

            if let Some(note) = self.parse_note(line) {
                in_note = true;
                notes.push(note);
                continue;
            }

            if let Some(child) = self.parse_child(commit, line) {
                in_note = false;
                children.push(child);
                continue;
            }

            if is_reference_line {
                continue;
            }

            match notes.last_mut() {
                Some(note) if in_note => push_line(&mut note.body, line),
                _ => kept.push(line),
            }
        }

        for note in &mut notes {
            note.body = note.body.trim().to_string();
        }

        commit.trimmed_body = kept.join("\n").trim().to_string();
        commit.notes = notes;
        commit.all_headers = children;
        commit.body = body;
    }

    fn parse_note(&self, line: &str) -> Option<Note> {
        let caps = self.re_notes.as_ref()?.captures(line)?;
        Some(Note::new(&caps[1], &caps[2]))
    }

    /// A squashed commit header found in the body of `parent`
    fn parse_child(&self, parent: &Commit, line: &str) -> Option<Commit> {
        if !self.multiline_commit || line.trim().is_empty() {
            return None;
        }

        let header = self.header.as_ref()?;
        let line = line.trim();
        let values = header.captures(line)?;

        let mut child = Commit {
            hash: parent.hash.clone(),
            author: parent.author.clone(),
            committer: parent.committer.clone(),
            header: line.to_string(),
            refs: self.parse_refs(line),
            mentions: self.parse_mentions(line),
            ..Default::default()
        };
        assign_by_name(&mut child, &header.names, &values);
        Some(child)
    }

    fn parse_refs(&self, input: &str) -> Vec<Ref> {
        let mut refs = Vec::new();

        if let Some(re_ref) = &self.re_ref {
            for caps in re_ref.captures_iter(input) {
                refs.push(Ref::new(
                    caps.get(1).map_or("", |m| m.as_str()),
                    caps.get(2).map_or("", |m| m.as_str()),
                    caps.get(3).map_or("", |m| m.as_str()),
                ));
            }
        }

        if let Some(re_issue) = &self.re_issue {
            for caps in re_issue.captures_iter(input) {
                let number = &caps[1];
                if !refs.iter().any(|r| r.reference == number) {
                    refs.push(Ref::new("", "", number));
                }
            }
        }

        refs
    }

    fn parse_mentions(&self, input: &str) -> Vec<String> {
        self.re_mention
            .captures_iter(input)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

fn push_line(body: &mut String, line: &str) {
    body.push('\n');
    body.push_str(line);
}

fn parse_hash(input: &str) -> Hash {
    let mut parts = input.split('\t');
    Hash {
        long: parts.next().unwrap_or_default().to_string(),
        short: parts.next().unwrap_or_default().to_string(),
    }
}

/// `name\temail\tunix-seconds`; an unreadable time becomes the epoch
fn parse_signature(input: &str) -> Signature {
    let mut parts = input.split('\t');
    let name = parts.next().unwrap_or_default().to_string();
    let email = parts.next().unwrap_or_default().to_string();
    let time = parts
        .next()
        .and_then(|ts| ts.trim().parse::<i64>().ok())
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .unwrap_or_default();

    Signature { name, email, time }
}

/// Drop repeated items, keeping the first occurrence
fn unique<T: PartialEq>(items: Vec<T>) -> Vec<T> {
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
