//! Per-commit hooks run by the commit parser.
//!
//! The hosting-style processors turn `@user`, `#12` and (on GitLab) `!7`
//! into Markdown links pointing at the hosting service.

use crate::config::{Config, Style};
use crate::domain::Commit;
use crate::error::Result;
use regex::Regex;

/// Rewrites or drops commits as they are parsed
pub trait Processor: Send + Sync {
    /// Prepare the processor for `config`; called once before any commit.
    fn bootstrap(&mut self, config: &Config) -> Result<()>;

    /// Returning `None` drops the commit from the changelog.
    fn process_commit(&self, commit: Commit) -> Option<Commit>;
}

/// Passes every commit through untouched
#[derive(Debug, Default)]
pub struct PlainProcessor;

impl Processor for PlainProcessor {
    fn bootstrap(&mut self, _config: &Config) -> Result<()> {
        Ok(())
    }

    fn process_commit(&self, commit: Commit) -> Option<Commit> {
        Some(commit)
    }
}

/// Ordered regex replacements applied to every text field of a commit
#[derive(Debug, Default)]
struct Linker {
    rules: Vec<(Regex, String)>,
}

impl Linker {
    fn rule(mut self, pattern: &str, replacement: String) -> Result<Self> {
        self.rules.push((Regex::new(pattern)?, replacement));
        Ok(self)
    }

    fn rewrite(&self, input: &str) -> String {
        self.rules
            .iter()
            .fold(input.to_string(), |text, (regex, replacement)| {
                regex.replace_all(&text, replacement.as_str()).into_owned()
            })
    }

    fn apply(&self, mut commit: Commit) -> Commit {
        commit.header = self.rewrite(&commit.header);
        commit.subject = self.rewrite(&commit.subject);
        commit.body = self.rewrite(&commit.body);
        for note in &mut commit.notes {
            note.body = self.rewrite(&note.body);
        }
        commit
    }
}

fn host_or(host: &str, default: &str) -> String {
    if host.is_empty() {
        default.to_string()
    } else {
        host.trim_end_matches('/').to_string()
    }
}

/// Links mentions to GitHub profiles and `#N` / `gh-N` to issues
#[derive(Debug, Default)]
pub struct GitHubProcessor {
    pub host: String,
    linker: Linker,
}

impl GitHubProcessor {
    pub fn new(host: impl Into<String>) -> Self {
        GitHubProcessor {
            host: host.into(),
            ..Default::default()
        }
    }
}

impl Processor for GitHubProcessor {
    fn bootstrap(&mut self, config: &Config) -> Result<()> {
        self.host = host_or(&self.host, "https://github.com");
        let repo = config.info.repository_url.trim_end_matches('/');

        self.linker = Linker::default()
            .rule(r"@(\w+)", format!("[@${{1}}]({}/${{1}})", self.host))?
            .rule(r"(?i)(#|gh-)(\d+)", format!("[${{1}}${{2}}]({}/issues/${{2}})", repo))?;
        Ok(())
    }

    fn process_commit(&self, commit: Commit) -> Option<Commit> {
        Some(self.linker.apply(commit))
    }
}

/// Links mentions, issues and merge requests on GitLab
#[derive(Debug, Default)]
pub struct GitLabProcessor {
    pub host: String,
    linker: Linker,
}

impl GitLabProcessor {
    pub fn new(host: impl Into<String>) -> Self {
        GitLabProcessor {
            host: host.into(),
            ..Default::default()
        }
    }
}

impl Processor for GitLabProcessor {
    fn bootstrap(&mut self, config: &Config) -> Result<()> {
        self.host = host_or(&self.host, "https://gitlab.com");
        let repo = config.info.repository_url.trim_end_matches('/');

        self.linker = Linker::default()
            .rule(r"@(\w+)", format!("[@${{1}}]({}/${{1}})", self.host))?
            .rule(r"(?i)#(\d+)", format!("[#${{1}}]({}/issues/${{1}})", repo))?
            .rule(r"!(\d+)", format!("[!${{1}}]({}/merge_requests/${{1}})", repo))?;
        Ok(())
    }

    fn process_commit(&self, commit: Commit) -> Option<Commit> {
        Some(self.linker.apply(commit))
    }
}

/// Links mentions and issues on Bitbucket
#[derive(Debug, Default)]
pub struct BitbucketProcessor {
    pub host: String,
    linker: Linker,
}

impl BitbucketProcessor {
    pub fn new(host: impl Into<String>) -> Self {
        BitbucketProcessor {
            host: host.into(),
            ..Default::default()
        }
    }
}

impl Processor for BitbucketProcessor {
    fn bootstrap(&mut self, config: &Config) -> Result<()> {
        self.host = host_or(&self.host, "https://bitbucket.org");
        let repo = config.info.repository_url.trim_end_matches('/');

        self.linker = Linker::default()
            .rule(r"@(\w+)", format!("[@${{1}}]({}/${{1}}/)", self.host))?
            .rule(r"(?i)#(\d+)", format!("[#${{1}}]({}/issues/${{1}}/)", repo))?;
        Ok(())
    }

    fn process_commit(&self, commit: Commit) -> Option<Commit> {
        Some(self.linker.apply(commit))
    }
}

/// `scheme://host` of a URL, or empty when it has no scheme
fn origin(url: &str) -> String {
    match url.split_once("://") {
        Some((scheme, rest)) => {
            let host = rest.split('/').next().unwrap_or_default();
            format!("{}://{}", scheme, host)
        }
        None => String::new(),
    }
}

/// Pick the processor matching the configured style, or the repository host.
///
/// The result is not bootstrapped yet.
pub fn processor_for(config: &Config) -> Box<dyn Processor> {
    let url = config.info.repository_url.as_str();
    let host = origin(url);

    let style = match config.style {
        Style::None if host.ends_with("github.com") => Style::Github,
        Style::None if host.ends_with("gitlab.com") => Style::Gitlab,
        Style::None if host.ends_with("bitbucket.org") => Style::Bitbucket,
        style => style,
    };

    match style {
        Style::Github => Box::new(GitHubProcessor::new(host)),
        Style::Gitlab => Box::new(GitLabProcessor::new(host)),
        Style::Bitbucket => Box::new(BitbucketProcessor::new(host)),
        Style::None => Box::new(PlainProcessor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Note;

    fn config(url: &str, style: Style) -> Config {
        let mut config = Config::default();
        config.info.repository_url = url.to_string();
        config.style = style;
        config
    }

    fn commit(text: &str) -> Commit {
        Commit {
            header: text.to_string(),
            subject: text.to_string(),
            body: text.to_string(),
            notes: vec![Note::new("BREAKING CHANGE", text)],
            ..Default::default()
        }
    }

    #[test]
    fn test_plain_processor_is_identity() {
        let mut processor = PlainProcessor;
        processor.bootstrap(&Config::default()).unwrap();
        let input = commit("fix #1 by @someone");
        assert_eq!(processor.process_commit(input.clone()), Some(input));
    }

    #[test]
    fn test_github_links() {
        let mut processor = GitHubProcessor::default();
        processor
            .bootstrap(&config("https://github.com/owner/repo/", Style::Github))
            .unwrap();

        let out = processor
            .process_commit(commit("fix #12 and GH-3, thanks @octo"))
            .unwrap();
        let expected = "fix [#12](https://github.com/owner/repo/issues/12) and \
                        [GH-3](https://github.com/owner/repo/issues/3), \
                        thanks [@octo](https://github.com/octo)";

        assert_eq!(out.header, expected);
        assert_eq!(out.subject, expected);
        assert_eq!(out.body, expected);
        assert_eq!(out.notes[0].body, expected);
    }

    #[test]
    fn test_gitlab_links_merge_requests() {
        let mut processor = GitLabProcessor::new("https://gitlab.example.com");
        processor
            .bootstrap(&config("https://gitlab.example.com/group/app", Style::Gitlab))
            .unwrap();

        let out = processor.process_commit(commit("see !7 and #8")).unwrap();
        assert_eq!(
            out.subject,
            "see [!7](https://gitlab.example.com/group/app/merge_requests/7) and \
             [#8](https://gitlab.example.com/group/app/issues/8)"
        );
    }

    #[test]
    fn test_bitbucket_links() {
        let mut processor = BitbucketProcessor::default();
        processor
            .bootstrap(&config("https://bitbucket.org/team/app", Style::Bitbucket))
            .unwrap();

        let out = processor.process_commit(commit("@dev #4")).unwrap();
        assert_eq!(
            out.subject,
            "[@dev](https://bitbucket.org/dev/) [#4](https://bitbucket.org/team/app/issues/4/)"
        );
    }

    #[test]
    fn test_processor_for_detects_host() {
        let mut processor = processor_for(&config("https://github.com/owner/repo", Style::None));
        processor
            .bootstrap(&config("https://github.com/owner/repo", Style::None))
            .unwrap();
        let out = processor.process_commit(commit("#1")).unwrap();
        assert_eq!(out.subject, "[#1](https://github.com/owner/repo/issues/1)");

        let mut plain = processor_for(&config("https://git.example.com/repo", Style::None));
        plain.bootstrap(&Config::default()).unwrap();
        assert_eq!(plain.process_commit(commit("#1")).unwrap().subject, "#1");
    }

    #[test]
    fn test_origin() {
        assert_eq!(origin("https://github.com/owner/repo"), "https://github.com");
        assert_eq!(origin("git@github.com:owner/repo"), "");
    }
}
