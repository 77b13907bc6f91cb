//! Runs the whole pipeline for one tag query.

use crate::boundary::BoundaryWarning;
use crate::commit_extractor::CommitExtractor;
use crate::commit_parser::CommitParser;
use crate::config::Config;
use crate::domain::{Changelog, Commit, RelatedTag, Tag, Unreleased, Version};
use crate::error::{ChangelogError, Result};
use crate::git::GitClient;
use crate::processor::Processor;
use crate::tag_reader::TagReader;
use crate::tag_selector::TagSelector;
use std::sync::Arc;

/// Builds a [Changelog] from the tags and commits of one repository
pub struct Generator<C> {
    config: Config,
    tag_reader: TagReader<Arc<C>>,
    tag_selector: TagSelector,
    commit_parser: CommitParser<Arc<C>>,
    commit_extractor: CommitExtractor,
}

impl<C: GitClient> Generator<C> {
    /// Normalize `config` and set up every pipeline stage.
    ///
    /// # Returns
    /// * `Err` - If the tag filter or any commit pattern is malformed
    pub fn new(client: C, mut config: Config) -> Result<Self> {
        config.normalize();

        let client = Arc::new(client);
        let opts = &config.options;

        Ok(Generator {
            tag_reader: TagReader::new(Arc::clone(&client), &opts.tag_filter_pattern, opts.sort)?,
            tag_selector: TagSelector::new(),
            commit_parser: CommitParser::new(client, &config)?,
            commit_extractor: CommitExtractor::new(opts),
            config,
        })
    }

    /// Bootstrap `processor` and run every parsed commit through it
    pub fn with_processor(mut self, mut processor: Box<dyn Processor>) -> Result<Self> {
        processor.bootstrap(&self.config)?;
        self.commit_parser = self.commit_parser.with_processor(processor);
        Ok(self)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the changelog for the tags selected by `query`.
    ///
    /// An empty query, or `..`, selects every tag.
    pub fn generate(&self, query: &str) -> Result<Changelog> {
        let mut warnings = Vec::new();

        let (tags, boundary) = self.get_tags(query, &mut warnings)?;
        let unmatched = matches!(
            warnings.last(),
            Some(BoundaryWarning::NoMatchingTags { .. })
        );
        let unreleased = if unmatched {
            Unreleased::default()
        } else {
            self.read_unreleased(&tags)?
        };
        let versions = self.read_versions(tags, &boundary, &mut warnings)?;

        for warning in &warnings {
            tracing::debug!(%warning, "changelog warning");
        }

        Ok(Changelog {
            unreleased,
            versions,
            warnings,
        })
    }

    fn next_tag(&self) -> Option<&str> {
        self.config
            .options
            .next_tag
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    fn get_tags(
        &self,
        query: &str,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<(Vec<Tag>, String)> {
        let listing = self.tag_reader.read()?;
        warnings.extend(
            listing
                .skipped
                .into_iter()
                .map(|tag| BoundaryWarning::NonSemverTag { tag }),
        );

        let mut tags = listing.tags;

        if let Some(next) = self.next_tag() {
            if tags.iter().any(|tag| tag.name == next) {
                return Err(ChangelogError::TagCollision(next.to_string()));
            }

            let mut synthetic = Tag::new(next);
            synthetic.subject = next.to_string();
            if let Some(newest) = tags.first_mut() {
                synthetic.previous = Some(newest.related());
                newest.next = Some(synthetic.related());
            }
            tags.insert(0, synthetic);
        }

        if tags.is_empty() {
            warnings.push(BoundaryWarning::NoTags);
            return Ok((tags, String::new()));
        }

        if query.is_empty() || query == ".." {
            return Ok((tags, String::new()));
        }

        let selection = self.tag_selector.select(&tags, query)?;
        if selection.tags.is_empty() {
            warnings.push(BoundaryWarning::NoMatchingTags {
                query: query.to_string(),
            });
        }

        tracing::debug!(query = %query, selected = selection.tags.len(), boundary = %selection.boundary, "selected tags");
        Ok((selection.tags, selection.boundary))
    }

    fn read_unreleased(&self, tags: &[Tag]) -> Result<Unreleased> {
        if self.next_tag().is_some() {
            return Ok(Unreleased::default());
        }

        let rev = match tags.first() {
            Some(newest) => format!("{}..HEAD", newest.name),
            None => "HEAD".to_string(),
        };

        let commits = self.commit_parser.parse(&rev)?;
        let extraction = self.commit_extractor.extract(&commits);
        Ok(Unreleased::new(commits, extraction))
    }

    fn read_versions(
        &self,
        tags: Vec<Tag>,
        boundary: &str,
        warnings: &mut Vec<BoundaryWarning>,
    ) -> Result<Vec<Version>> {
        let next = self.next_tag();
        let older: Vec<String> = tags.iter().skip(1).map(|t| t.name.clone()).collect();
        let mut versions = Vec::with_capacity(tags.len());
        let mut placeholder: Option<RelatedTag> = None;

        for (i, mut tag) in tags.into_iter().enumerate() {
            let is_next = next == Some(tag.name.as_str());

            let rev = if is_next {
                match &tag.previous {
                    Some(previous) => format!("{}..HEAD", previous.name),
                    None => "HEAD".to_string(),
                }
            } else if let Some(previous) = older.get(i) {
                format!("{}..{}", previous, tag.name)
            } else if !boundary.is_empty() {
                format!("{}..{}", boundary, tag.name)
            } else {
                tag.name.clone()
            };

            let commits: Vec<Commit> = self.commit_parser.parse(&rev)?;
            if commits.is_empty() {
                warnings.push(BoundaryWarning::EmptyRange { rev });
            }

            if is_next {
                if let Some(newest) = commits.first() {
                    tag.timestamp = newest.author.time;
                }
                placeholder = Some(tag.related());
            } else if let Some(link) = &placeholder {
                // the link was taken before the placeholder had a timestamp
                if tag.next.as_ref().map(|n| &n.name) == Some(&link.name) {
                    tag.next = Some(link.clone());
                }
            }

            let extraction = self.commit_extractor.extract(&commits);
            versions.push(Version::new(tag, commits, extraction));
        }

        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PatternOptions;
    use crate::git::MockClient;

    const TAG_SEPARATOR: &str = "@@__CHANGELOG_TAG__@@";
    const SEPARATOR: &str = "@@__CHANGELOG__@@";
    const DELIMITER: &str = "@@__CHANGELOG_DELIMITER__@@";

    fn tag_line(name: &str, date: &str, commit: &str) -> String {
        [
            format!("refs/tags/{}", name),
            format!("Release {}", name),
            date.to_string(),
            String::new(),
            commit.to_string(),
            String::new(),
        ]
        .join(TAG_SEPARATOR)
    }

    fn record(hash: &str, time: i64, subject: &str) -> String {
        format!(
            "{}HASH:{}\t{}{d}AUTHOR:dev\tdev@example.com\t{}{d}COMMITTER:dev\tdev@example.com\t{}{d}SUBJECT:{}{d}BODY:\n",
            SEPARATOR,
            hash,
            hash,
            time,
            time,
            subject,
            d = DELIMITER
        )
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.options.header =
            PatternOptions::new(r"^(\w*)(?:\((.*)\))?:\s(.*)$", &["Type", "Scope", "Subject"]);
        config
    }

    fn client() -> MockClient {
        client_with_unreleased(String::new())
    }

    fn client_with_unreleased(unreleased: String) -> MockClient {
        let tags = [
            tag_line("v2.0.0", "2018-02-01T00:00:00+00:00", "c2"),
            tag_line("v1.0.0", "2018-01-01T00:00:00+00:00", "c1"),
        ]
        .join("\n");

        MockClient::new()
            .with_output("for-each-ref", tags)
            .with_output("rev-list", "c2\nc1\n")
            .with_output_for("log", "v2.0.0..HEAD", unreleased)
            .with_output_for("log", "v1.0.0..HEAD", record("c3", 300, "feat: next"))
            .with_output_for("log", "v1.0.0..v2.0.0", record("c2", 200, "feat(core): x"))
            .with_output_for("log", "v1.0.0", record("c1", 100, "fix(core): y"))
            .with_output_for("log", "HEAD", record("c3", 300, "feat: next"))
    }

    fn names(versions: &[Version]) -> Vec<&str> {
        versions.iter().map(|v| v.tag.name.as_str()).collect()
    }

    #[test]
    fn test_generate_all_tags() {
        let generator = Generator::new(client(), config()).unwrap();
        let changelog = generator.generate("").unwrap();

        assert!(changelog.unreleased.is_empty());
        assert_eq!(names(&changelog.versions), vec!["v2.0.0", "v1.0.0"]);
        assert_eq!(changelog.versions[0].commit_groups[0].raw_title, "feat");
        assert_eq!(changelog.versions[1].commit_groups[0].raw_title, "fix");
        assert_eq!(
            changelog.versions[0].tag.previous.as_ref().map(|t| t.name.as_str()),
            Some("v1.0.0")
        );
        assert!(changelog.warnings.is_empty());
    }

    #[test]
    fn test_single_tag_uses_boundary() {
        let client = client();
        let generator = Generator::new(&client, config()).unwrap();
        let changelog = generator.generate("v2.0.0").unwrap();

        assert_eq!(names(&changelog.versions), vec!["v2.0.0"]);
        assert!(client
            .calls()
            .iter()
            .any(|call| call[0] == "log" && call[1] == "v1.0.0..v2.0.0"));
    }

    #[test]
    fn test_unmatched_single_tag_warns() {
        let generator = Generator::new(client(), config()).unwrap();
        let changelog = generator.generate("v9.0.0").unwrap();

        assert!(changelog.versions.is_empty());
        assert!(changelog.unreleased.is_empty());
        assert_eq!(
            changelog.warnings,
            vec![BoundaryWarning::NoMatchingTags {
                query: "v9.0.0".to_string()
            }]
        );
    }

    #[test]
    fn test_query_errors_propagate() {
        let generator = Generator::new(client(), config()).unwrap();
        assert!(matches!(
            generator.generate("a..b..c"),
            Err(ChangelogError::QueryParse(_))
        ));
        assert!(matches!(
            generator.generate("v9.0.0.."),
            Err(ChangelogError::NotFound(_))
        ));
    }

    #[test]
    fn test_next_tag_collects_unreleased_commits() {
        let mut config = config();
        config.options.next_tag = Some("v3.0.0".to_string());
        let client = client_with_unreleased(record("c3", 300, "feat: next"));

        let generator = Generator::new(client, config).unwrap();
        let changelog = generator.generate("").unwrap();

        assert!(changelog.unreleased.is_empty());
        assert_eq!(names(&changelog.versions), vec!["v3.0.0", "v2.0.0", "v1.0.0"]);
        let next = &changelog.versions[0];
        assert_eq!(next.tag.timestamp.timestamp(), 300);
        assert_eq!(next.tag.previous.as_ref().unwrap().name, "v2.0.0");
        assert_eq!(next.commits[0].subject, "next");

        let newest = changelog.versions[1].tag.next.as_ref().unwrap();
        assert_eq!(newest.name, "v3.0.0");
        assert_eq!(newest.timestamp, next.tag.timestamp);
    }

    #[test]
    fn test_next_tag_collision() {
        let mut config = config();
        config.options.next_tag = Some("v2.0.0".to_string());

        let generator = Generator::new(client(), config).unwrap();
        assert!(matches!(
            generator.generate(""),
            Err(ChangelogError::TagCollision(name)) if name == "v2.0.0"
        ));
    }

    #[test]
    fn test_no_tags() {
        let client = MockClient::new()
            .with_output("for-each-ref", "")
            .with_output("log", record("c1", 100, "feat: first"));

        let generator = Generator::new(client, config()).unwrap();
        let changelog = generator.generate("").unwrap();

        assert!(changelog.versions.is_empty());
        assert_eq!(changelog.unreleased.commits.len(), 1);
        assert_eq!(changelog.warnings, vec![BoundaryWarning::NoTags]);
    }

    #[test]
    fn test_invalid_tag_filter_fails_at_construction() {
        let mut config = config();
        config.options.tag_filter_pattern = "[".to_string();
        assert!(matches!(
            Generator::new(MockClient::new(), config),
            Err(ChangelogError::Regex(_))
        ));
    }
}
