use git_changelog::config::{load_config, Config, Style, TagSort};
use git_changelog::ChangelogError;
use serial_test::serial;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write config");
    file
}

#[test]
fn test_load_config_from_path() {
    let file = write_config(
        r#"
style = "github"

[info]
title = "Widgets"
repository_url = "https://github.com/acme/widgets"

[options]
sort = "semver"
tag_filter_pattern = "^v"

[options.commit_groups]
title_maps = { feat = "Features", fix = "Bug Fixes" }

[options.header]
pattern = '^(\w*): (.*)$'
pattern_maps = ["Type", "Subject"]
"#,
    );

    let config = load_config(file.path().to_str()).expect("Failed to load test config");

    assert_eq!(config.style, Style::Github);
    assert_eq!(config.info.title, "Widgets");
    assert_eq!(config.options.sort, TagSort::Semver);
    assert_eq!(config.options.tag_filter_pattern, "^v");
    assert_eq!(
        config.options.commit_groups.title_maps.get("feat"),
        Some(&"Features".to_string())
    );
    assert_eq!(config.options.header.pattern_maps, vec!["Type", "Subject"]);
    // untouched sections keep their defaults
    assert_eq!(config.bin, "git");
    assert_eq!(config.options.commits.sort_by, "Scope");
}

#[test]
fn test_invalid_sort_is_rejected() {
    let file = write_config("[options]\nsort = \"alphabetical\"\n");
    let result = load_config(file.path().to_str());
    assert!(matches!(result, Err(ChangelogError::Toml(_))));
}

#[test]
fn test_missing_config_path_is_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let result = load_config(missing.to_str());
    assert!(matches!(result, Err(ChangelogError::Io(_))));
}

#[test]
#[serial]
fn test_load_config_from_working_directory() {
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join(".chglog.toml"),
        "bin = \"/usr/local/bin/git\"\n\n[options]\nnext_tag = \"v3.0.0\"\n",
    )
    .unwrap();

    let original = std::env::current_dir().unwrap();
    std::env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    std::env::set_current_dir(original).unwrap();

    let config = result.expect("Failed to load .chglog.toml");
    assert_eq!(config.bin, "/usr/local/bin/git");
    assert_eq!(config.options.next_tag.as_deref(), Some("v3.0.0"));
}

#[test]
fn test_normalize_after_load() {
    let file = write_config(
        r#"
style = "gitlab"

[info]
repository_url = "https://gitlab.com/acme/widgets/"

[options.issues]
prefix = ["JIRA-"]
"#,
    );

    let mut config = load_config(file.path().to_str()).unwrap();
    config.normalize();

    assert_eq!(config.info.repository_url, "https://gitlab.com/acme/widgets");
    assert_eq!(config.options.issues.prefix, vec!["JIRA-"]);
    assert!(config.options.refs.actions.contains(&"closing".to_string()));
    assert_eq!(config.options.merges.pattern_maps, vec!["Source"]);
    assert_eq!(config.options.header.pattern, "^(.*)$");
}

#[test]
fn test_default_config_roundtrips_through_toml() {
    let rendered = toml::to_string(&Config::default()).unwrap();
    let parsed: Config = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed, Config::default());
}
