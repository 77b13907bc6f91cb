use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

use git_changelog::config::{self, Config, TagSort};
use git_changelog::git::{discover_workdir, CommandClient};
use git_changelog::processor::processor_for;
use git_changelog::{ui, Generator};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Summary,
}

#[derive(clap::Parser)]
#[command(
    name = "git-changelog",
    about = "Generate a changelog from git tags and conventional commits"
)]
struct Args {
    #[arg(help = "Tag query: <tag>, <old>..<new>, <old>.. or ..<new> (default: all tags)")]
    query: Option<String>,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, help = "Treat unreleased commits as this tag")]
    next_tag: Option<String>,

    #[arg(long, help = "Only use tags matching this regular expression")]
    tag_filter_pattern: Option<String>,

    #[arg(long, help = "Tag order: date or semver")]
    sort: Option<TagSort>,

    #[arg(long = "path", help = "Only include commits touching this path")]
    paths: Vec<String>,

    #[arg(long, help = "Match commit filters case-insensitively")]
    no_case: bool,

    #[arg(long, help = "Repository URL used for links")]
    repository_url: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary, help = "Output format")]
    format: OutputFormat,

    #[arg(short, long, help = "Write output to this file instead of stdout")]
    output: Option<String>,

    #[arg(short, long, help = "Overwrite the output file without asking")]
    force: bool,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v, -vv)")]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

/// Command line flags win over the configuration file
fn apply_overrides(config: &mut Config, args: &Args) {
    let opts = &mut config.options;

    if let Some(next_tag) = &args.next_tag {
        opts.next_tag = Some(next_tag.clone());
    }
    if let Some(pattern) = &args.tag_filter_pattern {
        opts.tag_filter_pattern = pattern.clone();
    }
    if let Some(sort) = args.sort {
        opts.sort = sort;
    }
    if !args.paths.is_empty() {
        opts.paths = args.paths.clone();
    }
    if args.no_case {
        opts.no_case_sensitive = true;
    }
    if let Some(url) = &args.repository_url {
        config.info.repository_url = url.clone();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &args);

    let workdir = match discover_workdir(".") {
        Ok(dir) => dir,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    let client = CommandClient::new(config.bin.clone()).with_working_dir(&workdir);
    let processor = processor_for(&config);
    let generator = Generator::new(client, config)?.with_processor(processor)?;

    let query = args.query.clone().unwrap_or_default();
    ui::display_status(&format!("Generating changelog in {}", workdir.display()));

    let changelog = match generator.generate(&query) {
        Ok(changelog) => changelog,
        Err(e) if e.is_query_error() => {
            ui::display_error(&e.to_string());
            ui::display_query_help(&query);
            std::process::exit(1);
        }
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    for warning in &changelog.warnings {
        ui::display_boundary_warning(warning);
    }

    let rendered = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&changelog)? + "\n",
        OutputFormat::Summary => ui::format_summary(&generator.config().info.title, &changelog),
    };

    match &args.output {
        Some(path) => {
            if Path::new(path).exists()
                && !args.force
                && !ui::confirm_action(&format!("'{}' exists. Overwrite?", path))?
            {
                println!("Operation cancelled by user.");
                return Ok(());
            }

            fs::write(path, rendered).with_context(|| format!("Failed to write {}", path))?;
            ui::display_success(&format!(
                "Wrote {} version(s) to {}",
                changelog.versions.len(),
                path
            ));
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
