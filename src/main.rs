//! Sumi-Scope main entry point
//!
//! This is the command-line interface for the Sumi-Scope focused crawler.

use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use sumi_scope::config::{compute_config_hash, read_config, validate, Config};
use sumi_scope::crawler::crawl;
use sumi_scope::output::print_report;
use tracing_subscriber::EnvFilter;

/// Sumi-Scope: a focused web crawler
///
/// Sumi-Scope crawls the sites named by its root URLs and nothing else. It
/// follows redirects within a budget, retries network errors, and reports
/// one outcome per URL.
#[derive(Parser, Debug)]
#[command(name = "sumi-scope")]
#[command(version)]
#[command(about = "A focused web crawler", long_about = None)]
struct Cli {
    /// Root URLs; a missing scheme defaults to http://
    #[arg(value_name = "ROOT")]
    roots: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum length of a redirect chain
    #[arg(long, value_name = "N")]
    max_redirect: Option<u32>,

    /// Maximum attempts per fetch on network errors
    #[arg(long, value_name = "N")]
    max_tries: Option<u32>,

    /// Maximum number of concurrent fetches
    #[arg(long, value_name = "N")]
    max_tasks: Option<usize>,

    /// Regex for URLs that are never crawled
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,

    /// Match hosts exactly, allowing only a `www.` toggle
    #[arg(long, conflicts_with = "lenient")]
    strict: bool,

    /// Match hosts by their last two labels
    #[arg(long, conflicts_with = "strict")]
    lenient: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Applies command-line values over the file configuration
    fn merge_into(self, mut config: Config) -> Config {
        config.roots.extend(self.roots);

        if let Some(n) = self.max_redirect {
            config.crawler.max_redirect = n;
        }
        if let Some(n) = self.max_tries {
            config.crawler.max_tries = n;
        }
        if let Some(n) = self.max_tasks {
            config.crawler.max_tasks = n;
        }
        if self.exclude.is_some() {
            config.crawler.exclude = self.exclude;
        }
        if self.strict {
            config.crawler.strict = true;
        } else if self.lenient {
            config.crawler.strict = false;
        }

        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let config = read_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let hash = compute_config_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let json = cli.json;
    let config = cli.merge_into(config);
    if config.roots.is_empty() {
        bail!("No root URLs given on the command line or in the configuration");
    }
    validate(&config).context("Invalid configuration")?;

    tracing::info!(
        "Crawling {} roots ({} matching, exclude: {})",
        config.roots.len(),
        if config.crawler.strict { "strict" } else { "lenient" },
        config.crawler.exclude.as_deref().unwrap_or("none")
    );

    let report = crawl(&config).await.context("Crawl failed")?;

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_scope=info,warn"),
            1 => EnvFilter::new("sumi_scope=debug,info"),
            2 => EnvFilter::new("sumi_scope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_file_config() {
        let cli = Cli::parse_from([
            "sumi-scope",
            "example.org",
            "--max-tries",
            "2",
            "--max-tasks",
            "5",
            "--exclude",
            "\\.pdf$",
            "--lenient",
        ]);

        let mut file = Config::default();
        file.roots.push("example.com".to_string());
        file.crawler.max_redirect = 3;

        let config = cli.merge_into(file);
        assert_eq!(config.roots, vec!["example.com", "example.org"]);
        assert_eq!(config.crawler.max_redirect, 3);
        assert_eq!(config.crawler.max_tries, 2);
        assert_eq!(config.crawler.max_tasks, 5);
        assert_eq!(config.crawler.exclude.as_deref(), Some("\\.pdf$"));
        assert!(!config.crawler.strict);
    }

    #[test]
    fn test_strict_and_lenient_conflict() {
        let result = Cli::try_parse_from(["sumi-scope", "--strict", "--lenient", "example.com"]);
        assert!(result.is_err());
    }
}
