//! perceiver entry point.
//!
//! Prints the extracted text of one file or URL on stdout. Logging goes to
//! stderr so the output can be piped.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use perceiver_client::Perceiver;
use perceiver_core::{AppConfig, Error};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "perceiver")]
#[command(about = "Extract the text content of a file or URL, with caching")]
#[command(version)]
struct Cli {
    /// Local path or http(s) URL
    source: String,

    /// Skip the cache lookup and always re-extract
    #[arg(long)]
    bypass_cache: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Exit status for a failed run.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<Error>().map(Error::exit_code).unwrap_or(1)
}

async fn run(cli: &Cli) -> Result<String> {
    let config = AppConfig::load(cli.config.as_deref())
        .map_err(Error::from)
        .context("failed to load configuration")?;

    let perceiver = Perceiver::from_config(config).await?;
    let (perception, outcome) = perceiver.perceive(&cli.source, cli.bypass_cache).await?;

    tracing::debug!(outcome = outcome.as_str(), source = %perception.source, "done");
    Ok(perception.contents)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    match run(&cli).await {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from(["perceiver", "-vv", "--bypass-cache", "--config", "p.toml", "report.pdf"]);
        assert_eq!(cli.source, "report.pdf");
        assert!(cli.bypass_cache);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("p.toml")));
        assert!(!cli.log_json);
    }

    #[test]
    fn test_source_required() {
        assert!(Cli::try_parse_from(["perceiver"]).is_err());
    }

    #[test]
    fn test_level() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(9), "trace");
    }

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::from(Error::UnrecognizedSource("???".into()));
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::from(Error::ConfigurationMissing { field: "x".into(), hint: "y".into() })
            .context("while extracting");
        assert_eq!(exit_code(&err), 3);

        let err = anyhow::Error::from(Error::extraction("web", "boom"));
        assert_eq!(exit_code(&err), 1);

        assert_eq!(exit_code(&anyhow::anyhow!("other")), 1);
    }

    #[tokio::test]
    async fn test_run_missing_config_file() {
        let cli = Cli::parse_from(["perceiver", "--config", "/nonexistent/perceiver.toml", "notes.txt"]);
        let err = run(&cli).await.unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[tokio::test]
    async fn test_run_unrecognized_source() {
        let cli = Cli::parse_from(["perceiver", "???"]);
        let err = run(&cli).await.unwrap_err();
        assert_eq!(exit_code(&err), 2);
    }
}
