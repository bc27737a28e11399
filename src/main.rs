use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use rumble_client::config::{ConfigResolver, ConfigSource, ResolvedConfig, RunConfig, RunFlags};
use rumble_client::orchestrator::{game_identifier, Orchestrator, OrchestratorOptions};
use rumble_client::phases::CommandCollaborators;

/// Run the rumble client: fetch participants, run trials, upload results.
#[derive(Parser)]
#[command(name = "rumble", about = "Client-side driver for a distributed competition rumble")]
struct Cli {
    /// Configuration file; defaults to $PARAMS, then ./roborumble/roborumble.txt
    config: Option<PathBuf>,

    /// Stop after this many iterations even when ITERATE=YES
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    max_iterations: Option<u64>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    show_config: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ConfigReport<'a> {
    path: &'a std::path::Path,
    game: String,
    flags: RunFlags,
    config: &'a RunConfig,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let resolved = ConfigResolver::new()
        .resolve(cli.config.as_deref())
        .context("loading configuration")?;

    if cli.show_config {
        println!("{}", render_config(&resolved)?);
        return Ok(());
    }

    if resolved.source == ConfigSource::Default {
        println!(
            "No argument found specifying properties file. \"{}\" assumed.",
            resolved.path.display()
        );
    }

    let collaborators = CommandCollaborators::new(&resolved.path);
    let mut orchestrator = Orchestrator::new(resolved, collaborators).options(OrchestratorOptions {
        max_iterations: cli.max_iterations,
        ..Default::default()
    });

    let iterations = orchestrator.run().context("rumble iteration failed")?;
    tracing::info!(iterations, "rumble client finished");
    Ok(())
}

/// The `--show-config` document. It is the only thing written to stdout in
/// that mode.
fn render_config(resolved: &ResolvedConfig) -> Result<String> {
    let report = ConfigReport {
        path: &resolved.path,
        game: game_identifier(&resolved.path),
        flags: RunFlags::from_config(&resolved.config),
        config: &resolved.config,
    };
    serde_json::to_string_pretty(&report).context("serializing configuration")
}

/// Diagnostics go to stderr so stdout carries only progress lines.
/// `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(source: ConfigSource) -> ResolvedConfig {
        ResolvedConfig {
            config: [("DOWNLOAD", "YES"), ("RUNONLY", "SERVER"), ("USER", "P\u{e9}rez")]
                .into_iter()
                .collect(),
            path: PathBuf::from("/srv/roborumble/meleerumble.txt"),
            source,
        }
    }

    #[test]
    fn test_show_config_output_is_json_only() {
        let text = render_config(&resolved(ConfigSource::Default)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["game"], "meleerumble");
        assert_eq!(value["path"], "/srv/roborumble/meleerumble.txt");
        assert_eq!(value["config"]["USER"], "P\u{e9}rez");
        assert_eq!(value["flags"]["download"], true);
        assert!(!text.contains("No argument found"));
    }

    #[test]
    fn test_max_iterations_rejects_zero() {
        assert!(Cli::try_parse_from(["rumble", "--max-iterations", "0"]).is_err());
        let cli = Cli::try_parse_from(["rumble", "--max-iterations", "3"]).unwrap();
        assert_eq!(cli.max_iterations, Some(3));
    }
}
