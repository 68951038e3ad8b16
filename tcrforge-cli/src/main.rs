//! # tcrforge CLI
//!
//! Runs one CDR3 design pass from a YAML configuration file.
//!
//! ## Usage
//!
//! ```bash
//! # Full run with the settings in config.yaml
//! tcrforge --config config.yaml
//!
//! # Reproducible local run into a scratch directory
//! tcrforge -c config.yaml --seed 42 --results-dir /tmp/run1
//!
//! # Only warnings and errors
//! tcrforge -c config.yaml -q
//! ```
//!
//! ## Options
//!
//! - `-c, --config <FILE>`: YAML configuration (required)
//! - `-o, --results-dir <DIR>`: Output directory (overrides `run.results_dir`)
//! - `-s, --seed <N>`: Random seed (overrides `run.random_seed`)
//! - `-t, --threads <N>`: Worker threads (overrides `run.num_threads`)
//! - `-q, --quiet`: Only log warnings and errors
//!
//! Live generation is enabled by exporting the API key named in
//! `generation.api_key_env` (default `NVIDIA_API_KEY`). Log verbosity can be
//! set with `RUST_LOG`.

use std::path::PathBuf;

use clap::{Arg, ArgAction, Command, value_parser};
use tcrforge_core::Pipeline;
use tcrforge_core::config::PipelineConfig;
use tcrforge_core::constants::VERSION;
use tcrforge_core::results::TerminalState;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("tcrforge")
        .version(VERSION)
        .about("Generate, filter and rank TCR CDR3 candidates")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("YAML run configuration"),
        )
        .arg(
            Arg::new("results-dir")
                .short('o')
                .long("results-dir")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .help("Output directory (overrides run.results_dir)"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("N")
                .value_parser(value_parser!(u64))
                .help("Random seed (overrides run.random_seed)"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Worker threads (overrides run.num_threads)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Only log warnings and errors"),
        )
}

fn init_logging(quiet: bool) {
    let default = if quiet {
        "warn"
    } else {
        "tcrforge=info,tcrforge_core=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Loads the configuration, applies command-line overrides and runs the
/// pipeline once.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = cli().get_matches();
    let quiet = matches.get_flag("quiet");
    init_logging(quiet);

    let Some(config_path) = matches.get_one::<PathBuf>("config") else {
        return Err("--config is required".into());
    };
    if !config_path.is_file() {
        return Err(format!("Config file not found: {}", config_path.display()).into());
    }

    let mut config = PipelineConfig::from_path(config_path)?;
    if let Some(dir) = matches.get_one::<PathBuf>("results-dir") {
        config.run.results_dir.clone_from(dir);
    }
    if let Some(seed) = matches.get_one::<u64>("seed") {
        config.run.random_seed = Some(*seed);
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.run.num_threads = Some(*threads);
    }

    let mut pipeline = Pipeline::from_config(config)?;
    let report = pipeline.run()?;

    if !quiet {
        eprintln!(
            "Run {} for {}: generated {} ({} real / {} mock), {} survived filtering.",
            report.state,
            report.target,
            report.generation.real + report.generation.mock,
            report.generation.real,
            report.generation.mock,
            report.filter.survivors
        );
        if let (TerminalState::Exported, Some(exports)) = (report.state, &report.exports) {
            eprintln!("Ranked candidates: {}", exports.candidates.display());
            eprintln!("Docking job: {}", exports.docking_job.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn test_overrides_parse() {
        let matches = cli()
            .try_get_matches_from([
                "tcrforge", "-c", "run.yaml", "--seed", "7", "-t", "2", "-o", "out", "-q",
            ])
            .unwrap();
        assert_eq!(matches.get_one::<u64>("seed"), Some(&7));
        assert_eq!(matches.get_one::<usize>("threads"), Some(&2));
        assert_eq!(
            matches.get_one::<PathBuf>("results-dir"),
            Some(&PathBuf::from("out"))
        );
        assert!(matches.get_flag("quiet"));
    }

    #[test]
    fn test_config_is_required() {
        assert!(cli().try_get_matches_from(["tcrforge"]).is_err());
    }
}
