//! Interval collapse command line tool
//!
//! Reads JSON Lines rows, collapses them and writes JSON Lines rows.
//!
//! # CLI Commands
//!
//! - `run` - Collapse rows (default if no command specified)
//! - `check-config` - Validate configuration and print the effective settings
//!
//! # Configuration
//!
//! The tool reads configuration from:
//! 1. `--config <path>`
//! 2. `COLLAPSE_CONFIG` environment variable (path to TOML file)
//! 3. `./collapse.toml` in current directory
//! 4. Default configuration
//!
//! `COLLAPSE_*` environment variables override the file, and command line
//! flags override both.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use interval_collapse::table::{collapse_rows, read_json_lines, write_json_lines};
use interval_collapse::{Config, Dimension};
use tracing::{debug, info};

const DEFAULT_CONFIG_FILE: &str = "collapse.toml";

#[derive(Parser)]
#[command(name = "collapse", version, about = "Collapse grouped time intervals")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (overrides COLLAPSE_CONFIG env var)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Grouping field; repeat for composite keys
    #[arg(short, long = "group", global = true)]
    groups: Vec<String>,

    /// Gap tolerance, in days for `date` and seconds for `timestamp`
    #[arg(long, global = true, allow_negative_numbers = true)]
    max_gap: Option<i64>,

    /// Time granularity: date or timestamp
    #[arg(short, long, global = true)]
    dimension: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Collapse JSON Lines rows (default)
    Run {
        /// Input file; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print run statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Validate configuration without processing any rows
    CheckConfig,
}

/// Resolve the configuration file, environment and CLI overrides
fn load_config(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os("COLLAPSE_CONFIG").map(PathBuf::from))
        .or_else(|| {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            local.exists().then(|| local.to_path_buf())
        });

    let mut config = match &path {
        Some(path) => Config::from_file_with_env(path)?,
        None => Config::from_env()?,
    };

    if !cli.groups.is_empty() {
        config.collapse.groups = cli.groups.clone();
    }
    if let Some(max_gap) = cli.max_gap {
        config.collapse.max_gap = max_gap;
    }
    if let Some(dimension) = &cli.dimension {
        config.collapse.dimension = dimension.parse::<Dimension>()?;
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.log_level));

    // stdout carries output rows
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Validate configuration and print summary
fn cmd_check_config(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let collapse = &config.collapse;

    println!("Configuration is valid!");
    println!();
    println!("Collapse Settings:");
    if collapse.groups.is_empty() {
        println!("  Groups: (none, all rows form one group)");
    } else {
        println!("  Groups: {}", collapse.groups.join(", "));
    }
    println!("  Dimension: {}", collapse.dimension);
    println!("  Max gap: {} {}", collapse.max_gap, collapse.dimension.unit());
    println!("  Range fields: {} .. {}", collapse.start_field, collapse.end_field);
    println!();
    println!("Parallel Settings:");
    println!("  Enabled: {}", config.parallel.enabled);
    println!("  Threshold: {} rows", config.parallel.parallel_threshold);
    println!();
    println!("Logging:");
    println!("  Level: {}", config.logging.log_level);

    Ok(())
}

/// Collapse rows from input to output
fn cmd_run(
    config: &Config,
    input: Option<&Path>,
    output: Option<&Path>,
    show_stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = match input {
        Some(path) => read_json_lines(BufReader::new(File::open(path)?))?,
        None => read_json_lines(io::stdin().lock())?,
    };

    let collapsed = collapse_rows(&rows, &config.collapse, &config.parallel)?;

    match output {
        Some(path) => write_json_lines(BufWriter::new(File::create(path)?), &collapsed.rows)?,
        None => write_json_lines(BufWriter::new(io::stdout().lock()), &collapsed.rows)?,
    }

    info!(
        input_rows = collapsed.stats.input_records,
        output_rows = collapsed.stats.segments,
        groups = collapsed.stats.groups,
        "Collapse complete"
    );

    if show_stats {
        eprintln!("{}", serde_json::to_string_pretty(&collapsed.stats)?);
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    init_tracing(&config);
    debug!(
        "Configuration: groups={:?}, max_gap={}, dimension={}",
        config.collapse.groups, config.collapse.max_gap, config.collapse.dimension
    );

    match &cli.command {
        Some(Commands::CheckConfig) => cmd_check_config(&config),
        Some(Commands::Run {
            input,
            output,
            stats,
        }) => cmd_run(&config, input.as_deref(), output.as_deref(), *stats),
        None => cmd_run(&config, None, None, false),
    }
}
