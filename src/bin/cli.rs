use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scanward::artifact::history;
use scanward::config::{self, Config};
use scanward::error::ScanError;
use scanward::output::{self, OutputFormat};

#[derive(Parser)]
#[command(
    name = "scanward",
    about = "Compliance scan orchestrator for OpenSCAP",
    version,
    author
)]
struct Cli {
    /// Config file path
    #[arg(long, short = 'c', global = true, env = config::CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Output format (console, json)
    #[arg(long, short = 'f', global = true, default_value = "console")]
    format: String,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a profile and publish versioned artifacts
    Scan {
        /// Profile to evaluate (defaults to the configured profile)
        profile: Option<String>,

        /// Exit 1 when any pipeline step failed
        #[arg(long)]
        strict: bool,
    },

    /// Re-apply the most recently generated fix script
    Fix,

    /// Show the latest outcome of a single rule
    Rule {
        /// Full rule id or its short name
        rule_id: String,
    },

    /// List previous scan runs in the scan directory
    History,

    /// Generate a starter scanward.toml config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = OutputFormat::from_str_lenient(&cli.format).unwrap_or_else(|| {
        eprintln!("Warning: unknown format '{}', using console", cli.format);
        OutputFormat::Console
    });
    let config_path = config::resolve_path(cli.config);

    let result = match cli.command {
        Commands::Scan { profile, strict } => cmd_scan(&config_path, profile, strict, format),
        Commands::Fix => cmd_fix(&config_path, format),
        Commands::Rule { rule_id } => cmd_rule(&config_path, &rule_id, format),
        Commands::History => cmd_history(&config_path, format),
        Commands::Init { force } => cmd_init(&config_path, force),
    };

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn cmd_scan(
    config_path: &Path,
    profile: Option<String>,
    strict: bool,
    format: OutputFormat,
) -> Result<i32, ScanError> {
    let config = Config::load(config_path)?;
    let report = scanward::run_scan(profile.as_deref(), &config)?;
    print!("{}", output::render_scan(&report, format)?);

    // Step failures are soft unless --strict.
    Ok(if strict && !report.is_clean() { 1 } else { 0 })
}

fn cmd_fix(config_path: &Path, format: OutputFormat) -> Result<i32, ScanError> {
    let config = Config::load(config_path)?;
    let outcome = scanward::apply_latest_fix(&config)?;
    print!("{}", output::render_fix(&outcome, format)?);
    Ok(0)
}

fn cmd_rule(config_path: &Path, rule_id: &str, format: OutputFormat) -> Result<i32, ScanError> {
    let config = Config::load(config_path)?;
    let inspection = scanward::inspect_rule(rule_id, &config)?;
    print!("{}", output::render_rule(&inspection, format)?);
    Ok(0)
}

fn cmd_history(config_path: &Path, format: OutputFormat) -> Result<i32, ScanError> {
    let config = Config::load(config_path)?;
    let runs = history::list_runs(&config.scan_dir()?)?;
    print!("{}", output::render_runs(&runs, format)?);
    Ok(0)
}

fn cmd_init(path: &Path, force: bool) -> Result<i32, ScanError> {
    if path.exists() && !force {
        eprintln!("{} already exists. Use --force to overwrite.", path.display());
        return Ok(1);
    }

    std::fs::write(path, Config::starter_toml())?;
    println!("Created {}", path.display());

    Ok(0)
}
