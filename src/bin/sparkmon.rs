//! sparkmon - live terminal sparklines for JSON metrics endpoints.
//!
//! Usage:
//!   sparkmon run --url http://localhost:8080/debug/vars memstats.HeapAlloc
//!   sparkmon run --url http://host/debug/vars 'rate:memstats.NumGC+marker:gc.running'
//!   sparkmon run --config dashboard.json -v --log-file sparkmon.log
//!   producer | sparkmon run heap conns        # one JSON document per line

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::OpenOptions;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use sparkmon::config::{Config, ConfigError, DEFAULT_REFRESH, STDIN_SOURCE, positive_duration};
use sparkmon::tui::App;

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 1;
/// Exit code for runtime failures (terminal unavailable).
const EXIT_RUNTIME: u8 = 2;

/// Bounds for the number of samples kept per series.
const MIN_STEPS: usize = 16;
const MAX_STEPS: usize = 4096;

/// Live terminal sparklines for JSON metrics endpoints.
#[derive(Parser)]
#[command(name = "sparkmon", about = "Live terminal sparklines for JSON metrics", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll endpoints and draw the dashboard.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON config file with endpoints and metrics.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seconds between redraws.
    #[arg(short, long, value_name = "SECS", default_value_t = DEFAULT_REFRESH.as_secs_f64())]
    refresh: f64,

    /// Poll interval in seconds, overriding the config file.
    #[arg(short, long, value_name = "SECS")]
    interval: Option<f64>,

    /// Samples kept per series (default: terminal width).
    #[arg(short, long, value_name = "N")]
    steps: Option<usize>,

    /// Source for FIELD arguments: an http(s) URL or `-` for stdin.
    #[arg(short, long, value_name = "URL", default_value = STDIN_SOURCE)]
    url: String,

    /// Request timeout in seconds, overriding the config file.
    #[arg(short, long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Write logs to this file (logs are discarded otherwise).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Fields to plot. `a+b` shares a panel; prefixes `counter:`, `rate:`
    /// and `marker:` (comma-combinable) change how a field is drawn.
    #[arg(value_name = "FIELD")]
    fields: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> ExitCode {
    if let Err(e) = init_logging(args.verbose, args.quiet, args.log_file.as_ref()) {
        eprintln!("Error: cannot open log file: {}", e);
        return ExitCode::from(EXIT_CONFIG);
    }

    let (config, refresh) = match load_config(&args)
        .and_then(|config| Ok((config, positive_duration("refresh", args.refresh)?)))
    {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let capacity = match args.steps {
        Some(0) => {
            eprintln!("Error: --steps must be at least 1");
            return ExitCode::from(EXIT_CONFIG);
        }
        Some(steps) => steps.min(MAX_STEPS),
        None => default_steps(),
    };

    info!(
        endpoints = config.endpoints.len(),
        series = config.series_ids().count(),
        capacity,
        refresh_ms = refresh.as_millis() as u64,
        "starting dashboard"
    );

    match App::new(config, capacity, refresh).run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "dashboard failed");
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_RUNTIME)
        }
    }
}

/// Config file endpoints first, then the FIELD arguments; flags override both.
fn load_config(args: &RunArgs) -> Result<Config, ConfigError> {
    let from_file = args.config.as_ref().map(Config::load).transpose()?;
    let from_fields = if args.fields.is_empty() {
        None
    } else {
        Some(Config::from_fields(&args.url, &args.fields)?)
    };

    let mut config = match (from_file, from_fields) {
        (Some(file), Some(fields)) => file.merge(fields)?,
        (Some(config), None) | (None, Some(config)) => config,
        (None, None) => return Err(ConfigError::NoEndpoints),
    };
    config.apply_overrides(args.interval, args.timeout)?;
    config.check_stdin(std::io::stdin().is_terminal())?;
    Ok(config)
}

/// One sample per terminal column, within sane bounds.
fn default_steps() -> usize {
    match crossterm::terminal::size() {
        Ok((width, _)) => usize::from(width).clamp(MIN_STEPS, MAX_STEPS),
        Err(_) => 100,
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// The dashboard owns the terminal, so logs only go to `log_file`.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&PathBuf>) -> std::io::Result<()> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("sparkmon={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}
