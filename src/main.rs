mod repl;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use primitive_db::config::{Config, OutputFormat};
use repl::{LineOutcome, Repl};

/// Flat-file record store with an interactive shell
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the catalog and row files
    #[arg(value_name = "DATA DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file (defaults to ./primitive_db.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run a single command and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum)]
    output: Option<OutputFormatArg>,

    /// Answer yes to confirmation prompts
    #[arg(short = 'y', long)]
    yes: bool,

    /// Print how long each command took
    #[arg(short = 't', long)]
    timing: bool,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress the banner
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Table,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Table => OutputFormat::Table,
            OutputFormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    info!(data_dir = %config.data_dir.display(), "starting");

    let mut repl = Repl::new(&config, args.yes)?;
    if let Some(command) = &args.command {
        return Ok(match repl.process_line(command) {
            LineOutcome::Failed => ExitCode::FAILURE,
            LineOutcome::Done | LineOutcome::Exit => ExitCode::SUCCESS,
        });
    }
    if !args.quiet {
        repl.print_banner();
    }
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("primitive_db=debug")
        } else {
            EnvFilter::new("primitive_db=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default()?,
    };

    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(output) = args.output {
        config.output_format = output.into();
    }
    config.timing |= args.timing;

    Ok(config)
}
