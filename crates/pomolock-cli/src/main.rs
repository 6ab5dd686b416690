use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "pomolock-cli",
    version,
    about = "Pomolock CLI - focus, take a break, lock the screen",
    after_help = "Examples:\n  pomolock-cli             # 25 minute countdown, then lock\n  pomolock-cli -t 45       # 45 minute countdown\n  pomolock-cli cycle       # full work/break cycle\n  pomolock-cli config list"
)]
struct Cli {
    /// Countdown length in minutes (1-180), used when no subcommand is given
    #[arg(
        short = 't',
        long = "time",
        default_value_t = commands::countdown::DEFAULT_MINUTES,
        allow_negative_numbers = true
    )]
    time: i64,

    /// Config file to use instead of ~/.config/pomolock/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full work/break cycle in the console
    Cycle(commands::cycle::CycleArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        None => commands::countdown::run(cli.time),
        Some(Commands::Cycle(args)) => commands::cycle::run(args, config_path),
        Some(Commands::Config { action }) => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
