//! a compact hardware telemetry monitor.

use {
    clap::{Parser, Subcommand},
    log::LevelFilter,
    std::{io, time::Duration},
    vitals::{App, Config},
};

#[derive(Parser)]
#[command(name = "vitals")]
#[command(about = "vitals: cpu, memory, fans, temperatures and power at a glance")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Log more. May be repeated; RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Print one sample of every sensor and exit (the default)
    Report,

    /// Show a live dashboard. Press q to quit.
    Watch {
        /// Milliseconds between samples (at least 100)
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,

        /// Samples of history kept for each series
        #[arg(long, default_value_t = 60)]
        history: usize,
    },
}

fn main() -> Result<(), vitals::Error> {
    let Cli { command, verbose } = Cli::parse();

    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level.as_str()))
        .init();

    match command.unwrap_or(Command::Report) {
        Command::Report => App::new(Config::default()).report(&mut io::stdout().lock()),
        Command::Watch {
            interval_ms,
            history,
        } => App::new(Config::new(Duration::from_millis(interval_ms), history)).tui(),
    }
}
