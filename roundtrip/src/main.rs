//! `xes-roundtrip`: read an XES event log, write it back out and print how long both took

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use roundtrip::{run, RoundtripConfig, RoundtripMode};

/// Read an XES event log and write it back out, timing both steps
#[derive(Parser, Debug)]
#[command(name = "xes-roundtrip")]
#[command(version, about, long_about = None)]
struct Cli {
    /// XES file to read (`.xes` or `.xes.gz`)
    #[arg(
        short,
        long,
        env = "XES_ROUNDTRIP_INPUT",
        default_value = "../static/xes/book/bigger-example.xes"
    )]
    input: PathBuf,

    /// File to write (gzip-compressed if it ends in `.gz`)
    #[arg(short, long, env = "XES_ROUNDTRIP_OUTPUT", default_value = "/tmp/out.xes")]
    output: PathBuf,

    /// Stream traces from input to output instead of loading the whole log
    #[arg(long)]
    streaming: bool,

    /// Print statistics of the log
    #[arg(long)]
    stats: bool,

    /// Warn about traces and events violating the global attribute declarations
    #[arg(long)]
    validate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl From<Cli> for RoundtripConfig {
    fn from(cli: Cli) -> Self {
        RoundtripConfig {
            input: cli.input,
            output: cli.output,
            mode: if cli.streaming {
                RoundtripMode::Streaming
            } else {
                RoundtripMode::Materialized
            },
            stats: cli.stats,
            validate: cli.validate,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let config = RoundtripConfig::from(cli);
    println!("{} --> {}", config.input.display(), config.output.display());
    let report = run(&config)?;
    println!("{report}");
    if let Some(stats) = &report.stats {
        println!("{stats}");
    }
    if config.validate && report.violations > 0 {
        log::warn!("{} global attribute violations", report.violations);
    }
    Ok(())
}
