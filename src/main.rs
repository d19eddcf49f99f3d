// CLI binary entry point for oxid3
//
// This is the main entry point for the oxid3 command-line tool.

mod cli;

use anyhow::Context;
use clap::Parser;
use cli::commands::{command_inspect, command_locate, command_options};
use cli::output::OutputFormatter;
use cli::{Commands, Config};
use std::process;

fn main() {
    let config = Config::parse();

    // RUST_LOG still overrides the level picked by the flags
    env_logger::Builder::new()
        .filter_level(config.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let formatter = OutputFormatter::new(config.format, config.quiet);
    if let Err(e) = run(config, &formatter) {
        formatter.print_error(&format!("{e:#}"));
        process::exit(1);
    }
}

fn run(config: Config, formatter: &OutputFormatter) -> anyhow::Result<()> {
    match config.command {
        Commands::Inspect {
            file,
            raw,
            max_frames,
        } => {
            let name = input_name(file.as_deref());
            command_inspect(file, raw, max_frames, formatter)
                .with_context(|| format!("Failed to inspect {name}"))
        }
        Commands::Locate { file } => {
            let name = input_name(file.as_deref());
            command_locate(file, formatter).with_context(|| format!("Failed to scan {name}"))
        }
        Commands::Options { table, name, major } => {
            command_options(table, name, major, formatter)
                .context("Failed to look up frame options")
        }
    }
}

fn input_name(file: Option<&std::path::Path>) -> String {
    file.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
}
