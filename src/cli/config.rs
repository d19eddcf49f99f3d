// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Oxid3 - ID3v2 tag inspection tool
#[derive(Parser, Debug)]
#[command(name = "oxid3")]
#[command(about = "Inspect the structure of ID3v2 tags", long_about = None)]
#[command(version)]
#[command(author = "xwsjjctz <xwsjjctz@icloud.com>")]
pub struct Config {
    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging, repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    #[default]
    Pretty,
    /// JSON
    Json,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tag header, flags and frames
    Inspect {
        /// Input file (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Leave unsynchronised payloads as stored
        #[arg(long)]
        raw: bool,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<usize>,
    },

    /// Print the offset of the first valid tag header
    Locate {
        /// Input file (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Look up a frame's options in a JSON frame options table
    Options {
        /// Specification table (`{"v2": {..}, "v3": {..}}`)
        #[arg(short, long)]
        table: PathBuf,

        /// Frame field name
        name: String,

        /// Major version of the tag (2, 3 or 4)
        #[arg(long, default_value_t = 4)]
        major: u8,
    },
}

impl Config {
    /// Log level for `--verbose`/`--quiet`
    pub fn log_level(&self) -> log::LevelFilter {
        match (self.quiet, self.verbose) {
            (true, _) => log::LevelFilter::Error,
            (false, 0) => log::LevelFilter::Warn,
            (false, 1) => log::LevelFilter::Debug,
            (false, _) => log::LevelFilter::Trace,
        }
    }
}
