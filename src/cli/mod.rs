// CLI module for oxid3
//
// Everything that touches files, stdin and stdout lives here; the library
// itself only sees byte slices.

pub mod commands;
pub mod config;
pub mod output;

pub use config::{Commands, Config};

// Error type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("File not found: {0}")]
    FileNotFound(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error(transparent)]
    Tag(#[from] oxid3::Id3Error),
    #[error("Error: {0}")]
    Other(String),
}
