use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Source directory {}: {reason}", path.display())]
    SourceDirectory { path: PathBuf, reason: String },

    #[error("No free name for '{name}' in {} after {attempts} attempts", directory.display())]
    CollisionExhausted {
        directory: PathBuf,
        name: String,
        attempts: u32,
    },

    #[error("Failed to transfer {} to {}: {source}", from.display(), to.display())]
    Transfer {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata error: {0}")]
    Metadata(String),
}
