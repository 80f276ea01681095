use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Could not connect to {url}: {source}")]
    Connection {
        url: String,
        source: diesel::ConnectionError,
    },

    #[error("Database error: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Invalid SQL identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
