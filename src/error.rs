use thiserror::Error;

#[derive(Error, Debug)]
pub enum HavenError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error("Unknown bank format: {0}")]
    UnknownFormat(String),

    #[error("{0} not found: {1}")]
    NotFound(&'static str, i64),

    #[error("Invalid period (expected YYYY-MM): {0}")]
    InvalidPeriod(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, HavenError>;
