//! Error types for the PostgreSQL onboarding plugin
use thiserror::Error;
use url::ParseError;

#[derive(Error, Debug)]
pub enum PluginError {
    /// a driver or query execution error, passed through as-is
    #[error("database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// the server answered, but not with the shape we asked for
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),

    #[error("invalid statement: {0}")]
    InvalidStatement(String),

    /// a planned statement failed; index is 1-based within the plan
    #[error("statement {index} failed: {source}")]
    Statement {
        index: usize,
        #[source]
        source: Box<PluginError>,
    },

    #[error("invalid dsn: {0}")]
    InvalidDsn(String),

    /// a url parsing error
    #[error("url parsing error {0}")]
    UrlError(#[from] ParseError),

    #[error("invalid flags: {0}")]
    InvalidFlags(String),
}

impl PluginError {
    /// True when the caller gave up waiting, as opposed to the database rejecting the work.
    pub fn is_timeout(&self) -> bool {
        match self {
            PluginError::Cancelled | PluginError::DeadlineExceeded => true,
            PluginError::DbError(sqlx::Error::PoolTimedOut) => true,
            PluginError::Statement { source, .. } => source.is_timeout(),
            _ => false,
        }
    }
}
