//! Error types for sqldump

use thiserror::Error;

/// Core error type for sqldump operations
#[derive(Error, Debug)]
pub enum SqlDumpError {
    /// The connection could not be established or authenticated
    #[error("Connection error: {0}")]
    Connection(String),

    /// A catalog or data query failed on the server
    #[error("Query error: [SQL {code}] {message}")]
    Query { code: u16, message: String },

    /// Option or connection settings could not be loaded
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The dump destination is missing, not writable, or the write failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SqlDumpError {
    /// Build a query error from a server error code and message
    pub fn query(code: u16, message: impl Into<String>) -> Self {
        Self::Query {
            code,
            message: message.into(),
        }
    }

    /// Server error code for query failures, `None` for every other kind
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Query { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Result type alias for sqldump operations
pub type Result<T> = std::result::Result<T, SqlDumpError>;
