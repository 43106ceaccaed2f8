use std::path::PathBuf;

/// Conditions that abort an import run.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read source document '{path}': {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed source document '{path}': {message}")]
    SourceMalformed { path: PathBuf, message: String },

    #[error("Failed to load system codes '{path}': {message}")]
    SystemCodes { path: PathBuf, message: String },

    #[error("Unknown system abbreviation '{abbr}' in client no.{sequence_id}")]
    UnknownSystem { abbr: String, sequence_id: String },

    #[error("Failed to read resume file '{path}': {source}")]
    ResumeUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open ledger file '{path}': {source}")]
    LedgerUnopenable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration in '{path}': {message}")]
    Invalid { path: String, message: String },
}

/// Why a single property could not be extracted from a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("no such property '{0}'")]
    Missing(String),

    #[error("property '{0}' has no value")]
    NoValue(String),
}

/// Failure of one call against a downstream sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("HTTP Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Key-value store error: {0}")]
    Store(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SoapError {
    #[error("SOAP transport error: {0}")]
    Transport(String),

    #[error("SOAP HTTP Error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("SOAP fault: {0}")]
    Fault(String),

    #[error("Malformed SOAP response: {0}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    #[error("Queue error: {0}")]
    Queue(String),
}

impl From<amiquip::Error> for WorkerError {
    fn from(err: amiquip::Error) -> Self {
        WorkerError::Queue(err.to_string())
    }
}

impl From<reqwest::Error> for SinkError {
    fn from(err: reqwest::Error) -> Self {
        SinkError::Transport(err.to_string())
    }
}

impl From<redis::RedisError> for SinkError {
    fn from(err: redis::RedisError) -> Self {
        SinkError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for SoapError {
    fn from(err: reqwest::Error) -> Self {
        SoapError::Transport(err.to_string())
    }
}
