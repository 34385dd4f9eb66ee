use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a BPMN document into process graphs.
#[derive(Error, Debug)]
pub enum ProcessParseError {
    #[error("Malformed BPMN XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("BPMN document ended before element '{0}' was closed")]
    UnexpectedEof(String),

    #[error("BPMN document contains no <process> element")]
    NoProcess,

    #[error("Could not read BPMN file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while loading the API contract document.
#[derive(Error, Debug)]
pub enum ContractError {
    #[error("Could not read contract file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse contract JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while serializing or writing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Could not write report to '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while loading an analyzer configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration value for '{field}': {message}")]
    Invalid { field: String, message: String },
}

/// Errors that can occur while discovering input files for a batch run.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Input path '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("Failed to walk directory '{path}': {message}")]
    Walk { path: PathBuf, message: String },
}
