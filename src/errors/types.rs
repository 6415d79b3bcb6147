//! Error type definitions for the aggregator
//!
//! `AppError` covers the run as a whole. `SourceError` describes why a single
//! source was unavailable; it never escapes the aggregation phase.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Taxonomy template could not be loaded
    #[error("Template error: {path}: {message}")]
    Template { path: PathBuf, message: String },

    /// A destination playlist could not be created or written
    #[error("Failed to write output {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source handling errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Run report serialization failures
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons a source is treated as unavailable
#[derive(Error, Debug)]
pub enum SourceError {
    /// Request exceeded the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// Non-success status from the remote server
    #[error("HTTP error: {status} - {url}")]
    Http { url: String, status: u16 },

    /// Connection, TLS or body read failures
    #[error("Request failed: {url} - {message}")]
    Connection { url: String, message: String },

    /// Source answered but the body was empty
    #[error("Empty response body: {url}")]
    EmptyBody { url: String },
}

impl AppError {
    /// Create a configuration error with a custom message
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a template error for the given file
    pub fn template<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Template {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an output write error for the given destination
    pub fn output_write<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}

impl SourceError {
    /// Create a timeout error
    pub fn timeout<U: Into<String>>(url: U) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Create an HTTP status error
    pub fn http<U: Into<String>>(url: U, status: u16) -> Self {
        Self::Http {
            url: url.into(),
            status,
        }
    }

    /// Create a connection error
    pub fn connection<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Map a reqwest failure onto the matching variant
    pub fn from_reqwest<U: Into<String>>(url: U, error: &reqwest::Error) -> Self {
        let url = url.into();
        if error.is_timeout() {
            Self::timeout(url)
        } else if let Some(status) = error.status() {
            Self::http(url, status.as_u16())
        } else {
            Self::connection(url, error.to_string())
        }
    }
}
