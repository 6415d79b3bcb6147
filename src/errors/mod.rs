//! Centralized error handling for the aggregator
//!
//! Only a failure to write the final playlists is fatal. Everything that can go
//! wrong with a single source or a single line is recovered where it happens and
//! reported through `tracing`.
//!
//! # Error Categories
//!
//! - **Source Errors**: a remote playlist could not be fetched (timeout, HTTP status, connection)
//! - **Configuration Errors**: invalid or unreadable configuration
//! - **Template Errors**: the taxonomy file could not be read or holds no categories
//! - **Output Errors**: a destination playlist could not be written
//!
//! # Usage
//!
//! ```rust
//! use m3u_aggregator::errors::{AppError, AppResult};
//!
//! fn example_function() -> AppResult<String> {
//!     Err(AppError::configuration("fetch.max_concurrent must be at least 1"))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;
