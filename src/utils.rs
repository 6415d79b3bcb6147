//! Shared helpers

pub mod url;
