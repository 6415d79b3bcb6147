//! Aggregates live-TV channel listings from many M3U and TXT playlists into
//! one curated playlist pair, ordered and named by a taxonomy template.

pub mod config;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod pipeline;
pub mod proxy;
pub mod sources;
pub mod utils;
