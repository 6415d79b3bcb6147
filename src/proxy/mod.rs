//! Matching, deduplication and output generation

pub mod generator;
pub mod matcher;
pub mod writer;

pub use generator::{GeneratedPlaylists, GenerationSummary, GeneratorOptions, PlaylistGenerator};
pub use matcher::{ChannelMatcher, MatchOptions};
pub use writer::{write_outputs, OutputFile};
