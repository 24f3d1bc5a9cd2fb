//! ffprobe-backed stream inspection for linguarr.
//!
//! This crate answers one question: which audio and subtitle languages does a
//! media file carry? It shells out to ffprobe, parses the JSON stream listing,
//! and returns a [`StreamInventory`]. All failure modes (missing tool, bad
//! file, timeout, unparseable output) surface as typed [`Error`]s so callers
//! can decide what is transient and what is fatal.

mod error;
mod ffprobe;
mod tools;
mod types;

pub use error::{Error, Result};
pub use ffprobe::probe_streams;
pub use tools::{check_ffprobe, find_ffprobe, ToolInfo};
pub use types::{AudioStream, StreamInventory, SubtitleStream};
