//! FFprobe-based stream inspection.

use super::types::*;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    #[serde(default)]
    tags: FfprobeTags,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeTags {
    language: Option<String>,
}

/// List the audio and subtitle streams of a media file using ffprobe.
///
/// The call is bounded by `timeout`; a hanging probe (network mount, file
/// still being written) fails that file only, it never stalls the caller.
pub async fn probe_streams(
    ffprobe: &Path,
    path: &Path,
    timeout: Duration,
) -> Result<StreamInventory> {
    if !path.exists() {
        return Err(Error::file_not_found(path));
    }

    let run = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
        .arg(path)
        .output();

    let output = tokio::time::timeout(timeout, run)
        .await
        .map_err(|_| Error::timeout("ffprobe", timeout.as_secs()))?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found("ffprobe")
            } else {
                Error::Io(e)
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::tool_failed("ffprobe", stderr.trim().to_string()));
    }

    let json_str = String::from_utf8(output.stdout)
        .map_err(|e| Error::parse_error("ffprobe", format!("Invalid UTF-8: {}", e)))?;

    let ff_output: FfprobeOutput = serde_json::from_str(&json_str)?;

    Ok(build_inventory(ff_output))
}

fn build_inventory(output: FfprobeOutput) -> StreamInventory {
    let mut inventory = StreamInventory::default();

    for stream in output.streams {
        let language = stream.tags.language;
        let codec = stream.codec_name.unwrap_or_default();

        match stream.codec_type.as_str() {
            "audio" => inventory.audio_streams.push(AudioStream { language, codec }),
            "subtitle" => inventory
                .subtitle_streams
                .push(SubtitleStream { language, codec }),
            _ => {}
        }
    }

    inventory
}
