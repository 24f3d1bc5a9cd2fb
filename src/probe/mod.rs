//! Inspection seam over the ffprobe wrapper crate.
//!
//! The audit loop talks to [`Inspector`] so tests can substitute a scripted
//! implementation; [`FfprobeInspector`] is the production one.

pub use linguarr_probe::{AudioStream, Error as ProbeError, StreamInventory, SubtitleStream};

use std::path::{Path, PathBuf};
use std::time::Duration;

/// The "Prober" collaborator: turn a file path into a stream inventory.
#[async_trait::async_trait]
pub trait Inspector: Send + Sync {
    async fn inspect(&self, path: &Path) -> Result<StreamInventory, ProbeError>;
}

/// ffprobe-backed inspector with a per-file timeout.
pub struct FfprobeInspector {
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FfprobeInspector {
    /// Resolve ffprobe (configured path, PATH, well-known locations) and
    /// build an inspector.
    pub fn locate(configured: Option<&Path>, timeout: Duration) -> Result<Self, ProbeError> {
        let ffprobe = linguarr_probe::find_ffprobe(configured)?;
        tracing::debug!("Using ffprobe at {}", ffprobe.display());
        Ok(Self { ffprobe, timeout })
    }
}

#[async_trait::async_trait]
impl Inspector for FfprobeInspector {
    async fn inspect(&self, path: &Path) -> Result<StreamInventory, ProbeError> {
        linguarr_probe::probe_streams(&self.ffprobe, path, self.timeout).await
    }
}
