//! ffprobe discovery.
//!
//! Looks for ffprobe on PATH first, then in the usual Windows install
//! locations (manual installs, Chocolatey, Scoop, WinGet shims).

use crate::{Error, Result};
use std::path::PathBuf;
use std::process::Command;

/// Information about the ffprobe executable.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Whether ffprobe is available.
    pub available: bool,
    /// First line of `ffprobe -version` output, if it ran.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Resolve the ffprobe executable.
///
/// A configured path wins when it exists; otherwise PATH is searched, then
/// the well-known install locations.
pub fn find_ffprobe(configured: Option<&std::path::Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        tracing::warn!(
            "configured ffprobe path does not exist, falling back to discovery: {}",
            path.display()
        );
    }

    if let Ok(path) = which::which("ffprobe") {
        return Ok(path);
    }

    for candidate in well_known_candidates() {
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(Error::tool_not_found("ffprobe"))
}

/// Check ffprobe availability and version.
pub fn check_ffprobe(configured: Option<&std::path::Path>) -> ToolInfo {
    let path = match find_ffprobe(configured) {
        Ok(p) => p,
        Err(_) => {
            return ToolInfo {
                available: false,
                version: None,
                path: None,
            }
        }
    };

    let result = Command::new(&path).arg("-version").output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            ToolInfo {
                available: true,
                version,
                path: Some(path),
            }
        }
        _ => ToolInfo {
            available: false,
            version: None,
            path: Some(path),
        },
    }
}

#[cfg(windows)]
fn well_known_candidates() -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = [
        r"C:\ffmpeg\bin",
        r"C:\Program Files\ffmpeg\bin",
        r"C:\Program Files (x86)\ffmpeg\bin",
        r"C:\tools\ffmpeg\bin",
    ]
    .iter()
    .map(|base| PathBuf::from(base).join("ffprobe.exe"))
    .collect();

    let choco = std::env::var("ChocolateyInstall")
        .unwrap_or_else(|_| r"C:\ProgramData\chocolatey".to_string());
    candidates.push(PathBuf::from(choco).join("bin").join("ffprobe.exe"));

    if let Ok(profile) = std::env::var("USERPROFILE") {
        candidates.push(
            PathBuf::from(profile)
                .join("scoop")
                .join("shims")
                .join("ffprobe.exe"),
        );
    }

    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        candidates.push(
            PathBuf::from(local)
                .join("Microsoft")
                .join("WinGet")
                .join("Links")
                .join("ffprobe.exe"),
        );
    }

    candidates
}

#[cfg(not(windows))]
fn well_known_candidates() -> Vec<PathBuf> {
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_missing_falls_back() {
        // A bogus configured path must not short-circuit discovery into an error
        // when ffprobe exists on PATH; when it doesn't, we get ToolNotFound.
        let result = find_ffprobe(Some(std::path::Path::new("/nonexistent/ffprobe")));
        if let Err(e) = result {
            assert!(matches!(e, Error::ToolNotFound { .. }));
        }
    }

    #[test]
    fn test_check_reports_unavailable_when_missing() {
        // With a directory that cannot contain ffprobe and an empty PATH-style
        // failure we at least never panic.
        let info = check_ffprobe(Some(std::path::Path::new("/nonexistent/ffprobe")));
        let _ = info.available;
    }
}
