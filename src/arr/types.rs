use serde::Deserialize;
use std::path::PathBuf;

/// What a media item is in its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Episode,
    Movie,
}

impl ItemKind {
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Episode => "episode",
            ItemKind::Movie => "movie",
        }
    }
}

/// A monitored item with a downloaded file, as listed by a catalog.
/// Read-only to the audit loop.
#[derive(Debug, Clone)]
pub struct MediaItem {
    pub kind: ItemKind,
    /// Display title ("Series - file.mkv" or the movie title).
    pub title: String,
    /// Catalog id of the file record (episodefile/moviefile id).
    pub file_id: i64,
    /// Ids to hand to the catalog's search command: episode ids for Sonarr,
    /// the movie id for Radarr.
    pub search_ids: Vec<i64>,
    /// Id used for release queries: first episode id or the movie id.
    pub release_id: i64,
    pub path: PathBuf,
    pub size: u64,
    /// Catalog's import stamp; part of the fingerprint so a replaced file
    /// is never served stale cache data.
    pub date_added: Option<String>,
    pub quality_profile_id: Option<i64>,
}

impl MediaItem {
    /// Identity of the file contents. Human-readable on purpose so the JSON
    /// stores stay hand-editable.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}|{}|{}",
            self.path.display(),
            self.size,
            self.date_added.as_deref().unwrap_or("-")
        )
    }

    /// Item-level identity for skip decisions; survives file replacement.
    pub fn skip_key(&self) -> String {
        format!("{}:{}", self.kind.label(), self.release_id)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// A candidate replacement release. Fetched fresh per remediation attempt,
/// never cached.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseCandidate {
    pub guid: String,
    pub indexer_id: i64,
    #[serde(default)]
    pub indexer: Option<String>,
    pub title: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub quality: Option<ReleaseQuality>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseQuality {
    #[serde(default)]
    pub quality: Option<QualityName>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualityName {
    #[serde(default)]
    pub name: Option<String>,
}

impl ReleaseCandidate {
    pub fn quality_label(&self) -> &str {
        self.quality
            .as_ref()
            .and_then(|q| q.quality.as_ref())
            .and_then(|q| q.name.as_deref())
            .unwrap_or("Unknown")
    }

    pub fn size_gib(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0 * 1024.0)
    }
}

// ============================================================================
// Sonarr wire types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrSeries {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub quality_profile_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisodeFile {
    pub id: i64,
    pub path: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub date_added: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SonarrEpisode {
    pub id: i64,
    #[serde(default)]
    pub episode_file_id: Option<i64>,
}

// ============================================================================
// Radarr wire types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub has_file: bool,
    #[serde(default)]
    pub quality_profile_id: Option<i64>,
    #[serde(default)]
    pub movie_file: Option<RadarrMovieFile>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarrMovieFile {
    pub id: i64,
    pub path: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub date_added: Option<String>,
}
