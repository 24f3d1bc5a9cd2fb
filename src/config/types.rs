use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalogs: Vec<CatalogConfig>,

    #[serde(default)]
    pub settings: Settings,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// One Sonarr or Radarr instance to audit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: CatalogKind,

    pub url: String,

    pub api_key: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Username for HTTP basic auth in front of the instance, if any.
    #[serde(default)]
    pub http_basic_auth_username: Option<String>,

    #[serde(default)]
    pub http_basic_auth_password: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Sonarr,
    Radarr,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Report what would happen without deleting or downloading anything.
    #[serde(default)]
    pub dry_run: bool,

    /// Prompt for a replacement release instead of auto-searching.
    #[serde(default)]
    pub interactive: bool,

    /// Require an audio stream in one of the configured languages.
    #[serde(default = "default_true")]
    pub require_audio: bool,

    /// Require a subtitle stream in one of the configured languages.
    #[serde(default = "default_true")]
    pub require_subs: bool,

    /// Language tags that satisfy the requirement, matched case-insensitively.
    #[serde(default = "default_language_codes")]
    pub language_codes: Vec<String>,

    /// Presentation-only: log files missing subtitles for this label.
    /// All codes from `language_codes` count as a match. Never affects
    /// the pass/fail verdict.
    #[serde(default)]
    pub highlight_missing_subs: Option<String>,

    /// How many files to inspect concurrently.
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,

    /// How many automatic remediations to run concurrently.
    #[serde(default = "default_remediation_concurrency")]
    pub remediation_concurrency: usize,

    /// Per-call timeout for catalog API requests.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,

    /// Per-file timeout for ffprobe.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_language_codes() -> Vec<String> {
    vec!["eng".to_string(), "en".to_string(), "english".to_string()]
}

fn default_probe_concurrency() -> usize {
    4
}

fn default_remediation_concurrency() -> usize {
    2
}

fn default_api_timeout() -> u64 {
    300
}

fn default_probe_timeout() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dry_run: false,
            interactive: false,
            require_audio: true,
            require_subs: true,
            language_codes: default_language_codes(),
            highlight_missing_subs: None,
            probe_concurrency: default_probe_concurrency(),
            remediation_concurrency: default_remediation_concurrency(),
            api_timeout_secs: default_api_timeout(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

impl Settings {
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Directory holding the three JSON stores. Tilde-expanded.
    #[serde(default)]
    pub dir: Option<String>,
}

impl CacheConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        let raw = self.dir.as_deref().unwrap_or("~/.local/share/linguarr");
        PathBuf::from(shellexpand::tilde(raw).as_ref())
    }
}
