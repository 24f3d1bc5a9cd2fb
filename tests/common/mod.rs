//! Shared test doubles for the audit loop tests.

#![allow(dead_code)]

use linguarr::arr::{
    CatalogClient, CatalogError, CatalogResult, ItemKind, MediaItem, QualityName,
    ReleaseCandidate, ReleaseQuality,
};
use linguarr::cache::CacheSet;
use linguarr::probe::{AudioStream, Inspector, ProbeError, StreamInventory, SubtitleStream};
use linguarr::remediate::{PromptAction, PromptContext, ReleasePrompt};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Builders
// ============================================================================

pub fn inventory(audio_langs: &[&str], sub_langs: &[&str]) -> StreamInventory {
    StreamInventory {
        audio_streams: audio_langs
            .iter()
            .map(|lang| AudioStream {
                language: if lang.is_empty() {
                    None
                } else {
                    Some(lang.to_string())
                },
                codec: "aac".to_string(),
            })
            .collect(),
        subtitle_streams: sub_langs
            .iter()
            .map(|lang| SubtitleStream {
                language: if lang.is_empty() {
                    None
                } else {
                    Some(lang.to_string())
                },
                codec: "subrip".to_string(),
            })
            .collect(),
    }
}

pub fn movie(id: i64, title: &str, path: &str, size: u64) -> MediaItem {
    MediaItem {
        kind: ItemKind::Movie,
        title: title.to_string(),
        file_id: id * 10,
        search_ids: vec![id],
        release_id: id,
        path: PathBuf::from(path),
        size,
        date_added: Some("2024-01-01T00:00:00Z".to_string()),
        quality_profile_id: Some(1),
    }
}

pub fn release(title: &str, quality: &str, size_gib: u64) -> ReleaseCandidate {
    ReleaseCandidate {
        guid: format!("guid-{}", title),
        indexer_id: 7,
        indexer: Some("test-indexer".to_string()),
        title: title.to_string(),
        size: size_gib * 1024 * 1024 * 1024,
        quality: Some(ReleaseQuality {
            quality: Some(QualityName {
                name: Some(quality.to_string()),
            }),
        }),
    }
}

pub fn open_caches(dir: &Path) -> Arc<CacheSet> {
    Arc::new(CacheSet::open(dir))
}

// ============================================================================
// MockCatalog
// ============================================================================

/// How a mocked catalog call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Auth,
    Server,
}

fn failure_error(kind: Failure, call: &'static str) -> CatalogError {
    match kind {
        Failure::Auth => CatalogError::Unauthorized {
            service: "mock".to_string(),
        },
        Failure::Server => CatalogError::Status {
            service: "mock".to_string(),
            method: "POST",
            path: call.to_string(),
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_string(),
        },
    }
}

/// In-memory catalog with call counters, standing in for a Sonarr/Radarr
/// instance in audit loop tests.
#[derive(Default)]
pub struct MockCatalog {
    pub items: Vec<MediaItem>,
    pub releases: Vec<ReleaseCandidate>,

    pub fail_list: Option<Failure>,
    pub fail_delete: Option<Failure>,
    pub fail_search: Option<Failure>,
    pub fail_releases: Option<Failure>,
    pub fail_download: Option<Failure>,

    pub deletes: AtomicUsize,
    pub searches: AtomicUsize,
    pub release_lists: AtomicUsize,
    pub downloads: AtomicUsize,
    /// Titles of items whose file was deleted, in call order.
    pub deleted_titles: Mutex<Vec<String>>,
    /// Guids of releases grabbed, in call order.
    pub downloaded_guids: Mutex<Vec<String>>,
}

impl MockCatalog {
    pub fn with_items(items: Vec<MediaItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    pub fn mutating_calls(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
            + self.searches.load(Ordering::SeqCst)
            + self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CatalogClient for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        Ok(true)
    }

    async fn list_items(&self) -> CatalogResult<Vec<MediaItem>> {
        if let Some(kind) = self.fail_list {
            return Err(failure_error(kind, "/movie"));
        }
        Ok(self.items.clone())
    }

    async fn delete_file(&self, item: &MediaItem) -> CatalogResult<()> {
        if let Some(kind) = self.fail_delete {
            return Err(failure_error(kind, "/moviefile"));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.deleted_titles.lock().push(item.title.clone());
        Ok(())
    }

    async fn trigger_search(&self, _item: &MediaItem) -> CatalogResult<()> {
        if let Some(kind) = self.fail_search {
            return Err(failure_error(kind, "/command"));
        }
        self.searches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list_releases(&self, _item: &MediaItem) -> CatalogResult<Vec<ReleaseCandidate>> {
        if let Some(kind) = self.fail_releases {
            return Err(failure_error(kind, "/release"));
        }
        self.release_lists.fetch_add(1, Ordering::SeqCst);
        Ok(self.releases.clone())
    }

    async fn download_release(
        &self,
        _item: &MediaItem,
        release: &ReleaseCandidate,
    ) -> CatalogResult<()> {
        if let Some(kind) = self.fail_download {
            return Err(failure_error(kind, "/release"));
        }
        self.downloads.fetch_add(1, Ordering::SeqCst);
        self.downloaded_guids.lock().push(release.guid.clone());
        Ok(())
    }
}

/// Hands the auditor a boxed view of a catalog the test keeps a handle to.
pub struct SharedCatalog(pub Arc<MockCatalog>);

pub fn boxed(catalog: &Arc<MockCatalog>) -> Box<dyn CatalogClient> {
    Box::new(SharedCatalog(catalog.clone()))
}

#[async_trait::async_trait]
impl CatalogClient for SharedCatalog {
    fn name(&self) -> &str {
        self.0.name()
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        self.0.test_connection().await
    }

    async fn list_items(&self) -> CatalogResult<Vec<MediaItem>> {
        self.0.list_items().await
    }

    async fn delete_file(&self, item: &MediaItem) -> CatalogResult<()> {
        self.0.delete_file(item).await
    }

    async fn trigger_search(&self, item: &MediaItem) -> CatalogResult<()> {
        self.0.trigger_search(item).await
    }

    async fn list_releases(&self, item: &MediaItem) -> CatalogResult<Vec<ReleaseCandidate>> {
        self.0.list_releases(item).await
    }

    async fn download_release(
        &self,
        item: &MediaItem,
        release: &ReleaseCandidate,
    ) -> CatalogResult<()> {
        self.0.download_release(item, release).await
    }
}

// ============================================================================
// FakeInspector
// ============================================================================

/// Scripted inspector: fixed inventories per path, optional per-path failures,
/// and a call counter to assert cache hits.
#[derive(Default)]
pub struct FakeInspector {
    inventories: HashMap<PathBuf, StreamInventory>,
    failing: HashSet<PathBuf>,
    pub calls: AtomicUsize,
}

impl FakeInspector {
    pub fn with_inventory(mut self, path: &str, inventory: StreamInventory) -> Self {
        self.inventories.insert(PathBuf::from(path), inventory);
        self
    }

    pub fn with_failure(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    pub fn probe_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Inspector for FakeInspector {
    async fn inspect(&self, path: &Path) -> Result<StreamInventory, ProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.contains(path) {
            return Err(ProbeError::tool_failed("ffprobe", "Invalid data found"));
        }

        self.inventories
            .get(path)
            .cloned()
            .ok_or_else(|| ProbeError::file_not_found(path))
    }
}

// ============================================================================
// ScriptedPrompt
// ============================================================================

/// Replays a fixed sequence of operator decisions. Runs out of script ->
/// cancels, so a test never hangs on an unexpected extra prompt.
#[derive(Default)]
pub struct ScriptedPrompt {
    actions: Mutex<VecDeque<PromptAction>>,
    pub prompts: AtomicUsize,
}

impl ScriptedPrompt {
    pub fn new(actions: Vec<PromptAction>) -> Self {
        Self {
            actions: Mutex::new(actions.into()),
            prompts: AtomicUsize::new(0),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReleasePrompt for ScriptedPrompt {
    async fn choose(&self, _ctx: &PromptContext<'_>) -> anyhow::Result<PromptAction> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .actions
            .lock()
            .pop_front()
            .unwrap_or(PromptAction::Cancel))
    }
}
