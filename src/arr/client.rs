use super::types::*;
use crate::config::{CatalogConfig, CatalogKind};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Per-call failures against a catalog. `Unauthorized` is the one the audit
/// loop latches on to stop hammering an instance that rejects the API key.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{service}: unauthorized (check the API key)")]
    Unauthorized { service: String },

    #[error("{service}: {method} {path} returned {status}: {message}")]
    Status {
        service: String,
        method: &'static str,
        path: String,
        status: StatusCode,
        message: String,
    },

    #[error("{service}: request to {path} failed: {source}")]
    Transport {
        service: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service}: failed to decode {path} response: {source}")]
    Decode {
        service: String,
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl CatalogError {
    pub fn is_auth(&self) -> bool {
        matches!(self, CatalogError::Unauthorized { .. })
    }
}

/// The catalog operations the audit loop needs (the "Catalog" collaborator).
#[async_trait::async_trait]
pub trait CatalogClient: Send + Sync {
    /// Configured instance name, for reporting.
    fn name(&self) -> &str;

    /// Test the connection to the catalog instance
    async fn test_connection(&self) -> CatalogResult<bool>;

    /// List monitored items that have a downloaded file, in the catalog's
    /// natural listing order.
    async fn list_items(&self) -> CatalogResult<Vec<MediaItem>>;

    /// Delete the item's file record (and file) from the catalog.
    async fn delete_file(&self, item: &MediaItem) -> CatalogResult<()>;

    /// Ask the catalog to search for and grab a replacement automatically.
    async fn trigger_search(&self, item: &MediaItem) -> CatalogResult<()>;

    /// Fetch candidate replacement releases for the item.
    async fn list_releases(&self, item: &MediaItem) -> CatalogResult<Vec<ReleaseCandidate>>;

    /// Ask the catalog to grab one specific release.
    async fn download_release(
        &self,
        item: &MediaItem,
        release: &ReleaseCandidate,
    ) -> CatalogResult<()>;
}

/// Create an appropriate client based on config
pub fn create_client(config: &CatalogConfig, timeout: Duration) -> Box<dyn CatalogClient> {
    match config.kind {
        CatalogKind::Sonarr => Box::new(SonarrClient::new(config, timeout)),
        CatalogKind::Radarr => Box::new(RadarrClient::new(config, timeout)),
    }
}

struct BaseClient {
    client: Client,
    name: String,
    base_url: String,
    api_key: String,
    basic_auth: Option<(String, String)>,
}

impl BaseClient {
    fn new(config: &CatalogConfig, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client with timeout: {}", e);
            Client::new()
        });

        let basic_auth = config
            .http_basic_auth_username
            .as_ref()
            .filter(|u| !u.is_empty())
            .map(|u| {
                (
                    u.clone(),
                    config.http_basic_auth_password.clone().unwrap_or_default(),
                )
            });

        Self {
            client,
            name: config.name.clone(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            basic_auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("X-Api-Key", &self.api_key);
        match &self.basic_auth {
            Some((user, pass)) => request.basic_auth(user, Some(pass)),
            None => request,
        }
    }

    async fn check_status(
        &self,
        method: &'static str,
        path: &str,
        response: Response,
    ) -> CatalogResult<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized {
                service: self.name.clone(),
            });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status {
                service: self.name.clone(),
                method,
                path: path.to_string(),
                status,
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> CatalogResult<T> {
        let response = self
            .apply_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                service: self.name.clone(),
                path: path.to_string(),
                source: e,
            })?;

        let response = self.check_status("GET", path, response).await?;

        response.json().await.map_err(|e| CatalogError::Decode {
            service: self.name.clone(),
            path: path.to_string(),
            source: e,
        })
    }

    async fn delete(&self, path: &str) -> CatalogResult<()> {
        let response = self
            .apply_auth(self.client.delete(self.url(path)))
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                service: self.name.clone(),
                path: path.to_string(),
                source: e,
            })?;

        self.check_status("DELETE", path, response).await?;
        Ok(())
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> CatalogResult<()> {
        let response = self
            .apply_auth(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                service: self.name.clone(),
                path: path.to_string(),
                source: e,
            })?;

        self.check_status("POST", path, response).await?;
        Ok(())
    }

    async fn status_ok(&self) -> CatalogResult<bool> {
        let path = "/system/status";
        let response = self
            .apply_auth(self.client.get(self.url(path)))
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                service: self.name.clone(),
                path: path.to_string(),
                source: e,
            })?;
        Ok(response.status().is_success())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DownloadBody<'a> {
    guid: &'a str,
    indexer_id: i64,
}

fn release_path(id_param: &str, id: i64, quality_profile_id: Option<i64>) -> String {
    match quality_profile_id {
        Some(profile) => format!("/release?{}={}&qualityProfileId={}", id_param, id, profile),
        None => format!("/release?{}={}", id_param, id),
    }
}

// ============================================================================
// Sonarr
// ============================================================================

pub struct SonarrClient(BaseClient);

impl SonarrClient {
    pub fn new(config: &CatalogConfig, timeout: Duration) -> Self {
        Self(BaseClient::new(config, timeout))
    }
}

#[async_trait::async_trait]
impl CatalogClient for SonarrClient {
    fn name(&self) -> &str {
        &self.0.name
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        self.0.status_ok().await
    }

    async fn list_items(&self) -> CatalogResult<Vec<MediaItem>> {
        let series_list: Vec<SonarrSeries> = self.0.get_json("/series").await?;
        let mut items = Vec::new();

        for series in series_list {
            let files: Vec<SonarrEpisodeFile> = self
                .0
                .get_json(&format!("/episodefile?seriesId={}", series.id))
                .await?;

            if files.is_empty() {
                continue;
            }

            let episodes: Vec<SonarrEpisode> = self
                .0
                .get_json(&format!("/episode?seriesId={}", series.id))
                .await?;

            // Multi-episode files map to several episode ids.
            let mut episodes_by_file: HashMap<i64, Vec<i64>> = HashMap::new();
            for episode in &episodes {
                if let Some(file_id) = episode.episode_file_id {
                    if file_id != 0 {
                        episodes_by_file.entry(file_id).or_default().push(episode.id);
                    }
                }
            }

            for file in files {
                let Some(path) = file.path else { continue };
                let Some(episode_ids) = episodes_by_file.get(&file.id) else {
                    tracing::warn!(
                        series = %series.title,
                        file = %path,
                        "No episodes reference this file, cannot remediate it"
                    );
                    continue;
                };

                let path = PathBuf::from(path);
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();

                items.push(MediaItem {
                    kind: ItemKind::Episode,
                    title: format!("{} - {}", series.title, file_name),
                    file_id: file.id,
                    search_ids: episode_ids.clone(),
                    release_id: episode_ids[0],
                    path,
                    size: file.size,
                    date_added: file.date_added,
                    quality_profile_id: series.quality_profile_id,
                });
            }
        }

        Ok(items)
    }

    async fn delete_file(&self, item: &MediaItem) -> CatalogResult<()> {
        self.0.delete(&format!("/episodefile/{}", item.file_id)).await
    }

    async fn trigger_search(&self, item: &MediaItem) -> CatalogResult<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SearchCommand<'a> {
            name: &'static str,
            episode_ids: &'a [i64],
        }

        let command = SearchCommand {
            name: "EpisodeSearch",
            episode_ids: &item.search_ids,
        };

        self.0.post_json("/command", &command).await
    }

    async fn list_releases(&self, item: &MediaItem) -> CatalogResult<Vec<ReleaseCandidate>> {
        self.0
            .get_json(&release_path(
                "episodeId",
                item.release_id,
                item.quality_profile_id,
            ))
            .await
    }

    async fn download_release(
        &self,
        _item: &MediaItem,
        release: &ReleaseCandidate,
    ) -> CatalogResult<()> {
        self.0
            .post_json(
                "/release",
                &DownloadBody {
                    guid: &release.guid,
                    indexer_id: release.indexer_id,
                },
            )
            .await
    }
}

// ============================================================================
// Radarr
// ============================================================================

pub struct RadarrClient(BaseClient);

impl RadarrClient {
    pub fn new(config: &CatalogConfig, timeout: Duration) -> Self {
        Self(BaseClient::new(config, timeout))
    }
}

#[async_trait::async_trait]
impl CatalogClient for RadarrClient {
    fn name(&self) -> &str {
        &self.0.name
    }

    async fn test_connection(&self) -> CatalogResult<bool> {
        self.0.status_ok().await
    }

    async fn list_items(&self) -> CatalogResult<Vec<MediaItem>> {
        let movies: Vec<RadarrMovie> = self.0.get_json("/movie").await?;

        let items = movies
            .into_iter()
            .filter(|m| m.has_file)
            .filter_map(|movie| {
                let file = movie.movie_file?;
                let path = PathBuf::from(file.path?);

                Some(MediaItem {
                    kind: ItemKind::Movie,
                    title: movie.title,
                    file_id: file.id,
                    search_ids: vec![movie.id],
                    release_id: movie.id,
                    path,
                    size: file.size,
                    date_added: file.date_added,
                    quality_profile_id: movie.quality_profile_id,
                })
            })
            .collect();

        Ok(items)
    }

    async fn delete_file(&self, item: &MediaItem) -> CatalogResult<()> {
        self.0.delete(&format!("/moviefile/{}", item.file_id)).await
    }

    async fn trigger_search(&self, item: &MediaItem) -> CatalogResult<()> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SearchCommand<'a> {
            name: &'static str,
            movie_ids: &'a [i64],
        }

        let command = SearchCommand {
            name: "MoviesSearch",
            movie_ids: &item.search_ids,
        };

        self.0.post_json("/command", &command).await
    }

    async fn list_releases(&self, item: &MediaItem) -> CatalogResult<Vec<ReleaseCandidate>> {
        self.0
            .get_json(&release_path(
                "movieId",
                item.release_id,
                item.quality_profile_id,
            ))
            .await
    }

    async fn download_release(
        &self,
        _item: &MediaItem,
        release: &ReleaseCandidate,
    ) -> CatalogResult<()> {
        self.0
            .post_json(
                "/release",
                &DownloadBody {
                    guid: &release.guid,
                    indexer_id: release.indexer_id,
                },
            )
            .await
    }
}
