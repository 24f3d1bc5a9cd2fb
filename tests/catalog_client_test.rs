//! HTTP-level tests for the Sonarr/Radarr clients against a mock server.

mod common;

use linguarr::arr::{self, ItemKind};
use linguarr::config::{CatalogConfig, CatalogKind};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog_config(kind: CatalogKind, url: &str) -> CatalogConfig {
    CatalogConfig {
        name: "test".to_string(),
        kind,
        url: url.to_string(),
        api_key: "secret-key".to_string(),
        enabled: true,
        http_basic_auth_username: None,
        http_basic_auth_password: None,
    }
}

#[tokio::test]
async fn test_radarr_list_items_maps_movies_with_files() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/movie"))
        .and(header("X-Api-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 5,
                "title": "Movie With File",
                "hasFile": true,
                "qualityProfileId": 3,
                "movieFile": {
                    "id": 50,
                    "path": "/media/movies/movie.mkv",
                    "size": 4_000_000_000u64,
                    "dateAdded": "2024-05-01T12:00:00Z"
                }
            },
            {
                "id": 6,
                "title": "Movie Without File",
                "hasFile": false
            }
        ])))
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Radarr, &server.uri()),
        Duration::from_secs(5),
    );

    let items = client.list_items().await.unwrap();
    assert_eq!(items.len(), 1);

    let item = &items[0];
    assert_eq!(item.kind, ItemKind::Movie);
    assert_eq!(item.title, "Movie With File");
    assert_eq!(item.file_id, 50);
    assert_eq!(item.search_ids, vec![5]);
    assert_eq!(item.release_id, 5);
    assert_eq!(item.size, 4_000_000_000);
    assert_eq!(item.quality_profile_id, Some(3));
    assert_eq!(
        item.fingerprint(),
        "/media/movies/movie.mkv|4000000000|2024-05-01T12:00:00Z"
    );
    assert_eq!(item.skip_key(), "movie:5");
}

#[tokio::test]
async fn test_rejected_api_key_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/movie"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Radarr, &server.uri()),
        Duration::from_secs(5),
    );

    let err = client.list_items().await.unwrap_err();
    assert!(err.is_auth(), "expected auth error, got: {}", err);
}

#[tokio::test]
async fn test_radarr_remediation_calls() {
    let server = MockServer::start().await;
    let item = common::movie(5, "Movie", "/media/movie.mkv", 100);

    Mock::given(method("DELETE"))
        .and(path("/api/v3/moviefile/50"))
        .and(header("X-Api-Key", "secret-key"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/command"))
        .and(body_json(json!({
            "name": "MoviesSearch",
            "movieIds": [5]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Radarr, &server.uri()),
        Duration::from_secs(5),
    );

    client.delete_file(&item).await.unwrap();
    client.trigger_search(&item).await.unwrap();
}

#[tokio::test]
async fn test_radarr_release_listing_and_download() {
    let server = MockServer::start().await;
    let item = common::movie(5, "Movie", "/media/movie.mkv", 100);

    Mock::given(method("GET"))
        .and(path("/api/v3/release"))
        .and(query_param("movieId", "5"))
        .and(query_param("qualityProfileId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "guid": "release-guid-1",
                "indexerId": 12,
                "indexer": "SomeIndexer",
                "title": "Movie.2024.1080p.BluRay",
                "size": 9_000_000_000u64,
                "quality": { "quality": { "name": "Bluray-1080p" } }
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/release"))
        .and(body_json(json!({
            "guid": "release-guid-1",
            "indexerId": 12
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Radarr, &server.uri()),
        Duration::from_secs(5),
    );

    let releases = client.list_releases(&item).await.unwrap();
    assert_eq!(releases.len(), 1);
    assert_eq!(releases[0].quality_label(), "Bluray-1080p");

    client.download_release(&item, &releases[0]).await.unwrap();
}

#[tokio::test]
async fn test_sonarr_list_items_joins_files_and_episodes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/series"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "title": "Some Show", "qualityProfileId": 2 }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v3/episodefile"))
        .and(query_param("seriesId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 100,
                "path": "/media/tv/show/s01e01e02.mkv",
                "size": 2_000_000_000u64,
                "dateAdded": "2024-03-01T00:00:00Z"
            },
            {
                "id": 101,
                "path": "/media/tv/show/orphaned.mkv",
                "size": 1_000_000_000u64
            }
        ])))
        .mount(&server)
        .await;

    // File 100 is a double episode; file 101 has no episode pointing at it.
    Mock::given(method("GET"))
        .and(path("/api/v3/episode"))
        .and(query_param("seriesId", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1000, "episodeFileId": 100 },
            { "id": 1001, "episodeFileId": 100 },
            { "id": 1002, "episodeFileId": 0 }
        ])))
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Sonarr, &server.uri()),
        Duration::from_secs(5),
    );

    let items = client.list_items().await.unwrap();
    assert_eq!(items.len(), 1, "orphaned file should be skipped");

    let item = &items[0];
    assert_eq!(item.kind, ItemKind::Episode);
    assert_eq!(item.title, "Some Show - s01e01e02.mkv");
    assert_eq!(item.file_id, 100);
    assert_eq!(item.search_ids, vec![1000, 1001]);
    assert_eq!(item.release_id, 1000);
    assert_eq!(item.skip_key(), "episode:1000");
}

#[tokio::test]
async fn test_sonarr_search_command_carries_all_episode_ids() {
    let server = MockServer::start().await;

    let mut item = common::movie(1, "Show - e01.mkv", "/media/tv/e01.mkv", 100);
    item.kind = ItemKind::Episode;
    item.search_ids = vec![1000, 1001];

    Mock::given(method("POST"))
        .and(path("/api/v3/command"))
        .and(body_json(json!({
            "name": "EpisodeSearch",
            "episodeIds": [1000, 1001]
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Sonarr, &server.uri()),
        Duration::from_secs(5),
    );

    client.trigger_search(&item).await.unwrap();
}

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/movie"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database locked"))
        .mount(&server)
        .await;

    let client = arr::create_client(
        &catalog_config(CatalogKind::Radarr, &server.uri()),
        Duration::from_secs(5),
    );

    let err = client.list_items().await.unwrap_err();
    assert!(!err.is_auth());
    let message = err.to_string();
    assert!(message.contains("500"), "got: {}", message);
    assert!(message.contains("database locked"), "got: {}", message);
}
