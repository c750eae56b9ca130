use async_trait::async_trait;
use playlist_drop::api::mock::MockCatalog;
use playlist_drop::cache::CacheState;
use playlist_drop::config::Config;
use playlist_drop::models::TrackRef;
use playlist_drop::service::{PlaylistService, ServiceError};
use playlist_drop::token::{AccessToken, AuthError, StaticTokenProvider, TokenProvider};
use std::sync::Arc;

struct RevokedToken;

#[async_trait]
impl TokenProvider for RevokedToken {
    async fn access_token(&self) -> Result<AccessToken, AuthError> {
        Err(AuthError::Rejected {
            status: 400,
            body: r#"{"error":"invalid_grant"}"#.into(),
        })
    }
}

fn test_config() -> Config {
    Config {
        playlist_id: "pl1".into(),
        ..Config::default()
    }
}

fn service_with(catalog: Arc<MockCatalog>) -> PlaylistService {
    PlaylistService::with_parts(&test_config(), Arc::new(StaticTokenProvider::new("tok")), catalog)
}

#[tokio::test]
async fn empty_query_is_rejected_without_remote_call() {
    let catalog = Arc::new(MockCatalog::with_demo_tracks());
    let service = service_with(catalog.clone());

    for q in ["", "   "] {
        let res = service.search(q).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
    }
    assert_eq!(catalog.search_calls(), 0);
}

#[tokio::test]
async fn search_returns_normalized_hits() {
    let catalog = Arc::new(MockCatalog::with_demo_tracks());
    let service = service_with(catalog.clone());

    let tracks = service.search("miles").await.expect("search");
    assert_eq!(tracks.len(), 2);
    assert!(tracks.iter().all(|t| t.artists == vec!["Miles Davis".to_string()]));
    assert_eq!(catalog.search_calls(), 1);
}

#[tokio::test]
async fn second_add_of_same_track_is_a_duplicate() {
    let catalog = Arc::new(MockCatalog::new());
    let service = service_with(catalog.clone());

    let data = service.add_track("spotify:track:ABC").await.expect("first add");
    assert!(data.get("snapshot_id").is_some());
    assert!(service.cache().contains(&TrackRef::new("spotify:track:ABC")).await);

    let res = service.add_track("spotify:track:ABC").await;
    assert!(matches!(res, Err(ServiceError::Duplicate(ref t)) if t.as_str() == "spotify:track:ABC"));

    assert_eq!(catalog.add_calls(), 1);
    assert_eq!(catalog.page_calls(), 1);
    assert_eq!(catalog.playlist(), vec![TrackRef::new("spotify:track:ABC")]);
}

#[tokio::test]
async fn track_already_in_remote_playlist_is_a_duplicate() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.seed_playlist(["spotify:track:OLD"]);
    let service = service_with(catalog.clone());

    let res = service.add_track("spotify:track:OLD").await;
    assert!(matches!(res, Err(ServiceError::Duplicate(_))));
    assert_eq!(catalog.add_calls(), 0);
}

#[tokio::test]
async fn membership_fetch_failure_aborts_add() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.set_fail_pages(true);
    let service = service_with(catalog.clone());

    let res = service.add_track("spotify:track:ABC").await;
    assert!(matches!(res, Err(ServiceError::Upstream(_))));
    assert_eq!(catalog.add_calls(), 0);
    assert_eq!(service.cache().state().await, CacheState::Stale);
    assert!(service.cache().is_empty().await);

    // next call retries the fetch instead of assuming "not a duplicate"
    catalog.set_fail_pages(false);
    service.add_track("spotify:track:ABC").await.expect("add after recovery");
    assert_eq!(catalog.page_calls(), 2);
    assert_eq!(catalog.add_calls(), 1);
}

#[tokio::test]
async fn failed_add_does_not_mark_track_present() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.set_fail_adds(true);
    let service = service_with(catalog.clone());

    let res = service.add_track("spotify:track:ABC").await;
    assert!(matches!(res, Err(ServiceError::Upstream(_))));
    assert!(!service.cache().contains(&TrackRef::new("spotify:track:ABC")).await);
}

#[tokio::test]
async fn missing_uri_is_rejected() {
    let catalog = Arc::new(MockCatalog::new());
    let service = service_with(catalog.clone());

    let res = service.add_track(" ").await;
    assert!(matches!(res, Err(ServiceError::Validation(_))));
    assert_eq!(catalog.page_calls(), 0);
}

#[tokio::test]
async fn token_failure_stops_before_any_catalog_call() {
    let catalog = Arc::new(MockCatalog::with_demo_tracks());
    let service = PlaylistService::with_parts(&test_config(), Arc::new(RevokedToken), catalog.clone());

    assert!(matches!(service.search("miles").await, Err(ServiceError::Auth(_))));
    assert!(matches!(service.add_track("mock:track:1").await, Err(ServiceError::Auth(_))));
    assert_eq!(catalog.search_calls(), 0);
    assert_eq!(catalog.page_calls(), 0);
    assert_eq!(catalog.add_calls(), 0);
}

#[tokio::test]
async fn uri_is_matched_exactly_as_sent() {
    let catalog = Arc::new(MockCatalog::new());
    catalog.seed_playlist(["spotify:track:A"]);
    let service = service_with(catalog.clone());

    service.add_track("spotify:track:A ").await.expect("distinct uri");
    assert!(service.cache().contains(&TrackRef::new("spotify:track:A ")).await);
    assert_eq!(
        catalog.playlist(),
        vec![TrackRef::new("spotify:track:A"), TrackRef::new("spotify:track:A ")]
    );
}

#[tokio::test]
async fn huge_cache_ttl_from_config_does_not_break_adds() {
    let cfg = Config {
        playlist_id: "pl1".into(),
        cache_ttl_secs: u64::MAX,
        ..Config::default()
    };
    let catalog = Arc::new(MockCatalog::new());
    let service = PlaylistService::with_parts(&cfg, Arc::new(StaticTokenProvider::new("tok")), catalog.clone());

    service.add_track("spotify:track:A").await.expect("first add");
    let res = service.add_track("spotify:track:A").await;
    assert!(matches!(res, Err(ServiceError::Duplicate(_))));
    assert_eq!(catalog.page_calls(), 1);
}

#[tokio::test]
async fn oversized_page_size_is_capped() {
    let cfg = Config {
        playlist_id: "pl1".into(),
        page_size: 500,
        ..Config::default()
    };
    let catalog = Arc::new(MockCatalog::new());
    catalog.seed_playlist((0..250).map(|i| TrackRef::new(format!("mock:track:{}", i))));
    let service = PlaylistService::with_parts(&cfg, Arc::new(StaticTokenProvider::new("tok")), catalog.clone());

    let res = service.add_track("mock:track:0").await;
    assert!(matches!(res, Err(ServiceError::Duplicate(_))));
    assert_eq!(catalog.page_calls(), 3);
}
