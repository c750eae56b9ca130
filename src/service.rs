use crate::api::spotify::SpotifyCatalog;
use crate::api::Catalog;
use crate::cache::PlaylistMembershipCache;
use crate::config::Config;
use crate::models::{Track, TrackRef};
use crate::sync::PlaylistSyncFetcher;
use crate::token::{AuthError, RefreshTokenProvider, TokenProvider};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    Validation(&'static str),
    #[error("token exchange failed")]
    Auth(#[from] AuthError),
    #[error("upstream call failed")]
    Upstream(#[source] anyhow::Error),
    #[error("track {0} is already in the playlist")]
    Duplicate(TrackRef),
}

/// Search and append-if-absent against one fixed playlist.
pub struct PlaylistService {
    tokens: Arc<dyn TokenProvider>,
    catalog: Arc<dyn Catalog>,
    cache: PlaylistMembershipCache,
    playlist_id: String,
    search_limit: u32,
}

impl PlaylistService {
    pub fn new(
        tokens: Arc<dyn TokenProvider>,
        catalog: Arc<dyn Catalog>,
        cache: PlaylistMembershipCache,
        playlist_id: impl Into<String>,
        search_limit: u32,
    ) -> Self {
        Self {
            tokens,
            catalog,
            cache,
            playlist_id: playlist_id.into(),
            search_limit,
        }
    }

    /// Wire up a service from the given token source and catalog, using the
    /// playlist and paging settings from `cfg`.
    pub fn with_parts(cfg: &Config, tokens: Arc<dyn TokenProvider>, catalog: Arc<dyn Catalog>) -> Self {
        let fetcher = PlaylistSyncFetcher::with_page_size(catalog.clone(), cfg.playlist_id.clone(), cfg.page_size);
        let cache = PlaylistMembershipCache::new(Arc::new(fetcher), Duration::from_secs(cfg.cache_ttl_secs));
        Self::new(tokens, catalog, cache, cfg.playlist_id.clone(), cfg.search_limit)
    }

    /// The production stack: refresh-token grant plus the Spotify Web API,
    /// sharing one HTTP client.
    pub fn from_config(cfg: &Config) -> Self {
        let client = reqwest::Client::new();
        let tokens = Arc::new(RefreshTokenProvider::new(
            client.clone(),
            cfg.credentials(),
            cfg.auth_base.clone(),
        ));
        let catalog = Arc::new(SpotifyCatalog::new(client, cfg.api_base.clone()));
        Self::with_parts(cfg, tokens, catalog)
    }

    pub fn cache(&self) -> &PlaylistMembershipCache {
        &self.cache
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Track>, ServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ServiceError::Validation("empty search query"));
        }
        let token = self.tokens.access_token().await.map_err(|e| {
            error!("search: token exchange failed: {}", e);
            ServiceError::Auth(e)
        })?;
        let tracks = self
            .catalog
            .search_tracks(&token, query, self.search_limit)
            .await
            .map_err(|e| {
                error!("search: catalog {} failed: {:#}", self.catalog.name(), e);
                ServiceError::Upstream(e)
            })?;
        Ok(tracks)
    }

    /// Append `uri` to the playlist unless it is already there.
    /// Returns the remote response payload on success.
    pub async fn add_track(&self, uri: &str) -> Result<serde_json::Value, ServiceError> {
        // the URI is kept exactly as sent; TrackRef equality is byte-exact
        if uri.trim().is_empty() {
            return Err(ServiceError::Validation("missing track uri"));
        }
        let track = TrackRef::new(uri);

        let token = self.tokens.access_token().await.map_err(|e| {
            error!("add_track: token exchange failed: {}", e);
            ServiceError::Auth(e)
        })?;

        // Never guess membership from a snapshot we could not refresh.
        if let Err(e) = self.cache.ensure_fresh(&token).await {
            let e = anyhow::Error::new(e);
            error!("add_track: membership refresh failed: {:#}", e);
            return Err(ServiceError::Upstream(e));
        }

        if self.cache.contains(&track).await {
            warn!("add_track: {} already in playlist {}", track, self.playlist_id);
            return Err(ServiceError::Duplicate(track));
        }

        let data = self
            .catalog
            .add_tracks(&token, &self.playlist_id, std::slice::from_ref(&track))
            .await
            .map_err(|e| {
                error!("add_track: adding {} failed: {:#}", track, e);
                ServiceError::Upstream(e)
            })?;

        info!("added {} to playlist {}", track, self.playlist_id);
        self.cache.record_add(track).await;
        Ok(data)
    }
}
