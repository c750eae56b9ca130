use crate::api::Catalog;
use crate::models::TrackRef;
use crate::token::AccessToken;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Page size for playlist-item listing; also the most the remote accepts.
pub const PAGE_SIZE: usize = 100;

#[derive(Debug, thiserror::Error)]
#[error("failed to fetch playlist {playlist_id} page at offset {offset}")]
pub struct FetchError {
    pub playlist_id: String,
    pub offset: usize,
    #[source]
    pub source: anyhow::Error,
}

/// Anything that can produce the full membership of the target playlist.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    async fn fetch_all(&self, token: &AccessToken) -> Result<HashSet<TrackRef>, FetchError>;
}

/// Builds a membership snapshot by paging through the playlist.
pub struct PlaylistSyncFetcher {
    catalog: Arc<dyn Catalog>,
    playlist_id: String,
    page_size: usize,
}

impl PlaylistSyncFetcher {
    pub fn new(catalog: Arc<dyn Catalog>, playlist_id: impl Into<String>) -> Self {
        Self::with_page_size(catalog, playlist_id, PAGE_SIZE)
    }

    pub fn with_page_size(catalog: Arc<dyn Catalog>, playlist_id: impl Into<String>, page_size: usize) -> Self {
        Self {
            catalog,
            playlist_id: playlist_id.into(),
            page_size: page_size.clamp(1, PAGE_SIZE),
        }
    }
}

#[async_trait]
impl MembershipSource for PlaylistSyncFetcher {
    /// Pages while `offset < total`, re-reading `total` from every page so a
    /// playlist that shrinks or grows mid-walk still terminates.
    /// Any failed page discards everything gathered so far.
    async fn fetch_all(&self, token: &AccessToken) -> Result<HashSet<TrackRef>, FetchError> {
        let mut uris = HashSet::new();
        let mut offset = 0usize;
        loop {
            let page = self
                .catalog
                .playlist_page(token, &self.playlist_id, offset, self.page_size)
                .await
                .map_err(|source| FetchError {
                    playlist_id: self.playlist_id.clone(),
                    offset,
                    source,
                })?;
            uris.extend(page.uris);
            offset += self.page_size;
            if offset >= page.total {
                break;
            }
        }
        debug!(
            "fetched {} unique uris from playlist {} via {}",
            uris.len(),
            self.playlist_id,
            self.catalog.name()
        );
        Ok(uris)
    }
}
