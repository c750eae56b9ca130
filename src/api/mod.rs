pub mod spotify;
pub mod mock;

use crate::models::{PlaylistPage, Track, TrackRef};
use crate::token::AccessToken;
use anyhow::Result;

/// Catalog trait: the remote operations the service needs.
/// Implementations: spotify::SpotifyCatalog and mock::MockCatalog.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Search tracks by free text, returning at most `limit` normalized hits.
    async fn search_tracks(&self, token: &AccessToken, query: &str, limit: u32) -> Result<Vec<Track>>;

    /// Fetch one page of track URIs from a playlist.
    async fn playlist_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage>;

    /// Append tracks to a playlist. Returns the remote response body as-is.
    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[TrackRef],
    ) -> Result<serde_json::Value>;

    /// Return the catalog's name (for logging)
    fn name(&self) -> &str;
}
