use super::Catalog;
use crate::models::{PlaylistPage, Track, TrackRef};
use crate::token::AccessToken;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Deserialize)]
struct SearchResponse {
    tracks: Paging<TrackObject>,
}

#[derive(Deserialize)]
struct Paging<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct TrackObject {
    name: String,
    uri: String,
    #[serde(default)]
    artists: Vec<ArtistObject>,
    album: Option<AlbumObject>,
}

#[derive(Deserialize)]
struct ArtistObject {
    name: String,
}

#[derive(Deserialize)]
struct AlbumObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    images: Vec<ImageObject>,
}

#[derive(Deserialize)]
struct ImageObject {
    url: String,
}

#[derive(Deserialize)]
struct PlaylistItemsResponse {
    #[serde(default)]
    items: Vec<PlaylistItem>,
    total: usize,
}

#[derive(Deserialize)]
struct PlaylistItem {
    // null for tracks removed from the catalog
    track: Option<PlaylistTrack>,
}

#[derive(Deserialize)]
struct PlaylistTrack {
    uri: Option<String>,
}

impl From<TrackObject> for Track {
    fn from(t: TrackObject) -> Self {
        let (album, album_art_url) = match t.album {
            Some(a) => {
                let art = a.images.into_iter().next().map(|i| i.url);
                (a.name, art)
            }
            None => (String::new(), None),
        };
        Track {
            name: t.name,
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            album,
            album_art_url,
            uri: TrackRef::new(t.uri),
        }
    }
}

/// Catalog backed by the Spotify Web API.
/// `api_base` includes the version path, e.g. `https://api.spotify.com/v1`.
pub struct SpotifyCatalog {
    client: Client,
    api_base: String,
}

impl SpotifyCatalog {
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Catalog for SpotifyCatalog {
    fn name(&self) -> &str {
        "spotify"
    }

    async fn search_tracks(&self, token: &AccessToken, query: &str, limit: u32) -> Result<Vec<Track>> {
        let url = format!(
            "{}/search?q={}&type=track&limit={}",
            self.api_base,
            urlencoding::encode(query),
            limit
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, token.bearer())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .context("search request")?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("search failed: {} => {}", status, txt));
        }
        let sr: SearchResponse = resp.json().await.context("parse search response")?;
        Ok(sr.tracks.items.into_iter().map(Track::from).collect())
    }

    async fn playlist_page(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage> {
        let url = format!(
            "{}/playlists/{}/tracks?offset={}&limit={}&fields={}",
            self.api_base,
            urlencoding::encode(playlist_id),
            offset,
            limit,
            urlencoding::encode("items(track(uri)),total")
        );
        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, token.bearer())
            .send()
            .await
            .context("list playlist tracks request")?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("list playlist tracks failed: {} => {}", status, txt));
        }
        let page: PlaylistItemsResponse = resp.json().await.context("parse playlist page")?;
        let uris: Vec<TrackRef> = page
            .items
            .into_iter()
            .filter_map(|it| it.track.and_then(|t| t.uri))
            .map(TrackRef::new)
            .collect();
        debug!(
            "playlist {} page at offset {}: {} uris, total {}",
            playlist_id,
            offset,
            uris.len(),
            page.total
        );
        Ok(PlaylistPage {
            uris,
            total: page.total,
        })
    }

    async fn add_tracks(
        &self,
        token: &AccessToken,
        playlist_id: &str,
        uris: &[TrackRef],
    ) -> Result<serde_json::Value> {
        let url = format!(
            "{}/playlists/{}/tracks",
            self.api_base,
            urlencoding::encode(playlist_id)
        );
        let body = json!({ "uris": uris });
        let resp = self
            .client
            .post(&url)
            .header(AUTHORIZATION, token.bearer())
            .json(&body)
            .send()
            .await
            .context("add tracks request")?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("add tracks failed: {} => {}", status, txt));
        }
        let j: serde_json::Value = resp.json().await.context("parse add tracks response")?;
        Ok(j)
    }
}
