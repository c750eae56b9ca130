use super::Catalog;
use crate::models::{PlaylistPage, Track, TrackRef};
use crate::token::AccessToken;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::info;

/// An in-memory catalog used in tests and for running the UI offline.
/// It keeps one playlist's contents and counts every remote-style call.
#[derive(Default)]
pub struct MockCatalog {
    tracks: Vec<Track>,
    playlist: Mutex<Vec<TrackRef>>,
    search_calls: AtomicUsize,
    page_calls: AtomicUsize,
    add_calls: AtomicUsize,
    fail_pages: AtomicBool,
    fail_adds: AtomicBool,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fixed catalog, handy for `--mock` runs.
    pub fn with_demo_tracks() -> Self {
        let demo = [
            ("Blue in Green", "Miles Davis", "Kind of Blue", "1"),
            ("So What", "Miles Davis", "Kind of Blue", "2"),
            ("Naima", "John Coltrane", "Giant Steps", "3"),
            ("Take Five", "The Dave Brubeck Quartet", "Time Out", "4"),
        ];
        let tracks = demo
            .iter()
            .map(|(name, artist, album, id)| Track {
                name: name.to_string(),
                artists: vec![artist.to_string()],
                album: album.to_string(),
                album_art_url: None,
                uri: TrackRef::new(format!("mock:track:{}", id)),
            })
            .collect();
        Self::with_tracks(tracks)
    }

    pub fn with_tracks(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            ..Self::default()
        }
    }

    /// Pre-populate the playlist.
    pub fn seed_playlist<I, T>(&self, uris: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<TrackRef>,
    {
        let mut pl = self.playlist.lock().unwrap_or_else(|e| e.into_inner());
        pl.extend(uris.into_iter().map(Into::into));
    }

    pub fn playlist(&self) -> Vec<TrackRef> {
        self.playlist.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_adds(&self, fail: bool) {
        self.fail_adds.store(fail, Ordering::SeqCst);
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn add_calls(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for MockCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_tracks(&self, _token: &AccessToken, query: &str, limit: u32) -> Result<Vec<Track>> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        info!("MockCatalog: search {}", query);
        let needle = query.to_lowercase();
        Ok(self
            .tracks
            .iter()
            .filter(|t| {
                t.name.to_lowercase().contains(&needle)
                    || t.artists.iter().any(|a| a.to_lowercase().contains(&needle))
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn playlist_page(
        &self,
        _token: &AccessToken,
        playlist_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<PlaylistPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(anyhow!("list playlist tracks failed: 503 => mock outage"));
        }
        let pl = self.playlist.lock().unwrap_or_else(|e| e.into_inner());
        info!("MockCatalog: playlist_page {} offset {}", playlist_id, offset);
        Ok(PlaylistPage {
            uris: pl.iter().skip(offset).take(limit).cloned().collect(),
            total: pl.len(),
        })
    }

    async fn add_tracks(
        &self,
        _token: &AccessToken,
        playlist_id: &str,
        uris: &[TrackRef],
    ) -> Result<serde_json::Value> {
        let n = self.add_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_adds.load(Ordering::SeqCst) {
            return Err(anyhow!("add tracks failed: 403 => mock forbidden"));
        }
        info!("MockCatalog: add_tracks {} -> {} tracks", playlist_id, uris.len());
        let mut pl = self.playlist.lock().unwrap_or_else(|e| e.into_inner());
        pl.extend(uris.iter().cloned());
        Ok(json!({ "snapshot_id": format!("mock-snapshot-{}", n) }))
    }
}
