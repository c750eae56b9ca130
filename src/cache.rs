use crate::models::TrackRef;
use crate::sync::{FetchError, MembershipSource};
use crate::token::AccessToken;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

/// How long a fetched snapshot is trusted.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    Fresh,
    Stale,
}

#[derive(Default)]
struct Snapshot {
    uris: HashSet<TrackRef>,
    /// None until the first successful fetch.
    fetched_at: Option<Instant>,
    /// Optimistic adds and when they happened. A fetch that started before
    /// an add may not include it, so those are merged back in on replace.
    recorded: HashMap<TrackRef, Instant>,
}

impl Snapshot {
    fn state(&self, now: Instant, ttl: Duration) -> CacheState {
        match self.fetched_at {
            Some(at) if now.saturating_duration_since(at) < ttl => CacheState::Fresh,
            _ => CacheState::Stale,
        }
    }

    fn replace(&mut self, mut uris: HashSet<TrackRef>, started: Instant, now: Instant) {
        uris.extend(self.recorded.keys().cloned());
        // adds older than this fetch's start are already in its result
        self.recorded.retain(|_, at| *at >= started);
        self.uris = uris;
        self.fetched_at = Some(now);
    }
}

/// Best-effort view of which tracks are already in the target playlist.
///
/// The snapshot is refreshed on demand by [`ensure_fresh`](Self::ensure_fresh)
/// and grows optimistically through [`record_add`](Self::record_add). The lock
/// is never held across the remote fetch, so two callers that both see a
/// stale snapshot may both fetch; whichever finishes last wins, keeping any
/// tracks recorded while it was in flight.
pub struct PlaylistMembershipCache {
    source: Arc<dyn MembershipSource>,
    ttl: Duration,
    snapshot: Mutex<Snapshot>,
}

impl PlaylistMembershipCache {
    pub fn new(source: Arc<dyn MembershipSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            snapshot: Mutex::new(Snapshot::default()),
        }
    }

    pub async fn state(&self) -> CacheState {
        self.snapshot.lock().await.state(Instant::now(), self.ttl)
    }

    /// Number of tracks in the current snapshot, fresh or not.
    pub async fn len(&self) -> usize {
        self.snapshot.lock().await.uris.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Refetch the membership if the snapshot is stale. On failure the old
    /// snapshot is kept as it was and the error is returned to the caller.
    pub async fn ensure_fresh(&self, token: &AccessToken) -> Result<(), FetchError> {
        if self.state().await == CacheState::Fresh {
            return Ok(());
        }
        debug!("playlist membership snapshot is stale, fetching");
        let started = Instant::now();
        let uris = self.source.fetch_all(token).await?;
        let mut snap = self.snapshot.lock().await;
        snap.replace(uris, started, Instant::now());
        let count = snap.uris.len();
        info!("playlist membership refreshed: {} tracks", count);
        Ok(())
    }

    /// Exact-match lookup. Freshness is the caller's concern.
    pub async fn contains(&self, track: &TrackRef) -> bool {
        self.snapshot.lock().await.uris.contains(track)
    }

    /// Remember a track we just added. Does not extend the expiry.
    pub async fn record_add(&self, track: TrackRef) {
        let mut snap = self.snapshot.lock().await;
        snap.recorded.insert(track.clone(), Instant::now());
        snap.uris.insert(track);
    }
}
