use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable identifier of a track (e.g. `spotify:track:ABC`).
/// Two refs are the same track only if the strings match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TrackRef(String);

impl TrackRef {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackRef {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A search hit normalized for the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub album_art_url: Option<String>,
    pub uri: TrackRef,
}

/// One page of the remote playlist-items listing.
#[derive(Debug, Clone, Default)]
pub struct PlaylistPage {
    pub uris: Vec<TrackRef>,
    /// Total item count as reported by this page.
    pub total: usize,
}
