use crate::media::MediaProfile;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Audio => f.write_str("audio"),
            Self::Video => f.write_str("video"),
        }
    }
}

#[derive(Clone)]
pub struct LocalTrack {
    pub kind: TrackKind,
    pub track: Arc<TrackLocalStaticSample>,
}

impl LocalTrack {
    pub fn new(kind: TrackKind, track: Arc<TrackLocalStaticSample>) -> Self {
        Self { kind, track }
    }

    pub fn id(&self) -> &str {
        self.track.id()
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack")
            .field("kind", &self.kind)
            .field("id", &self.id())
            .finish()
    }
}

/// Tracks produced by one successful capture. Stopping cancels whatever feeds
/// them; dropping stops as well.
#[derive(Debug)]
pub struct LocalMedia {
    profile: MediaProfile,
    tracks: Vec<LocalTrack>,
    feed: CancellationToken,
}

impl LocalMedia {
    pub fn new(profile: MediaProfile, tracks: Vec<LocalTrack>, feed: CancellationToken) -> Self {
        Self {
            profile,
            tracks,
            feed,
        }
    }

    pub fn placeholder() -> Self {
        Self::new(
            MediaProfile::Placeholder,
            Vec::new(),
            CancellationToken::new(),
        )
    }

    pub fn profile(&self) -> MediaProfile {
        self.profile
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn track(&self, kind: TrackKind) -> Option<&LocalTrack> {
        self.tracks.iter().find(|t| t.kind == kind)
    }

    pub fn stop(&self) {
        self.feed.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.feed.is_cancelled()
    }
}

impl Drop for LocalMedia {
    fn drop(&mut self) {
        self.feed.cancel();
    }
}
