use crate::media::TrackKind;

/// Aggregate of the remote tracks received on the current session.
#[derive(Debug, Default, Clone)]
pub struct RemoteStream {
    tracks: Vec<(String, TrackKind)>,
}

impl RemoteStream {
    /// Returns false when a track with the same id is already present.
    pub fn add(&mut self, track_id: impl Into<String>, kind: TrackKind) -> bool {
        let track_id = track_id.into();
        if self.contains(&track_id) {
            return false;
        }
        self.tracks.push((track_id, kind));
        true
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|(id, _)| id == track_id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = TrackKind> + '_ {
        self.tracks.iter().map(|(_, kind)| *kind)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }
}
