use crate::error::PeerError;
use crate::media::{LocalMedia, TrackKind};
use crate::peer::{PeerEvent, PeerFactory, PeerSession, RemoteStream};
use consult_core::{ConnectivityState, NegotiationState};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Owns the single live peer session of a call and what has been observed
/// about it.
pub struct PeerController {
    generation: u64,
    session: Box<dyn PeerSession>,
    remote: RemoteStream,
    connectivity: ConnectivityState,
    closed: bool,
}

impl PeerController {
    /// Opens a session through `factory` and binds `media` into it.
    pub async fn open(
        factory: &dyn PeerFactory,
        generation: u64,
        events: mpsc::Sender<PeerEvent>,
        media: Option<&LocalMedia>,
    ) -> Result<Self, PeerError> {
        let session = factory.open(generation, events).await?;

        if let Some(media) = media {
            if let Err(e) = session.bind_local_media(media).await {
                let _ = session.close().await;
                return Err(e);
            }
        }

        info!("Peer session #{} opened", generation);
        Ok(Self {
            generation,
            session,
            remote: RemoteStream::default(),
            connectivity: ConnectivityState::New,
            closed: false,
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn session(&self) -> &dyn PeerSession {
        self.session.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity
    }

    pub fn set_connectivity(&mut self, state: ConnectivityState) {
        self.connectivity = state;
    }

    pub fn remote_track_count(&self) -> usize {
        self.remote.len()
    }

    pub fn remote_stream(&self) -> &RemoteStream {
        &self.remote
    }

    /// Records a remote track. Returns false for a track already known.
    pub fn on_remote_track(&mut self, track_id: &str, kind: TrackKind) -> bool {
        let added = self.remote.add(track_id, kind);
        if added {
            debug!(
                "Remote {} track {} added to session #{}",
                kind, track_id, self.generation
            );
        }
        added
    }

    pub async fn negotiation_state(&self) -> NegotiationState {
        self.session.negotiation_state().await
    }

    pub async fn bind_local_media(&self, media: &LocalMedia) -> Result<(), PeerError> {
        if self.closed {
            return Err(PeerError::Closed);
        }
        self.session.bind_local_media(media).await
    }

    /// Closes the session. Safe to call more than once.
    pub async fn close(&mut self) -> Result<(), PeerError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.remote.clear();
        self.connectivity = ConnectivityState::Closed;
        info!("Closing peer session #{}", self.generation);
        self.session.close().await
    }
}
