use crate::error::PeerError;
use crate::media::LocalMedia;
use crate::peer::PeerEvent;
use async_trait::async_trait;
use consult_core::{IceCandidateRecord, NegotiationState, SessionDescription};
use tokio::sync::mpsc;

/// One underlying peer connection.
#[async_trait]
pub trait PeerSession: Send + Sync {
    /// Create an offer. `ice_restart` asks for fresh ICE credentials.
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription, PeerError>;

    async fn create_answer(&self) -> Result<SessionDescription, PeerError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), PeerError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), PeerError>;

    async fn local_description(&self) -> Option<SessionDescription>;

    async fn remote_description(&self) -> Option<SessionDescription>;

    async fn has_remote_description(&self) -> bool {
        self.remote_description().await.is_some()
    }

    async fn negotiation_state(&self) -> NegotiationState;

    async fn add_ice_candidate(&self, candidate: IceCandidateRecord) -> Result<(), PeerError>;

    /// Put the tracks of `media` on the session's senders, replacing what is
    /// there. Kinds absent from `media` are cleared.
    async fn bind_local_media(&self, media: &LocalMedia) -> Result<(), PeerError>;

    async fn close(&self) -> Result<(), PeerError>;
}

/// Creates peer sessions; events of the new session go to `events`.
#[async_trait]
pub trait PeerFactory: Send + Sync {
    async fn open(
        &self,
        generation: u64,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerSession>, PeerError>;
}
