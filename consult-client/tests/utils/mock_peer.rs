use async_trait::async_trait;
use consult_client::{LocalMedia, MediaProfile, PeerError, PeerEvent, PeerFactory, PeerSession, TrackKind};
use consult_core::{
    ConnectivityState, IceCandidateRecord, NegotiationState, SdpKind, SessionDescription,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Everything a mock peer session has been asked to do.
#[derive(Debug)]
pub struct MockPeerState {
    pub negotiation: NegotiationState,
    pub local: Option<SessionDescription>,
    pub remote: Option<SessionDescription>,
    pub applied_candidates: Vec<IceCandidateRecord>,
    /// One entry per created offer: whether it asked for an ICE restart.
    pub offers: Vec<bool>,
    pub answers: usize,
    pub bound_profiles: Vec<MediaProfile>,
    pub closed: bool,
    pub fail_create_offer: bool,
    pub fail_set_remote: bool,
}

impl Default for MockPeerState {
    fn default() -> Self {
        Self {
            negotiation: NegotiationState::Idle,
            local: None,
            remote: None,
            applied_candidates: Vec::new(),
            offers: Vec::new(),
            answers: 0,
            bound_profiles: Vec::new(),
            closed: false,
            fail_create_offer: false,
            fail_set_remote: false,
        }
    }
}

/// Test-side view of one mock session: inspect its state, inject events.
#[derive(Clone)]
pub struct MockPeer {
    pub generation: u64,
    pub state: Arc<Mutex<MockPeerState>>,
    events: mpsc::Sender<PeerEvent>,
}

impl MockPeer {
    pub async fn emit(&self, event: PeerEvent) {
        let _ = self.events.send(event).await;
    }

    pub async fn set_connectivity(&self, state: ConnectivityState) {
        self.emit(PeerEvent::IceConnectionChanged(self.generation, state))
            .await;
    }

    /// ICE connects and the remote audio track shows up.
    pub async fn connect(&self) {
        self.set_connectivity(ConnectivityState::Connected).await;
        self.emit(PeerEvent::RemoteTrackAdded(
            self.generation,
            format!("remote-audio-{}", self.generation),
            TrackKind::Audio,
        ))
        .await;
    }

    pub async fn emit_candidate(&self, candidate: &str) {
        self.emit(PeerEvent::CandidateGenerated(
            self.generation,
            IceCandidateRecord::new(candidate),
        ))
        .await;
    }

    pub async fn negotiation(&self) -> NegotiationState {
        self.state.lock().await.negotiation
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

struct MockPeerSession {
    generation: u64,
    state: Arc<Mutex<MockPeerState>>,
}

fn mock_sdp(kind: &str, generation: u64, n: usize) -> String {
    format!(
        "v=0\r\no=- {generation} {n} IN IP4 127.0.0.1\r\ns={kind}\r\nt=0 0\r\n\
         m=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=extmap:13 urn:3gpp:video-orientation\r\n\
         m=video 9 UDP/TLS/RTP/SAVPF 96\r\na=sendrecv\r\n"
    )
}

#[async_trait]
impl PeerSession for MockPeerSession {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription, PeerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PeerError::Closed);
        }
        if state.fail_create_offer {
            return Err(PeerError::Other("offer refused".into()));
        }
        state.offers.push(ice_restart);
        Ok(SessionDescription::offer(mock_sdp(
            "offer",
            self.generation,
            state.offers.len(),
        )))
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PeerError::Closed);
        }
        if state.negotiation != NegotiationState::HaveRemoteOffer {
            return Err(PeerError::Other("no remote offer to answer".into()));
        }
        state.answers += 1;
        Ok(SessionDescription::answer(mock_sdp(
            "answer",
            self.generation,
            state.answers,
        )))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PeerError::Closed);
        }
        state.negotiation = match (desc.kind, state.negotiation) {
            (SdpKind::Offer, NegotiationState::Idle | NegotiationState::Stable) => {
                NegotiationState::HaveLocalOffer
            }
            (SdpKind::Answer, NegotiationState::HaveRemoteOffer) => NegotiationState::Stable,
            (kind, current) => {
                return Err(PeerError::Other(format!(
                    "cannot set local {:?} while {}",
                    kind, current
                )));
            }
        };
        state.local = Some(desc);
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PeerError::Closed);
        }
        if state.fail_set_remote {
            return Err(PeerError::Other("remote description rejected".into()));
        }
        state.negotiation = match (desc.kind, state.negotiation) {
            (SdpKind::Offer, NegotiationState::Idle | NegotiationState::Stable) => {
                NegotiationState::HaveRemoteOffer
            }
            (SdpKind::Answer, NegotiationState::HaveLocalOffer) => NegotiationState::Stable,
            (kind, current) => {
                return Err(PeerError::Other(format!(
                    "cannot set remote {:?} while {}",
                    kind, current
                )));
            }
        };
        state.remote = Some(desc);
        Ok(())
    }

    async fn local_description(&self) -> Option<SessionDescription> {
        self.state.lock().await.local.clone()
    }

    async fn remote_description(&self) -> Option<SessionDescription> {
        self.state.lock().await.remote.clone()
    }

    async fn negotiation_state(&self) -> NegotiationState {
        self.state.lock().await.negotiation
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateRecord) -> Result<(), PeerError> {
        let mut state = self.state.lock().await;
        if state.remote.is_none() {
            return Err(PeerError::Other("candidate before remote description".into()));
        }
        if candidate.candidate.contains("malformed") {
            return Err(PeerError::Other("malformed candidate".into()));
        }
        state.applied_candidates.push(candidate);
        Ok(())
    }

    async fn bind_local_media(&self, media: &LocalMedia) -> Result<(), PeerError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(PeerError::Closed);
        }
        state.bound_profiles.push(media.profile());
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.state.lock().await.closed = true;
        Ok(())
    }
}

#[derive(Default)]
struct FactoryState {
    peers: Vec<MockPeer>,
    fail_opens: bool,
}

/// Peer factory that hands out in-memory sessions and remembers them.
#[derive(Clone, Default)]
pub struct MockPeerFactory {
    inner: Arc<Mutex<FactoryState>>,
}

impl MockPeerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `open` fail.
    pub async fn fail_opens(&self, fail: bool) {
        self.inner.lock().await.fail_opens = fail;
    }

    pub async fn opened(&self) -> usize {
        self.inner.lock().await.peers.len()
    }

    pub async fn peer(&self, generation: u64) -> Option<MockPeer> {
        self.inner
            .lock()
            .await
            .peers
            .iter()
            .find(|p| p.generation == generation)
            .cloned()
    }

    /// Waits (in tokio time) until a session with `generation` exists.
    pub async fn wait_for_peer(&self, generation: u64) -> Option<MockPeer> {
        for _ in 0..600 {
            if let Some(peer) = self.peer(generation).await {
                return Some(peer);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        None
    }
}

#[async_trait]
impl PeerFactory for MockPeerFactory {
    async fn open(
        &self,
        generation: u64,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerSession>, PeerError> {
        let mut inner = self.inner.lock().await;
        if inner.fail_opens {
            return Err(PeerError::Other("peer factory unavailable".into()));
        }

        tracing::debug!("[MockPeerFactory] open session #{}", generation);
        let state = Arc::new(Mutex::new(MockPeerState::default()));
        inner.peers.push(MockPeer {
            generation,
            state: state.clone(),
            events,
        });
        Ok(Box::new(MockPeerSession { generation, state }))
    }
}
