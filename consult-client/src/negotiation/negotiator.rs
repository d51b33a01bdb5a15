use crate::error::NegotiationError;
use crate::negotiation::IceCandidateBuffer;
use crate::peer::PeerController;
use crate::sdp::SdpNormalizer;
use consult_core::{IceCandidateRecord, NegotiationState, Role, SessionDescription, Signal};
use tracing::{debug, info, warn};

/// Offer/answer/candidate handling for one call. Holds no peer session of
/// its own; every operation acts on the controller it is handed.
pub struct Negotiator {
    role: Role,
    normalizer: SdpNormalizer,
    buffer: IceCandidateBuffer,
}

impl Negotiator {
    pub fn new(role: Role, normalizer: SdpNormalizer) -> Self {
        Self {
            role,
            normalizer,
            buffer: IceCandidateBuffer::default(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn buffered_candidates(&self) -> usize {
        self.buffer.len()
    }

    pub fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    /// Produces a new local offer. Returns `None` for a responder, or when
    /// the session is in the middle of another exchange.
    pub async fn create_offer(
        &mut self,
        peer: &PeerController,
        ice_restart: bool,
    ) -> Result<Option<Signal>, NegotiationError> {
        if !self.role.is_initiator() {
            debug!("Responder does not create offers");
            return Ok(None);
        }

        let state = peer.negotiation_state().await;
        if !state.accepts_new_offer() {
            debug!("Not creating an offer while {}", state);
            return Ok(None);
        }

        let session = peer.session();
        let offer = session
            .create_offer(ice_restart)
            .await
            .map_err(NegotiationError::CreateOffer)?;
        let offer = self.normalize(&offer);
        session
            .set_local_description(offer.clone())
            .await
            .map_err(NegotiationError::SetLocal)?;

        info!(
            "Created {}offer on session #{}",
            if ice_restart { "ICE-restart " } else { "" },
            peer.generation()
        );
        Ok(Some(Signal::Offer { sdp: offer }))
    }

    /// The offer still waiting for an answer, for a participant that may
    /// have missed it.
    pub async fn resend_pending_offer(&self, peer: &PeerController) -> Option<Signal> {
        if !self.role.is_initiator()
            || peer.negotiation_state().await != NegotiationState::HaveLocalOffer
        {
            return None;
        }
        let sdp = peer.session().local_description().await?;
        debug!("Re-sending pending offer of session #{}", peer.generation());
        Some(Signal::Offer { sdp })
    }

    /// Applies a remote offer and returns the answer to send.
    ///
    /// An initiator holding its own offer keeps it and drops the remote one.
    pub async fn process_offer(
        &mut self,
        peer: &PeerController,
        offer: SessionDescription,
    ) -> Result<Option<Signal>, NegotiationError> {
        let state = peer.negotiation_state().await;
        if self.role.is_initiator() && state == NegotiationState::HaveLocalOffer {
            warn!(
                "Offer collision on session #{}; keeping the local offer",
                peer.generation()
            );
            return Ok(None);
        }
        if !state.accepts_new_offer() {
            debug!("Ignoring offer received while {}", state);
            return Ok(None);
        }

        let offer = self.normalize(&offer);
        let session = peer.session();
        if state == NegotiationState::Stable
            && session
                .remote_description()
                .await
                .is_some_and(|current| current.sdp == offer.sdp)
        {
            debug!("Ignoring repeated offer on session #{}", peer.generation());
            return Ok(None);
        }

        session
            .set_remote_description(offer)
            .await
            .map_err(NegotiationError::SetRemote)?;
        self.flush_candidates(peer).await;

        let answer = session
            .create_answer()
            .await
            .map_err(NegotiationError::CreateAnswer)?;
        let answer = self.normalize(&answer);
        session
            .set_local_description(answer.clone())
            .await
            .map_err(NegotiationError::SetLocal)?;

        info!("Answered offer on session #{}", peer.generation());
        Ok(Some(Signal::Answer { sdp: answer }))
    }

    /// Applies a remote answer. Answers arriving outside `have-local-offer`
    /// are stale and ignored; returns whether the answer was applied.
    pub async fn process_answer(
        &mut self,
        peer: &PeerController,
        answer: SessionDescription,
    ) -> Result<bool, NegotiationError> {
        let state = peer.negotiation_state().await;
        if state != NegotiationState::HaveLocalOffer {
            debug!("Ignoring answer received while {}", state);
            return Ok(false);
        }

        peer.session()
            .set_remote_description(self.normalize(&answer))
            .await
            .map_err(NegotiationError::SetRemote)?;
        self.flush_candidates(peer).await;

        info!("Applied answer on session #{}", peer.generation());
        Ok(true)
    }

    /// Applies `candidate`, or buffers it until a remote description exists.
    pub async fn process_ice_candidate(
        &mut self,
        peer: &PeerController,
        candidate: IceCandidateRecord,
    ) {
        if !peer.session().has_remote_description().await {
            debug!("Buffering early ICE candidate");
            self.buffer.push(candidate);
            return;
        }
        add_candidate(peer, candidate).await;
    }

    async fn flush_candidates(&mut self, peer: &PeerController) {
        let pending = self.buffer.drain();
        if pending.is_empty() {
            return;
        }
        debug!("Flushing {} buffered ICE candidate(s)", pending.len());
        for candidate in pending {
            add_candidate(peer, candidate).await;
        }
    }

    fn normalize(&self, desc: &SessionDescription) -> SessionDescription {
        desc.with_sdp(self.normalizer.normalize(&desc.sdp))
    }
}

async fn add_candidate(peer: &PeerController, candidate: IceCandidateRecord) {
    let Err(e) = peer.session().add_ice_candidate(candidate).await else {
        return;
    };
    warn!(
        "Failed to add ICE candidate on session #{}: {}",
        peer.generation(),
        e
    );
}
