use crate::session::CallSession;
use consult_core::Signal;
use tokio::time::Instant;
use tracing::{debug, info, warn};

impl CallSession {
    pub(super) async fn handle_signal(&mut self, signal: Signal) {
        self.dispatch_signal(signal, true).await;
        self.publish_status().await;
    }

    /// Applies one decoded signal. With `retry_after_reset`, an offer that
    /// breaks the session is replayed on its successor.
    pub(super) async fn dispatch_signal(&mut self, signal: Signal, retry_after_reset: bool) {
        if let Signal::Heartbeat { is_admin, .. } = signal {
            if self.presence.on_heartbeat(Instant::now()) {
                info!(
                    "Participant joined room {}{}",
                    self.params.room_id,
                    if is_admin { " (administrator)" } else { "" }
                );
                self.on_participant_arrived().await;
            }
            return;
        }

        let Some(peer) = self.peer.as_ref() else {
            debug!("No peer session yet; deferring {} signal", signal.kind());
            self.deferred.push(signal);
            return;
        };

        match signal {
            Signal::Offer { sdp } => {
                let replay = retry_after_reset.then(|| sdp.clone());
                match self.negotiator.process_offer(peer, sdp).await {
                    Ok(Some(answer)) => self.outbox.send(answer),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to apply offer on session #{}: {}", self.generation, e);
                        if let Some(sdp) = replay {
                            self.deferred.push(Signal::Offer { sdp });
                        }
                        self.full_reset().await;
                    }
                }
            }
            Signal::Answer { sdp } => {
                if let Err(e) = self.negotiator.process_answer(peer, sdp).await {
                    warn!("Failed to apply answer on session #{}: {}", self.generation, e);
                    self.full_reset().await;
                }
            }
            Signal::IceCandidate { candidate } => {
                self.negotiator.process_ice_candidate(peer, candidate).await;
            }
            Signal::Heartbeat { .. } => {}
        }
    }

    /// An initiator that is not connected yet makes sure the newcomer gets
    /// an offer: the pending one while it awaits an answer, otherwise a
    /// fresh one. A rejoining responder has lost the previous exchange.
    async fn on_participant_arrived(&mut self) {
        if !self.role.is_initiator() {
            return;
        }
        let Some(peer) = self.peer.as_ref() else {
            return;
        };
        if peer.connectivity().is_connected() {
            return;
        }

        if let Some(offer) = self.negotiator.resend_pending_offer(peer).await {
            self.outbox.send(offer);
            return;
        }
        debug!(
            "Participant arrived while session #{} is {}; sending a fresh offer",
            self.generation,
            peer.connectivity()
        );
        self.send_offer(false).await;
    }
}
