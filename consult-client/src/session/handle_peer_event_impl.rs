use crate::peer::PeerEvent;
use crate::reconnect::ReconnectAction;
use crate::session::{CallSession, SessionEvent};
use crate::task::schedule_once;
use consult_core::{NegotiationState, Signal};
use tracing::{debug, info, trace};

impl CallSession {
    pub(super) async fn handle_peer_event(&mut self, event: PeerEvent) {
        let Some(peer) = self.peer.as_mut() else {
            trace!("Peer event without a session: {:?}", event);
            return;
        };
        if event.generation() != peer.generation() {
            trace!("Dropping event of superseded session: {:?}", event);
            return;
        }

        match event {
            PeerEvent::CandidateGenerated(_, candidate) => {
                self.outbox.send(Signal::IceCandidate { candidate });
                return;
            }

            PeerEvent::IceConnectionChanged(_, state) => {
                info!("Session #{} is {}", peer.generation(), state);
                peer.set_connectivity(state);
                let action = self
                    .reconnect
                    .on_connectivity(state, peer.remote_track_count());
                self.apply_reconnect_action(action).await;
            }

            PeerEvent::NegotiationNeeded(_) => {
                if self.role.is_initiator()
                    && peer.negotiation_state().await == NegotiationState::Stable
                {
                    debug!("Renegotiating session #{}", peer.generation());
                    self.send_offer(false).await;
                }
            }

            PeerEvent::SignalingChanged(_, state) => {
                debug!("Session #{} negotiation is {}", peer.generation(), state);
            }

            PeerEvent::RemoteTrackAdded(_, track_id, kind) => {
                let added = peer.on_remote_track(&track_id, kind);
                let connectivity = peer.connectivity();
                if added && connectivity.is_connected() {
                    let action = self
                        .reconnect
                        .on_connectivity(connectivity, peer.remote_track_count());
                    self.apply_reconnect_action(action).await;
                }
            }
        }

        self.publish_status().await;
    }

    pub(super) async fn apply_reconnect_action(&mut self, action: ReconnectAction) {
        match action {
            ReconnectAction::Nothing => {}
            ReconnectAction::SoftRetry { attempt, delay } => {
                self.recovering = true;
                schedule_once(
                    delay,
                    self.event_tx.clone(),
                    SessionEvent::SoftRetryDue {
                        generation: self.generation,
                        attempt,
                    },
                    &self.token,
                );
            }
            ReconnectAction::FullReset => self.full_reset().await,
            ReconnectAction::VerifyMediaAfter(grace) => {
                schedule_once(
                    grace,
                    self.event_tx.clone(),
                    SessionEvent::MediaCheckDue {
                        generation: self.generation,
                    },
                    &self.token,
                );
            }
            ReconnectAction::Recovered => self.recovering = false,
        }
    }
}
