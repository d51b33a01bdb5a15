use crate::error::CallError;
use crate::peer::PeerController;
use crate::reconnect::ReconnectAction;
use crate::session::{CallSession, SessionEvent};
use crate::status::CallStatus;
use crate::task::schedule_once;
use tracing::{debug, error, info, warn};

impl CallSession {
    pub(super) async fn on_soft_retry_due(&mut self, generation: u64, attempt: u32) {
        let Some(peer) = self.peer.as_ref() else {
            return;
        };
        if generation != peer.generation() {
            return;
        }
        if peer.connectivity().is_connected() {
            debug!("Soft retry {} not needed; connection is back", attempt);
            self.recovering = false;
            self.publish_status().await;
            return;
        }
        if !self.role.is_initiator() {
            debug!("Soft retry {}: waiting for the initiator to restart ICE", attempt);
            return;
        }

        info!("Soft retry {}: restarting ICE on session #{}", attempt, generation);
        match self.negotiator.create_offer(peer, true).await {
            Ok(Some(offer)) => self.outbox.send(offer),
            Ok(None) => {
                if let Some(offer) = self.negotiator.resend_pending_offer(peer).await {
                    self.outbox.send(offer);
                }
            }
            Err(e) => {
                warn!("ICE-restart offer failed: {}", e);
                self.full_reset().await;
            }
        }
    }

    pub(super) async fn on_media_check_due(&mut self, generation: u64) {
        let Some(peer) = self.peer.as_ref() else {
            return;
        };
        if generation != peer.generation() {
            return;
        }
        let action = self
            .reconnect
            .on_media_check(peer.connectivity(), peer.remote_track_count());
        if action != ReconnectAction::Nothing {
            self.apply_reconnect_action(action).await;
            self.publish_status().await;
        }
    }

    /// Closes the current peer session and schedules its replacement once
    /// the settle delay has passed.
    pub(super) async fn full_reset(&mut self) {
        if self.resetting {
            return;
        }
        self.resetting = true;
        self.recovering = true;

        info!("Resetting peer session #{}", self.generation);
        if let Some(mut peer) = self.peer.take() {
            if let Err(e) = peer.close().await {
                warn!("Error while closing peer session #{}: {}", self.generation, e);
            }
        }
        self.negotiator.clear_buffer();
        self.set_status(CallStatus::Reconnecting);

        schedule_once(
            self.config.reset_settle(),
            self.event_tx.clone(),
            SessionEvent::ResetReady {
                generation: self.generation,
            },
            &self.token,
        );
    }

    pub(super) async fn on_reset_ready(&mut self, generation: u64) {
        if generation != self.generation || !self.resetting {
            return;
        }
        self.generation += 1;

        let opened = PeerController::open(
            self.peers.as_ref(),
            self.generation,
            self.peer_tx.clone(),
            self.media.current(),
        )
        .await;
        let peer = match opened {
            Ok(peer) => peer,
            Err(e) => {
                error!("Could not re-create the peer session: {}", e);
                self.finish(Err(CallError::ResetFailed(e)));
                return;
            }
        };
        self.peer = Some(peer);
        self.resetting = false;
        info!("Peer session #{} ready", self.generation);

        if self.role.is_initiator() {
            let Some(peer) = self.peer.as_ref() else {
                return;
            };
            match self.negotiator.create_offer(peer, false).await {
                Ok(Some(offer)) => self.outbox.send(offer),
                Ok(None) => {}
                Err(e) => {
                    error!("Offer on the new peer session failed: {}", e);
                    self.finish(Err(CallError::ResetFailed(e.into_peer_error())));
                    return;
                }
            }
        }

        for signal in std::mem::take(&mut self.deferred) {
            self.dispatch_signal(signal, false).await;
            if self.outcome.is_some() {
                return;
            }
        }
        self.publish_status().await;
    }
}
