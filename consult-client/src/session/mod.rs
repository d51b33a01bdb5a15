use crate::config::ClientConfig;
use crate::error::CallError;
use crate::liveness::Presence;
use crate::media::{CaptureBackend, MediaManager, MediaQuality};
use crate::negotiation::Negotiator;
use crate::peer::{PeerController, PeerEvent, PeerFactory};
use crate::reconnect::ReconnectController;
use crate::sdp::SdpNormalizer;
use crate::signaling::{SignalOutbox, SignalPoller, SignalRelay};
use crate::status::{CallStatus, StatusSnapshot, project_status};
use crate::task::ScheduledTask;
use consult_core::{ConnectivityState, LaunchParams, NegotiationState, PeerId, Role, Signal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

mod call_handle;
mod handle_peer_event_impl;
mod handle_signal_impl;
mod recovery_impl;
mod session_command;
mod session_event;

pub use call_handle::*;
pub use session_command::*;
pub use session_event::*;

/// The collaborators a call runs against.
#[derive(Clone)]
pub struct CallServices {
    pub peers: Arc<dyn PeerFactory>,
    pub relay: Arc<dyn SignalRelay>,
    pub capture: Arc<dyn CaptureBackend>,
}

/// One call. Its `run` loop is the only place call state changes.
pub struct CallSession {
    params: LaunchParams,
    role: Role,
    config: ClientConfig,
    peers: Arc<dyn PeerFactory>,
    relay: Arc<dyn SignalRelay>,

    media: MediaManager,
    negotiator: Negotiator,
    poller: SignalPoller,
    presence: Presence,
    reconnect: ReconnectController,
    outbox: SignalOutbox,

    peer: Option<PeerController>,
    generation: u64,
    /// Set while a soft retry or reset is in flight.
    recovering: bool,
    /// Set between closing a session and opening its successor.
    resetting: bool,
    /// Signals that arrived while no peer session existed.
    deferred: Vec<Signal>,

    command_rx: mpsc::Receiver<SessionCommand>,
    peer_tx: mpsc::Sender<PeerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    timer_tx: mpsc::Sender<Timer>,
    timer_rx: mpsc::Receiver<Timer>,
    event_tx: mpsc::Sender<SessionEvent>,
    event_rx: mpsc::Receiver<SessionEvent>,
    status_tx: watch::Sender<StatusSnapshot>,

    token: CancellationToken,
    timers: Vec<ScheduledTask>,
    outcome: Option<Result<(), CallError>>,
    torn_down: bool,
}

impl CallSession {
    pub fn new(
        params: LaunchParams,
        config: ClientConfig,
        services: CallServices,
        command_rx: mpsc::Receiver<SessionCommand>,
        status_tx: watch::Sender<StatusSnapshot>,
    ) -> Self {
        let (peer_tx, peer_rx) = mpsc::channel(256);
        let (timer_tx, timer_rx) = mpsc::channel(16);
        let (event_tx, event_rx) = mpsc::channel(64);

        let role = params.role();
        let self_id = PeerId::new();
        let token = CancellationToken::new();

        let outbox = SignalOutbox::spawn(
            services.relay.clone(),
            params.room_id.clone(),
            self_id,
            token.child_token(),
        );

        info!(
            "Call session {} created for room {} as {}",
            self_id, params.room_id, role
        );

        Self {
            role,
            negotiator: Negotiator::new(role, SdpNormalizer::default()),
            poller: SignalPoller::new(self_id, role),
            presence: Presence::new(config.presence_timeout()),
            reconnect: ReconnectController::new(
                config.max_soft_retries,
                config.soft_retry_base(),
                config.media_grace(),
            ),
            media: MediaManager::new(services.capture),
            peers: services.peers,
            relay: services.relay,
            outbox,
            peer: None,
            generation: 0,
            recovering: false,
            resetting: false,
            deferred: Vec::new(),
            command_rx,
            peer_tx,
            peer_rx,
            timer_tx,
            timer_rx,
            event_tx,
            event_rx,
            status_tx,
            token,
            timers: Vec::new(),
            outcome: None,
            torn_down: false,
            params,
            config,
        }
    }

    pub async fn run(mut self) -> Result<(), CallError> {
        info!("Call event loop started");

        self.start().await;

        while self.outcome.is_none() {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Call handle dropped. Hanging up.");
                            self.finish(Ok(()));
                        }
                    }
                }

                Some(evt) = self.peer_rx.recv() => {
                    self.handle_peer_event(evt).await;
                }

                Some(timer) = self.timer_rx.recv() => {
                    self.handle_timer(timer).await;
                }

                Some(evt) = self.event_rx.recv() => {
                    self.handle_session_event(evt).await;
                }
            }
        }

        self.teardown().await;
        info!("Call event loop finished");

        self.outcome.take().unwrap_or(Ok(()))
    }

    async fn start(&mut self) {
        self.set_status(CallStatus::AcquiringMedia);

        let acquired = self
            .media
            .acquire(
                self.config.preferred_quality,
                self.params.is_admin,
                self.params.no_media,
                None,
            )
            .await;
        if let Err(e) = acquired {
            error!("Could not acquire local media: {}", e);
            self.finish(Err(e.into()));
            return;
        }

        self.generation = 1;
        let opened = PeerController::open(
            self.peers.as_ref(),
            self.generation,
            self.peer_tx.clone(),
            self.media.current(),
        )
        .await;
        match opened {
            Ok(peer) => self.peer = Some(peer),
            Err(e) => {
                error!("Could not open the peer session: {}", e);
                self.finish(Err(CallError::Peer(e)));
                return;
            }
        }

        self.start_timers();
        self.publish_status().await;

        if self.role.is_initiator() {
            self.send_offer(false).await;
        }
    }

    fn start_timers(&mut self) {
        let config = &self.config;
        self.timers = vec![
            ScheduledTask::spawn(
                "signal-poll",
                config.poll_interval(),
                Duration::ZERO,
                self.timer_tx.clone(),
                Timer::Poll,
                &self.token,
            ),
            ScheduledTask::spawn(
                "heartbeat",
                config.heartbeat_interval(),
                Duration::ZERO,
                self.timer_tx.clone(),
                Timer::Heartbeat,
                &self.token,
            ),
            ScheduledTask::spawn(
                "presence-check",
                config.presence_check_interval(),
                config.presence_check_interval(),
                self.timer_tx.clone(),
                Timer::Presence,
                &self.token,
            ),
        ];
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::HangUp => {
                info!("Hang-up requested for room {}", self.params.room_id);
                self.finish(Ok(()));
            }
            SessionCommand::ReacquireMedia(quality) => self.reacquire_media(quality).await,
        }
    }

    /// Swaps local media on a running call. The current tracks stay in use
    /// when nothing better can be opened.
    async fn reacquire_media(&mut self, quality: MediaQuality) {
        let acquired = self
            .media
            .acquire(
                quality,
                self.params.is_admin,
                self.params.no_media,
                self.peer.as_ref(),
            )
            .await;
        match acquired {
            Ok(media) => info!(
                "Local media switched to {} on session #{}",
                media.profile(),
                self.generation
            ),
            Err(e) => warn!("Keeping current local media: {}", e),
        }
        self.publish_status().await;
    }

    async fn handle_timer(&mut self, timer: Timer) {
        match timer {
            Timer::Poll => self.spawn_poll(),
            Timer::Heartbeat => {
                let heartbeat = self.presence.heartbeat(
                    tokio::time::Instant::now(),
                    self.role,
                    self.params.is_admin,
                );
                self.outbox.send(heartbeat);
            }
            Timer::Presence => {
                if self.presence.check(tokio::time::Instant::now()) {
                    self.publish_status().await;
                }
            }
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Fetched(Ok(batch)) => {
                for signal in self.poller.ingest(batch) {
                    self.handle_signal(signal).await;
                    if self.outcome.is_some() {
                        return;
                    }
                }
            }
            SessionEvent::Fetched(Err(e)) => {
                warn!("Signal poll failed, retrying on next tick: {}", e);
            }
            SessionEvent::SoftRetryDue {
                generation,
                attempt,
            } => self.on_soft_retry_due(generation, attempt).await,
            SessionEvent::MediaCheckDue { generation } => {
                self.on_media_check_due(generation).await
            }
            SessionEvent::ResetReady { generation } => self.on_reset_ready(generation).await,
        }
    }

    /// Fetches in the background so a slow relay never delays later ticks.
    fn spawn_poll(&self) {
        let relay = self.relay.clone();
        let room = self.params.room_id.clone();
        let since_id = self.poller.since_id();
        let tx = self.event_tx.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                result = relay.fetch(&room, since_id) => {
                    let _ = tx.send(SessionEvent::Fetched(result)).await;
                }
            }
        });
    }

    /// Creates an offer and sends it. A failure resets the peer session.
    async fn send_offer(&mut self, ice_restart: bool) {
        let Some(peer) = self.peer.as_ref() else {
            return;
        };
        match self.negotiator.create_offer(peer, ice_restart).await {
            Ok(Some(offer)) => self.outbox.send(offer),
            Ok(None) => {}
            Err(e) => {
                warn!("Offer failed on session #{}: {}", self.generation, e);
                self.full_reset().await;
            }
        }
    }

    fn finish(&mut self, outcome: Result<(), CallError>) {
        if self.outcome.is_none() {
            self.outcome = Some(outcome);
        }
    }

    /// Releases timers, media, and the peer session. Runs once.
    async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;

        self.token.cancel();
        self.timers.clear();
        self.media.stop();
        self.negotiator.clear_buffer();
        self.deferred.clear();

        if let Some(mut peer) = self.peer.take() {
            if let Err(e) = peer.close().await {
                warn!("Error while closing peer session: {}", e);
            }
        }

        let status = match &self.outcome {
            Some(Err(e)) => CallStatus::Failed(e.to_string()),
            _ => CallStatus::Ended,
        };
        self.set_status(status);
        info!("Call in room {} torn down", self.params.room_id);
    }

    async fn publish_status(&self) {
        let (negotiation, connectivity, remote_tracks) = match &self.peer {
            Some(peer) => (
                peer.negotiation_state().await,
                peer.connectivity(),
                peer.remote_track_count(),
            ),
            None => (NegotiationState::Idle, ConnectivityState::New, 0),
        };
        let status = project_status(
            connectivity,
            remote_tracks,
            self.presence.participant_ready(),
            self.recovering,
        );
        self.publish(StatusSnapshot {
            status,
            participant_ready: self.presence.participant_ready(),
            negotiation,
            connectivity,
            remote_tracks,
            reconnect_attempts: self.reconnect.attempts(),
            media: self.media.profile(),
        });
    }

    /// Publishes `status` with the rest of the snapshot unchanged.
    fn set_status(&self, status: CallStatus) {
        let mut snapshot = self.status_tx.borrow().clone();
        snapshot.status = status;
        snapshot.media = self.media.profile();
        if self.torn_down {
            snapshot.connectivity = ConnectivityState::Closed;
            snapshot.remote_tracks = 0;
        }
        self.publish(snapshot);
    }

    fn publish(&self, snapshot: StatusSnapshot) {
        self.status_tx.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            if current.status != snapshot.status {
                info!("Call status: {}", snapshot.status);
            }
            *current = snapshot;
            true
        });
    }
}
