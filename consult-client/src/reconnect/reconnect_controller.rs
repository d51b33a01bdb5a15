use consult_core::ConnectivityState;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// What the session should do after a connectivity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectAction {
    Nothing,
    /// Renegotiate after `delay` unless the connection recovers first.
    SoftRetry { attempt: u32, delay: Duration },
    /// Tear the peer session down and build a new one.
    FullReset,
    /// Connected but no remote media yet; look again after the delay.
    VerifyMediaAfter(Duration),
    /// Back to connected with remote media.
    Recovered,
}

/// Bounded recovery policy for one call.
#[derive(Debug)]
pub struct ReconnectController {
    attempts: u32,
    max_attempts: u32,
    base_delay: Duration,
    media_grace: Duration,
    last_failure: Option<Instant>,
}

impl ReconnectController {
    pub fn new(max_attempts: u32, base_delay: Duration, media_grace: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_delay,
            media_grace,
            last_failure: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_failure(&self) -> Option<Instant> {
        self.last_failure
    }

    pub fn on_connectivity(&mut self, state: ConnectivityState, remote_tracks: usize) -> ReconnectAction {
        match state {
            ConnectivityState::Disconnected => {
                self.last_failure = Some(Instant::now());
                if self.attempts >= self.max_attempts {
                    warn!(
                        "Still disconnected after {} soft retries; resetting",
                        self.attempts
                    );
                    return ReconnectAction::FullReset;
                }
                self.attempts += 1;
                let delay = self.base_delay * self.attempts;
                info!(
                    "Disconnected; soft retry {}/{} in {:?}",
                    self.attempts, self.max_attempts, delay
                );
                ReconnectAction::SoftRetry {
                    attempt: self.attempts,
                    delay,
                }
            }
            ConnectivityState::Failed => {
                self.last_failure = Some(Instant::now());
                warn!("Connection failed; resetting");
                ReconnectAction::FullReset
            }
            ConnectivityState::Connected | ConnectivityState::Completed => {
                if remote_tracks > 0 {
                    self.recovered()
                } else {
                    ReconnectAction::VerifyMediaAfter(self.media_grace)
                }
            }
            _ => ReconnectAction::Nothing,
        }
    }

    /// Follow-up of `VerifyMediaAfter`: connected without remote media is a
    /// silent failure.
    pub fn on_media_check(&mut self, state: ConnectivityState, remote_tracks: usize) -> ReconnectAction {
        if !state.is_connected() {
            return ReconnectAction::Nothing;
        }
        if remote_tracks > 0 {
            return self.recovered();
        }
        self.last_failure = Some(Instant::now());
        warn!("Connected without remote media; resetting");
        ReconnectAction::FullReset
    }

    fn recovered(&mut self) -> ReconnectAction {
        if self.attempts > 0 {
            info!("Connection re-established after {} attempt(s)", self.attempts);
        }
        self.attempts = 0;
        ReconnectAction::Recovered
    }
}
