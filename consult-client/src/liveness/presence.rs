use consult_core::{Role, Signal};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;
use tracing::info;

/// Heartbeat bookkeeping. `participant_ready` holds only while the last
/// heartbeat from the other side is at most `timeout` old.
#[derive(Debug)]
pub struct Presence {
    last_sent: Option<Instant>,
    last_received: Option<Instant>,
    participant_ready: bool,
    timeout: Duration,
}

impl Presence {
    pub fn new(timeout: Duration) -> Self {
        Self {
            last_sent: None,
            last_received: None,
            participant_ready: false,
            timeout,
        }
    }

    pub fn participant_ready(&self) -> bool {
        self.participant_ready
    }

    pub fn last_sent(&self) -> Option<Instant> {
        self.last_sent
    }

    pub fn last_received(&self) -> Option<Instant> {
        self.last_received
    }

    /// Builds the next heartbeat and records when it went out.
    pub fn heartbeat(&mut self, now: Instant, role: Role, is_admin: bool) -> Signal {
        self.last_sent = Some(now);
        Signal::Heartbeat {
            timestamp: unix_millis(),
            is_admin,
            is_initiator: role.is_initiator(),
        }
    }

    /// Records a heartbeat from the participant. Returns true when this
    /// makes the participant ready.
    pub fn on_heartbeat(&mut self, now: Instant) -> bool {
        self.last_received = Some(now);
        if self.participant_ready {
            return false;
        }
        self.participant_ready = true;
        info!("Participant is present");
        true
    }

    /// Returns true when the participant has just gone silent.
    pub fn check(&mut self, now: Instant) -> bool {
        if !self.participant_ready {
            return false;
        }
        let silent = self
            .last_received
            .is_none_or(|at| now.saturating_duration_since(at) > self.timeout);
        if silent {
            self.participant_ready = false;
            info!("No heartbeat for {:?}; participant considered gone", self.timeout);
        }
        silent
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
