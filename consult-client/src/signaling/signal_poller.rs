use crate::signaling::ProcessedSignals;
use consult_core::{PeerId, RelayedSignal, Role, Signal, SignalEnvelope};
use tracing::{debug, trace, warn};

/// Turns relay batches into the ordered list of signals still to apply.
#[derive(Debug)]
pub struct SignalPoller {
    since_id: u64,
    processed: ProcessedSignals,
    self_id: PeerId,
    role: Role,
}

impl SignalPoller {
    pub fn new(self_id: PeerId, role: Role) -> Self {
        Self {
            since_id: 0,
            processed: ProcessedSignals::new(),
            self_id,
            role,
        }
    }

    /// Highest relay id seen so far; the next fetch asks for newer ones.
    pub fn since_id(&self) -> u64 {
        self.since_id
    }

    pub fn processed(&self) -> &ProcessedSignals {
        &self.processed
    }

    /// Decodes `batch` in arrival order, dropping ids already applied, our
    /// own echoed signals and payloads that do not decode. The cursor
    /// advances past everything in the batch either way.
    pub fn ingest(&mut self, batch: Vec<RelayedSignal>) -> Vec<Signal> {
        let mut fresh = Vec::with_capacity(batch.len());

        for relayed in batch {
            self.since_id = self.since_id.max(relayed.id);

            if !self.processed.insert(relayed.id) {
                trace!("Signal {} already processed", relayed.id);
                continue;
            }

            let envelope = match SignalEnvelope::from_json(&relayed.data) {
                Ok(envelope) => envelope,
                Err(e) => {
                    warn!("Dropping undecodable signal {}: {}", relayed.id, e);
                    continue;
                }
            };

            if self.is_echo(&envelope) {
                trace!("Skipping own {} signal {}", envelope.signal.kind(), relayed.id);
                continue;
            }

            debug!("Received {} signal {}", envelope.signal.kind(), relayed.id);
            fresh.push(envelope.signal);
        }

        fresh
    }

    fn is_echo(&self, envelope: &SignalEnvelope) -> bool {
        match (&envelope.from, &envelope.signal) {
            (Some(from), _) => *from == self.self_id,
            (None, Signal::Heartbeat { is_initiator, .. }) => {
                *is_initiator == self.role.is_initiator()
            }
            (None, _) => false,
        }
    }
}
