use crate::signaling::SignalRelay;
use consult_core::{PeerId, RoomId, Signal, SignalEnvelope};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Pushes outbound signals one at a time, in the order they were queued.
pub struct SignalOutbox {
    tx: mpsc::UnboundedSender<Signal>,
    task: JoinHandle<()>,
}

impl SignalOutbox {
    pub fn spawn(
        relay: Arc<dyn SignalRelay>,
        room: RoomId,
        from: PeerId,
        token: CancellationToken,
    ) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Signal>();

        let task = tokio::spawn(async move {
            loop {
                let signal = tokio::select! {
                    _ = token.cancelled() => break,
                    signal = rx.recv() => match signal {
                        Some(s) => s,
                        None => break,
                    },
                };

                let kind = signal.kind();
                let data = match SignalEnvelope::new(signal, from).to_json() {
                    Ok(data) => data,
                    Err(e) => {
                        warn!("Failed to encode {} signal: {}", kind, e);
                        continue;
                    }
                };

                match relay.push(&room, data).await {
                    Ok(()) => debug!("Sent {} signal to room {}", kind, room),
                    Err(e) => warn!("Failed to send {} signal to room {}: {}", kind, room, e),
                }
            }
            debug!("Signal outbox for room {} stopped", room);
        });

        Self { tx, task }
    }

    /// Queues `signal`. Never waits on the relay.
    pub fn send(&self, signal: Signal) {
        if self.tx.send(signal).is_err() {
            warn!("Signal outbox is closed; signal dropped");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
