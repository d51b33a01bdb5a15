use crate::error::RelayError;
use consult_core::RelayedSignal;

/// Periodic ticks posted by the session timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Poll,
    Heartbeat,
    Presence,
}

/// Results of background work and delayed actions, fed back into the
/// session loop. Delayed actions carry the peer generation they were
/// scheduled for.
#[derive(Debug)]
pub enum SessionEvent {
    Fetched(Result<Vec<RelayedSignal>, RelayError>),
    SoftRetryDue { generation: u64, attempt: u32 },
    MediaCheckDue { generation: u64 },
    ResetReady { generation: u64 },
}
