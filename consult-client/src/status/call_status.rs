use crate::media::MediaProfile;
use consult_core::{ConnectivityState, NegotiationState};
use std::fmt;

/// User-facing call status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallStatus {
    Initializing,
    AcquiringMedia,
    WaitingForParticipant,
    Connecting,
    Connected,
    Reconnecting,
    Ended,
    Failed(String),
}

impl CallStatus {
    /// Whether the call is over, for good or bad.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Ended | Self::Failed(_))
    }
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initializing => f.write_str("initializing"),
            Self::AcquiringMedia => f.write_str("acquiring media"),
            Self::WaitingForParticipant => f.write_str("waiting for participant"),
            Self::Connecting => f.write_str("connecting"),
            Self::Connected => f.write_str("connection established"),
            Self::Reconnecting => f.write_str("reconnecting…"),
            Self::Ended => f.write_str("call ended"),
            Self::Failed(message) => write!(f, "error: {}", message),
        }
    }
}

/// Everything the UI gets to see of a running call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: CallStatus,
    pub participant_ready: bool,
    pub negotiation: NegotiationState,
    pub connectivity: ConnectivityState,
    pub remote_tracks: usize,
    pub reconnect_attempts: u32,
    pub media: Option<MediaProfile>,
}

impl Default for StatusSnapshot {
    fn default() -> Self {
        Self {
            status: CallStatus::Initializing,
            participant_ready: false,
            negotiation: NegotiationState::Idle,
            connectivity: ConnectivityState::New,
            remote_tracks: 0,
            reconnect_attempts: 0,
            media: None,
        }
    }
}

/// Status of a live call, derived from what the session currently knows.
/// `recovering` is set while a reset or soft retry is in flight.
pub fn project_status(
    connectivity: ConnectivityState,
    remote_tracks: usize,
    participant_ready: bool,
    recovering: bool,
) -> CallStatus {
    if connectivity.is_connected() && remote_tracks > 0 {
        return CallStatus::Connected;
    }
    if recovering
        || matches!(
            connectivity,
            ConnectivityState::Disconnected | ConnectivityState::Failed
        )
    {
        return CallStatus::Reconnecting;
    }
    if !participant_ready {
        return CallStatus::WaitingForParticipant;
    }
    CallStatus::Connecting
}
