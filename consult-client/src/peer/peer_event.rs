use crate::media::TrackKind;
use consult_core::{ConnectivityState, IceCandidateRecord, NegotiationState};

/// Transitions reported by a peer session. The first field is the generation
/// of the session that produced the event, so events of a replaced session
/// can be told apart and dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    CandidateGenerated(u64, IceCandidateRecord),
    IceConnectionChanged(u64, ConnectivityState),
    NegotiationNeeded(u64),
    SignalingChanged(u64, NegotiationState),
    RemoteTrackAdded(u64, String, TrackKind),
}

impl PeerEvent {
    pub fn generation(&self) -> u64 {
        match self {
            Self::CandidateGenerated(g, _)
            | Self::IceConnectionChanged(g, _)
            | Self::NegotiationNeeded(g)
            | Self::SignalingChanged(g, _)
            | Self::RemoteTrackAdded(g, _, _) => *g,
        }
    }
}
