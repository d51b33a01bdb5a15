mod launch;
mod peer;
mod room;
mod signaling;
mod state;

pub use launch::{LaunchParams, Role};
pub use peer::PeerId;
pub use room::RoomId;
pub use signaling::{
    IceCandidateRecord, IceServerConfig, RelayedSignal, SdpKind, SessionDescription, Signal,
    SignalEnvelope,
};
pub use state::{ConnectivityState, NegotiationState};
