pub mod config;
pub mod error;
pub mod liveness;
pub mod media;
pub mod negotiation;
pub mod peer;
pub mod reconnect;
pub mod sdp;
pub mod session;
pub mod signaling;
pub mod status;
pub mod task;

pub use config::*;
pub use error::*;
pub use liveness::*;
pub use media::*;
pub use negotiation::*;
pub use peer::*;
pub use reconnect::*;
pub use sdp::*;
pub use session::*;
pub use signaling::*;
pub use status::*;
pub use task::*;
