mod peer_controller;
mod peer_event;
mod peer_session;
mod remote_stream;
mod rtc_session;

pub use peer_controller::*;
pub use peer_event::*;
pub use peer_session::*;
pub use remote_stream::*;
pub use rtc_session::*;
