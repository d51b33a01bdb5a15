mod http_relay;
mod processed_signals;
mod signal_outbox;
mod signal_poller;
mod signal_relay;

pub use http_relay::*;
pub use processed_signals::*;
pub use signal_outbox::*;
pub use signal_poller::*;
pub use signal_relay::*;
