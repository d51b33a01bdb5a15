mod ice_buffer;
mod negotiator;

pub use ice_buffer::*;
pub use negotiator::*;
