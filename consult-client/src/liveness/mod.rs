mod presence;

pub use presence::*;
