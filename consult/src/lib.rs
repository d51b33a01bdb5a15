pub use consult_core::model::{LaunchParams, PeerId, RoomId};

pub mod model {
    pub use consult_core::model::*;
    pub use consult_core::utils;
}

#[cfg(feature = "client")]
pub mod client {
    pub use consult_client::*;
}
