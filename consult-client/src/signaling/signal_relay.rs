use crate::error::RelayError;
use async_trait::async_trait;
use consult_core::{RelayedSignal, RoomId};

/// The message relay both participants of a room talk through.
#[async_trait]
pub trait SignalRelay: Send + Sync {
    /// Store one JSON-encoded signal for the room.
    async fn push(&self, room: &RoomId, data: String) -> Result<(), RelayError>;

    /// Signals of the room with an id greater than `since_id`, ascending.
    async fn fetch(&self, room: &RoomId, since_id: u64) -> Result<Vec<RelayedSignal>, RelayError>;
}
