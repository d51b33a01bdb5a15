use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Negotiation role, fixed for the lifetime of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The party that created the room. Only the initiator produces offers.
    Initiator,
    Responder,
}

impl Role {
    pub fn from_initiator_flag(is_initiator: bool) -> Self {
        if is_initiator {
            Self::Initiator
        } else {
            Self::Responder
        }
    }

    pub fn is_initiator(self) -> bool {
        matches!(self, Self::Initiator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initiator => f.write_str("initiator"),
            Self::Responder => f.write_str("responder"),
        }
    }
}

/// Parameters handed over by the application that launches a call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub room_id: RoomId,
    pub is_initiator: bool,
    pub is_admin: bool,
    /// Join without camera or microphone. Honoured for administrators only.
    pub no_media: bool,
}

impl LaunchParams {
    pub fn new(room_id: impl Into<RoomId>, is_initiator: bool) -> Self {
        Self {
            room_id: room_id.into(),
            is_initiator,
            is_admin: false,
            no_media: false,
        }
    }

    pub fn admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn no_media(mut self, no_media: bool) -> Self {
        self.no_media = no_media;
        self
    }

    pub fn role(&self) -> Role {
        Role::from_initiator_flag(self.is_initiator)
    }
}
