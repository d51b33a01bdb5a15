use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("at least one STUN server is required")]
    MissingStun,

    #[error("at least one TURN server is required")]
    MissingTurn,

    #[error("TURN server {0} has no username/credential; provide them via config or environment")]
    MissingTurnCredentials(String),

    #[error("relay url is empty")]
    MissingRelayUrl,
}

/// A single capture attempt failed. Recovered by the next fallback tier.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device unavailable: {0}")]
    Unavailable(String),

    #[error("capture permission denied: {0}")]
    Denied(String),
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no capture profile could be opened (last error: {0})")]
    Exhausted(#[source] CaptureError),

    #[error("failed to bind local media into the peer session: {0}")]
    Bind(#[source] PeerError),
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error(transparent)]
    WebRtc(#[from] webrtc::Error),

    #[error("peer session is closed")]
    Closed,

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("failed to create offer: {0}")]
    CreateOffer(#[source] PeerError),

    #[error("failed to create answer: {0}")]
    CreateAnswer(#[source] PeerError),

    #[error("failed to set local description: {0}")]
    SetLocal(#[source] PeerError),

    #[error("failed to set remote description: {0}")]
    SetRemote(#[source] PeerError),
}

impl NegotiationError {
    /// The peer-session failure behind this step.
    pub fn into_peer_error(self) -> PeerError {
        match self {
            Self::CreateOffer(e) | Self::CreateAnswer(e) | Self::SetLocal(e) | Self::SetRemote(e) => e,
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("relay rejected the request: {0}")]
    Rejected(String),

    #[error("failed to encode signal: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("relay is unreachable: {0}")]
    Unreachable(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            Self::Unreachable(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

/// Errors that end a call.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("media acquisition failed: {0}")]
    Media(#[from] MediaError),

    #[error("failed to open peer session: {0}")]
    Peer(#[source] PeerError),

    #[error("connection could not be re-established: {0}")]
    ResetFailed(#[source] PeerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("call task ended abnormally: {0}")]
    Task(#[from] tokio::task::JoinError),
}
