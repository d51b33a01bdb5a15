use crate::error::RelayError;
use crate::signaling::SignalRelay;
use async_trait::async_trait;
use consult_core::{RelayedSignal, RoomId};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::trace;

/// Relay client over the `POST /signal` and `GET /signals` endpoints.
#[derive(Debug, Clone)]
pub struct HttpRelay {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    room_id: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FetchResponse {
    success: bool,
    #[serde(default)]
    signals: Vec<RelayedSignal>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpRelay {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl SignalRelay for HttpRelay {
    async fn push(&self, room: &RoomId, data: String) -> Result<(), RelayError> {
        let response: PushResponse = self
            .client
            .post(format!("{}/signal", self.base_url))
            .json(&PushRequest {
                room_id: room.as_str(),
                data,
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            return Err(RelayError::Rejected(response.message.unwrap_or_default()));
        }
        trace!("Signal stored for room {}", room);
        Ok(())
    }

    async fn fetch(&self, room: &RoomId, since_id: u64) -> Result<Vec<RelayedSignal>, RelayError> {
        let response: FetchResponse = self
            .client
            .get(format!("{}/signals", self.base_url))
            .query(&[("room_id", room.as_str().to_owned()), ("since_id", since_id.to_string())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if !response.success {
            return Err(RelayError::Rejected(response.message.unwrap_or_default()));
        }
        Ok(response.signals)
    }
}
