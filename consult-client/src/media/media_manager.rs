use crate::error::{CaptureError, MediaError};
use crate::media::{CaptureBackend, LocalMedia, MediaProfile, MediaQuality};
use crate::peer::PeerController;
use std::sync::Arc;
use tracing::{info, warn};

/// Holds the call's local media and walks the capture fallback ladder.
pub struct MediaManager {
    backend: Arc<dyn CaptureBackend>,
    current: Option<LocalMedia>,
}

impl MediaManager {
    pub fn new(backend: Arc<dyn CaptureBackend>) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    /// Opens the best profile the backend can provide, starting at
    /// `preferred`. The placeholder tier is only reachable for
    /// administrators; `no_media` jumps straight to it.
    ///
    /// The previous media is stopped once the new one is in place, and the
    /// new tracks are bound into `peer` when given.
    pub async fn acquire(
        &mut self,
        preferred: MediaQuality,
        is_admin: bool,
        no_media: bool,
        peer: Option<&PeerController>,
    ) -> Result<&LocalMedia, MediaError> {
        let chain = if no_media && is_admin {
            vec![MediaProfile::Placeholder]
        } else {
            if no_media {
                warn!("Ignoring no-media request from a non-administrator");
            }
            MediaProfile::fallback_chain(preferred, is_admin)
        };

        let media = self.open_first(&chain).await?;
        info!("Local media acquired: {}", media.profile());

        if let Some(peer) = peer {
            peer.bind_local_media(&media)
                .await
                .map_err(MediaError::Bind)?;
        }

        if let Some(old) = self.current.take() {
            old.stop();
        }
        Ok(&*self.current.insert(media))
    }

    async fn open_first(&self, chain: &[MediaProfile]) -> Result<LocalMedia, MediaError> {
        let mut last_error = CaptureError::Unavailable("no capture profile to try".to_owned());

        for &profile in chain {
            if profile == MediaProfile::Placeholder {
                return Ok(LocalMedia::placeholder());
            }
            match self.backend.open(profile, &profile.constraints()).await {
                Ok(media) => return Ok(media),
                Err(e) => {
                    warn!("Capture with profile '{}' failed: {}", profile, e);
                    last_error = e;
                }
            }
        }

        Err(MediaError::Exhausted(last_error))
    }

    pub fn current(&self) -> Option<&LocalMedia> {
        self.current.as_ref()
    }

    pub fn profile(&self) -> Option<MediaProfile> {
        self.current.as_ref().map(LocalMedia::profile)
    }

    /// Stops and releases the held tracks.
    pub fn stop(&mut self) {
        if let Some(media) = self.current.take() {
            media.stop();
            info!("Local media stopped");
        }
    }
}
