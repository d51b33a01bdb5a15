use crate::error::CaptureError;
use crate::media::{CaptureBackend, LocalMedia, LocalTrack, MediaConstraints, MediaProfile, TrackKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Opus frame that decodes to 20 ms of silence.
const OPUS_SILENCE_FRAME: [u8; 3] = [0xf8, 0xff, 0xfe];
const AUDIO_FRAME: Duration = Duration::from_millis(20);

static NEXT_TRACK: AtomicU64 = AtomicU64::new(1);

/// Capture backend for hosts without camera or microphone access: real
/// sendable tracks, with the audio one fed Opus silence so the remote side
/// sees media flowing.
#[derive(Debug, Clone)]
pub struct SyntheticCapture {
    stream_id: String,
}

impl SyntheticCapture {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }

    fn track(&self, kind: TrackKind) -> Arc<TrackLocalStaticSample> {
        let n = NEXT_TRACK.fetch_add(1, Ordering::Relaxed);
        let capability = match kind {
            TrackKind::Audio => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            TrackKind::Video => RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                clock_rate: 90000,
                ..Default::default()
            },
        };
        Arc::new(TrackLocalStaticSample::new(
            capability,
            format!("{}-{}", kind, n),
            self.stream_id.clone(),
        ))
    }
}

impl Default for SyntheticCapture {
    fn default() -> Self {
        Self::new("consult-local")
    }
}

#[async_trait]
impl CaptureBackend for SyntheticCapture {
    async fn open(
        &self,
        profile: MediaProfile,
        constraints: &MediaConstraints,
    ) -> Result<LocalMedia, CaptureError> {
        let feed = CancellationToken::new();
        let mut tracks = Vec::new();

        if constraints.audio.is_some() {
            let audio = self.track(TrackKind::Audio);
            spawn_silence_feed(audio.clone(), feed.clone());
            tracks.push(LocalTrack::new(TrackKind::Audio, audio));
        }
        if let Some(video) = constraints.video {
            debug!(
                "Synthetic video track {}x{}@{}",
                video.width, video.height, video.frame_rate
            );
            tracks.push(LocalTrack::new(TrackKind::Video, self.track(TrackKind::Video)));
        }

        if tracks.is_empty() {
            return Err(CaptureError::Unavailable(format!(
                "profile '{}' requests no devices",
                profile
            )));
        }

        Ok(LocalMedia::new(profile, tracks, feed))
    }
}

fn spawn_silence_feed(track: Arc<TrackLocalStaticSample>, feed: CancellationToken) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(AUDIO_FRAME);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = feed.cancelled() => break,
                _ = ticker.tick() => {
                    let sample = Sample {
                        data: Bytes::from_static(&OPUS_SILENCE_FRAME),
                        duration: AUDIO_FRAME,
                        ..Default::default()
                    };
                    if let Err(e) = track.write_sample(&sample).await {
                        trace!("Silence sample dropped: {}", e);
                    }
                }
            }
        }
        debug!("Silence feed stopped");
    });
}
