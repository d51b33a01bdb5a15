use crate::error::CaptureError;
use crate::media::LocalMedia;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Quality the call starts negotiating capture with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaQuality {
    High,
    Basic,
}

/// One rung of the capture fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaProfile {
    HighDefinition,
    Standard,
    AudioOnly,
    /// No devices at all. Only administrators may join like this.
    Placeholder,
}

impl MediaProfile {
    /// Capture profiles to try, best first.
    pub fn fallback_chain(preferred: MediaQuality, allow_placeholder: bool) -> Vec<Self> {
        let mut chain = match preferred {
            MediaQuality::High => vec![Self::HighDefinition, Self::Standard, Self::AudioOnly],
            MediaQuality::Basic => vec![Self::Standard, Self::AudioOnly],
        };
        if allow_placeholder {
            chain.push(Self::Placeholder);
        }
        chain
    }

    pub fn constraints(self) -> MediaConstraints {
        match self {
            Self::HighDefinition => MediaConstraints {
                audio: Some(AudioConstraints::processed()),
                video: Some(VideoConstraints {
                    width: 1280,
                    height: 720,
                    frame_rate: 30,
                }),
            },
            Self::Standard => MediaConstraints {
                audio: Some(AudioConstraints::default()),
                video: Some(VideoConstraints {
                    width: 640,
                    height: 480,
                    frame_rate: 15,
                }),
            },
            Self::AudioOnly => MediaConstraints {
                audio: Some(AudioConstraints::default()),
                video: None,
            },
            Self::Placeholder => MediaConstraints::default(),
        }
    }
}

impl fmt::Display for MediaProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::HighDefinition => "high definition",
            Self::Standard => "standard",
            Self::AudioOnly => "audio only",
            Self::Placeholder => "no media",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl AudioConstraints {
    pub fn processed() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaConstraints {
    pub audio: Option<AudioConstraints>,
    pub video: Option<VideoConstraints>,
}

/// Source of local capture tracks (camera, microphone, or a stand-in).
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    async fn open(
        &self,
        profile: MediaProfile,
        constraints: &MediaConstraints,
    ) -> Result<LocalMedia, CaptureError>;
}
