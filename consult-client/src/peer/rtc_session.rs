use crate::error::PeerError;
use crate::media::{LocalMedia, TrackKind};
use crate::peer::{PeerEvent, PeerFactory, PeerSession};
use async_trait::async_trait;
use consult_core::{
    ConnectivityState, IceCandidateRecord, IceServerConfig, NegotiationState, SdpKind,
    SessionDescription,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::offer_answer_options::RTCOfferOptions;
use webrtc::peer_connection::sdp::sdp_type::RTCSdpType;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::signaling_state::RTCSignalingState;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::{RTCRtpTransceiver, RTCRtpTransceiverInit};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Opens `webrtc` peer connections configured with a fixed ICE server list.
#[derive(Debug, Clone)]
pub struct RtcPeerFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl RtcPeerFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl PeerFactory for RtcPeerFactory {
    async fn open(
        &self,
        generation: u64,
        events: mpsc::Sender<PeerEvent>,
    ) -> Result<Box<dyn PeerSession>, PeerError> {
        let session = RtcPeerSession::new(generation, &self.ice_servers, events).await?;
        Ok(Box::new(session))
    }
}

pub struct RtcPeerSession {
    generation: u64,
    peer_connection: Arc<RTCPeerConnection>,
}

impl RtcPeerSession {
    pub async fn new(
        generation: u64,
        ice_servers: &[IceServerConfig],
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self, PeerError> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        // webrtc-rs negotiates unified plan only, so no semantics switch here.
        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Directions are fixed before any track exists.
        for kind in [RTPCodecType::Audio, RTPCodecType::Video] {
            peer_connection
                .add_transceiver_from_kind(
                    kind,
                    Some(RTCRtpTransceiverInit {
                        direction: RTCRtpTransceiverDirection::Sendrecv,
                        send_encodings: vec![],
                    }),
                )
                .await?;
        }

        Self::wire_events(&peer_connection, generation, event_tx);

        Ok(Self {
            generation,
            peer_connection,
        })
    }

    fn wire_events(pc: &Arc<RTCPeerConnection>, generation: u64, event_tx: mpsc::Sender<PeerEvent>) {
        let ice_tx = event_tx.clone();
        pc.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let record = IceCandidateRecord {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(PeerEvent::CandidateGenerated(generation, record))
                    .await;
            })
        }));

        let state_tx = event_tx.clone();
        pc.on_ice_connection_state_change(Box::new(move |s: RTCIceConnectionState| {
            let tx = state_tx.clone();
            Box::pin(async move {
                info!("ICE connection state of session #{}: {}", generation, s);
                let Some(state) = connectivity_from(s) else {
                    return;
                };
                let _ = tx
                    .send(PeerEvent::IceConnectionChanged(generation, state))
                    .await;
            })
        }));

        let negotiation_tx = event_tx.clone();
        pc.on_negotiation_needed(Box::new(move || {
            let tx = negotiation_tx.clone();
            Box::pin(async move {
                let _ = tx.send(PeerEvent::NegotiationNeeded(generation)).await;
            })
        }));

        let signaling_tx = event_tx.clone();
        pc.on_signaling_state_change(Box::new(move |s: RTCSignalingState| {
            let tx = signaling_tx.clone();
            Box::pin(async move {
                debug!("Signaling state of session #{}: {}", generation, s);
                let state = match s {
                    RTCSignalingState::Stable => NegotiationState::Stable,
                    RTCSignalingState::HaveLocalOffer => NegotiationState::HaveLocalOffer,
                    RTCSignalingState::HaveRemoteOffer => NegotiationState::HaveRemoteOffer,
                    _ => return,
                };
                let _ = tx.send(PeerEvent::SignalingChanged(generation, state)).await;
            })
        }));

        let track_tx = event_tx;
        pc.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => TrackKind::Audio,
                        RTPCodecType::Video => TrackKind::Video,
                        _ => return,
                    };
                    let track_id = track.id();
                    let _ = tx
                        .send(PeerEvent::RemoteTrackAdded(generation, track_id.clone(), kind))
                        .await;

                    // The handler must return promptly; reading happens elsewhere.
                    tokio::spawn(async move {
                        while track.read_rtp().await.is_ok() {}
                        trace!("Remote track {} ended", track_id);
                    });
                })
            },
        ));
    }

    pub async fn transceiver_count(&self) -> usize {
        self.peer_connection.get_transceivers().await.len()
    }
}

#[async_trait]
impl PeerSession for RtcPeerSession {
    async fn create_offer(&self, ice_restart: bool) -> Result<SessionDescription, PeerError> {
        let options = ice_restart.then(|| RTCOfferOptions {
            ice_restart: true,
            ..Default::default()
        });
        let offer = self.peer_connection.create_offer(options).await?;
        Ok(from_rtc(&offer))
    }

    async fn create_answer(&self) -> Result<SessionDescription, PeerError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(from_rtc(&answer))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        self.peer_connection
            .set_local_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), PeerError> {
        self.peer_connection
            .set_remote_description(to_rtc(desc)?)
            .await?;
        Ok(())
    }

    async fn local_description(&self) -> Option<SessionDescription> {
        self.peer_connection
            .local_description()
            .await
            .map(|desc| from_rtc(&desc))
    }

    async fn remote_description(&self) -> Option<SessionDescription> {
        self.peer_connection
            .remote_description()
            .await
            .map(|desc| from_rtc(&desc))
    }

    async fn negotiation_state(&self) -> NegotiationState {
        match self.peer_connection.signaling_state() {
            RTCSignalingState::HaveLocalOffer | RTCSignalingState::HaveLocalPranswer => {
                NegotiationState::HaveLocalOffer
            }
            RTCSignalingState::HaveRemoteOffer | RTCSignalingState::HaveRemotePranswer => {
                NegotiationState::HaveRemoteOffer
            }
            RTCSignalingState::Stable if self.has_remote_description().await => {
                NegotiationState::Stable
            }
            _ => NegotiationState::Idle,
        }
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateRecord) -> Result<(), PeerError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn bind_local_media(&self, media: &LocalMedia) -> Result<(), PeerError> {
        let transceivers = self.peer_connection.get_transceivers().await;

        for kind in [TrackKind::Audio, TrackKind::Video] {
            let codec_kind = match kind {
                TrackKind::Audio => RTPCodecType::Audio,
                TrackKind::Video => RTPCodecType::Video,
            };
            let track = media
                .track(kind)
                .map(|t| Arc::clone(&t.track) as Arc<dyn TrackLocal + Send + Sync>);

            match transceivers.iter().find(|t| t.kind() == codec_kind) {
                Some(transceiver) => {
                    transceiver.sender().await.replace_track(track).await?;
                }
                None => {
                    if let Some(track) = track {
                        self.peer_connection.add_track(track).await?;
                    }
                }
            }
        }

        debug!(
            "Bound {} local track(s) ({}) into session #{}",
            media.tracks().len(),
            media.profile(),
            self.generation
        );
        Ok(())
    }

    async fn close(&self) -> Result<(), PeerError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

fn connectivity_from(state: RTCIceConnectionState) -> Option<ConnectivityState> {
    let state = match state {
        RTCIceConnectionState::New => ConnectivityState::New,
        RTCIceConnectionState::Checking => ConnectivityState::Checking,
        RTCIceConnectionState::Connected => ConnectivityState::Connected,
        RTCIceConnectionState::Completed => ConnectivityState::Completed,
        RTCIceConnectionState::Disconnected => ConnectivityState::Disconnected,
        RTCIceConnectionState::Failed => ConnectivityState::Failed,
        RTCIceConnectionState::Closed => ConnectivityState::Closed,
        _ => return None,
    };
    Some(state)
}

fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, PeerError> {
    let rtc = match desc.kind {
        SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
        SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        SdpKind::Pranswer => RTCSessionDescription::pranswer(desc.sdp)?,
        SdpKind::Rollback => {
            return Err(PeerError::Other(
                "rollback descriptions are not supported".to_owned(),
            ));
        }
    };
    Ok(rtc)
}

fn from_rtc(desc: &RTCSessionDescription) -> SessionDescription {
    let kind = match desc.sdp_type {
        RTCSdpType::Answer => SdpKind::Answer,
        RTCSdpType::Pranswer => SdpKind::Pranswer,
        RTCSdpType::Rollback => SdpKind::Rollback,
        _ => SdpKind::Offer,
    };
    SessionDescription {
        kind,
        sdp: desc.sdp.clone(),
    }
}
