use consult_client::{Negotiator, SdpNormalizer};
use consult_core::{IceCandidateRecord, NegotiationState, Role, SessionDescription, Signal};

use super::open_mock_controller;
use crate::integration::init_tracing;

fn remote_offer() -> SessionDescription {
    SessionDescription::offer(
        "v=0\r\ns=-\r\nm=audio 9 UDP/TLS/RTP/SAVPF 111\r\na=extmap:13 urn:3gpp:video-orientation\r\n",
    )
}

#[tokio::test]
async fn test_early_candidates_flush_after_offer() {
    init_tracing();

    let (controller, peer, _rx) = open_mock_controller().await;
    let mut negotiator = Negotiator::new(Role::Responder, SdpNormalizer::default());

    negotiator
        .process_ice_candidate(&controller, IceCandidateRecord::new("candidate:4"))
        .await;
    negotiator
        .process_ice_candidate(&controller, IceCandidateRecord::new("candidate:5"))
        .await;
    assert_eq!(negotiator.buffered_candidates(), 2);
    assert!(peer.state.lock().await.applied_candidates.is_empty());

    let answer = negotiator
        .process_offer(&controller, remote_offer())
        .await
        .expect("Offer failed");

    assert!(matches!(answer, Some(Signal::Answer { .. })));
    assert_eq!(negotiator.buffered_candidates(), 0);
    assert_eq!(peer.negotiation().await, NegotiationState::Stable);

    let state = peer.state.lock().await;
    let applied: Vec<&str> = state
        .applied_candidates
        .iter()
        .map(|c| c.candidate.as_str())
        .collect();
    assert_eq!(applied, vec!["candidate:4", "candidate:5"]);

    let remote = state.remote.as_ref().expect("No remote description");
    assert!(remote.sdp.contains("a=extmap:64 urn:3gpp:video-orientation"));
    assert!(!remote.sdp.contains("a=extmap:13 "));

    let local = state.local.as_ref().expect("No local description");
    assert!(local.sdp.contains("a=extmap:64 "));
}

#[tokio::test]
async fn test_late_candidates_apply_immediately_and_errors_are_ignored() {
    init_tracing();

    let (controller, peer, _rx) = open_mock_controller().await;
    let mut negotiator = Negotiator::new(Role::Responder, SdpNormalizer::default());
    negotiator
        .process_offer(&controller, remote_offer())
        .await
        .expect("Offer failed");

    negotiator
        .process_ice_candidate(&controller, IceCandidateRecord::new("candidate:malformed"))
        .await;
    negotiator
        .process_ice_candidate(&controller, IceCandidateRecord::new("candidate:7"))
        .await;

    assert_eq!(negotiator.buffered_candidates(), 0);
    let state = peer.state.lock().await;
    assert_eq!(state.applied_candidates.len(), 1);
    assert_eq!(state.applied_candidates[0].candidate, "candidate:7");
}
