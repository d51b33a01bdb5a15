use consult_client::{Negotiator, SdpNormalizer};
use consult_core::{NegotiationState, Role, SessionDescription};

use super::open_mock_controller;
use crate::integration::init_tracing;

#[tokio::test]
async fn test_answer_in_idle_is_ignored() {
    init_tracing();

    let (controller, peer, _rx) = open_mock_controller().await;
    let mut negotiator = Negotiator::new(Role::Initiator, SdpNormalizer::default());

    let applied = negotiator
        .process_answer(&controller, SessionDescription::answer("v=0\r\n"))
        .await
        .expect("Stale answer must not error");

    assert!(!applied);
    assert_eq!(peer.negotiation().await, NegotiationState::Idle);
    assert!(peer.state.lock().await.remote.is_none());
}

#[tokio::test]
async fn test_second_answer_after_stable_is_ignored() {
    init_tracing();

    let (controller, peer, _rx) = open_mock_controller().await;
    let mut negotiator = Negotiator::new(Role::Initiator, SdpNormalizer::default());
    negotiator.create_offer(&controller, false).await.unwrap();

    let first = negotiator
        .process_answer(&controller, SessionDescription::answer("v=0\r\ns=first\r\n"))
        .await
        .unwrap();
    let second = negotiator
        .process_answer(&controller, SessionDescription::answer("v=0\r\ns=second\r\n"))
        .await
        .unwrap();

    assert!(first);
    assert!(!second);
    assert_eq!(peer.negotiation().await, NegotiationState::Stable);
    let remote = peer.state.lock().await.remote.clone().unwrap();
    assert!(remote.sdp.contains("s=first"));
}

#[tokio::test]
async fn test_rejected_remote_description_is_an_error() {
    init_tracing();

    let (controller, peer, _rx) = open_mock_controller().await;
    let mut negotiator = Negotiator::new(Role::Responder, SdpNormalizer::default());
    peer.state.lock().await.fail_set_remote = true;

    let result = negotiator
        .process_offer(&controller, SessionDescription::offer("v=0\r\n"))
        .await;

    assert!(matches!(
        result,
        Err(consult_client::NegotiationError::SetRemote(_))
    ));
}
