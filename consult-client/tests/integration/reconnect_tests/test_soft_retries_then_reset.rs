use consult_client::CallStatus;
use consult_core::{ConnectivityState, LaunchParams, NegotiationState, RoomId};
use std::time::Duration;

use super::answer_from_remote;
use crate::integration::{init_tracing, start_test_call, wait_for_status};
use crate::utils::{MemoryRelay, MockCapture, MockPeer};

async fn disconnect_and_wait(peer: &MockPeer, wait: Duration) {
    peer.set_connectivity(ConnectivityState::Disconnected).await;
    tokio::time::sleep(wait).await;
}

#[tokio::test(start_paused = true)]
async fn test_soft_retries_then_reset() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-flapping");
    let call = start_test_call(LaunchParams::new(room.clone(), true), &relay, MockCapture::new());

    assert!(relay.wait_for(&room, "offer", 1).await);
    answer_from_remote(&relay, &room).await;
    let peer = call.peers.peer(1).await.unwrap();
    wait_for_status(&call.handle, |s| s.negotiation == NegotiationState::Stable).await;

    disconnect_and_wait(&peer, Duration::from_millis(1_500)).await;
    assert_eq!(call.handle.status().status, CallStatus::Reconnecting);
    assert_eq!(call.handle.status().reconnect_attempts, 1);
    assert_eq!(peer.state.lock().await.offers, vec![false, true]);

    disconnect_and_wait(&peer, Duration::from_millis(2_500)).await;
    disconnect_and_wait(&peer, Duration::from_millis(3_500)).await;
    assert_eq!(call.handle.status().reconnect_attempts, 3);
    assert_eq!(call.peers.opened().await, 1);

    peer.set_connectivity(ConnectivityState::Disconnected).await;
    let second = call.peers.wait_for_peer(2).await.expect("no reset after 3 retries");
    assert!(peer.is_closed().await);
    // A pending restart offer is re-sent, never replaced by a fourth one.
    assert_eq!(peer.state.lock().await.offers, vec![false, true]);

    second.connect().await;
    let recovered = wait_for_status(&call.handle, |s| s.status == CallStatus::Connected).await;
    assert_eq!(recovered.reconnect_attempts, 0);

    call.handle.hang_up().await;
    call.handle.join().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_recovery_before_retry_is_due() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-blip");
    let call = start_test_call(LaunchParams::new(room.clone(), true), &relay, MockCapture::new());

    assert!(relay.wait_for(&room, "offer", 1).await);
    answer_from_remote(&relay, &room).await;
    let peer = call.peers.peer(1).await.unwrap();
    wait_for_status(&call.handle, |s| s.negotiation == NegotiationState::Stable).await;
    peer.connect().await;
    wait_for_status(&call.handle, |s| s.status == CallStatus::Connected).await;

    peer.set_connectivity(ConnectivityState::Disconnected).await;
    wait_for_status(&call.handle, |s| s.status == CallStatus::Reconnecting).await;
    peer.set_connectivity(ConnectivityState::Connected).await;

    let snapshot = wait_for_status(&call.handle, |s| s.status == CallStatus::Connected).await;
    assert_eq!(snapshot.reconnect_attempts, 0);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(peer.state.lock().await.offers, vec![false]);

    call.handle.hang_up().await;
    call.handle.join().await.unwrap();
}
