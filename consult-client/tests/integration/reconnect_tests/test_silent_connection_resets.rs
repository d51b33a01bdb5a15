use consult_core::{ConnectivityState, LaunchParams, RoomId};

use crate::integration::{init_tracing, start_test_call};
use crate::utils::{MemoryRelay, MockCapture};

#[tokio::test(start_paused = true)]
async fn test_silent_connection_resets() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-silent");
    let call = start_test_call(LaunchParams::new(room.clone(), true), &relay, MockCapture::new());

    let first = call.peers.wait_for_peer(1).await.unwrap();
    first.set_connectivity(ConnectivityState::Connected).await;

    let second = call.peers.wait_for_peer(2).await.expect("no reset without media");
    assert!(first.is_closed().await);
    assert!(!second.is_closed().await);

    call.handle.hang_up().await;
    call.handle.join().await.unwrap();
}
