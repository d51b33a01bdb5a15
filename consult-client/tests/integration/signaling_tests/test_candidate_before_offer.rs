use consult_core::{IceCandidateRecord, LaunchParams, RoomId, SessionDescription, Signal};

use crate::integration::{init_tracing, start_test_call};
use crate::utils::{MemoryRelay, MockCapture};

#[tokio::test(start_paused = true)]
async fn test_candidate_before_offer() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-early-candidate");
    relay
        .inject_with_id(
            &room,
            4,
            Signal::IceCandidate {
                candidate: IceCandidateRecord::new("candidate:early"),
            },
        )
        .await;
    relay
        .inject_with_id(
            &room,
            5,
            Signal::Offer {
                sdp: SessionDescription::offer("v=0\r\ns=initiator\r\n"),
            },
        )
        .await;

    let call = start_test_call(LaunchParams::new(room.clone(), false), &relay, MockCapture::new());

    assert!(relay.wait_for(&room, "answer", 1).await);
    let peer = call.peers.peer(1).await.unwrap();
    {
        let state = peer.state.lock().await;
        assert_eq!(state.applied_candidates.len(), 1);
        assert_eq!(state.applied_candidates[0].candidate, "candidate:early");
    }

    // Later polls apply nothing twice.
    tokio::time::sleep(std::time::Duration::from_secs(6)).await;
    let state = peer.state.lock().await;
    assert_eq!(state.applied_candidates.len(), 1);
    assert_eq!(state.answers, 1);
    drop(state);

    call.handle.hang_up().await;
    call.handle.join().await.unwrap();
}
