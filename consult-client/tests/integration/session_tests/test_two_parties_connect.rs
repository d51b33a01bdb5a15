use consult_client::CallStatus;
use consult_core::{LaunchParams, NegotiationState, RoomId};
use std::time::Duration;

use crate::integration::{init_tracing, start_test_call, wait_for_status};
use crate::utils::{MemoryRelay, MockCapture};

#[tokio::test(start_paused = true)]
async fn test_two_parties_connect() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-consultation");
    let doctor = start_test_call(LaunchParams::new(room.clone(), true), &relay, MockCapture::new());
    let patient = start_test_call(LaunchParams::new(room.clone(), false), &relay, MockCapture::new());

    assert!(relay.wait_for(&room, "offer", 1).await);
    assert!(relay.wait_for(&room, "answer", 1).await);

    wait_for_status(&doctor.handle, |s| {
        s.negotiation == NegotiationState::Stable && s.participant_ready
    })
    .await;
    wait_for_status(&patient.handle, |s| {
        s.negotiation == NegotiationState::Stable && s.participant_ready
    })
    .await;

    // A heartbeat seen after the answer renegotiates once; let that settle.
    tokio::time::sleep(Duration::from_secs(5)).await;
    wait_for_status(&doctor.handle, |s| s.negotiation == NegotiationState::Stable).await;
    wait_for_status(&patient.handle, |s| s.negotiation == NegotiationState::Stable).await;

    let doctor_peer = doctor.peers.peer(1).await.unwrap();
    let patient_peer = patient.peers.peer(1).await.unwrap();
    {
        let offered = doctor_peer.state.lock().await.local.clone().unwrap();
        let received = patient_peer.state.lock().await.remote.clone().unwrap();
        assert_eq!(offered, received);
        assert!(received.sdp.contains("a=extmap:64 "));
    }
    assert_eq!(patient_peer.state.lock().await.offers.len(), 0);

    doctor_peer.emit_candidate("candidate:doctor-host").await;
    patient_peer.emit_candidate("candidate:patient-host").await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(
        patient_peer.state.lock().await.applied_candidates[0].candidate,
        "candidate:doctor-host"
    );
    assert_eq!(
        doctor_peer.state.lock().await.applied_candidates[0].candidate,
        "candidate:patient-host"
    );

    doctor_peer.connect().await;
    patient_peer.connect().await;

    let doctor_view = wait_for_status(&doctor.handle, |s| s.status == CallStatus::Connected).await;
    let patient_view = wait_for_status(&patient.handle, |s| s.status == CallStatus::Connected).await;
    assert_eq!(doctor_view.status.to_string(), "connection established");
    assert_eq!(doctor_view.remote_tracks, 1);
    assert_eq!(patient_view.remote_tracks, 1);

    doctor.handle.hang_up().await;
    patient.handle.hang_up().await;
    doctor.handle.join().await.unwrap();
    patient.handle.join().await.unwrap();
}
