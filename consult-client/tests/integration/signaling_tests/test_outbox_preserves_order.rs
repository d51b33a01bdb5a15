use consult_client::SignalOutbox;
use consult_core::{IceCandidateRecord, PeerId, RoomId, SessionDescription, Signal};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::integration::init_tracing;
use crate::utils::MemoryRelay;

#[tokio::test(start_paused = true)]
async fn test_outbox_preserves_order() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-outbox");
    let me = PeerId::new();
    let token = CancellationToken::new();
    let outbox = SignalOutbox::spawn(Arc::new(relay.clone()), room.clone(), me, token.clone());

    outbox.send(Signal::Offer {
        sdp: SessionDescription::offer("v=0\r\n"),
    });
    for n in 0..3 {
        outbox.send(Signal::IceCandidate {
            candidate: IceCandidateRecord::new(format!("candidate:{}", n)),
        });
    }

    assert!(relay.wait_for(&room, "ice-candidate", 3).await);
    let envelopes = relay.envelopes(&room).await;
    let kinds: Vec<&str> = envelopes.iter().map(|e| e.signal.kind()).collect();
    assert_eq!(
        kinds,
        vec!["offer", "ice-candidate", "ice-candidate", "ice-candidate"]
    );
    assert!(envelopes.iter().all(|e| e.from == Some(me)));

    token.cancel();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    assert!(outbox.is_finished());
}
