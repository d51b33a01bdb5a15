use consult_core::{LaunchParams, RoomId, SessionDescription, Signal};

use crate::integration::{init_tracing, start_test_call};
use crate::utils::{MemoryRelay, MockCapture};

#[tokio::test(start_paused = true)]
async fn test_polling_survives_transport_errors() {
    init_tracing();

    let relay = MemoryRelay::new();
    let room = RoomId::from("room-flaky");
    relay.fail_fetches(3).await;
    relay
        .inject(
            &room,
            Signal::Offer {
                sdp: SessionDescription::offer("v=0\r\ns=remote\r\n"),
            },
            None,
        )
        .await;

    let call = start_test_call(LaunchParams::new(room.clone(), false), &relay, MockCapture::new());

    assert!(relay.wait_for(&room, "answer", 1).await, "no answer sent");
    assert!(relay.fetch_count().await >= 4);

    call.handle.hang_up().await;
    call.handle.join().await.unwrap();
}
