pub mod test_early_candidates_flush_after_offer;
pub mod test_stale_answer_ignored;

use consult_client::{PeerController, PeerEvent};
use tokio::sync::mpsc;

use crate::utils::{MockPeer, MockPeerFactory};

pub async fn open_mock_controller() -> (PeerController, MockPeer, mpsc::Receiver<PeerEvent>) {
    let factory = MockPeerFactory::new();
    let (tx, rx) = mpsc::channel(64);
    let controller = PeerController::open(&factory, 1, tx, None)
        .await
        .expect("Failed to open mock peer");
    let peer = factory.peer(1).await.expect("Mock peer missing");
    (controller, peer, rx)
}
