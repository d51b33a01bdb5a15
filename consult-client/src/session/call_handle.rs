use crate::config::ClientConfig;
use crate::error::CallError;
use crate::media::MediaQuality;
use crate::session::{CallServices, CallSession, SessionCommand};
use crate::status::StatusSnapshot;
use consult_core::LaunchParams;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

/// Owner-side handle of a running call. Dropping it hangs up.
pub struct CallHandle {
    commands: mpsc::Sender<SessionCommand>,
    status: watch::Receiver<StatusSnapshot>,
    task: JoinHandle<Result<(), CallError>>,
}

impl CallHandle {
    /// Spawns the call's session on the current runtime.
    pub fn start(params: LaunchParams, config: ClientConfig, services: CallServices) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (status_tx, status_rx) = watch::channel(StatusSnapshot::default());

        let session = CallSession::new(params, config, services, cmd_rx, status_tx);
        let task = tokio::spawn(session.run());

        Self {
            commands: cmd_tx,
            status: status_rx,
            task,
        }
    }

    /// Asks the session to end the call. Returns immediately; use `join` to
    /// wait for the teardown.
    pub async fn hang_up(&self) {
        if self.commands.send(SessionCommand::HangUp).await.is_err() {
            debug!("Hang-up after the call already ended");
        }
    }

    /// Asks the session to reopen local media, starting at `quality`.
    pub async fn reacquire_media(&self, quality: MediaQuality) {
        if self
            .commands
            .send(SessionCommand::ReacquireMedia(quality))
            .await
            .is_err()
        {
            debug!("Media change after the call already ended");
        }
    }

    /// Current status snapshot.
    pub fn status(&self) -> StatusSnapshot {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSnapshot> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the call to end and returns why it ended.
    pub async fn join(self) -> Result<(), CallError> {
        self.task.await?
    }
}
