use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// A periodic timer that posts `msg` into a channel until cancelled. It
/// never does the work itself.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    token: CancellationToken,
}

impl ScheduledTask {
    /// First tick after `first_delay`, then every `period`. Stops with
    /// `parent`, with `cancel`, on drop, or when the receiver is gone.
    pub fn spawn<M>(
        name: &'static str,
        period: Duration,
        first_delay: Duration,
        tx: mpsc::Sender<M>,
        msg: M,
        parent: &CancellationToken,
    ) -> Self
    where
        M: Clone + Send + 'static,
    {
        let token = parent.child_token();
        let task_token = token.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + first_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = task_token.cancelled() => break,
                    _ = ticker.tick() => {
                        if tx.send(msg.clone()).await.is_err() {
                            break;
                        }
                    }
                }
            }
            trace!("Timer '{}' stopped", name);
        });

        Self { name, token }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Posts `msg` once after `delay`, unless `token` is cancelled first.
pub fn schedule_once<M>(delay: Duration, tx: mpsc::Sender<M>, msg: M, token: &CancellationToken)
where
    M: Send + 'static,
{
    let token = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = tokio::time::sleep(delay) => {
                let _ = tx.send(msg).await;
            }
        }
    });
}
