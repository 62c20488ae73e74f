// ── Progress poller ──
//
// Timer-driven background loop. Each iteration waits for either the
// cancellation token or the next interval tick, then runs the caller's
// tick callback. The callback may end the loop by returning `Break`.

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to a running poll loop.
#[derive(Debug)]
pub struct ProgressPoller {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressPoller {
    /// Spawn the loop on the current runtime.
    pub fn spawn<F, Fut>(interval: Duration, tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_task(interval, cancel.clone(), tick));
        Self { cancel, handle }
    }

    /// Token that stops the loop when cancelled. Cloneable, e.g. for a
    /// signal handler.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the loop to end on its own or through the token.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            if e.is_panic() {
                warn!(error = %e, "progress poller panicked");
            }
        }
    }

    /// Cancel and wait for the current iteration to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.join().await;
    }

    /// Stop immediately, even mid-tick.
    pub async fn abort(self) {
        self.handle.abort();
        self.join().await;
    }
}

/// Logs when the loop is torn down without reaching its normal exit.
struct ExitGuard {
    finished: bool,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if !self.finished {
            warn!("progress poller cancelled");
        }
    }
}

async fn poll_task<F, Fut>(interval: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    let mut guard = ExitGuard { finished: false };
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // consume the immediate first tick

    debug!(interval_secs = interval.as_secs(), "progress poller started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if tick().await.is_break() {
                    break;
                }
            }
        }
    }

    guard.finished = true;
    info!("progress poller stopped");
}
