//! Rate-limited progress forwarding
//!
//! Forwards `task-progress` actions at most once per window. The first event
//! after a quiet window goes out immediately; later ones in the same window
//! collapse into a single trailing event sent when the window closes. When
//! the task finishes, the last pending event is still delivered.

use crate::dispatch::{Action, Dispatch, ProgressInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use uuid::Uuid;

/// Background forwarder owned by the runner for one task
pub struct ProgressForwarder {
    done: CancellationToken,
    handle: JoinHandle<()>,
}

impl ProgressForwarder {
    /// Start forwarding; returns the sender to hand to the task context
    pub fn spawn(
        task_id: Uuid,
        dispatch: Arc<dyn Dispatch>,
        interval: Duration,
    ) -> (mpsc::UnboundedSender<ProgressInfo>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let done = CancellationToken::new();
        let handle = tokio::spawn(forward(task_id, rx, done.clone(), dispatch, interval));
        (tx, Self { done, handle })
    }

    /// Stop accepting progress and wait until the final value is delivered
    pub async fn finish(self) {
        self.done.cancel();
        if let Err(e) = self.handle.await {
            warn!("Progress forwarder stopped abnormally: {}", e);
        }
    }
}

async fn forward(
    task_id: Uuid,
    mut rx: mpsc::UnboundedReceiver<ProgressInfo>,
    done: CancellationToken,
    dispatch: Arc<dyn Dispatch>,
    interval: Duration,
) {
    let emit = |info: ProgressInfo| dispatch.dispatch(Action::TaskProgress { id: task_id, info });

    let mut pending: Option<ProgressInfo> = None;
    let mut window_end: Option<Instant> = None;

    loop {
        let deadline = window_end.unwrap_or_else(Instant::now);
        // Trailing edge first: a closed window flushes before newer values
        tokio::select! {
            biased;
            _ = sleep_until(deadline), if pending.is_some() => {
                if let Some(info) = pending.take() {
                    emit(info);
                    window_end = Some(Instant::now() + interval);
                }
            }
            _ = done.cancelled() => break,
            received = rx.recv() => match received {
                Some(info) => match window_end {
                    Some(end) if Instant::now() < end => pending = Some(info),
                    _ => {
                        pending = None;
                        emit(info);
                        window_end = Some(Instant::now() + interval);
                    }
                },
                None => break,
            },
        }
    }

    // Senders may outlive the task (clones held by the registry or by
    // collaborators); anything already queued still counts.
    rx.close();
    while let Ok(info) = rx.try_recv() {
        pending = Some(info);
    }

    if let Some(info) = pending {
        if let Some(end) = window_end {
            sleep_until(end).await;
        }
        emit(info);
    }
}
