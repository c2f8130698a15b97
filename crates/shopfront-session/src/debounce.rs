//! # Search Debouncer
//!
//! Timer-reset debouncing for search-as-you-type.
//!
//! ## Timeline
//! ```text
//! input:   "s"   "sh"  "shi"                      "shirt"
//!           │     │     │                            │
//! timer:    ├──x  ├──x  ├────────── delay ──────┐    ├────── delay ──────┐
//!                                               ▼                        ▼
//! output:                                     "shi"                   "shirt"
//! ```
//!
//! Every input restarts the delay; only the value that survives a full
//! quiet period is emitted. Closing the input flushes whatever is pending.
//! The debouncer knows nothing about the session: the caller decides what
//! to do with an emitted value (usually `SessionStore::search`).

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::trace;

/// Handle feeding a background debounce task.
#[derive(Debug)]
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    worker: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Starts a debouncer. Settled values arrive on the returned receiver.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn spawn(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (output_tx, output_rx) = mpsc::unbounded_channel();

        let worker = tokio::spawn(run(delay, input_rx, output_tx));

        (
            Debouncer {
                input: input_tx,
                worker,
            },
            output_rx,
        )
    }

    /// Feeds a new value, restarting the quiet period.
    ///
    /// Returns false when the debouncer has stopped (its output was dropped).
    pub fn input(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    /// Closes the input and waits until any pending value is flushed.
    pub async fn finish(self) {
        drop(self.input);
        let _ = self.worker.await;
    }
}

async fn run<T>(delay: Duration, mut input: mpsc::UnboundedReceiver<T>, output: mpsc::UnboundedSender<T>) {
    let mut pending: Option<T> = None;

    loop {
        let Some(value) = pending.take() else {
            match input.recv().await {
                Some(value) => pending = Some(value),
                None => return,
            }
            continue;
        };

        tokio::select! {
            next = input.recv() => match next {
                Some(newer) => {
                    trace!("Debounce timer reset");
                    pending = Some(newer);
                }
                None => {
                    let _ = output.send(value);
                    return;
                }
            },
            _ = sleep(delay) => {
                if output.send(value).is_err() {
                    return;
                }
            }
        }
    }
}
