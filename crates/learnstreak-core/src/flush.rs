//! Debounced persistence worker
//!
//! Mutations hand snapshots to a background thread. The thread waits for the
//! debounce delay to pass without a newer snapshot arriving, then encodes and
//! writes only the latest one.

use learnstreak_api::{encode, AppData};
use learnstreak_store::{PersistenceAdapter, StoreError, StoreResult};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

enum FlushCommand {
    /// Replace the pending snapshot and re-arm the timer
    Schedule(AppData),
    /// Write the pending snapshot now
    Flush(Sender<StoreResult<()>>),
    /// Drop the pending snapshot and clear storage
    Clear(Sender<StoreResult<()>>),
    Shutdown,
}

/// Handle to the flush thread
pub(crate) struct FlushWorker {
    tx: Sender<FlushCommand>,
    handle: Option<JoinHandle<()>>,
}

impl FlushWorker {
    pub(crate) fn spawn(adapter: Arc<dyn PersistenceAdapter>, delay: Duration) -> StoreResult<Self> {
        let (tx, rx) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("learnstreak-flush".into())
            .spawn(move || run(rx, adapter, delay))?;

        debug!(delay_ms = delay.as_millis() as u64, "Flush worker started");

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot; a later call before the delay elapses supersedes it
    pub(crate) fn schedule(&self, data: AppData) {
        if self.tx.send(FlushCommand::Schedule(data)).is_err() {
            warn!("Flush worker gone, snapshot not persisted");
        }
    }

    /// Write any pending snapshot and wait for the result
    pub(crate) fn flush(&self) -> StoreResult<()> {
        self.request(FlushCommand::Flush)
    }

    /// Cancel any pending snapshot and clear storage, waiting for the result
    pub(crate) fn clear(&self) -> StoreResult<()> {
        self.request(FlushCommand::Clear)
    }

    fn request(&self, make: fn(Sender<StoreResult<()>>) -> FlushCommand) -> StoreResult<()> {
        let (ack_tx, ack_rx) = mpsc::channel();
        self.tx
            .send(make(ack_tx))
            .map_err(|_| StoreError::Unavailable("flush worker stopped".into()))?;
        ack_rx
            .recv()
            .map_err(|_| StoreError::Unavailable("flush worker stopped".into()))?
    }
}

impl Drop for FlushWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(FlushCommand::Shutdown);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("Flush worker panicked");
        }
    }
}

fn run(rx: Receiver<FlushCommand>, adapter: Arc<dyn PersistenceAdapter>, delay: Duration) {
    let mut pending: Option<AppData> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        let command = match deadline {
            Some(at) => match rx.recv_timeout(at.saturating_duration_since(Instant::now())) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => {
                    deadline = None;
                    let _ = write_pending(adapter.as_ref(), &mut pending);
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            FlushCommand::Schedule(data) => {
                pending = Some(data);
                deadline = Some(Instant::now() + delay);
            }
            FlushCommand::Flush(ack) => {
                deadline = None;
                let _ = ack.send(write_pending(adapter.as_ref(), &mut pending));
            }
            FlushCommand::Clear(ack) => {
                deadline = None;
                if pending.take().is_some() {
                    debug!("Pending snapshot discarded");
                }
                let result = adapter.clear();
                match &result {
                    Ok(()) => info!(adapter = %adapter.describe(), "Persisted data cleared"),
                    Err(e) => warn!(error = %e, "Failed to clear persisted data"),
                }
                let _ = ack.send(result);
            }
            FlushCommand::Shutdown => break,
        }
    }

    // Whatever is still pending gets one last attempt
    let _ = write_pending(adapter.as_ref(), &mut pending);
    debug!("Flush worker stopped");
}

/// Write the pending snapshot. On failure the snapshot stays pending so an
/// explicit flush or shutdown can retry it.
fn write_pending(adapter: &dyn PersistenceAdapter, pending: &mut Option<AppData>) -> StoreResult<()> {
    let Some(data) = pending.take() else {
        return Ok(());
    };

    let result = encode(&data)
        .map_err(|e| StoreError::Encoding(e.to_string()))
        .and_then(|bytes| {
            adapter.save(&bytes)?;
            Ok(bytes.len())
        });

    match result {
        Ok(len) => {
            debug!(adapter = %adapter.describe(), bytes = len, "Snapshot written");
            Ok(())
        }
        Err(e) => {
            warn!(adapter = %adapter.describe(), error = %e, "Failed to write snapshot");
            *pending = Some(data);
            Err(e)
        }
    }
}
