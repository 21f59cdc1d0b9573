//! HTTP collector sink.
//!
//! Events are queued on a bounded channel and POSTed by a single background
//! thread, so `emit` never waits on the network. When the queue is full the
//! event is dropped. On shutdown the queue gets [`FLUSH_LIMIT`] to drain;
//! whatever is left after that is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam::channel::{self, Sender};

use super::{Event, Telemetry};

/// Events waiting for delivery before new ones are dropped.
const QUEUE_CAPACITY: usize = 1024;

/// Longest a dropped collector waits for queued events to go out.
const FLUSH_LIMIT: Duration = Duration::from_secs(1);

/// Background POSTer. Dropping it flushes the queue (bounded by
/// [`FLUSH_LIMIT`]) and joins the thread.
pub struct HttpCollector {
    tx: Option<Sender<Event>>,
    worker: Option<JoinHandle<()>>,
    /// Set once the flush limit passes; the worker then skips delivery.
    abandoned: Arc<AtomicBool>,
}

impl HttpCollector {
    /// Start the delivery thread for `endpoint`.
    pub fn spawn(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        let endpoint = endpoint.to_string();
        let (tx, rx) = channel::bounded::<Event>(QUEUE_CAPACITY);
        let abandoned = Arc::new(AtomicBool::new(false));

        let stop = Arc::clone(&abandoned);
        let worker = thread::Builder::new()
            .name("telemetry".into())
            .spawn(move || {
                for event in rx {
                    if stop.load(Ordering::Relaxed) {
                        continue;
                    }
                    // Delivery is best effort
                    let _ = client.post(&endpoint).json(&event).send();
                }
            })
            .context("failed to spawn telemetry thread")?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
            abandoned,
        })
    }
}

impl Telemetry for HttpCollector {
    fn emit(&self, event: Event) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(event);
        }
    }
}

impl Drop for HttpCollector {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop once the queue drains
        drop(self.tx.take());
        let Some(worker) = self.worker.take() else {
            return;
        };

        let deadline = Instant::now() + FLUSH_LIMIT;
        while !worker.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        self.abandoned.store(true, Ordering::Relaxed);
        // Still busy: leave it detached, it discards the rest
        if worker.is_finished() {
            let _ = worker.join();
        }
    }
}
