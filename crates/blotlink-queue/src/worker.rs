use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::JoinHandle;

use blotlink_transport::FrameSink;
use tracing::{debug, error, info, warn};

use crate::error::{QueueError, Result};
use crate::queue::{DeliveryQueue, Envelope, Shared, WorkerState};

/// Default name of the worker thread.
pub const DEFAULT_THREAD_NAME: &str = "blot-serial";

/// Delivery worker settings.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Name given to the worker thread.
    pub thread_name: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_THREAD_NAME.to_string(),
        }
    }
}

/// What the worker hands back when it exits cleanly.
#[derive(Debug)]
pub struct WorkerReport<S> {
    /// The transport, returned to the caller who owns its lifecycle.
    pub sink: S,
    /// Frames written completely.
    pub frames_written: u64,
    /// Bytes written, delimiters included.
    pub bytes_written: u64,
}

/// Start a worker on its own thread with default settings.
///
/// Returns the producer handle and the worker handle. The worker owns `sink`
/// exclusively until it stops.
pub fn spawn<S>(sink: S) -> Result<(DeliveryQueue, WorkerHandle<S>)>
where
    S: FrameSink + 'static,
{
    spawn_with_config(sink, QueueConfig::default())
}

/// Start a worker with explicit settings.
pub fn spawn_with_config<S>(sink: S, config: QueueConfig) -> Result<(DeliveryQueue, WorkerHandle<S>)>
where
    S: FrameSink + 'static,
{
    let (tx, rx) = mpsc::channel();
    let shared = Shared::new();
    let worker = DeliveryWorker {
        sink,
        rx,
        shared: Arc::clone(&shared),
    };

    let join = std::thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || worker.run())
        .map_err(QueueError::Spawn)?;

    info!(thread = %config.thread_name, "delivery worker started");

    let queue = DeliveryQueue::new(tx, Arc::clone(&shared));
    Ok((queue, WorkerHandle { join, shared }))
}

/// The single consumer of a delivery queue.
struct DeliveryWorker<S> {
    sink: S,
    rx: Receiver<Envelope>,
    shared: Arc<Shared>,
}

impl<S: FrameSink> DeliveryWorker<S> {
    fn run(mut self) -> Result<WorkerReport<S>> {
        let mut frames_written = 0u64;
        let mut bytes_written = 0u64;

        loop {
            let envelope = match self.rx.recv() {
                Ok(envelope) => envelope,
                Err(_) => {
                    info!("all producers dropped, delivery worker exiting");
                    break;
                }
            };

            let frame = match envelope {
                Envelope::Frame(frame) => frame,
                Envelope::Shutdown => {
                    info!(frames_written, "shutdown sentinel received");
                    break;
                }
            };

            self.shared.set_state(WorkerState::Draining);
            let written = self.sink.write_frame(frame.as_bytes());
            self.shared.frame_done();

            if let Err(err) = written {
                self.shared.set_state(WorkerState::Stopped);
                let abandoned = self.shared.abandon_pending();
                error!(error = %err, frames_written, abandoned, "transport write failed, delivery worker stopped");
                return Err(err.into());
            }

            frames_written += 1;
            bytes_written += frame.len() as u64;
            debug!(len = frame.len(), frames_written, "frame written");
            self.shared.set_state(WorkerState::Running);
        }

        self.shared.set_state(WorkerState::Stopped);
        let abandoned = self.shared.abandon_pending();
        if abandoned > 0 {
            warn!(abandoned, "frames queued after shutdown were not written");
        }

        Ok(WorkerReport {
            sink: self.sink,
            frames_written,
            bytes_written,
        })
    }
}

/// Owner's handle on a running worker.
#[derive(Debug)]
pub struct WorkerHandle<S> {
    join: JoinHandle<Result<WorkerReport<S>>>,
    shared: Arc<Shared>,
}

impl<S> WorkerHandle<S> {
    /// Current worker state.
    pub fn state(&self) -> WorkerState {
        self.shared.state()
    }

    /// True once the worker thread has returned.
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the worker to exit.
    ///
    /// Only returns after a shutdown sentinel, a transport failure, or once
    /// every [`DeliveryQueue`] clone has been dropped.
    pub fn join(self) -> Result<WorkerReport<S>> {
        self.join.join().map_err(|_| QueueError::WorkerPanicked)?
    }
}
