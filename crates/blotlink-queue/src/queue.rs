use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

use blotlink_frame::EncodedFrame;
use tracing::debug;

use crate::error::{QueueError, Result};

/// One slot in the delivery queue.
#[derive(Debug)]
pub(crate) enum Envelope {
    Frame(EncodedFrame),
    /// Poison value: the worker exits when it dequeues this.
    Shutdown,
}

/// Lifecycle of the delivery worker.
///
/// `Running` ⇄ `Draining` while frames flow; `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next queue item.
    Running,
    /// Writing one frame to the transport.
    Draining,
    /// Exited after the shutdown sentinel, a transport failure, or producer hang-up.
    Stopped,
}

impl WorkerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkerState::Running,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            WorkerState::Running => 0,
            WorkerState::Draining => 1,
            WorkerState::Stopped => 2,
        }
    }
}

/// State shared between producers and the worker.
#[derive(Debug)]
pub(crate) struct Shared {
    pending: AtomicUsize,
    state: AtomicU8,
}

impl Shared {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            pending: AtomicUsize::new(0),
            state: AtomicU8::new(WorkerState::Running.as_u8()),
        })
    }

    pub(crate) fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next` unless already stopped.
    pub(crate) fn set_state(&self, next: WorkerState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (WorkerState::from_u8(current) != WorkerState::Stopped).then_some(next.as_u8())
            });
    }

    pub(crate) fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub(crate) fn frame_done(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }

    /// Zero the gauge once the worker has stopped. Returns the frames that
    /// will never be written.
    pub(crate) fn abandon_pending(&self) -> usize {
        self.pending.swap(0, Ordering::AcqRel)
    }
}

/// Producer handle for the delivery queue.
///
/// Unbounded FIFO of encoded frames drained by exactly one worker. Cheap to
/// clone; every clone feeds the same worker. `push` never blocks.
#[derive(Debug, Clone)]
pub struct DeliveryQueue {
    tx: Sender<Envelope>,
    shared: Arc<Shared>,
}

impl DeliveryQueue {
    pub(crate) fn new(tx: Sender<Envelope>, shared: Arc<Shared>) -> Self {
        Self { tx, shared }
    }

    /// Append a frame to the tail of the queue.
    ///
    /// Fails with [`QueueError::Closed`] once the worker has stopped; the frame
    /// is dropped in that case.
    pub fn push(&self, frame: EncodedFrame) -> Result<()> {
        if self.shared.state() == WorkerState::Stopped {
            return Err(QueueError::Closed);
        }
        self.shared.pending.fetch_add(1, Ordering::AcqRel);
        self.tx.send(Envelope::Frame(frame)).map_err(|_| {
            self.shared.frame_done();
            QueueError::Closed
        })
    }

    /// Enqueue one shutdown sentinel.
    ///
    /// Frames pushed earlier are still written; frames pushed later are not.
    /// Does not wait for the worker and does not touch the transport.
    pub fn shutdown(&self) {
        if self.tx.send(Envelope::Shutdown).is_err() {
            debug!("shutdown requested after worker stopped");
        }
    }

    /// Frames pushed but not yet written.
    ///
    /// Drops to zero when the worker stops; frames still queued at that
    /// point are discarded, not delivered.
    pub fn pending(&self) -> usize {
        self.shared.pending()
    }

    /// Current worker state.
    pub fn worker_state(&self) -> WorkerState {
        self.shared.state()
    }
}
