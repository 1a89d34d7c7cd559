/// Errors that can occur while queueing or delivering frames.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// A command could not be framed.
    #[error("framing error: {0}")]
    Framing(#[from] blotlink_frame::FramingError),

    /// The worker's transport write failed; the worker has stopped.
    #[error("transport error: {0}")]
    Transport(#[from] blotlink_transport::TransportError),

    /// The worker has stopped and no longer accepts frames.
    #[error("delivery queue closed")]
    Closed,

    /// The worker thread could not be started.
    #[error("failed to spawn delivery worker: {0}")]
    Spawn(std::io::Error),

    /// The worker thread panicked.
    #[error("delivery worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, QueueError>;
