use std::path::PathBuf;

/// Errors that can occur in serial transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the serial device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to apply line settings to the serial device.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The requested baud rate has no termios equivalent.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaud(u32),

    /// An I/O error occurred while writing to the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport accepted zero bytes; the link is gone.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
