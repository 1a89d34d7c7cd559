/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FramingError {
    /// The event name does not fit the one-byte length prefix.
    #[error("event name too long ({len} bytes, max {max})")]
    EventTooLong { len: usize, max: usize },

    /// The payload does not fit the one-byte length prefix.
    #[error("payload too large ({len} bytes, max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// The stuffed bytes are not valid COBS.
    #[error("invalid COBS data: {0}")]
    Cobs(&'static str),

    /// The unstuffed message does not match the field layout.
    #[error("malformed message: {0}")]
    Malformed(&'static str),

    /// The event name is not valid UTF-8.
    #[error("event name is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// An I/O error occurred while reading frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a delimiter was seen.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FramingError>;
