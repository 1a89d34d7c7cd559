use std::fmt;
use std::io;

use blotlink_frame::FramingError;
use blotlink_queue::{ParseError, QueueError};
use blotlink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => FAILURE,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { source, .. } | TransportError::Configure { source, .. } => {
            io_error(context, source)
        }
        TransportError::UnsupportedBaud(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn framing_error(context: &str, err: FramingError) -> CliError {
    match err {
        FramingError::Io(source) => io_error(context, source),
        FramingError::EventTooLong { .. } | FramingError::PayloadTooLarge { .. } => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn queue_error(context: &str, err: QueueError) -> CliError {
    match err {
        QueueError::Framing(err) => framing_error(context, err),
        QueueError::Transport(err) => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        QueueError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn parse_error(context: &str, err: ParseError) -> CliError {
    CliError::new(DATA_INVALID, format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversized_event_is_usage_error() {
        let err = framing_error("encode failed", FramingError::EventTooLong { len: 300, max: 255 });
        assert_eq!(err.code, USAGE);
        assert!(err.message.starts_with("encode failed: "));
    }

    #[test]
    fn worker_transport_failure_maps_to_transport_code() {
        let err = queue_error(
            "delivery failed",
            QueueError::Transport(TransportError::Io(io::Error::from(io::ErrorKind::BrokenPipe))),
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }

    #[test]
    fn open_errors_follow_io_kind() {
        let err = transport_error(
            "open failed",
            TransportError::Open {
                path: "/dev/ttyX".into(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            },
        );
        assert_eq!(err.code, PERMISSION_DENIED);

        let err = transport_error("open failed", TransportError::UnsupportedBaud(7));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn corrupt_frames_are_data_invalid() {
        let err = framing_error("decode failed", FramingError::Cobs("code byte overruns input"));
        assert_eq!(err.code, DATA_INVALID);
    }
}
