use std::io::{ErrorKind, Write};

use crate::error::{Result, TransportError};

/// The write side of a serial link.
///
/// Implementations must write each frame completely before returning and must
/// not be called from more than one thread at a time. Any `Write + Send` type
/// is a sink, so a `SerialPort`, a `Vec<u8>` or a socket all work.
pub trait FrameSink: Send {
    /// Write one complete frame and flush it to the device.
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
}

impl<W: Write + Send> FrameSink for W {
    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < frame.len() {
            match self.write(&frame[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }

        loop {
            match self.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}
