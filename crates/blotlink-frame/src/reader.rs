use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::warn;

use crate::codec::{decode_frame, RawFrame, DELIMITER, MAX_FRAME_LEN};
use crate::error::{FramingError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;
const READ_CHUNK_SIZE: usize = 512;

/// Reads complete frames from any `Read` stream.
///
/// This is the receiving half of the protocol, as the firmware implements it:
/// scan for the delimiter, unstuff, parse. A frame that fails to decode is
/// dropped and reading resumes after its delimiter, so one corrupted frame
/// costs exactly that frame.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    discarded: u64,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            discarded: 0,
        }
    }

    /// Read the next intact frame (blocking).
    ///
    /// Returns `Err(FramingError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<RawFrame> {
        loop {
            match decode_frame(&mut self.buf) {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {}
                Err(err) => {
                    self.discarded += 1;
                    warn!(error = %err, "discarding corrupt frame");
                    continue;
                }
            }

            // No delimiter within the longest legal frame: the bytes are noise.
            if self.buf.len() > MAX_FRAME_LEN {
                self.discarded += 1;
                warn!(len = self.buf.len(), "discarding undelimited bytes");
                self.buf.clear();
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FramingError::Io(err)),
            };

            if read == 0 {
                return Err(FramingError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Number of frames dropped because they failed to decode.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// True if bytes after the last delimiter are still buffered.
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty() && !self.buf.contains(&DELIMITER)
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<RawFrame>;

    /// Yields frames until EOF; other errors are yielded once.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FramingError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::FrameEncoder;

    fn wire(frames: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = FrameEncoder::new();
        let mut out = Vec::new();
        for (event, payload) in frames {
            out.extend_from_slice(encoder.encode(event, payload).unwrap().as_bytes());
        }
        out
    }

    #[test]
    fn read_multiple_frames() {
        let bytes = wire(&[("motorsOn", b""), ("servo", &2500i32.to_le_bytes()), ("go", &[0; 8])]);
        let mut reader = FrameReader::new(Cursor::new(bytes));

        let f1 = reader.read_frame().unwrap();
        let f2 = reader.read_frame().unwrap();
        let f3 = reader.read_frame().unwrap();

        assert_eq!((f1.event.as_str(), f1.sequence), ("motorsOn", 0));
        assert_eq!((f2.event.as_str(), f2.sequence), ("servo", 1));
        assert_eq!(f2.payload.as_ref(), &2500i32.to_le_bytes());
        assert_eq!((f3.event.as_str(), f3.sequence), ("go", 2));
        assert!(matches!(reader.read_frame(), Err(FramingError::ConnectionClosed)));
    }

    #[test]
    fn partial_read_handling() {
        let bytes = wire(&[("go", &[1, 2, 3, 4, 5, 6, 7, 8])]);
        let mut reader = FrameReader::new(ByteByByteReader { bytes, pos: 0 });

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.payload.as_ref(), &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn resyncs_after_garbage() {
        let mut bytes = vec![0x7F, 0x13, 0x00];
        bytes.extend(wire(&[("motorsOff", b"")]));
        let mut reader = FrameReader::new(Cursor::new(bytes));

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.event, "motorsOff");
        assert_eq!(reader.discarded(), 1);
    }

    #[test]
    fn resyncs_after_truncated_frame() {
        let good = wire(&[("go", &[9; 8]), ("motorsOn", b"")]);
        let first_end = good.iter().position(|&b| b == 0).unwrap();

        // Drop the middle of the first frame but keep its delimiter.
        let mut bytes = good[..3].to_vec();
        bytes.extend_from_slice(&good[first_end..]);
        let mut reader = FrameReader::new(Cursor::new(bytes));

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.event, "motorsOn");
        assert_eq!(frame.sequence, 1);
        assert_eq!(reader.discarded(), 1);
    }

    #[test]
    fn long_noise_is_dropped() {
        let mut bytes = vec![0x42; MAX_FRAME_LEN + READ_CHUNK_SIZE];
        bytes.push(0x00);
        bytes.extend(wire(&[("shutdown", b"")]));
        let mut reader = FrameReader::new(Cursor::new(bytes));

        let frame = reader.read_frame().unwrap();
        assert_eq!(frame.event, "shutdown");
        assert!(reader.discarded() >= 1);
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut bytes = wire(&[("go", &[0; 8])]);
        bytes.pop();
        let mut reader = FrameReader::new(Cursor::new(bytes));

        assert!(matches!(reader.read_frame(), Err(FramingError::ConnectionClosed)));
        assert!(reader.has_partial());
    }

    #[test]
    fn iterator_stops_at_eof() {
        let bytes = wire(&[("go", &[0; 8]), ("go", &[1; 8])]);
        let frames: Vec<_> = FrameReader::new(Cursor::new(bytes))
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].sequence, 1);
    }

    #[test]
    fn interrupted_read_retries() {
        let reader = InterruptedThenData {
            interrupted: false,
            inner: Cursor::new(wire(&[("servo", &500i32.to_le_bytes())])),
        };
        let mut framed = FrameReader::new(reader);
        assert_eq!(framed.read_frame().unwrap().event, "servo");
    }

    #[test]
    fn accessors_and_into_inner() {
        let reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct InterruptedThenData {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
