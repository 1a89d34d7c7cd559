use std::sync::atomic::{AtomicU8, Ordering};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cobs;
use crate::error::{FramingError, Result};

/// Frame delimiter. Never produced by COBS stuffing.
pub const DELIMITER: u8 = 0x00;

/// Longest event name the one-byte length prefix can describe.
pub const MAX_EVENT_LEN: usize = u8::MAX as usize;

/// Largest payload the one-byte length prefix can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// Largest unstuffed message: two length bytes, both bodies, sequence byte.
pub const MAX_RAW_LEN: usize = 1 + MAX_EVENT_LEN + 1 + MAX_PAYLOAD_LEN + 1;

/// Largest frame on the wire, delimiter included.
pub const MAX_FRAME_LEN: usize = cobs::max_encoded_len(MAX_RAW_LEN) + 1;

/// A decoded event message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Event name, e.g. `"go"`.
    pub event: String,
    /// Opaque payload bytes.
    pub payload: Bytes,
    /// Sequence number the sender stamped on this frame.
    pub sequence: u8,
}

impl RawFrame {
    /// Create a new frame.
    pub fn new(event: impl Into<String>, payload: impl Into<Bytes>, sequence: u8) -> Self {
        Self {
            event: event.into(),
            payload: payload.into(),
            sequence,
        }
    }

    /// Size of the unstuffed message.
    pub fn raw_len(&self) -> usize {
        3 + self.event.len() + self.payload.len()
    }
}

/// A stuffed, delimiter-terminated frame ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame(Bytes);

impl EncodedFrame {
    /// Wire bytes, delimiter included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl AsRef<[u8]> for EncodedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Build the unstuffed message for one event.
///
/// ```text
/// ┌───────────┬─────────────┬─────────────┬──────────────┬──────────┐
/// │ event_len │ event UTF-8 │ payload_len │ payload      │ sequence │
/// │ (1B)      │ (event_len) │ (1B)        │ (payload_len)│ (1B)     │
/// └───────────┴─────────────┴─────────────┴──────────────┴──────────┘
/// ```
pub fn encode_raw(event: &str, payload: &[u8], sequence: u8, dst: &mut BytesMut) -> Result<()> {
    check_lengths(event, payload)?;
    dst.reserve(3 + event.len() + payload.len());
    dst.put_u8(event.len() as u8);
    dst.put_slice(event.as_bytes());
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    dst.put_u8(sequence);
    Ok(())
}

/// Encode one event into a complete wire frame: `COBS(raw) || 0x00`.
pub fn encode_frame(event: &str, payload: &[u8], sequence: u8) -> Result<EncodedFrame> {
    let mut raw = BytesMut::with_capacity(3 + event.len() + payload.len());
    encode_raw(event, payload, sequence, &mut raw)?;

    let mut wire = BytesMut::with_capacity(cobs::max_encoded_len(raw.len()) + 1);
    cobs::encode(&raw, &mut wire);
    wire.put_u8(DELIMITER);
    Ok(EncodedFrame(wire.freeze()))
}

fn check_lengths(event: &str, payload: &[u8]) -> Result<()> {
    if event.len() > MAX_EVENT_LEN {
        return Err(FramingError::EventTooLong {
            len: event.len(),
            max: MAX_EVENT_LEN,
        });
    }
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(FramingError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    Ok(())
}

/// Decode one frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't hold a delimiter yet. Otherwise the
/// frame bytes and the delimiter are consumed, even when the frame turns out to
/// be corrupt, so the next call starts at the following frame.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<RawFrame>> {
    let Some(end) = src.iter().position(|&b| b == DELIMITER) else {
        return Ok(None);
    };

    let stuffed = src.split_to(end);
    src.advance(1);

    let mut raw = BytesMut::with_capacity(stuffed.len());
    cobs::decode(&stuffed, &mut raw)?;
    parse_raw(raw.freeze()).map(Some)
}

/// Split an unstuffed message into its fields.
pub fn parse_raw(mut raw: Bytes) -> Result<RawFrame> {
    if raw.is_empty() {
        return Err(FramingError::Malformed("empty message"));
    }
    let event_len = raw.get_u8() as usize;
    if raw.len() < event_len + 2 {
        return Err(FramingError::Malformed("event length exceeds message"));
    }
    let event = std::str::from_utf8(&raw.split_to(event_len))?.to_owned();

    let payload_len = raw.get_u8() as usize;
    if raw.len() != payload_len + 1 {
        return Err(FramingError::Malformed(
            "payload length does not match message",
        ));
    }
    let payload = raw.split_to(payload_len);
    let sequence = raw.get_u8();

    Ok(RawFrame {
        event,
        payload,
        sequence,
    })
}

/// Stateful encoder that stamps every frame with a rolling sequence number.
///
/// The counter advances by one (mod 256) per successfully encoded frame,
/// regardless of event. Reserving a number is a single atomic step, so one
/// encoder can be shared across threads without duplicate or skipped numbers.
/// A call rejected for oversized input does not consume a number.
#[derive(Debug, Default)]
pub struct FrameEncoder {
    sequence: AtomicU8,
}

impl FrameEncoder {
    /// Create an encoder whose first frame carries sequence 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder whose first frame carries `sequence`.
    pub fn with_initial_sequence(sequence: u8) -> Self {
        Self {
            sequence: AtomicU8::new(sequence),
        }
    }

    /// Encode `event` with an opaque `payload`, consuming one sequence number.
    pub fn encode(&self, event: &str, payload: &[u8]) -> Result<EncodedFrame> {
        check_lengths(event, payload)?;
        // AtomicU8::fetch_add wraps on overflow.
        let sequence = self.sequence.fetch_add(1, Ordering::AcqRel);
        encode_frame(event, payload, sequence)
    }

    /// The sequence number the next successful `encode` will use.
    pub fn next_sequence(&self) -> u8 {
        self.sequence.load(Ordering::Acquire)
    }
}
