//! Event framing for the Blot serial protocol.
//!
//! Every command is a named event with an opaque payload, framed as:
//! - a 1-byte event length, the UTF-8 event name
//! - a 1-byte payload length, the payload
//! - a 1-byte rolling sequence number
//!
//! The message is COBS-stuffed and terminated by a single `0x00`, so a receiver
//! can always resynchronize at the next delimiter after line noise.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod cobs;
pub mod codec;
pub mod error;
pub mod events;
pub mod reader;

#[cfg(feature = "async")]
pub use async_codec::BlotCodec;
pub use codec::{
    decode_frame, encode_frame, encode_raw, parse_raw, EncodedFrame, FrameEncoder, RawFrame,
    DELIMITER, MAX_EVENT_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, MAX_RAW_LEN,
};
pub use error::{FramingError, Result};
pub use reader::FrameReader;
