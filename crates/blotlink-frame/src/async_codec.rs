//! Async framing via `tokio_util::codec` (requires the `async` feature).

use bytes::BytesMut;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::codec::{decode_frame, EncodedFrame, RawFrame, MAX_FRAME_LEN};
use crate::error::{FramingError, Result};

/// Codec for `FramedRead` / `FramedWrite`.
///
/// Decoding yields [`RawFrame`]s and skips corrupt frames the same way
/// [`crate::FrameReader`] does. Encoding writes pre-encoded frames verbatim;
/// sequence numbers are stamped by [`crate::FrameEncoder`], not here.
#[derive(Debug, Default)]
pub struct BlotCodec {
    discarded: u64,
}

impl BlotCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames dropped because they failed to decode.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }
}

impl Decoder for BlotCodec {
    type Item = RawFrame;
    type Error = FramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<RawFrame>> {
        loop {
            match decode_frame(src) {
                Ok(Some(frame)) => return Ok(Some(frame)),
                Ok(None) => {
                    if src.len() > MAX_FRAME_LEN {
                        self.discarded += 1;
                        warn!(len = src.len(), "discarding undelimited bytes");
                        src.clear();
                    }
                    return Ok(None);
                }
                Err(err) => {
                    self.discarded += 1;
                    warn!(error = %err, "discarding corrupt frame");
                }
            }
        }
    }
}

impl Encoder<EncodedFrame> for BlotCodec {
    type Error = FramingError;

    fn encode(&mut self, item: EncodedFrame, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}

/// Write one frame to an async writer and flush it.
pub async fn write_frame<W>(writer: &mut W, frame: &EncodedFrame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(frame.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}
