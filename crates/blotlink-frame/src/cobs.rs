//! Consistent Overhead Byte Stuffing.
//!
//! Removes every `0x00` from a byte string by splitting it into runs of
//! non-zero bytes, each prefixed with a code byte of `run length + 1`. A code
//! of `0xFF` marks a full 254-byte run with no implied zero after it.
//!
//! The output matches the reference `cobs` encoder used by the plotter tools
//! byte for byte, including the rule that a trailing full run is not followed
//! by an extra `0x01` block.

use bytes::{BufMut, BytesMut};

use crate::error::{FramingError, Result};

/// Longest run of non-zero bytes a single code byte can describe.
const MAX_RUN: usize = 0xFE;

/// Upper bound on the stuffed size of `len` input bytes.
pub const fn max_encoded_len(len: usize) -> usize {
    len + len / MAX_RUN + 1
}

/// Stuff `src` into `dst`. The appended bytes never contain `0x00`.
///
/// The frame delimiter is not written; see [`crate::codec`].
pub fn encode(src: &[u8], dst: &mut BytesMut) {
    dst.reserve(max_encoded_len(src.len()));

    let mut run_start = 0usize;
    let mut final_zero = true;

    for (idx, &byte) in src.iter().enumerate() {
        if byte == 0 {
            final_zero = true;
            dst.put_u8((idx - run_start + 1) as u8);
            dst.put_slice(&src[run_start..idx]);
            run_start = idx + 1;
        } else if idx - run_start == MAX_RUN - 1 {
            final_zero = false;
            dst.put_u8(0xFF);
            dst.put_slice(&src[run_start..=idx]);
            run_start = idx + 1;
        }
    }

    if run_start != src.len() || final_zero {
        dst.put_u8((src.len() - run_start + 1) as u8);
        dst.put_slice(&src[run_start..]);
    }
}

/// Convenience wrapper around [`encode`].
pub fn encode_to_vec(src: &[u8]) -> Vec<u8> {
    let mut dst = BytesMut::with_capacity(max_encoded_len(src.len()));
    encode(src, &mut dst);
    dst.to_vec()
}

/// Reverse [`encode`]. `src` must not include the frame delimiter.
pub fn decode(src: &[u8], dst: &mut BytesMut) -> Result<()> {
    dst.reserve(src.len());

    let mut idx = 0usize;
    while idx < src.len() {
        let code = src[idx] as usize;
        if code == 0 {
            return Err(FramingError::Cobs("zero byte inside stuffed data"));
        }
        idx += 1;

        let end = idx + code - 1;
        if end > src.len() {
            return Err(FramingError::Cobs("code byte overruns input"));
        }

        let run = &src[idx..end];
        if run.contains(&0) {
            return Err(FramingError::Cobs("zero byte inside stuffed data"));
        }
        dst.put_slice(run);
        idx = end;

        if idx < src.len() && code < 0xFF {
            dst.put_u8(0);
        }
    }
    Ok(())
}
