use std::fs;
use std::io::Cursor;

use blotlink_frame::FrameReader;
use tracing::warn;

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{framing_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_frames, FrameOutput, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = match (&args.hex, &args.file) {
        (_, Some(path)) => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?,
        (Some(hex), None) => parse_hex(hex)?,
        (None, None) => Vec::new(),
    };

    let mut reader = FrameReader::new(Cursor::new(wire));
    let mut frames = Vec::new();
    for frame in reader.by_ref() {
        let frame = frame.map_err(|err| framing_error("decode failed", err))?;
        frames.push(FrameOutput::from_raw(&frame));
    }

    let discarded = reader.discarded();
    let trailing = reader.has_partial();
    if trailing {
        warn!("input ends without a frame delimiter");
    }

    if frames.is_empty() {
        return Err(CliError::new(
            DATA_INVALID,
            format!("no intact frames in input ({discarded} discarded)"),
        ));
    }

    print_frames(&frames, format);

    if discarded > 0 || trailing {
        return Ok(DATA_INVALID);
    }
    Ok(SUCCESS)
}
