use blotlink_frame::{encode_frame, encode_raw, RawFrame};

use crate::cmd::EncodeArgs;
use crate::exit::{framing_error, CliResult, SUCCESS};
use crate::output::{print_frames, print_raw, FrameOutput, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let command = args.payload.command(&args.event)?;
    let payload = command.payload();

    let frame = encode_frame(command.event(), &payload, args.sequence)
        .map_err(|err| framing_error("encode failed", err))?;

    if let OutputFormat::Raw = format {
        print_raw(frame.as_bytes());
        return Ok(SUCCESS);
    }

    let mut raw = bytes::BytesMut::new();
    encode_raw(command.event(), &payload, args.sequence, &mut raw)
        .map_err(|err| framing_error("encode failed", err))?;

    let mut out = FrameOutput::from_raw(&RawFrame::new(command.event(), payload, args.sequence));
    out.raw = Some(hex::encode(&raw));
    out.frame = Some(hex::encode(frame.as_bytes()));
    print_frames(&[out], format);
    Ok(SUCCESS)
}
