use tracing::debug;

use crate::cmd::session::{deliver, Submitted};
use crate::cmd::SendArgs;
use crate::exit::{queue_error, CliResult};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = args.payload.command(&args.event)?;
    debug!(%command, "sending single command");

    deliver(&args.port, format, |plotter| {
        plotter
            .send(&command)
            .map_err(|err| queue_error("send failed", err))?;
        Ok(Submitted {
            commands: 1,
            interrupted: false,
        })
    })
}
