use blotlink_queue::square_commands;

use crate::cmd::session::{deliver, Submitted};
use crate::cmd::SquareArgs;
use crate::exit::{queue_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub fn run(args: SquareArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.size.is_finite() || args.size <= 0.0 {
        return Err(CliError::new(
            USAGE,
            format!("--size must be a positive number, got {}", args.size),
        ));
    }

    let commands = square_commands(args.size);
    deliver(&args.port, format, |plotter| {
        let commands = plotter
            .send_all(&commands)
            .map_err(|err| queue_error("send failed", err))?;
        Ok(Submitted {
            commands,
            interrupted: false,
        })
    })
}
