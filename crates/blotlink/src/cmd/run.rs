use std::fs;
use std::io::{self, BufRead};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use blotlink_queue::{parse_command, parse_script, Command, ParseError, Plotter};
use tracing::{info, warn};

use crate::cmd::session::{deliver, Submitted};
use crate::cmd::RunArgs;
use crate::exit::{io_error, parse_error, queue_error, CliError, CliResult, INTERNAL};
use crate::output::OutputFormat;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let stop = install_interrupt_handler()?;

    match args.script.as_deref() {
        Some(path) if path != Path::new("-") => {
            let text = fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            // Reject a bad script before anything reaches the plotter.
            let commands =
                parse_script(&text).map_err(|err| parse_error("invalid script", err))?;
            info!(path = %path.display(), commands = commands.len(), "script loaded");

            deliver(&args.port, format, |plotter| {
                submit_all(plotter, &commands, &stop)
            })
        }
        _ => deliver(&args.port, format, |plotter| {
            stream_lines(plotter, io::stdin().lock(), &stop)
        }),
    }
}

fn install_interrupt_handler() -> CliResult<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        // A blocked stdin read only sees the flag once the next line or EOF arrives.
        warn!("interrupt received, stopping before the next command (press again to abort)");
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install Ctrl-C handler: {err}")))?;
    Ok(stop)
}

fn submit_all(plotter: &Plotter, commands: &[Command], stop: &AtomicBool) -> CliResult<Submitted> {
    let mut submitted = 0usize;
    for command in commands {
        if stop.load(Ordering::SeqCst) {
            return Ok(Submitted {
                commands: submitted,
                interrupted: true,
            });
        }
        plotter
            .send(command)
            .map_err(|err| queue_error("send failed", err))?;
        submitted += 1;
    }
    Ok(Submitted {
        commands: submitted,
        interrupted: false,
    })
}

/// Queue commands as lines arrive. Stops at EOF or after an interrupt.
///
/// The interrupt flag is checked between lines, so on an idle terminal it takes
/// effect only when the next line or EOF arrives. A second Ctrl-C exits at once.
fn stream_lines<R: BufRead>(plotter: &Plotter, input: R, stop: &AtomicBool) -> CliResult<Submitted> {
    let mut submitted = 0usize;
    for (index, line) in input.lines().enumerate() {
        if stop.load(Ordering::SeqCst) {
            return Ok(Submitted {
                commands: submitted,
                interrupted: true,
            });
        }
        let line = line.map_err(|err| io_error("failed reading stdin", err))?;
        let command = parse_command(&line).map_err(|err| {
            parse_error(
                "invalid script",
                ParseError {
                    line: index + 1,
                    ..err
                },
            )
        })?;
        if let Some(command) = command {
            plotter
                .send(&command)
                .map_err(|err| queue_error("send failed", err))?;
            submitted += 1;
        }
    }
    Ok(Submitted {
        commands: submitted,
        interrupted: stop.load(Ordering::SeqCst),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use blotlink_frame::FrameReader;
    use blotlink_queue::spawn;

    use super::*;

    #[test]
    fn stream_lines_queues_until_eof() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);
        let stop = AtomicBool::new(false);

        let script = "motors on\n# comment\n\ngo 1 2\nmotors off\n";
        let submitted = stream_lines(&plotter, Cursor::new(script), &stop).unwrap();
        assert_eq!(submitted.commands, 3);
        assert!(!submitted.interrupted);

        plotter.close();
        let wire = handle.join().unwrap().sink;
        let events: Vec<String> = FrameReader::new(wire.as_slice())
            .map(|f| f.unwrap().event)
            .collect();
        assert_eq!(events, vec!["motorsOn", "go", "motorsOff"]);
    }

    #[test]
    fn stream_lines_reports_line_number() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);
        let stop = AtomicBool::new(false);

        let err = stream_lines(&plotter, Cursor::new("motors on\nfly away\n"), &stop)
            .err()
            .unwrap();
        assert_eq!(err.code, crate::exit::DATA_INVALID);
        assert!(err.message.contains("line 2"), "{}", err.message);

        plotter.close();
        assert_eq!(handle.join().unwrap().frames_written, 1);
    }

    #[test]
    fn interrupt_stops_before_next_command() {
        let (queue, handle) = spawn(Vec::new()).unwrap();
        let plotter = Plotter::new(queue);
        let stop = AtomicBool::new(true);

        let commands = vec![Command::MotorsOn, Command::MotorsOff];
        let submitted = submit_all(&plotter, &commands, &stop).unwrap();
        assert_eq!(submitted.commands, 0);
        assert!(submitted.interrupted);

        plotter.close();
        assert_eq!(handle.join().unwrap().frames_written, 0);
    }
}
