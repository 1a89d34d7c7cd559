use blotlink_queue::{spawn, Plotter};
use blotlink_transport::{SerialConfig, SerialPort};
use tracing::info;

use crate::cmd::PortArgs;
use crate::exit::{queue_error, transport_error, CliResult, SUCCESS};
use crate::output::{print_delivery, DeliveryOutput, OutputFormat};

/// What a session's producer reports back.
pub struct Submitted {
    pub commands: usize,
    pub interrupted: bool,
}

/// Open the port, hand it to a delivery worker and run `produce` against a
/// plotter on it.
///
/// The worker is always shut down and joined, even if `produce` fails, so
/// everything queued before the failure still reaches the port. A worker
/// transport error takes precedence over the producer's error.
pub fn deliver<F>(port: &PortArgs, format: OutputFormat, produce: F) -> CliResult<i32>
where
    F: FnOnce(&Plotter) -> CliResult<Submitted>,
{
    let config = SerialConfig::new(&port.port).with_baud_rate(port.baud);
    let serial = SerialPort::open(&config).map_err(|err| transport_error("open failed", err))?;
    let tty = serial.is_tty();

    let (queue, handle) = spawn(serial).map_err(|err| queue_error("worker failed", err))?;
    let plotter = Plotter::new(queue);

    let outcome = produce(&plotter);
    plotter.close();
    let report = handle
        .join()
        .map_err(|err| queue_error("delivery failed", err))?;
    let submitted = outcome?;

    info!(
        commands = submitted.commands,
        frames = report.frames_written,
        bytes = report.bytes_written,
        "delivery complete"
    );

    let out = DeliveryOutput {
        port: report.sink.path(),
        tty,
        frames_written: report.frames_written,
        bytes_written: report.bytes_written,
        interrupted: submitted.interrupted,
    };
    print_delivery(&out, format);
    Ok(SUCCESS)
}
