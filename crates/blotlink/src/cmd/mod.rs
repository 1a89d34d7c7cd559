use clap::{Args, Subcommand};
use std::path::PathBuf;

use blotlink_queue::Command as PlotterCommand;
use blotlink_transport::DEFAULT_BAUD_RATE;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod run;
pub mod send;
mod session;
pub mod square;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one event and print the frame without touching a port.
    Encode(EncodeArgs),
    /// Decode hex frames with the reference decoder.
    Decode(DecodeArgs),
    /// Send a single event to the plotter.
    Send(SendArgs),
    /// Stream a command script to the plotter.
    Run(RunArgs),
    /// Draw the demo square.
    Square(SquareArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Run(args) => run::run(args, format),
        Command::Square(args) => square::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PayloadArgs {
    /// Raw payload as hex.
    #[arg(long, conflicts_with_all = ["go", "servo"])]
    pub hex: Option<String>,
    /// Target coordinates for a `go` payload (e.g. 10,20).
    #[arg(long, value_name = "X,Y", allow_hyphen_values = true, conflicts_with_all = ["hex", "servo"])]
    pub go: Option<String>,
    /// Servo pulse width in microseconds.
    #[arg(long, value_name = "MICROS", allow_hyphen_values = true, conflicts_with_all = ["hex", "go"])]
    pub servo: Option<i32>,
}

impl PayloadArgs {
    /// Build the command for `event` with the requested payload encoding.
    pub fn command(&self, event: &str) -> CliResult<PlotterCommand> {
        if let Some(coords) = &self.go {
            let (x, y) = parse_point(coords)?;
            return Ok(match event {
                blotlink_frame::events::GO => PlotterCommand::go(x, y),
                _ => PlotterCommand::Raw {
                    event: event.to_string(),
                    payload: PlotterCommand::go(x, y).payload(),
                },
            });
        }
        if let Some(pulse_us) = self.servo {
            return Ok(match event {
                blotlink_frame::events::SERVO => PlotterCommand::Servo { pulse_us },
                _ => PlotterCommand::Raw {
                    event: event.to_string(),
                    payload: PlotterCommand::Servo { pulse_us }.payload(),
                },
            });
        }
        let payload = match &self.hex {
            Some(hex) => parse_hex(hex)?,
            None => Vec::new(),
        };
        Ok(PlotterCommand::Raw {
            event: event.to_string(),
            payload: payload.into(),
        })
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Event name (e.g. go, servo, motorsOn).
    pub event: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
    /// Sequence number to stamp.
    #[arg(long, default_value = "0")]
    pub sequence: u8,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded wire bytes (one or more frames).
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read raw wire bytes from a capture file instead.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PortArgs {
    /// Serial device path.
    #[arg(env = "BLOT_PORT")]
    pub port: PathBuf,
    /// Line speed.
    #[arg(long, env = "BLOT_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Event name.
    pub event: String,
    #[command(flatten)]
    pub payload: PayloadArgs,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Script file. Reads stdin when omitted or `-`.
    pub script: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SquareArgs {
    #[command(flatten)]
    pub port: PortArgs,
    /// Side length in plotter units.
    #[arg(long, default_value = "50")]
    pub size: f32,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_point(input: &str) -> CliResult<(f32, f32)> {
    let (x, y) = input
        .split_once(',')
        .ok_or_else(|| CliError::new(USAGE, format!("--go expects X,Y, got {input:?}")))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f32>()
            .map_err(|_| CliError::new(USAGE, format!("invalid coordinate: {value:?}")))
    };
    Ok((parse(x)?, parse(y)?))
}

/// Decode hex, tolerating whitespace and an optional `0x` prefix.
pub fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input.split_whitespace().collect();
    let cleaned = cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
        .unwrap_or(&cleaned);
    hex::decode(cleaned).map_err(|err| CliError::new(USAGE, format!("invalid hex: {err}")))
}
