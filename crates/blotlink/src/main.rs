mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "blotlink", version, about = "Blot plotter serial link CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from([
            "blotlink",
            "send",
            "/dev/ttyACM0",
            "go",
            "--go",
            "10,20",
            "--baud",
            "115200",
        ])
        .expect("send args should parse");

        match cli.command {
            Command::Send(args) => {
                assert_eq!(args.event, "go");
                assert_eq!(args.port.baud, 115_200);
                assert_eq!(args.payload.go.as_deref(), Some("10,20"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "blotlink", "encode", "servo", "--servo", "500", "--hex", "01",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn go_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["blotlink", "encode", "go", "--go", "-5,2.5"])
            .expect("negative coordinates should parse");
        assert!(matches!(cli.command, Command::Encode(_)));
    }

    #[test]
    fn square_defaults_size() {
        let cli = Cli::try_parse_from(["blotlink", "square", "/tmp/plotter"])
            .expect("square args should parse");
        match cli.command {
            Command::Square(args) => assert_eq!(args.size, 50.0),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn decode_requires_input() {
        let err = Cli::try_parse_from(["blotlink", "decode"]).expect_err("input is required");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn sequence_must_fit_in_a_byte() {
        assert!(Cli::try_parse_from(["blotlink", "encode", "motorsOn", "--sequence", "256"]).is_err());
    }
}
