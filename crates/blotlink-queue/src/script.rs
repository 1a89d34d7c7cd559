//! Line-oriented command scripts.
//!
//! ```text
//! # draw a short line
//! motors on
//! pen down
//! go 10 20
//! pen up
//! servo 1500
//! raw led 01ff
//! motors off
//! ```

use bytes::Bytes;

use crate::commands::Command;

/// A script line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number (0 when parsing a single command).
    pub line: usize,
    pub reason: String,
}

impl ParseError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            line: 0,
            reason: reason.into(),
        }
    }
}

/// Parse one script line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = match line.split_once('#') {
        Some((code, _comment)) => code,
        None => line,
    };
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (keyword.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("go", [x, y]) => Command::go(parse_coord(x)?, parse_coord(y)?),
        ("go", _) => return Err(ParseError::new("usage: go X Y")),
        ("pen", ["up"]) => Command::pen_up(),
        ("pen", ["down"]) => Command::pen_down(),
        ("pen", _) => return Err(ParseError::new("usage: pen up|down")),
        ("servo", [pulse]) => Command::Servo {
            pulse_us: pulse
                .parse()
                .map_err(|_| ParseError::new(format!("invalid pulse width: {pulse}")))?,
        },
        ("servo", _) => return Err(ParseError::new("usage: servo MICROSECONDS")),
        ("motors", ["on"]) => Command::MotorsOn,
        ("motors", ["off"]) => Command::MotorsOff,
        ("motors", _) => return Err(ParseError::new("usage: motors on|off")),
        ("shutdown", []) => Command::Shutdown,
        ("shutdown", _) => return Err(ParseError::new("usage: shutdown")),
        ("raw", [event]) => Command::Raw {
            event: event.to_string(),
            payload: Bytes::new(),
        },
        ("raw", [event, payload]) => Command::Raw {
            event: event.to_string(),
            payload: hex::decode(payload)
                .map(Bytes::from)
                .map_err(|err| ParseError::new(format!("invalid hex payload: {err}")))?,
        },
        ("raw", _) => return Err(ParseError::new("usage: raw EVENT [HEX]")),
        (other, _) => return Err(ParseError::new(format!("unknown command: {other}"))),
    };
    Ok(Some(command))
}

/// Parse a whole script, stopping at the first bad line.
pub fn parse_script(text: &str) -> Result<Vec<Command>, ParseError> {
    let mut commands = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        match parse_command(line) {
            Ok(Some(command)) => commands.push(command),
            Ok(None) => {}
            Err(err) => return Err(ParseError { line: idx + 1, ..err }),
        }
    }
    Ok(commands)
}

fn parse_coord(raw: &str) -> Result<f32, ParseError> {
    let value: f32 = raw
        .parse()
        .map_err(|_| ParseError::new(format!("invalid coordinate: {raw}")))?;
    if !value.is_finite() {
        return Err(ParseError::new(format!("coordinate must be finite: {raw}")));
    }
    Ok(value)
}
