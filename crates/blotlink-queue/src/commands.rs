use std::fmt;

use blotlink_frame::events;
use bytes::{BufMut, Bytes, BytesMut};

/// Servo pulse width that lifts the pen.
pub const PEN_UP_PULSE_US: i32 = 500;

/// Servo pulse width that lowers the pen.
pub const PEN_DOWN_PULSE_US: i32 = 2500;

/// A plotter command, ready to be framed.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Move to absolute coordinates in plotter units.
    Go { x: f32, y: f32 },
    /// Set the pen servo pulse width.
    Servo { pulse_us: i32 },
    MotorsOn,
    MotorsOff,
    /// Firmware stop request.
    Shutdown,
    /// Any other event with a caller-built payload.
    Raw { event: String, payload: Bytes },
}

impl Command {
    pub fn go(x: f32, y: f32) -> Self {
        Command::Go { x, y }
    }

    pub fn pen_up() -> Self {
        Command::Servo {
            pulse_us: PEN_UP_PULSE_US,
        }
    }

    pub fn pen_down() -> Self {
        Command::Servo {
            pulse_us: PEN_DOWN_PULSE_US,
        }
    }

    /// Event name on the wire.
    pub fn event(&self) -> &str {
        match self {
            Command::Go { .. } => events::GO,
            Command::Servo { .. } => events::SERVO,
            Command::MotorsOn => events::MOTORS_ON,
            Command::MotorsOff => events::MOTORS_OFF,
            Command::Shutdown => events::SHUTDOWN,
            Command::Raw { event, .. } => event.as_str(),
        }
    }

    /// Payload bytes on the wire.
    pub fn payload(&self) -> Bytes {
        match self {
            Command::Go { x, y } => {
                let mut buf = BytesMut::with_capacity(8);
                buf.put_f32_le(*x);
                buf.put_f32_le(*y);
                buf.freeze()
            }
            Command::Servo { pulse_us } => {
                let mut buf = BytesMut::with_capacity(4);
                buf.put_i32_le(*pulse_us);
                buf.freeze()
            }
            Command::MotorsOn | Command::MotorsOff | Command::Shutdown => Bytes::new(),
            Command::Raw { payload, .. } => payload.clone(),
        }
    }
}

/// Formats in the script syntax accepted by [`crate::script::parse_command`].
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Go { x, y } => write!(f, "go {x} {y}"),
            Command::Servo { pulse_us } if *pulse_us == PEN_UP_PULSE_US => f.write_str("pen up"),
            Command::Servo { pulse_us } if *pulse_us == PEN_DOWN_PULSE_US => {
                f.write_str("pen down")
            }
            Command::Servo { pulse_us } => write!(f, "servo {pulse_us}"),
            Command::MotorsOn => f.write_str("motors on"),
            Command::MotorsOff => f.write_str("motors off"),
            Command::Shutdown => f.write_str("shutdown"),
            Command::Raw { event, payload } if payload.is_empty() => write!(f, "raw {event}"),
            Command::Raw { event, payload } => write!(f, "raw {event} {}", hex::encode(payload)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn go_payload_is_two_le_floats() {
        let cmd = Command::go(10.0, 20.0);
        assert_eq!(cmd.event(), "go");
        assert_eq!(
            cmd.payload().as_ref(),
            &[0x00, 0x00, 0x20, 0x41, 0x00, 0x00, 0xa0, 0x41]
        );
    }

    #[test]
    fn pen_pulses() {
        assert_eq!(Command::pen_up().payload().as_ref(), &500i32.to_le_bytes());
        assert_eq!(Command::pen_down().payload().as_ref(), &2500i32.to_le_bytes());
        assert_eq!(Command::pen_down().event(), "servo");
    }

    #[test]
    fn motor_commands_have_no_payload() {
        for cmd in [Command::MotorsOn, Command::MotorsOff, Command::Shutdown] {
            assert!(cmd.payload().is_empty());
            assert_eq!(events::payload_len(cmd.event()), Some(0));
        }
        assert_eq!(Command::MotorsOn.event(), "motorsOn");
        assert_eq!(Command::MotorsOff.event(), "motorsOff");
    }

    #[test]
    fn raw_passes_payload_through() {
        let cmd = Command::Raw {
            event: "led".to_string(),
            payload: Bytes::from_static(&[0, 1, 0]),
        };
        assert_eq!(cmd.event(), "led");
        assert_eq!(cmd.payload().as_ref(), &[0, 1, 0]);
        assert_eq!(cmd.to_string(), "raw led 000100");
    }

    #[test]
    fn display_uses_script_syntax() {
        assert_eq!(Command::go(1.5, -2.0).to_string(), "go 1.5 -2");
        assert_eq!(Command::pen_up().to_string(), "pen up");
        assert_eq!(Command::Servo { pulse_us: 1200 }.to_string(), "servo 1200");
        assert_eq!(Command::MotorsOff.to_string(), "motors off");
    }
}
