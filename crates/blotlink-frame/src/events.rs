//! Event names understood by the Blot firmware.
//!
//! The codec accepts any name up to 255 bytes; these are the ones the stock
//! firmware dispatches on.

/// Move to an absolute position. Payload: two little-endian `f32` (x, y).
pub const GO: &str = "go";

/// Set the pen servo pulse width. Payload: little-endian `i32` microseconds.
pub const SERVO: &str = "servo";

/// Energise the stepper drivers. No payload.
pub const MOTORS_ON: &str = "motorsOn";

/// Release the stepper drivers. No payload.
pub const MOTORS_OFF: &str = "motorsOff";

/// Ask the firmware to stop. No payload. Not supported by every firmware build.
pub const SHUTDOWN: &str = "shutdown";

/// All known event names.
pub const KNOWN_EVENTS: [&str; 5] = [GO, SERVO, MOTORS_ON, MOTORS_OFF, SHUTDOWN];

/// Returns true if the firmware is known to handle `event`.
pub fn is_known(event: &str) -> bool {
    KNOWN_EVENTS.contains(&event)
}

/// Expected payload length for a known event, if it has a fixed one.
pub fn payload_len(event: &str) -> Option<usize> {
    match event {
        GO => Some(8),
        SERVO => Some(4),
        MOTORS_ON | MOTORS_OFF | SHUTDOWN => Some(0),
        _ => None,
    }
}
