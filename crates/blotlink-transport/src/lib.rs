//! Serial byte-sink abstraction for the Blot plotter link.
//!
//! Provides the one operation the delivery layer needs from a transport:
//! write a complete frame, in order, from a single owner.
//! - [`FrameSink`] is the write boundary (any `std::io::Write` qualifies)
//! - [`SerialPort`] opens and configures a serial device
//!
//! This is the lowest layer of blotlink. Everything else builds on top of it.

pub mod config;
pub mod error;
pub mod serial;
pub mod traits;

pub use config::{SerialConfig, DEFAULT_BAUD_RATE};
pub use error::{Result, TransportError};
pub use serial::SerialPort;
pub use traits::FrameSink;
