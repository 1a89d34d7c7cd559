//! Ordered, single-writer delivery of Blot frames.
//!
//! Any number of producers push pre-encoded frames; one dedicated worker
//! thread owns the transport and writes them in push order. A shutdown
//! sentinel stops the worker once everything queued before it is written.
//!
//! ```text
//! producer ─┐
//! producer ─┼─► DeliveryQueue (FIFO) ─► worker thread ─► FrameSink
//! producer ─┘
//! ```
//!
//! [`Plotter`] layers the firmware's commands on top.

pub mod commands;
pub mod error;
pub mod plotter;
pub mod queue;
pub mod script;
pub mod worker;

pub use commands::{Command, PEN_DOWN_PULSE_US, PEN_UP_PULSE_US};
pub use error::{QueueError, Result};
pub use plotter::{square_commands, Plotter};
pub use queue::{DeliveryQueue, WorkerState};
pub use script::{parse_command, parse_script, ParseError};
pub use worker::{spawn, spawn_with_config, QueueConfig, WorkerHandle, WorkerReport};
