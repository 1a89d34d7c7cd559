//! Framed serial command link for the Blot pen plotter.
//!
//! blotlink turns plotter commands into COBS-stuffed, sequence-numbered frames
//! and delivers them in order over a serial line from a single writer thread.
//!
//! # Crate Structure
//!
//! - [`transport`]: Serial device opening and the frame sink boundary
//! - [`frame`]: Event framing, COBS, sequence stamping, reference decoder
//! - [`queue`]: Delivery queue, worker and plotter commands (behind `queue` feature)

/// Re-export transport types.
pub mod transport {
    pub use blotlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use blotlink_frame::*;
}

/// Re-export delivery queue types (requires `queue` feature).
#[cfg(feature = "queue")]
pub mod queue {
    pub use blotlink_queue::*;
}
