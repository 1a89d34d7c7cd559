use std::path::PathBuf;
use std::time::Duration;

/// Baud rate the Blot firmware listens on out of the box.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Serial line settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0`.
    pub path: PathBuf,
    /// Line speed. Default: 9600.
    pub baud_rate: u32,
    /// Read timeout applied to the tty (rounded to tenths of a second).
    pub timeout: Option<Duration>,
}

impl SerialConfig {
    /// Settings for `path` with the default baud rate and a one second timeout.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Some(Duration::from_secs(1)),
        }
    }

    /// Override the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_firmware() {
        let cfg = SerialConfig::new("/dev/ttyACM0");
        assert_eq!(cfg.baud_rate, 9600);
        assert_eq!(cfg.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn baud_override() {
        let cfg = SerialConfig::new("/dev/ttyUSB0").with_baud_rate(115_200);
        assert_eq!(cfg.baud_rate, 115_200);
        assert_eq!(cfg.path, PathBuf::from("/dev/ttyUSB0"));
    }
}
