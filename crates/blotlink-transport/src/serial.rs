use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::SerialConfig;
use crate::error::{Result, TransportError};

/// Baud rates accepted by [`SerialPort::open`].
pub const SUPPORTED_BAUD_RATES: [u32; 9] = [
    1200, 2400, 4800, 9600, 19_200, 38_400, 57_600, 115_200, 230_400,
];

/// An open serial device.
///
/// On Unix the line is switched to raw mode at the configured baud rate when
/// the path refers to a tty. Any other openable path (a regular file or a FIFO)
/// is used as-is, which makes dry runs and capture files possible.
pub struct SerialPort {
    file: File,
    path: PathBuf,
    is_tty: bool,
}

impl SerialPort {
    /// Open and configure the device described by `config`.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        if !SUPPORTED_BAUD_RATES.contains(&config.baud_rate) {
            return Err(TransportError::UnsupportedBaud(config.baud_rate));
        }

        let path = config.path.clone();
        let file = open_device(&path).map_err(|source| TransportError::Open {
            path: path.clone(),
            source,
        })?;

        let is_tty = platform::is_tty(&file);
        if is_tty {
            platform::configure_raw(&file, config).map_err(|source| {
                TransportError::Configure {
                    path: path.clone(),
                    source,
                }
            })?;
            info!(?path, baud = config.baud_rate, "serial port opened");
        } else {
            debug!(?path, "not a tty, skipping line configuration");
        }

        Ok(Self { file, path, is_tty })
    }

    /// Device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether line settings were applied (the path is a terminal device).
    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Try to clone this port (creates a new file descriptor).
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            file: self.file.try_clone()?,
            path: self.path.clone(),
            is_tty: self.is_tty,
        })
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for SerialPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl std::fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("tty", &self.is_tty)
            .finish()
    }
}

fn open_device(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOCTTY);
    }
    options.open(path)
}

#[cfg(unix)]
mod platform {
    use std::fs::File;
    use std::os::fd::AsRawFd;

    use crate::config::SerialConfig;

    pub(super) fn is_tty(file: &File) -> bool {
        // SAFETY: the descriptor is owned by `file` and open for the duration of the call.
        unsafe { libc::isatty(file.as_raw_fd()) == 1 }
    }

    pub(super) fn configure_raw(file: &File, config: &SerialConfig) -> std::io::Result<()> {
        let speed = speed_for(config.baud_rate).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("no termios speed for {}", config.baud_rate),
            )
        })?;
        let fd = file.as_raw_fd();

        // SAFETY: `termios` is plain data; an all-zero value is a valid
        // starting point that tcgetattr overwrites before use.
        let mut tio: libc::termios = unsafe { std::mem::zeroed() };

        // SAFETY: `fd` is an open terminal descriptor and `tio` is a valid
        // writable termios for every call below.
        unsafe {
            if libc::tcgetattr(fd, &mut tio) != 0 {
                return Err(std::io::Error::last_os_error());
            }
            libc::cfmakeraw(&mut tio);
            if libc::cfsetispeed(&mut tio, speed) != 0 || libc::cfsetospeed(&mut tio, speed) != 0 {
                return Err(std::io::Error::last_os_error());
            }
        }

        tio.c_cflag |= libc::CLOCAL | libc::CREAD;
        match config.timeout {
            Some(timeout) => {
                let tenths = (timeout.as_millis() / 100).clamp(1, u8::MAX as u128) as libc::cc_t;
                tio.c_cc[libc::VMIN] = 0;
                tio.c_cc[libc::VTIME] = tenths;
            }
            None => {
                tio.c_cc[libc::VMIN] = 1;
                tio.c_cc[libc::VTIME] = 0;
            }
        }

        // SAFETY: see above; `tio` was initialised by tcgetattr.
        let rc = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &tio) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error());
        }
        Ok(())
    }

    fn speed_for(baud: u32) -> Option<libc::speed_t> {
        let speed = match baud {
            1200 => libc::B1200,
            2400 => libc::B2400,
            4800 => libc::B4800,
            9600 => libc::B9600,
            19_200 => libc::B19200,
            38_400 => libc::B38400,
            57_600 => libc::B57600,
            115_200 => libc::B115200,
            230_400 => libc::B230400,
            _ => return None,
        };
        Some(speed)
    }

}

#[cfg(not(unix))]
mod platform {
    use std::fs::File;

    use crate::config::SerialConfig;

    pub(super) fn is_tty(_file: &File) -> bool {
        false
    }

    pub(super) fn configure_raw(_file: &File, _config: &SerialConfig) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FrameSink;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "blotlink-serial-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn regular_file_opens_without_line_setup() {
        let path = temp_path("plain");
        std::fs::write(&path, b"").unwrap();

        let mut port = SerialPort::open(&SerialConfig::new(&path)).unwrap();
        assert!(!port.is_tty());
        assert_eq!(port.path(), path.as_path());

        port.write_frame(&[0x03, b'h', b'i', 0x00]).unwrap();
        drop(port);

        assert_eq!(std::fs::read(&path).unwrap(), vec![0x03, b'h', b'i', 0x00]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_device_reports_open_error() {
        let path = temp_path("missing");
        let err = SerialPort::open(&SerialConfig::new(&path)).unwrap_err();
        assert!(matches!(err, TransportError::Open { path: p, .. } if p == path));
    }

    #[test]
    fn unsupported_baud_rejected_before_open() {
        let cfg = SerialConfig::new("/nonexistent/tty").with_baud_rate(12_345);
        let err = SerialPort::open(&cfg).unwrap_err();
        assert!(matches!(err, TransportError::UnsupportedBaud(12_345)));
    }

    #[test]
    fn clone_shares_device() {
        let path = temp_path("clone");
        std::fs::write(&path, b"").unwrap();

        let port = SerialPort::open(&SerialConfig::new(&path)).unwrap();
        let clone = port.try_clone().unwrap();
        assert_eq!(clone.path(), port.path());
        assert_eq!(format!("{clone:?}"), format!("{port:?}"));
        let _ = std::fs::remove_file(&path);
    }
}
