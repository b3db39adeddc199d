//! Output side of the bridge: the display's serial port or stdout

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

/// Pause before reopening a device after a failed write
pub const REOPEN_DELAY: Duration = Duration::from_secs(1);

/// Serial write timeout
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

type Writer = Box<dyn Write + Send>;
type Opener = Box<dyn FnMut() -> io::Result<Writer> + Send>;

/// Where status lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Device(PathBuf),
}

impl FromStr for Target {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Target::Stdout,
            path => Target::Device(PathBuf::from(path)),
        })
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Stdout => f.write_str("stdout"),
            Target::Device(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Line writer that survives one transient device failure per line
pub struct Sink {
    label: String,
    open: Opener,
    writer: Writer,
    reopen_delay: Duration,
}

impl Sink {
    /// Open `target`; a device is configured for `baud` 8N1
    pub fn open(target: Target, baud: u32) -> Result<Self> {
        let label = match &target {
            Target::Stdout => target.to_string(),
            Target::Device(_) => format!("{target} @ {baud}"),
        };
        let open: Opener = match target {
            Target::Stdout => Box::new(|| Ok(Box::new(io::stdout()) as Writer)),
            Target::Device(path) => Box::new(move || open_port(&path, baud)),
        };

        let sink = Self::with_opener(label, open, REOPEN_DELAY)?;
        info!("Writing status lines to {}", sink.label);
        Ok(sink)
    }

    fn with_opener(label: String, mut open: Opener, reopen_delay: Duration) -> Result<Self> {
        let writer = open().with_context(|| format!("Failed to open {label}"))?;
        Ok(Self {
            label,
            open,
            writer,
            reopen_delay,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Write one complete line
    ///
    /// On failure the target is reopened once after the reopen delay; a
    /// second failure is returned.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        let err = match send(&mut self.writer, line) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        warn!("Write to {} failed: {}; reopening", self.label, err);
        thread::sleep(self.reopen_delay);

        self.writer = (self.open)().with_context(|| format!("Failed to reopen {}", self.label))?;
        send(&mut self.writer, line).with_context(|| format!("Write to {} failed after reopen", self.label))
    }
}

fn open_port(path: &Path, baud: u32) -> io::Result<Writer> {
    let port = serialport::new(path.to_string_lossy(), baud)
        .timeout(WRITE_TIMEOUT)
        .open()?;
    Ok(Box::new(port))
}

fn send(writer: &mut Writer, line: &str) -> io::Result<()> {
    writer.write_all(line.as_bytes())?;
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Writer that fails while the shared failure budget lasts
    struct Flaky {
        failures: Arc<AtomicUsize>,
        out: Arc<Mutex<Vec<u8>>>,
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(io::ErrorKind::BrokenPipe.into());
            }
            self.out.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        failures: Arc<AtomicUsize>,
        opens: Arc<AtomicUsize>,
        out: Arc<Mutex<Vec<u8>>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                failures: Arc::new(AtomicUsize::new(0)),
                opens: Arc::new(AtomicUsize::new(0)),
                out: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn sink(&self) -> Sink {
            let (failures, opens, out) = (self.failures.clone(), self.opens.clone(), self.out.clone());
            let open: Opener = Box::new(move || {
                opens.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(Flaky {
                    failures: failures.clone(),
                    out: out.clone(),
                }) as Writer)
            });
            Sink::with_opener("test port".into(), open, Duration::ZERO).unwrap()
        }

        fn written(&self) -> String {
            String::from_utf8(self.out.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_target_parse() {
        assert_eq!("-".parse::<Target>().unwrap(), Target::Stdout);
        assert_eq!(
            "/dev/ttyACM0".parse::<Target>().unwrap(),
            Target::Device(PathBuf::from("/dev/ttyACM0"))
        );
        assert_eq!(Target::Stdout.to_string(), "stdout");
    }

    #[test]
    fn test_missing_device_fails_to_open() {
        let path = std::env::temp_dir().join(format!("smon-bridge-{}-missing", std::process::id())).join("port");
        assert!(Sink::open(Target::Device(path), 115_200).is_err());
    }

    #[test]
    fn test_lines_are_written_in_order() {
        let harness = Harness::new();
        let mut sink = harness.sink();
        sink.write_line("{\"cpu\":12.5}\n").unwrap();
        sink.write_line("{}\n").unwrap();

        assert_eq!(harness.written(), "{\"cpu\":12.5}\n{}\n");
        assert_eq!(harness.opens.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reopens_once_after_failed_write() {
        let harness = Harness::new();
        let mut sink = harness.sink();
        harness.failures.store(1, Ordering::SeqCst);

        sink.write_line("{\"cpu\":40}\n").unwrap();
        assert_eq!(harness.opens.load(Ordering::SeqCst), 2);
        assert_eq!(harness.written(), "{\"cpu\":40}\n");
    }

    #[test]
    fn test_second_failure_is_an_error() {
        let harness = Harness::new();
        let mut sink = harness.sink();
        harness.failures.store(2, Ordering::SeqCst);

        assert!(sink.write_line("{}\n").is_err());
        assert_eq!(harness.opens.load(Ordering::SeqCst), 2);
        assert_eq!(harness.written(), "");
    }
}
