//! Smart Monitor host bridge
//!
//! Samples host metrics every interval and writes one JSON status line to
//! the display's serial port (or stdout with `--port -`).
//!
//! `serialport` configures the device itself (default 115200 8N1).

mod collector;
mod sink;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, ensure, Context, Result};
use clap::Parser;
use tracing::{debug, info, Level};

use crate::collector::Collector;
use crate::sink::{Sink, Target};

#[derive(Parser, Debug)]
#[command(name = "smon-bridge", version, about = "Stream host status to a Smart Monitor display")]
struct Args {
    /// Serial device of the display, or `-` for stdout
    #[arg(long, short, value_name = "PATH")]
    port: Target,

    /// Serial line speed
    #[arg(long, short, default_value_t = 115_200, value_name = "BAUD")]
    baud: u32,

    /// Seconds between status lines
    #[arg(long, short, default_value_t = 2.0, value_name = "SECONDS")]
    interval: f64,

    /// Header title to show instead of the host name
    #[arg(long, value_name = "NAME")]
    app: Option<String>,

    /// Log at debug level and echo every line sent
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    ensure!(
        args.interval.is_finite() && args.interval > 0.0,
        "--interval must be a positive number of seconds"
    );
    let interval = Duration::from_secs_f64(args.interval);

    info!("Smart Monitor bridge starting (interval {:?})", interval);

    let mut sink = Sink::open(args.port.clone(), args.baud)?;
    let mut collector = Collector::new();

    loop {
        let started = Instant::now();

        let sample = collector.sample();
        let line = sample
            .to_message(args.app.as_deref())
            .to_line()
            .map_err(|e| anyhow!("Failed to encode status line: {:?}", e))?;

        sink.write_line(&line)
            .with_context(|| format!("Giving up on {}", sink.label()))?;
        debug!("Sent {}", line.trim_end());

        thread::sleep(interval.saturating_sub(started.elapsed()));
    }
}
