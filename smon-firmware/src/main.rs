//! Smart Monitor - desk status display firmware
//!
//! Receives newline-delimited JSON status records from the host over UART0,
//! animates them and drives a 128x64 SH1106 OLED over I2C0.
//!
//! Everything runs in one cooperative loop: serial bytes are applied as
//! they arrive, and every animation tick first applies whatever is still
//! buffered, then advances the animation and pushes a full frame.

#![no_std]
#![no_main]

extern crate alloc;

mod sh1106;

use core::future::ready;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c, InterruptHandler as I2cInterruptHandler};
use embassy_rp::peripherals::{I2C0, UART0};
use embassy_rp::uart::{self, BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Duration, Instant, Ticker};
use embedded_alloc::LlffHeap as Heap;
use embedded_io_async::Read;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use smon_core::{AnimationConfig, App, IngestError, Millis};
use smon_display::{render, render_splash, FrameBuffer};
use smon_protocol::{LineError, LineReader};

use crate::sh1106::{Sh1106, SH1106_ADDR};

// Heap allocator for JSON decoding
#[global_allocator]
static HEAP: Heap = Heap::empty();

// Heap size: 16KB
const HEAP_SIZE: usize = 16 * 1024;

/// Host link baud rate
const BAUD_RATE: u32 = 115_200;

/// I2C clock for the OLED
const I2C_FREQUENCY: u32 = 400_000;

/// Bytes read from the UART ring buffer per call
const RX_CHUNK: usize = 64;

/// Interval between link statistics log lines
const STATS_INTERVAL_MS: u32 = 30_000;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    I2C0_IRQ => I2cInterruptHandler<I2C0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 2048]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Smart Monitor firmware starting...");

    init_heap();

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // OLED on I2C0 (GPIO4=SDA, GPIO5=SCL)
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = I2C_FREQUENCY;
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c_config);

    let mut display = Sh1106::new(i2c, SH1106_ADDR);
    let mut frame = FrameBuffer::new();
    match display.init().await {
        Ok(()) => {
            info!("OLED initialized");
            // Drawing into the frame buffer cannot fail
            let _ = render_splash(&mut frame);
            if let Err(e) = display.flush(&frame).await {
                warn!("Splash flush failed: {:?}", e);
            }
        }
        Err(e) => error!("Failed to initialize display: {:?}", e),
    }

    // Host link on UART0 (GPIO0=TX, GPIO1=RX)
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 2048]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, mut rx) = uart.split();
    info!("UART initialized at {} baud", BAUD_RATE);

    let config = AnimationConfig::default();
    // Boot time after I2C traffic varies from board to board
    let seed = Instant::now().as_ticks();
    let mut app = App::new(config, seed);
    let mut reader = LineReader::new();

    let mut ticker = Ticker::every(Duration::from_millis(config.tick_interval_ms as u64));
    let mut buf = [0u8; RX_CHUNK];
    let mut last_stats = now();

    info!("Entering control loop");

    loop {
        match select(rx.read(&mut buf), ticker.next()).await {
            Either::First(result) => {
                receive(&mut app, &mut reader, result, &buf);
            }
            Either::Second(()) => {
                // Apply bytes that are already buffered before drawing
                while let Either::First(result) = select(rx.read(&mut buf), ready(())).await {
                    if !receive(&mut app, &mut reader, result, &buf) {
                        break;
                    }
                }

                let now = now();
                app.tick(now);
                // Drawing into the frame buffer cannot fail
                let _ = render(&app, now, &mut frame);
                if let Err(e) = display.flush(&frame).await {
                    warn!("Display flush failed: {:?}", e);
                }
                trace!("Frame at {} ms", now.as_ms());

                if now.since(last_stats) >= STATS_INTERVAL_MS {
                    last_stats = now;
                    info!("Link {:?}: {:?}", app.link_state(now), app.stats());
                }
            }
        }
    }
}

/// Apply one UART read; returns false when nothing was read
fn receive(app: &mut App, reader: &mut LineReader, result: Result<usize, uart::Error>, buf: &[u8]) -> bool {
    match result {
        Ok(0) => false,
        Ok(n) => {
            trace!("RX: {} bytes", n);
            let applied = app.ingest(reader, &buf[..n], now(), log_rejected);
            if applied > 0 {
                debug!("Applied {} status line(s)", applied);
            }
            true
        }
        Err(e) => {
            warn!("UART read error: {:?}", e);
            false
        }
    }
}

fn log_rejected(err: IngestError) {
    match err {
        IngestError::Line(LineError::Overlong) => warn!("Dropped overlong line"),
        IngestError::Line(LineError::InvalidUtf8) => warn!("Dropped line with invalid UTF-8"),
        IngestError::Decode(e) => warn!("Malformed status line: {:?}", e),
    }
}

/// Milliseconds since boot on the wrapping animation clock
fn now() -> Millis {
    Millis::from_ms(Instant::now().as_millis() as u32)
}

fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
