//! Host metric sampling
//!
//! [`Collector`] owns the sysinfo handles and produces a [`Sample`] per
//! interval. Turning a sample into a wire message and computing network
//! rates are plain functions so they can be tested without a live system.

use std::path::Path;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use smon_protocol::{NetRates, StatusMessage};
use sysinfo::{Disks, Networks, System};

/// Shortest interval used for a rate, in seconds
pub const MIN_RATE_INTERVAL_S: f64 = 0.1;

const KIB: u64 = 1024;

/// One round of host measurements
///
/// Anything the host could not measure is `None` and left out of the
/// message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sample {
    pub cpu_percent: Option<f32>,
    pub ram_total_kib: Option<u64>,
    pub ram_available_kib: Option<u64>,
    pub disk_free_kib: Option<u64>,
    pub uptime_s: Option<u64>,
    pub host_name: Option<String>,
    pub unix_time_s: Option<u64>,
    pub net: Option<NetRates>,
}

impl Sample {
    /// Build the status record for this sample
    ///
    /// `app` overrides the header title on the display.
    pub fn to_message(&self, app: Option<&str>) -> StatusMessage {
        let ram_used = match (self.ram_total_kib, self.ram_available_kib) {
            (Some(total), Some(available)) => Some(total.saturating_sub(available)),
            _ => None,
        };

        StatusMessage {
            cpu: self.cpu_percent.map(|cpu| cpu.clamp(0.0, 100.0)),
            ram: self.ram_total_kib.map(to_i64),
            ram_used: ram_used.map(to_i64),
            weather: None,
            host: self.host_name.clone().filter(|host| !host.is_empty()),
            time: self.unix_time_s.map(to_i64),
            uptime: self.uptime_s.map(to_i64),
            disk_free: self.disk_free_kib.map(to_i64),
            net: self.net.clone(),
            app: app.map(str::trim).filter(|app| !app.is_empty()).map(String::from),
        }
    }
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Network throughput from cumulative byte counters
#[derive(Debug, Clone, Default)]
pub struct RateMeter {
    last: Option<Counters>,
}

#[derive(Debug, Clone, Copy)]
struct Counters {
    at: Instant,
    rx_bytes: u64,
    tx_bytes: u64,
}

impl RateMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new totals and return KiB/s since the previous call
    ///
    /// The first call only primes the meter. Counters that went backwards
    /// (interface reset) count as zero traffic.
    pub fn update(&mut self, at: Instant, rx_bytes: u64, tx_bytes: u64) -> Option<NetRates> {
        let current = Counters {
            at,
            rx_bytes,
            tx_bytes,
        };
        let previous = self.last.replace(current)?;

        let elapsed = at
            .saturating_duration_since(previous.at)
            .as_secs_f64()
            .max(MIN_RATE_INTERVAL_S);
        let rate = |now: u64, before: u64| (now.saturating_sub(before) as f64 / KIB as f64 / elapsed) as f32;

        Some(NetRates {
            rx: Some(rate(rx_bytes, previous.rx_bytes)),
            tx: Some(rate(tx_bytes, previous.tx_bytes)),
        })
    }
}

/// Live sampler backed by sysinfo
pub struct Collector {
    system: System,
    disks: Disks,
    networks: Networks,
    rates: RateMeter,
    cpu_primed: bool,
}

impl Collector {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta; the first reading is only a baseline
        system.refresh_cpu_usage();

        Self {
            system,
            disks: Disks::new_with_refreshed_list(),
            networks: Networks::new_with_refreshed_list(),
            rates: RateMeter::new(),
            cpu_primed: false,
        }
    }

    /// Measure everything once
    pub fn sample(&mut self) -> Sample {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        self.disks.refresh();
        self.networks.refresh();

        let cpu_percent = if self.cpu_primed {
            Some(self.system.global_cpu_info().cpu_usage())
        } else {
            self.cpu_primed = true;
            None
        };

        let total = self.system.total_memory();
        let (ram_total_kib, ram_available_kib) = if total > 0 {
            (Some(total / KIB), Some(self.system.available_memory() / KIB))
        } else {
            (None, None)
        };

        let (rx_bytes, tx_bytes) = self
            .networks
            .list()
            .values()
            .fold((0u64, 0u64), |(rx, tx), data| {
                (
                    rx.saturating_add(data.total_received()),
                    tx.saturating_add(data.total_transmitted()),
                )
            });

        Sample {
            cpu_percent,
            ram_total_kib,
            ram_available_kib,
            disk_free_kib: self.root_disk_free().map(|bytes| bytes / KIB),
            uptime_s: Some(System::uptime()),
            host_name: System::host_name(),
            unix_time_s: unix_time(),
            net: self.rates.update(Instant::now(), rx_bytes, tx_bytes),
        }
    }

    /// Free bytes on `/`, or on the first disk when there is no root mount
    fn root_disk_free(&self) -> Option<u64> {
        let disks = self.disks.list();
        disks
            .iter()
            .find(|disk| disk.mount_point() == Path::new("/"))
            .or_else(|| disks.first())
            .map(|disk| disk.available_space())
    }
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

fn unix_time() -> Option<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|elapsed| elapsed.as_secs())
}
