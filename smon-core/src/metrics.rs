//! Latest known host metrics
//!
//! Each status message only overwrites the fields it carries. Everything
//! else keeps the value from earlier messages; there is no other history.

use heapless::String;
use smon_protocol::StatusMessage;

/// Maximum stored length of the host and application names
pub const TITLE_LEN: usize = 32;

/// Header title used when neither app nor host name is known
pub const DEFAULT_TITLE: &str = "SMON";

/// Bounded text for names shown in the header
pub type Title = String<TITLE_LEN>;

/// Sticky snapshot of host metrics
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MetricSnapshot {
    /// CPU usage, percent
    pub cpu_percent: Option<f32>,
    /// Total RAM, KiB
    pub ram_total_kb: Option<i64>,
    /// Used RAM, KiB
    pub ram_used_kb: Option<i64>,
    /// Outside temperature, °C
    pub temperature_c: Option<f32>,
    /// Free disk space, KiB
    pub disk_free_kb: Option<i64>,
    /// Host uptime, seconds
    pub uptime_s: Option<i64>,
    /// Host wall clock, UNIX seconds
    pub epoch_s: Option<i64>,
    /// Network receive rate, KiB/s
    pub net_rx_kbs: Option<f32>,
    /// Network transmit rate, KiB/s
    pub net_tx_kbs: Option<f32>,
    pub host_name: Title,
    /// Foreground application, trimmed
    pub app_name: Title,
}

impl MetricSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a decoded message, keeping previous values for absent fields
    pub fn merge(&mut self, msg: &StatusMessage) {
        overwrite(&mut self.cpu_percent, msg.cpu);
        overwrite(&mut self.ram_total_kb, msg.ram);
        overwrite(&mut self.ram_used_kb, msg.ram_used);
        overwrite(
            &mut self.temperature_c,
            msg.weather.as_ref().and_then(|w| w.temp),
        );
        overwrite(&mut self.epoch_s, msg.time);
        overwrite(&mut self.uptime_s, msg.uptime);
        overwrite(&mut self.disk_free_kb, msg.disk_free);
        if let Some(net) = &msg.net {
            overwrite(&mut self.net_rx_kbs, net.rx);
            overwrite(&mut self.net_tx_kbs, net.tx);
        }
        if let Some(host) = &msg.host {
            set_title(&mut self.host_name, host);
        }
        if let Some(app) = &msg.app {
            set_title(&mut self.app_name, app.trim());
        }
    }

    /// CPU usage if a valid (non-negative) value is known
    pub fn cpu(&self) -> Option<f32> {
        self.cpu_percent.filter(|cpu| *cpu >= 0.0)
    }

    /// Used/total RAM ratio if both values are usable
    pub fn ram_ratio(&self) -> Option<f32> {
        match (self.ram_total_kb, self.ram_used_kb) {
            (Some(total), Some(used)) if total > 0 && used >= 0 => Some(used as f32 / total as f32),
            _ => None,
        }
    }

    /// Free RAM in whole MiB
    pub fn ram_free_mb(&self) -> Option<i64> {
        match (self.ram_total_kb, self.ram_used_kb) {
            (Some(total), Some(used)) if total > 0 && used >= 0 => Some((total - used) / 1024),
            _ => None,
        }
    }

    /// Temperature if known and a real number
    pub fn temperature(&self) -> Option<f32> {
        self.temperature_c.filter(|t| !t.is_nan())
    }

    /// Free disk space if known and non-negative
    pub fn disk_free(&self) -> Option<i64> {
        self.disk_free_kb.filter(|kb| *kb >= 0)
    }

    /// Uptime if known and non-negative
    pub fn uptime(&self) -> Option<i64> {
        self.uptime_s.filter(|s| *s >= 0)
    }

    /// Combined network rate, floored at zero, once both directions are known
    pub fn net_total(&self) -> Option<f32> {
        match (self.net_rx_kbs, self.net_tx_kbs) {
            (Some(rx), Some(tx)) if !rx.is_nan() && !tx.is_nan() => Some((rx + tx).max(0.0)),
            _ => None,
        }
    }

    /// Header title: application, else host, else the default
    pub fn title(&self) -> &str {
        if !self.app_name.is_empty() {
            self.app_name.as_str()
        } else if !self.host_name.is_empty() {
            self.host_name.as_str()
        } else {
            DEFAULT_TITLE
        }
    }
}

#[inline]
fn overwrite<T>(slot: &mut Option<T>, incoming: Option<T>) {
    if incoming.is_some() {
        *slot = incoming;
    }
}

/// Copy as many whole characters as fit
fn set_title(dst: &mut Title, src: &str) {
    dst.clear();
    for ch in src.chars() {
        if dst.push(ch).is_err() {
            break;
        }
    }
}
