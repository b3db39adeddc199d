//! Scrolling status ticker
//!
//! The text is rebuilt after every decoded message and scrolls one pixel
//! per tick. Layout assumes a fixed-advance font of [`GLYPH_WIDTH`] pixels.

use core::fmt::{self, Write};

use heapless::String;

use crate::metrics::MetricSnapshot;

/// Horizontal advance of one glyph, pixels
pub const GLYPH_WIDTH: i32 = 6;

/// Ticker text capacity; fits every field at its widest
pub const TICKER_CAPACITY: usize = 128;

/// Shown when no field is available
pub const PLACEHOLDER: &str = " Smart Monitor";

/// Trailing gap before the text wraps around
const PADDING: &str = "   ";

pub type TickerText = String<TICKER_CAPACITY>;

/// Disk space from KiB, in MB up to 9999 MB and in GB above
#[derive(Debug, Clone, Copy)]
pub struct Disk(pub i64);

impl fmt::Display for Disk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            return f.write_str("--");
        }
        let mb = self.0 / 1024;
        if mb > 9999 {
            write!(f, "{}GB", mb / 1024)
        } else {
            write!(f, "{}MB", mb)
        }
    }
}

/// Uptime from seconds as `[Nd ]HhMm`
#[derive(Debug, Clone, Copy)]
pub struct Uptime(pub i64);

impl fmt::Display for Uptime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            return f.write_str("--");
        }
        let minutes = self.0 / 60;
        let hours = minutes / 60;
        let days = hours / 24;
        if days > 0 {
            write!(f, "{}d ", days)?;
        }
        write!(f, "{}h{}m", hours % 24, minutes % 60)
    }
}

/// Marquee state
#[derive(Debug, Clone)]
pub struct Ticker {
    text: TickerText,
    width_px: i32,
    offset_px: i32,
    viewport_px: i32,
}

impl Ticker {
    /// Create a ticker showing the placeholder, parked at the right edge
    pub fn new(viewport_px: i32) -> Self {
        let mut ticker = Self {
            text: TickerText::new(),
            width_px: 1,
            offset_px: viewport_px,
            viewport_px,
        };
        ticker.set_text(placeholder());
        ticker
    }

    /// Rebuild the text from the snapshot
    pub fn rebuild(&mut self, metrics: &MetricSnapshot) {
        let text = compose(metrics).unwrap_or_else(|_| placeholder());
        self.set_text(text);
    }

    fn set_text(&mut self, text: TickerText) {
        self.width_px = (text.chars().count() as i32 * GLYPH_WIDTH).max(1);
        self.text = text;
        if self.offset_px > self.viewport_px || self.offset_px + self.width_px < 0 {
            self.offset_px = self.viewport_px;
        }
    }

    /// Move one pixel left, wrapping once fully past the left edge
    pub fn scroll(&mut self) {
        self.offset_px -= 1;
        if self.offset_px + self.width_px < 0 {
            self.offset_px = self.viewport_px;
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_str()
    }

    pub fn width_px(&self) -> i32 {
        self.width_px
    }

    /// Left edge of the text relative to the viewport
    pub fn offset_px(&self) -> i32 {
        self.offset_px
    }
}

fn placeholder() -> TickerText {
    let mut text = TickerText::new();
    // Both fit the capacity
    let _ = text.push_str(PLACEHOLDER);
    let _ = text.push_str(PADDING);
    text
}

fn compose(metrics: &MetricSnapshot) -> Result<TickerText, fmt::Error> {
    let mut text = TickerText::new();
    if let Some(temp) = metrics.temperature() {
        write!(text, "  {}C", temp as i32)?;
    }
    if let Some(cpu) = metrics.cpu() {
        write!(text, "  CPU {}%", cpu as i32)?;
    }
    if let Some(free_mb) = metrics.ram_free_mb() {
        write!(text, "  RAM {}MB", free_mb)?;
    }
    if let Some(kb) = metrics.disk_free() {
        write!(text, "  DISK {}", Disk(kb))?;
    }
    if let Some(seconds) = metrics.uptime() {
        write!(text, "  UPT {}", Uptime(seconds))?;
    }
    if text.is_empty() {
        return Ok(placeholder());
    }
    text.push_str(PADDING).map_err(|_| fmt::Error)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use smon_protocol::StatusMessage;

    fn snapshot(line: &str) -> MetricSnapshot {
        let mut snap = MetricSnapshot::new();
        snap.merge(&StatusMessage::decode(line).unwrap());
        snap
    }

    #[test]
    fn test_disk_format() {
        assert_eq!(format!("{}", Disk(512 * 1024)), "512MB");
        assert_eq!(format!("{}", Disk(9999 * 1024)), "9999MB");
        assert_eq!(format!("{}", Disk(10_000 * 1024)), "9GB");
        assert_eq!(format!("{}", Disk(52_428_800)), "50GB");
        assert_eq!(format!("{}", Disk(-1)), "--");
    }

    #[test]
    fn test_uptime_format() {
        assert_eq!(format!("{}", Uptime(59)), "0h0m");
        assert_eq!(format!("{}", Uptime(3 * 3600 + 25 * 60)), "3h25m");
        assert_eq!(format!("{}", Uptime(93_784)), "1d 2h3m");
        assert_eq!(format!("{}", Uptime(-1)), "--");
    }

    #[test]
    fn test_full_text() {
        let mut ticker = Ticker::new(128);
        ticker.rebuild(&snapshot(
            r#"{"cpu":42.9,"ram":8192,"ram_used":2048,"weather":{"temp":-3.7},
                "disk_free":52428800,"uptime":93784}"#,
        ));
        assert_eq!(
            ticker.text(),
            "  -3C  CPU 42%  RAM 6MB  DISK 50GB  UPT 1d 2h3m   "
        );
        assert_eq!(ticker.width_px(), ticker.text().len() as i32 * GLYPH_WIDTH);
    }

    #[test]
    fn test_placeholder_when_nothing_known() {
        let mut ticker = Ticker::new(128);
        ticker.rebuild(&snapshot("{}"));
        assert_eq!(ticker.text(), " Smart Monitor   ");
        ticker.rebuild(&snapshot(r#"{"host":"box","net":{"rx":1,"tx":2}}"#));
        assert_eq!(ticker.text(), " Smart Monitor   ");
    }

    #[test]
    fn test_scroll_wraps_after_leaving_left_edge() {
        let mut ticker = Ticker::new(128);
        let width = ticker.width_px();
        for _ in 0..(128 + width) {
            ticker.scroll();
        }
        assert_eq!(ticker.offset_px(), -width);
        ticker.scroll();
        assert_eq!(ticker.offset_px(), 128);
    }

    #[test]
    fn test_shorter_text_resets_out_of_range_offset() {
        let mut ticker = Ticker::new(128);
        ticker.rebuild(&snapshot(
            r#"{"cpu":50,"ram":8192,"ram_used":2048,"disk_free":52428800,"uptime":93784}"#,
        ));
        for _ in 0..250 {
            ticker.scroll();
        }
        assert_eq!(ticker.offset_px(), 128 - 250);

        // Same text keeps scrolling from where it was
        ticker.rebuild(&snapshot(
            r#"{"cpu":50,"ram":8192,"ram_used":2048,"disk_free":52428800,"uptime":93784}"#,
        ));
        assert_eq!(ticker.offset_px(), 128 - 250);

        // "  CPU 50%   " is already past the left edge at this offset
        ticker.rebuild(&snapshot(r#"{"cpu":50}"#));
        assert_eq!(ticker.offset_px(), 128);
    }
}
