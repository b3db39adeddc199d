//! Board-agnostic core logic for the Smart Monitor display
//!
//! This crate contains everything between a decoded status line and the
//! pixels, none of which depends on specific hardware:
//!
//! - Sticky metric snapshot merged from status messages
//! - Smoothed gauges and network auto-scaling
//! - Scrolling ticker text
//! - Character micro-animations (blink, wink, sweat, head bob)
//! - Sleep state machine and mood bands
//! - Link freshness tracking
//! - The `App` value that ties them together for the control loop

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod animation;
pub mod app;
pub mod config;
pub mod math;
pub mod metrics;
pub mod state;
pub mod time;

pub use app::{App, IngestError};
pub use config::AnimationConfig;
pub use metrics::MetricSnapshot;
pub use time::Millis;
