//! Smart Monitor Serial Protocol
//!
//! This crate defines the one-way link between the host computer and the
//! status display. The host writes one JSON object per line at 115200 baud;
//! the display never answers.
//!
//! # Protocol Overview
//!
//! ```text
//! {"cpu":12.5,"ram":16384000,"ram_used":8120000,"net":{"rx":3.1,"tx":0.4}}\n
//! ```
//!
//! - Records are terminated by CR or LF; blank records are ignored.
//! - A record longer than [`MAX_LINE_LEN`] bytes is dropped whole.
//! - Every field is optional. A receiver keeps the previous value of any
//!   field the record leaves out.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

pub mod line;
pub mod status;

pub use line::{Line, LineError, LineReader, Lines, MAX_LINE_LEN};
pub use status::{DecodeError, EncodeError, NetRates, StatusMessage, Weather};
