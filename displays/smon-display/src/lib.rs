//! Rendering for the Smart Monitor panel
//!
//! This crate provides:
//! - `FrameBuffer`, a 128x64 1-bpp buffer organised in 8-pixel pages the
//!   way SH1106/SSD1306 controllers expect it
//! - Layout constants for the header, gauges, face and ticker
//! - The renderer, generic over any `DrawTarget<Color = BinaryColor>`
//!
//! The firmware draws into a `FrameBuffer` and hands its pages to the
//! panel driver; tests draw into one and inspect pixels.

#![no_std]
#![deny(unsafe_code)]

pub mod framebuffer;
pub mod layout;
pub mod renderer;

pub use framebuffer::{FrameBuffer, HEIGHT, PAGES, WIDTH};
pub use renderer::{render, render_splash};
