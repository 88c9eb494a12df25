//! Core module: capture log dan presentasi sinyal
//!
//! - Capture: mmap-backed log untuk setiap sinyal yang lewat
//! - Waveform: render text tiga level, read-only terhadap simbol

mod capture;
mod waveform;

pub use capture::{CapturedSignal, Records, SignalLog, Side};
pub use waveform::render;
