//! amilink - ASCII text link over a three-level (AMI) line code
//!
//! Arsitektur:
//! - Protocol: XOR substitution cipher + alternate-mark-inversion line coding
//! - Network: mio receiver dan blocking sender, satu pesan per unit
//! - Core: mmap capture log dan text waveform
//!
//! ```
//! use amilink::protocol::{Cipher, Key, SignalCodec, to_wire};
//!
//! let codec = SignalCodec::new(Cipher::new(Key(0xFE)));
//! let symbols = codec.transmit("A").unwrap();
//! assert_eq!(symbols.len(), 8);
//! assert_eq!(codec.receive(&to_wire(&symbols)).unwrap(), "A");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod protocol;

pub use config::LinkConfig;
pub use error::{Error, Result, Violation};
