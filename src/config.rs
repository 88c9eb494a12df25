//! Konfigurasi link, dipakai bersama oleh sender dan receiver.

use std::path::PathBuf;

use crate::core::SignalLog;
use crate::error::{Error, Result};
use crate::protocol::{Cipher, Key, SignalCodec, TrailingBits, DEFAULT_KEY};

/// Alamat default (localhost:3000)
pub const DEFAULT_ADDR: &str = "localhost:3000";
/// Kapasitas buffer satu koneksi = maksimum simbol per transmission unit
pub const DEFAULT_RECV_BUFFER: usize = 1024;

/// Link configuration
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Alamat server (bind untuk receiver, connect untuk sender)
    pub addr: String,
    /// Key cipher, harus sama di kedua sisi
    pub key: Key,
    /// Maksimum simbol per transmission unit
    pub recv_buffer: usize,
    /// SO_SNDBUF / SO_RCVBUF dalam KB (unix saja)
    pub socket_buffer_kb: usize,
    /// Path capture log, None = tidak merekam
    pub capture: Option<PathBuf>,
    /// Kapasitas capture log dalam KB (power of 2)
    pub capture_size_kb: usize,
    /// Tolak sisa bit parsial saat decode
    pub strict: bool,
    /// Print waveform ke stdout
    pub render: bool,
    /// Receiver berhenti setelah sekian unit, None = jalan sampai shutdown
    pub max_messages: Option<u64>,
    /// Debug logging
    pub verbose: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            key: DEFAULT_KEY,
            recv_buffer: DEFAULT_RECV_BUFFER,
            socket_buffer_kb: 64,
            capture: None,
            capture_size_kb: 64,
            strict: false,
            render: true,
            max_messages: None,
            verbose: false,
        }
    }
}

impl LinkConfig {
    /// Validasi nilai yang tidak bisa dicek oleh parser argumen
    pub fn validate(&self) -> Result<()> {
        if self.recv_buffer < 8 {
            return Err(Error::Config(format!(
                "recv buffer {} cannot hold a single byte (8 symbols)",
                self.recv_buffer
            )));
        }
        if self.capture.is_some() && !self.capture_size_kb.is_power_of_two() {
            return Err(Error::Config(format!(
                "capture size {} KB must be a power of two",
                self.capture_size_kb
            )));
        }
        Ok(())
    }

    /// Codec untuk endpoint ini
    pub fn codec(&self) -> SignalCodec {
        let trailing = if self.strict {
            TrailingBits::Reject
        } else {
            TrailingBits::Discard
        };
        SignalCodec::new(Cipher::new(self.key)).with_trailing(trailing)
    }

    /// Buka capture log jika dikonfigurasi
    pub fn open_capture(&self) -> Result<Option<SignalLog>> {
        match &self.capture {
            Some(path) => Ok(Some(SignalLog::open(path, self.capture_size_kb * 1024)?)),
            None => Ok(None),
        }
    }
}

/// Parse key dari desimal (`254`) atau hex (`0xFE`)
pub fn parse_key(s: &str) -> std::result::Result<Key, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed
        .map(Key)
        .map_err(|e| format!("invalid key '{}': {} (expected 0-255 or 0x00-0xFF)", s, e))
}
