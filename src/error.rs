//! Error types untuk seluruh link.
//!
//! Setiap operasi core (encrypt, decrypt, encode, decode) mengembalikan
//! `Result` dengan variant yang bisa dibedakan di call site.

use std::fmt;

use thiserror::Error;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Plaintext berisi karakter di luar 7-bit ASCII
    #[error("invalid input: character {ch:?} at index {index} is outside 7-bit ASCII")]
    InvalidInput { ch: char, index: usize },

    /// Hasil decrypt bukan ASCII (key salah atau ciphertext rusak)
    #[error("decoding error: byte {byte:#04x} at index {index} is not ASCII, check keys")]
    Decoding { byte: u8, index: usize },

    /// Urutan simbol melanggar aturan alternasi polaritas
    #[error("protocol violation at symbol {position}: {kind}")]
    ProtocolViolation { position: usize, kind: Violation },

    /// Peer mengirim lebih banyak simbol dari read buffer receiver
    #[error("transmission unit exceeds {limit} symbols")]
    UnitTooLarge { limit: usize },

    /// Socket / file I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Konfigurasi tidak valid
    #[error("configuration error: {0}")]
    Config(String),
}

/// Jenis pelanggaran protokol yang dideteksi decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// PositiveMark saat polaritas berikutnya harus negatif
    UnexpectedPositiveMark,
    /// NegativeMark saat polaritas berikutnya harus positif
    UnexpectedNegativeMark,
    /// Byte wire di luar alfabet tiga simbol
    UnknownSymbol(u8),
    /// Sisa bit kurang dari 8 (hanya pada strict decoder)
    TruncatedByte { bits: u8 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedPositiveMark => f.write_str("unexpected positive mark"),
            Self::UnexpectedNegativeMark => f.write_str("unexpected negative mark"),
            Self::UnknownSymbol(_) => f.write_str("unknown symbol"),
            Self::TruncatedByte { .. } => f.write_str("truncated byte"),
        }
    }
}

impl Error {
    /// Shortcut untuk membuat `ProtocolViolation`
    pub(crate) fn violation(position: usize, kind: Violation) -> Self {
        Self::ProtocolViolation { position, kind }
    }

    /// Jenis pelanggaran, jika error ini adalah `ProtocolViolation`
    pub fn as_violation(&self) -> Option<Violation> {
        match self {
            Self::ProtocolViolation { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Result alias untuk crate ini
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_messages() {
        assert_eq!(
            Violation::UnexpectedPositiveMark.to_string(),
            "unexpected positive mark"
        );
        assert_eq!(
            Violation::UnexpectedNegativeMark.to_string(),
            "unexpected negative mark"
        );
        assert_eq!(Violation::UnknownSymbol(0xFF).to_string(), "unknown symbol");
    }

    #[test]
    fn test_protocol_violation_display() {
        let err = Error::violation(3, Violation::UnexpectedNegativeMark);
        assert_eq!(
            err.to_string(),
            "protocol violation at symbol 3: unexpected negative mark"
        );
        assert_eq!(err.as_violation(), Some(Violation::UnexpectedNegativeMark));
    }

    #[test]
    fn test_unit_too_large_display() {
        let err = Error::UnitTooLarge { limit: 1024 };
        assert_eq!(err.to_string(), "transmission unit exceeds 1024 symbols");
        assert_eq!(err.as_violation(), None);
    }
}
