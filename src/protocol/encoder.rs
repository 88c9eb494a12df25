//! AMI Line Encoder/Decoder
//!
//! Setiap bit ciphertext menjadi satu simbol (bit 0 dari tiap byte dikirim
//! pertama). Bit 0 selalu `Zero`, bit 1 bergantian `PositiveMark` /
//! `NegativeMark`, dimulai dari positif.
//!
//! State polaritas hanya hidup selama satu panggilan encode/decode.

use super::symbol::{Polarity, Symbol};
use crate::error::{Error, Result, Violation};

const BITS_PER_BYTE: usize = 8;

/// Lazy iterator simbol untuk satu deretan byte
pub struct Symbols<'a> {
    bytes: std::slice::Iter<'a, u8>,
    current: u8,
    bit: usize,
    polarity: Polarity,
}

impl<'a> Iterator for Symbols<'a> {
    type Item = Symbol;

    #[inline(always)]
    fn next(&mut self) -> Option<Symbol> {
        if self.bit == BITS_PER_BYTE {
            self.current = *self.bytes.next()?;
            self.bit = 0;
        }

        let set = (self.current >> self.bit) & 0b1 == 1;
        self.bit += 1;

        if !set {
            return Some(Symbol::Zero);
        }

        let mark = Symbol::mark(self.polarity);
        self.polarity = self.polarity.flip();
        Some(mark)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.bytes.len() * BITS_PER_BYTE + (BITS_PER_BYTE - self.bit);
        (n, Some(n))
    }
}

impl ExactSizeIterator for Symbols<'_> {}

/// Iterator simbol untuk `bytes`, polaritas mulai dari positif
pub fn symbols(bytes: &[u8]) -> Symbols<'_> {
    Symbols {
        bytes: bytes.iter(),
        current: 0,
        bit: BITS_PER_BYTE,
        polarity: Polarity::Positive,
    }
}

/// Encode byte menjadi simbol. Total function, `8 * bytes.len()` simbol.
pub fn encode(bytes: &[u8]) -> Vec<Symbol> {
    symbols(bytes).collect()
}

/// Decode byte wire menjadi byte asli, sisa bit parsial dibuang
pub fn decode(wire: &[u8]) -> Result<Vec<u8>> {
    Decoder::new(wire).collect()
}

/// Decode deretan `Symbol` (sudah tervalidasi alfabetnya)
pub fn decode_symbols(symbols: &[Symbol]) -> Result<Vec<u8>> {
    let wire = super::symbol::to_wire(symbols);
    decode(&wire)
}

/// Pre-allocated encoder buffer
///
/// Menulis byte wire langsung ke buffer internal, tidak ada alokasi
/// setelah inisialisasi.
pub struct Encoder {
    buffer: Box<[u8]>,
    write_pos: usize,
}

impl Encoder {
    /// Membuat encoder dengan kapasitas `capacity` simbol
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity].into_boxed_slice(),
            write_pos: 0,
        }
    }

    /// Reset encoder untuk reuse
    #[inline(always)]
    pub fn reset(&mut self) {
        self.write_pos = 0;
    }

    /// Encode satu pesan ke buffer
    ///
    /// Returns slice ke byte wire, atau None jika buffer tidak cukup.
    /// Polaritas selalu mulai dari positif untuk setiap pesan.
    #[inline]
    pub fn encode(&mut self, bytes: &[u8]) -> Option<&[u8]> {
        let total = bytes.len().checked_mul(BITS_PER_BYTE)?;
        if self.write_pos + total > self.buffer.len() {
            return None;
        }

        let start = self.write_pos;
        for (slot, symbol) in self.buffer[start..start + total]
            .iter_mut()
            .zip(symbols(bytes))
        {
            *slot = symbol.to_wire();
        }
        self.write_pos += total;

        Some(&self.buffer[start..self.write_pos])
    }

    /// Get current buffer content
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[..self.write_pos]
    }

    /// Available space in buffer (dalam simbol)
    #[inline(always)]
    pub fn available(&self) -> usize {
        self.buffer.len() - self.write_pos
    }
}

/// Kebijakan untuk sisa simbol yang kurang dari satu byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBits {
    /// Buang diam-diam (perilaku default)
    #[default]
    Discard,
    /// Gagal dengan `Violation::TruncatedByte`
    Reject,
}

/// Zero-copy decoder, menghasilkan satu byte per 8 simbol
///
/// Setiap `Decoder` baru mulai dengan polaritas positif. Setelah error
/// pertama iterator berhenti.
pub struct Decoder<'a> {
    wire: &'a [u8],
    read_pos: usize,
    polarity: Polarity,
    trailing: TrailingBits,
    done: bool,
}

impl<'a> Decoder<'a> {
    /// Decoder dengan `TrailingBits::Discard`
    #[inline(always)]
    pub fn new(wire: &'a [u8]) -> Self {
        Self::with_policy(wire, TrailingBits::Discard)
    }

    /// Decoder yang menolak sisa bit parsial
    #[inline(always)]
    pub fn strict(wire: &'a [u8]) -> Self {
        Self::with_policy(wire, TrailingBits::Reject)
    }

    pub fn with_policy(wire: &'a [u8], trailing: TrailingBits) -> Self {
        Self {
            wire,
            read_pos: 0,
            polarity: Polarity::Positive,
            trailing,
            done: false,
        }
    }

    /// Remaining symbols
    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.wire.len().saturating_sub(self.read_pos)
    }

    /// Rakit `n` simbol berikutnya menjadi satu byte (LSB first)
    fn take_bits(&mut self, n: usize) -> Result<u8> {
        let mut byte = 0u8;

        for bit in 0..n {
            let position = self.read_pos;
            let raw = self.wire[position];
            self.read_pos += 1;

            match Symbol::from_wire(raw) {
                Some(Symbol::Zero) => {}
                Some(Symbol::PositiveMark) => {
                    if self.polarity != Polarity::Positive {
                        return Err(Error::violation(
                            position,
                            Violation::UnexpectedPositiveMark,
                        ));
                    }
                    byte |= 1 << bit;
                    self.polarity = self.polarity.flip();
                }
                Some(Symbol::NegativeMark) => {
                    if self.polarity != Polarity::Negative {
                        return Err(Error::violation(
                            position,
                            Violation::UnexpectedNegativeMark,
                        ));
                    }
                    byte |= 1 << bit;
                    self.polarity = self.polarity.flip();
                }
                None => {
                    return Err(Error::violation(position, Violation::UnknownSymbol(raw)));
                }
            }
        }

        Ok(byte)
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining() == 0 {
            return None;
        }

        let n = self.remaining().min(BITS_PER_BYTE);
        let start = self.read_pos;

        let byte = match self.take_bits(n) {
            Ok(byte) => byte,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        if n == BITS_PER_BYTE {
            return Some(Ok(byte));
        }

        // Sisa simbol sudah tervalidasi, tapi tidak membentuk byte penuh
        self.done = true;
        match self.trailing {
            TrailingBits::Discard => None,
            TrailingBits::Reject => Some(Err(Error::violation(
                start,
                Violation::TruncatedByte { bits: n as u8 },
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::symbol::to_wire;

    use crate::protocol::symbol::Symbol::{NegativeMark as N, PositiveMark as P, Zero as Z};

    #[test]
    fn test_encode_0xbf() {
        assert_eq!(encode(&[0xBF]), vec![P, N, P, N, P, N, Z, P]);
    }

    #[test]
    fn test_decode_0xbf() {
        let wire = to_wire(&[P, N, P, N, P, N, Z, P]);
        assert_eq!(decode(&wire).unwrap(), vec![0xBF]);
    }

    #[test]
    fn test_polarity_carries_across_bytes() {
        // 0x01 -> satu mark positif, byte berikutnya mulai dari negatif
        let symbols = encode(&[0x01, 0x01]);
        assert_eq!(symbols[0], P);
        assert_eq!(symbols[8], N);
        assert_eq!(decode_symbols(&symbols).unwrap(), vec![0x01, 0x01]);
    }

    #[test]
    fn test_empty() {
        assert!(encode(&[]).is_empty());
        assert!(decode(&[]).unwrap().is_empty());
        assert_eq!(symbols(&[]).len(), 0);
    }

    #[test]
    fn test_reject_double_positive() {
        let wire = to_wire(&[P, Z, P, Z, Z, Z, Z, Z]);
        let err = decode(&wire).unwrap_err();
        assert_eq!(err.as_violation(), Some(Violation::UnexpectedPositiveMark));
        assert!(matches!(err, Error::ProtocolViolation { position: 2, .. }));
    }

    #[test]
    fn test_reject_leading_negative() {
        let wire = to_wire(&[N, Z, Z, Z, Z, Z, Z, Z]);
        let err = decode(&wire).unwrap_err();
        assert_eq!(err.as_violation(), Some(Violation::UnexpectedNegativeMark));
    }

    #[test]
    fn test_reject_unknown_symbol() {
        let wire = [0b01, 0b01, 0b11, 0b01, 0b01, 0b01, 0b01, 0b01];
        let err = decode(&wire).unwrap_err();
        assert_eq!(err.as_violation(), Some(Violation::UnknownSymbol(0b11)));
        assert!(matches!(err, Error::ProtocolViolation { position: 2, .. }));
    }

    #[test]
    fn test_trailing_bits_discarded_by_default() {
        let mut wire = to_wire(&encode(b"hi"));
        wire.extend_from_slice(&[0b01, 0b01, 0b01]);
        assert_eq!(decode(&wire).unwrap(), b"hi".to_vec());
    }

    #[test]
    fn test_trailing_bits_rejected_when_strict() {
        let mut wire = to_wire(&encode(b"hi"));
        wire.extend_from_slice(&[0b01, 0b01, 0b01]);
        let err = Decoder::strict(&wire)
            .collect::<Result<Vec<u8>>>()
            .unwrap_err();
        assert_eq!(
            err.as_violation(),
            Some(Violation::TruncatedByte { bits: 3 })
        );
        assert!(matches!(err, Error::ProtocolViolation { position: 16, .. }));
    }

    #[test]
    fn test_trailing_bits_still_validated() {
        // Sisa simbol tetap dicek walaupun akan dibuang
        let wire = [0b00];
        assert!(decode(&wire).is_err());
    }

    #[test]
    fn test_encoder_buffer() {
        let mut encoder = Encoder::new(16);
        let wire = encoder.encode(&[0xBF]).unwrap().to_vec();
        assert_eq!(wire, to_wire(&[P, N, P, N, P, N, Z, P]));
        assert_eq!(encoder.available(), 8);

        // Pesan kedua mulai lagi dari positif
        let second = encoder.encode(&[0x01]).unwrap();
        assert_eq!(second[0], P.to_wire());

        assert!(encoder.encode(&[0x00]).is_none());
        encoder.reset();
        assert_eq!(encoder.as_bytes().len(), 0);
        assert!(encoder.encode(&[0x00, 0x00]).is_some());
    }
}
