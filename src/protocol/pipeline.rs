//! Pipeline lengkap satu endpoint:
//! plaintext -> encrypt -> encode -> wire -> decode -> decrypt -> plaintext

use super::cipher::Cipher;
use super::encoder::{self, Decoder, Encoder, TrailingBits};
use super::symbol::Symbol;
use crate::error::{Error, Result};

/// Cipher + line coder untuk satu endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct SignalCodec {
    cipher: Cipher,
    trailing: TrailingBits,
}

impl SignalCodec {
    pub fn new(cipher: Cipher) -> Self {
        Self {
            cipher,
            trailing: TrailingBits::Discard,
        }
    }

    /// Set kebijakan sisa bit untuk sisi receive
    pub fn with_trailing(mut self, trailing: TrailingBits) -> Self {
        self.trailing = trailing;
        self
    }

    pub fn cipher(&self) -> &Cipher {
        &self.cipher
    }

    /// Plaintext menjadi deretan simbol
    pub fn transmit(&self, plaintext: &str) -> Result<Vec<Symbol>> {
        let ciphertext = self.cipher.encrypt(plaintext)?;
        Ok(encoder::encode(&ciphertext))
    }

    /// Plaintext menjadi byte wire di dalam `encoder` (buffer di-reset dulu)
    pub fn transmit_into<'e>(&self, encoder: &'e mut Encoder, plaintext: &str) -> Result<&'e [u8]> {
        let ciphertext = self.cipher.encrypt(plaintext)?;
        encoder.reset();
        let needed = ciphertext.len() * 8;
        let available = encoder.available();
        encoder.encode(&ciphertext).ok_or_else(|| {
            Error::Config(format!(
                "message needs {} symbols, encoder buffer holds {}",
                needed, available
            ))
        })
    }

    /// Byte wire kembali menjadi plaintext
    pub fn receive(&self, wire: &[u8]) -> Result<String> {
        let ciphertext = Decoder::with_policy(wire, self.trailing).collect::<Result<Vec<u8>>>()?;
        self.cipher.decrypt(&ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Violation;
    use crate::protocol::cipher::Key;
    use crate::protocol::symbol::{to_wire, Symbol::*};

    #[test]
    fn test_transmit_letter_a() {
        let codec = SignalCodec::new(Cipher::new(Key(0xFE)));
        let symbols = codec.transmit("A").unwrap();
        assert_eq!(
            symbols,
            vec![
                PositiveMark,
                NegativeMark,
                PositiveMark,
                NegativeMark,
                PositiveMark,
                NegativeMark,
                Zero,
                PositiveMark
            ]
        );
        assert_eq!(codec.receive(&to_wire(&symbols)).unwrap(), "A");
    }

    #[test]
    fn test_transmit_into_matches_transmit() {
        let codec = SignalCodec::default();
        let mut encoder = Encoder::new(1024);
        let wire = codec.transmit_into(&mut encoder, "ping").unwrap().to_vec();
        assert_eq!(wire, to_wire(&codec.transmit("ping").unwrap()));

        // Buffer di-reset per pesan
        let again = codec.transmit_into(&mut encoder, "ping").unwrap();
        assert_eq!(again, wire.as_slice());
    }

    #[test]
    fn test_transmit_into_small_buffer() {
        let codec = SignalCodec::default();
        let mut encoder = Encoder::new(8);
        assert!(matches!(
            codec.transmit_into(&mut encoder, "ab"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_transmit_rejects_non_ascii() {
        let codec = SignalCodec::default();
        assert!(matches!(
            codec.transmit("é"),
            Err(Error::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_receive_strict_policy() {
        let codec = SignalCodec::default().with_trailing(TrailingBits::Reject);
        let mut wire = to_wire(&codec.transmit("ok").unwrap());
        wire.push(0b01);
        let err = codec.receive(&wire).unwrap_err();
        assert_eq!(err.as_violation(), Some(Violation::TruncatedByte { bits: 1 }));

        wire.pop();
        assert_eq!(codec.receive(&wire).unwrap(), "ok");
    }
}
