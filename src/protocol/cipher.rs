//! Substitution cipher satu byte (XOR dengan key)
//!
//! Bukan enkripsi yang aman - hanya menyamarkan pesan sebelum line coding.
//! Key yang berbeda di kedua sisi tidak terdeteksi di layer ini.

use crate::error::{Error, Result};

/// Key default, sama dengan yang dipakai kedua endpoint
pub const DEFAULT_KEY: Key = Key(0xFE);

/// Key satu byte yang dibagi sender dan receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key(pub u8);

impl Default for Key {
    fn default() -> Self {
        DEFAULT_KEY
    }
}

/// Cipher XOR dengan key tetap
#[derive(Debug, Clone, Copy)]
pub struct Cipher {
    key: Key,
}

impl Cipher {
    pub fn new(key: Key) -> Self {
        Self { key }
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Encrypt plaintext ASCII menjadi ciphertext
    ///
    /// Gagal dengan `InvalidInput` jika ada karakter di atas 127.
    pub fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>> {
        if let Some((index, ch)) = plaintext.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
            return Err(Error::InvalidInput { ch, index });
        }

        Ok(plaintext.bytes().map(|b| b ^ self.key.0).collect())
    }

    /// Decrypt ciphertext kembali menjadi teks ASCII
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<String> {
        let mut plain = ciphertext.to_vec();
        self.apply(&mut plain);

        if let Some((index, &byte)) = plain.iter().enumerate().find(|(_, b)| !b.is_ascii()) {
            return Err(Error::Decoding { byte, index });
        }

        Ok(plain.into_iter().map(char::from).collect())
    }

    /// XOR in-place dengan key
    #[inline(always)]
    pub fn apply(&self, buf: &mut [u8]) {
        for b in buf.iter_mut() {
            *b ^= self.key.0;
        }
    }
}

impl Default for Cipher {
    fn default() -> Self {
        Self::new(DEFAULT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_single_char() {
        let cipher = Cipher::new(Key(0xFE));
        assert_eq!(cipher.encrypt("A").unwrap(), vec![0xBF]);
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let cipher = Cipher::default();
        let ct = cipher.encrypt("Hello, AMI!").unwrap();
        assert_eq!(ct.len(), 11);
        assert_eq!(cipher.decrypt(&ct).unwrap(), "Hello, AMI!");
    }

    #[test]
    fn test_encrypt_rejects_non_ascii() {
        let cipher = Cipher::default();
        match cipher.encrypt("café") {
            Err(Error::InvalidInput { ch, index }) => {
                assert_eq!(ch, 'é');
                assert_eq!(index, 3);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_decrypt_wrong_key_detected_when_not_ascii() {
        let ct = Cipher::new(Key(0xFE)).encrypt("A").unwrap();
        // 0xBF ^ 0x00 = 0xBF, bukan ASCII
        let result = Cipher::new(Key(0x00)).decrypt(&ct);
        assert!(matches!(result, Err(Error::Decoding { byte: 0xBF, index: 0 })));
    }

    #[test]
    fn test_decrypt_wrong_key_can_yield_ascii_garbage() {
        let ct = Cipher::new(Key(0x01)).encrypt("A").unwrap();
        let plain = Cipher::new(Key(0x03)).decrypt(&ct).unwrap();
        assert_eq!(plain, "C");
    }

    #[test]
    fn test_decrypt_full_ascii_range() {
        let cipher = Cipher::new(Key(0x00));
        let all: Vec<u8> = (0u8..=127).collect();
        let plain = cipher.decrypt(&all).unwrap();
        assert_eq!(plain.len(), 128);
        assert!(plain.bytes().eq(0u8..=127));

        // Byte non-ASCII dilaporkan di posisi pertamanya
        assert!(matches!(
            cipher.decrypt(&[b'o', b'k', 0x80, 0xFF]),
            Err(Error::Decoding { byte: 0x80, index: 2 })
        ));
    }

    #[test]
    fn test_empty() {
        let cipher = Cipher::default();
        assert!(cipher.encrypt("").unwrap().is_empty());
        assert_eq!(cipher.decrypt(&[]).unwrap(), "");
    }
}
