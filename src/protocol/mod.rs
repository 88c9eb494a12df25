//! Protocol Layer: Substitution Cipher + AMI Line Coding
//!
//! Prinsip desain:
//! - Tiga level sinyal: Zero, PositiveMark, NegativeMark
//! - Satu byte wire per simbol, bit 0 dikirim pertama
//! - Stateless: polaritas dibuat ulang di setiap encode/decode

mod cipher;
mod encoder;
mod pipeline;
mod symbol;

pub use cipher::{Cipher, Key, DEFAULT_KEY};
pub use encoder::{decode, decode_symbols, encode, symbols, Decoder, Encoder, Symbols, TrailingBits};
pub use pipeline::SignalCodec;
pub use symbol::{to_wire, Polarity, Symbol, NEG_TENSION, POS_TENSION, ZERO_TENSION};
