//! Alfabet sinyal tiga level
//!
//! Layout wire (1 byte per simbol):
//! ┌──────────────┬────────┐
//! │ Zero         │ 0b01   │
//! │ PositiveMark │ 0b10   │
//! │ NegativeMark │ 0b00   │
//! └──────────────┴────────┘
//!
//! Byte lain di wire adalah protocol error saat decode.

/// Wire value untuk level nol
pub const ZERO_TENSION: u8 = 0b01;
/// Wire value untuk mark positif (+V)
pub const POS_TENSION: u8 = 0b10;
/// Wire value untuk mark negatif (-V)
pub const NEG_TENSION: u8 = 0b00;

/// Satu simbol sinyal, mewakili satu bit ciphertext
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// Bit 0
    Zero = ZERO_TENSION,
    /// Bit 1, polaritas positif
    PositiveMark = POS_TENSION,
    /// Bit 1, polaritas negatif
    NegativeMark = NEG_TENSION,
}

impl Symbol {
    #[inline(always)]
    pub fn from_wire(v: u8) -> Option<Self> {
        match v {
            ZERO_TENSION => Some(Self::Zero),
            POS_TENSION => Some(Self::PositiveMark),
            NEG_TENSION => Some(Self::NegativeMark),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn to_wire(self) -> u8 {
        self as u8
    }

    /// Mark untuk polaritas tertentu
    #[inline(always)]
    pub fn mark(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => Self::PositiveMark,
            Polarity::Negative => Self::NegativeMark,
        }
    }

    #[inline(always)]
    pub fn is_mark(self) -> bool {
        self != Self::Zero
    }

    /// Level sinyal: +1, 0, atau -1
    #[inline(always)]
    pub fn level(self) -> i8 {
        match self {
            Self::PositiveMark => 1,
            Self::Zero => 0,
            Self::NegativeMark => -1,
        }
    }
}

/// Polaritas yang harus dipakai mark berikutnya.
///
/// Selalu dimulai dari `Positive` di setiap operasi encode/decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    #[default]
    Positive,
    Negative,
}

impl Polarity {
    #[inline(always)]
    pub fn flip(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// Konversi deretan simbol ke byte wire
pub fn to_wire(symbols: &[Symbol]) -> Vec<u8> {
    symbols.iter().map(|s| s.to_wire()).collect()
}
