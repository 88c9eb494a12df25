//! Memory-Mapped Signal Capture Log
//!
//! Setiap sinyal yang dikirim atau diterima bisa direkam ke file mmap,
//! sehingga waveform bisa diperiksa lagi setelah sesi selesai.
//!
//! Layout file:
//! ┌───────────────────────────────────────────────┐
//! │ Header (64 bytes)                             │
//! │   magic u64 | version u32 | capacity u32      │
//! │   write_pos u64                               │
//! ├───────────────────────────────────────────────┤
//! │ Record: side u8 | len u32 LE | wire bytes     │
//! │ Record: ...                                   │
//! └───────────────────────────────────────────────┘
//!
//! Append-only, tidak ada wraparound. Jika penuh, `append` mengembalikan None.

use memmap2::{MmapMut, MmapOptions};
use std::fs::OpenOptions;
use std::path::Path;

use crate::error::{Error, Result};

const MAGIC: u64 = 0x414D_494C_4F47_5631; // "AMILOGV1"
const VERSION: u32 = 1;
const HEADER_SIZE: usize = 64;
const RECORD_HEADER_SIZE: usize = 5;

const MAGIC_OFFSET: usize = 0;
const VERSION_OFFSET: usize = 8;
const CAPACITY_OFFSET: usize = 12;
const WRITE_POS_OFFSET: usize = 16;

/// Sisi link yang merekam sinyal
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Client = 1,
    Server = 2,
}

impl Side {
    #[inline(always)]
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::Client),
            2 => Some(Self::Server),
            _ => None,
        }
    }
}

/// Satu sinyal yang tersimpan di log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturedSignal<'a> {
    pub side: Side,
    pub offset: usize,
    pub wire: &'a [u8],
}

/// Mmap-backed log untuk sinyal yang lewat link
pub struct SignalLog {
    mmap: MmapMut,
    capacity: usize,
}

impl SignalLog {
    /// Membuat atau membuka capture log
    ///
    /// # Arguments
    /// * `path` - Path ke file log
    /// * `capacity` - Kapasitas area record dalam bytes (harus power of 2)
    pub fn open<P: AsRef<Path>>(path: P, capacity: usize) -> Result<Self> {
        if !capacity.is_power_of_two() || capacity > u32::MAX as usize {
            return Err(Error::Config(format!(
                "capture capacity {} must be a power of two that fits in u32",
                capacity
            )));
        }

        let total_size = HEADER_SIZE + capacity;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path.as_ref())?;

        if file.metadata()?.len() < total_size as u64 {
            file.set_len(total_size as u64)?;
        }

        // SAFETY: File dibuka read/write dan panjangnya minimal total_size
        let mmap = unsafe { MmapOptions::new().len(total_size).map_mut(&file)? };

        let mut log = Self { mmap, capacity };

        if log.read_u64(MAGIC_OFFSET) != MAGIC {
            log.write_u64(MAGIC_OFFSET, MAGIC);
            log.write_u32(VERSION_OFFSET, VERSION);
            log.write_u32(CAPACITY_OFFSET, capacity as u32);
            log.write_u64(WRITE_POS_OFFSET, 0);
        } else {
            let version = log.read_u32(VERSION_OFFSET);
            let stored = log.read_u32(CAPACITY_OFFSET) as usize;
            if version != VERSION || stored != capacity {
                return Err(Error::Config(format!(
                    "capture log {} has version {} capacity {}, expected version {} capacity {}",
                    path.as_ref().display(),
                    version,
                    stored,
                    VERSION,
                    capacity
                )));
            }
        }

        Ok(log)
    }

    /// Menulis satu sinyal ke log
    ///
    /// Returns offset record, atau None jika tidak cukup ruang
    pub fn append(&mut self, side: Side, wire: &[u8]) -> Option<usize> {
        let write_pos = self.write_pos();
        let record_len = RECORD_HEADER_SIZE + wire.len();

        if wire.len() > u32::MAX as usize || write_pos + record_len > self.capacity {
            return None;
        }

        let start = HEADER_SIZE + write_pos;
        self.mmap[start] = side as u8;
        self.mmap[start + 1..start + RECORD_HEADER_SIZE]
            .copy_from_slice(&(wire.len() as u32).to_le_bytes());
        self.mmap[start + RECORD_HEADER_SIZE..start + record_len].copy_from_slice(wire);

        self.write_u64(WRITE_POS_OFFSET, (write_pos + record_len) as u64);

        Some(write_pos)
    }

    /// Flush perubahan ke disk
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// Iterasi semua record sesuai urutan tulis
    pub fn records(&self) -> Records<'_> {
        Records {
            data: &self.mmap[HEADER_SIZE..HEADER_SIZE + self.write_pos()],
            pos: 0,
        }
    }

    /// Bytes terpakai di area record
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.write_pos()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.write_pos() == 0
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn write_pos(&self) -> usize {
        (self.read_u64(WRITE_POS_OFFSET) as usize).min(self.capacity)
    }

    fn read_u64(&self, offset: usize) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.mmap[offset..offset + 8]);
        u64::from_le_bytes(buf)
    }

    fn read_u32(&self, offset: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(&self.mmap[offset..offset + 4]);
        u32::from_le_bytes(buf)
    }

    fn write_u64(&mut self, offset: usize, v: u64) {
        self.mmap[offset..offset + 8].copy_from_slice(&v.to_le_bytes());
    }

    fn write_u32(&mut self, offset: usize, v: u32) {
        self.mmap[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
    }
}

/// Iterator untuk record di capture log
pub struct Records<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = CapturedSignal<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header_end = self.pos + RECORD_HEADER_SIZE;
        if header_end > self.data.len() {
            return None;
        }

        // Record rusak menghentikan iterasi
        let side = Side::from_u8(self.data[self.pos])?;
        let mut len_buf = [0u8; 4];
        len_buf.copy_from_slice(&self.data[self.pos + 1..header_end]);
        let len = u32::from_le_bytes(len_buf) as usize;

        let end = header_end + len;
        if end > self.data.len() {
            return None;
        }

        let record = CapturedSignal {
            side,
            offset: self.pos,
            wire: &self.data[header_end..end],
        };
        self.pos = end;

        Some(record)
    }
}
