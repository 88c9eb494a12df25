//! Network Layer: Transport untuk sinyal AMI
//!
//! - Receiver: mio event loop, satu koneksi = satu pesan (EOF = batas unit)
//! - Sender: blocking TcpStream per pesan dengan TCP_NODELAY
//!
//! Tidak ada framing atau retry; pesan yang rusak hanya di-log.

mod client;
mod connection;
mod server;

pub use client::Sender;
pub use connection::{Connection, ReadOutcome};
pub use server::{Delivery, Receiver, ReceiverSummary, ShutdownHandle};
