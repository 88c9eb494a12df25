//! Sender (client side)
//!
//! Satu pesan = satu koneksi: connect, `write_all`, lalu shutdown sisi tulis
//! supaya receiver melihat EOF sebagai batas unit. Encoder buffer
//! di-alokasikan sekali, seukuran read buffer receiver.

use std::io::Write;
use std::net::{Shutdown, SocketAddr, TcpStream};

use tracing::{debug, info, warn};

use super::server::resolve;
use crate::config::LinkConfig;
use crate::core::{render, Side, SignalLog};
use crate::error::Result;
use crate::protocol::{Encoder, SignalCodec, Symbol};

/// Sender endpoint
pub struct Sender {
    addr: SocketAddr,
    codec: SignalCodec,
    encoder: Encoder,
    capture: Option<SignalLog>,
    socket_buffer: usize,
    render: bool,
    messages_sent: u64,
}

impl Sender {
    /// Siapkan sender untuk receiver di `config.addr`
    ///
    /// Koneksi dibuka per pesan oleh `send`.
    pub fn connect(config: &LinkConfig) -> Result<Self> {
        config.validate()?;

        let addr = resolve(&config.addr)?;
        info!(%addr, "sender ready");

        Ok(Self {
            addr,
            codec: config.codec(),
            // Satu unit tidak boleh lebih besar dari read buffer receiver
            encoder: Encoder::new(config.recv_buffer),
            capture: config.open_capture()?,
            socket_buffer: config.socket_buffer_kb * 1024,
            render: config.render,
            messages_sent: 0,
        })
    }

    /// Alamat receiver
    pub fn peer_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Encrypt, encode, dan kirim satu pesan sebagai satu unit
    ///
    /// Returns jumlah byte wire yang dikirim.
    pub fn send(&mut self, message: &str) -> Result<usize> {
        // Encode dulu: input invalid tidak membuka koneksi
        let wire = self.codec.transmit_into(&mut self.encoder, message)?;

        let mut stream = TcpStream::connect(self.addr)?;
        stream.set_nodelay(true)?;
        #[cfg(unix)]
        super::connection::tune_socket_buffer(&stream, libc::SO_SNDBUF, self.socket_buffer);

        stream.write_all(wire)?;
        stream.flush()?;
        stream.shutdown(Shutdown::Write)?;
        self.messages_sent += 1;

        debug!(symbols = wire.len(), "transmission unit sent");

        if let Some(capture) = self.capture.as_mut() {
            if capture.append(Side::Client, wire).is_none() {
                warn!(capacity = capture.capacity(), "capture log full, signal not recorded");
            }
        }

        if self.render {
            let symbols: Vec<Symbol> = wire.iter().filter_map(|&b| Symbol::from_wire(b)).collect();
            println!("{}", render(&symbols, message));
        }

        info!(sent = self.messages_sent, "sent {}", message);
        Ok(wire.len())
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    /// Flush capture log
    pub fn close(self) -> Result<()> {
        if let Some(capture) = &self.capture {
            capture.flush()?;
        }
        Ok(())
    }
}
