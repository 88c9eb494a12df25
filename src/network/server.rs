//! Receiver dengan event-driven I/O
//!
//! Menggunakan mio untuk non-blocking accept/read. Setiap koneksi membawa
//! tepat satu pesan: receiver menampung byte sampai EOF lalu decode, dan
//! terus menerima koneksi baru sampai shutdown.

use std::collections::HashMap;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token, Waker};
use tracing::{debug, info, warn};

use super::connection::{Connection, ReadOutcome};
use crate::config::LinkConfig;
use crate::core::{render, Side, SignalLog};
use crate::error::{Error, Result};
use crate::protocol::{SignalCodec, Symbol};

const SERVER_TOKEN: Token = Token(0);
const WAKE_TOKEN: Token = Token(1);
const FIRST_PEER_TOKEN: usize = 2;
const MAX_CONNECTIONS: usize = 64;
const EVENTS_CAPACITY: usize = 64;

/// Satu transmission unit yang sudah diproses
#[derive(Debug)]
pub struct Delivery<'a> {
    pub peer: SocketAddr,
    pub wire: &'a [u8],
    pub outcome: Result<String>,
}

/// Statistik satu sesi receiver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverSummary {
    pub messages_received: u64,
    pub messages_rejected: u64,
    pub bytes_received: u64,
}

impl ReceiverSummary {
    /// Jumlah unit yang sudah diproses (diterima + ditolak)
    pub fn units(&self) -> u64 {
        self.messages_received + self.messages_rejected
    }
}

/// Menghentikan `Receiver::run` dari thread lain
#[derive(Clone)]
pub struct ShutdownHandle {
    stop: Arc<AtomicBool>,
    waker: Arc<Waker>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) -> Result<()> {
        self.stop.store(true, Ordering::Release);
        self.waker.wake()?;
        Ok(())
    }
}

/// Receiver (server side)
pub struct Receiver {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    stop: Arc<AtomicBool>,
    waker: Arc<Waker>,
    codec: SignalCodec,
    capture: Option<SignalLog>,
    recv_buffer: usize,
    socket_buffer: usize,
    max_messages: Option<u64>,
    render: bool,
    summary: ReceiverSummary,
}

impl Receiver {
    /// Bind ke `config.addr`
    pub fn bind(config: &LinkConfig) -> Result<Self> {
        config.validate()?;

        let addr = resolve(&config.addr)?;
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;

        poll.registry()
            .register(&mut listener, SERVER_TOKEN, Interest::READABLE)?;
        let waker = Arc::new(Waker::new(poll.registry(), WAKE_TOKEN)?);

        Ok(Self {
            poll,
            listener,
            connections: HashMap::with_capacity(MAX_CONNECTIONS),
            next_token: FIRST_PEER_TOKEN,
            stop: Arc::new(AtomicBool::new(false)),
            waker,
            codec: config.codec(),
            capture: config.open_capture()?,
            recv_buffer: config.recv_buffer,
            socket_buffer: config.socket_buffer_kb * 1024,
            max_messages: config.max_messages,
            render: config.render,
            summary: ReceiverSummary::default(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Capture log, jika ada
    pub fn capture(&self) -> Option<&SignalLog> {
        self.capture.as_ref()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            stop: Arc::clone(&self.stop),
            waker: Arc::clone(&self.waker),
        }
    }

    /// Run sampai shutdown atau `max_messages` tercapai
    pub fn run(&mut self) -> Result<ReceiverSummary> {
        self.run_with(|_| {})
    }

    /// Run event loop, `on_delivery` dipanggil untuk setiap unit
    pub fn run_with<F>(&mut self, mut on_delivery: F) -> Result<ReceiverSummary>
    where
        F: FnMut(&Delivery<'_>),
    {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);

        info!(addr = %self.local_addr()?, "receiver listening");

        while !self.should_stop() {
            if let Err(e) = self.poll.poll(&mut events, None) {
                if e.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(e.into());
            }

            for event in events.iter() {
                if self.should_stop() {
                    break;
                }
                match event.token() {
                    SERVER_TOKEN => self.accept_connections()?,
                    // Flag stop dicek di awal loop
                    WAKE_TOKEN => {}
                    token => self.handle_read(token, &mut on_delivery)?,
                }
            }
        }

        if let Some(capture) = &self.capture {
            capture.flush()?;
        }
        info!(
            received = self.summary.messages_received,
            rejected = self.summary.messages_rejected,
            "receiver done"
        );
        Ok(self.summary)
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
            || self
                .max_messages
                .map_or(false, |max| self.summary.units() >= max)
    }

    /// Accept new connections
    fn accept_connections(&mut self) -> Result<()> {
        loop {
            match self.listener.accept() {
                Ok((mut stream, addr)) => {
                    if self.connections.len() >= MAX_CONNECTIONS {
                        warn!(%addr, "max connections reached, rejecting");
                        continue;
                    }

                    #[cfg(unix)]
                    super::connection::tune_socket_buffer(
                        &stream,
                        libc::SO_RCVBUF,
                        self.socket_buffer,
                    );

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    self.poll
                        .registry()
                        .register(&mut stream, token, Interest::READABLE)?;
                    let conn = Connection::new(stream, addr, self.recv_buffer)?;

                    debug!(%addr, ?token, "peer connected");
                    self.connections.insert(token, conn);
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Handle readable event. Unit diproses saat peer EOF.
    fn handle_read<F>(&mut self, token: Token, on_delivery: &mut F) -> Result<()>
    where
        F: FnMut(&Delivery<'_>),
    {
        let outcome = match self.connections.get_mut(&token) {
            Some(conn) => conn.fill(),
            None => return Ok(()),
        };

        let outcome = match outcome {
            Ok(ReadOutcome::Pending) => return Ok(()),
            Ok(outcome) => outcome,
            Err(e) => {
                if let Some(conn) = self.close(token)? {
                    warn!(peer = %conn.peer(), error = %e, "connection failed, unit dropped");
                }
                return Ok(());
            }
        };

        let conn = match self.close(token)? {
            Some(conn) => conn,
            None => return Ok(()),
        };

        let delivery = match outcome {
            ReadOutcome::Overflow => {
                let limit = conn.capacity();
                self.deliver(conn.peer(), conn.unit(), Err(Error::UnitTooLarge { limit }))
            }
            _ => {
                let decoded = self.codec.receive(conn.unit());
                self.deliver(conn.peer(), conn.unit(), decoded)
            }
        };
        on_delivery(&delivery);
        Ok(())
    }

    /// Lepas koneksi dari poll dan map
    fn close(&mut self, token: Token) -> Result<Option<Connection>> {
        match self.connections.remove(&token) {
            Some(mut conn) => {
                self.poll.registry().deregister(conn.stream_mut())?;
                Ok(Some(conn))
            }
            None => Ok(None),
        }
    }

    /// Update statistik, capture, dan log untuk satu unit
    fn deliver<'a>(
        &mut self,
        peer: SocketAddr,
        wire: &'a [u8],
        outcome: Result<String>,
    ) -> Delivery<'a> {
        self.summary.bytes_received += wire.len() as u64;
        debug!(%peer, symbols = wire.len(), "transmission unit received");

        if let Some(capture) = self.capture.as_mut() {
            if capture.append(Side::Server, wire).is_none() {
                warn!(capacity = capture.capacity(), "capture log full, signal not recorded");
            }
        }

        match &outcome {
            Ok(text) => {
                self.summary.messages_received += 1;
                info!(%peer, symbols = wire.len(), "received message {}", text);
                if self.render {
                    let symbols: Vec<Symbol> =
                        wire.iter().filter_map(|&b| Symbol::from_wire(b)).collect();
                    println!("{}", render(&symbols, text));
                }
            }
            Err(e) => {
                self.summary.messages_rejected += 1;
                warn!(%peer, error = %e, "rejected transmission");
            }
        }

        Delivery {
            peer,
            wire,
            outcome,
        }
    }
}

/// Resolve `host:port` (boleh hostname seperti `localhost`)
pub(crate) fn resolve(addr: &str) -> Result<SocketAddr> {
    addr.to_socket_addrs()?
        .next()
        .ok_or_else(|| Error::Config(format!("address '{}' did not resolve", addr)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let addr = resolve("127.0.0.1:3000").unwrap();
        assert_eq!(addr.port(), 3000);
        assert!(resolve("not an address").is_err());
    }

    #[test]
    fn test_bind_ephemeral() {
        let config = LinkConfig {
            addr: "127.0.0.1:0".to_string(),
            ..LinkConfig::default()
        };
        let receiver = Receiver::bind(&config).unwrap();
        assert_ne!(receiver.local_addr().unwrap().port(), 0);
        assert!(receiver.capture().is_none());
    }

    #[test]
    fn test_shutdown_before_run() {
        let config = LinkConfig {
            addr: "127.0.0.1:0".to_string(),
            ..LinkConfig::default()
        };
        let mut receiver = Receiver::bind(&config).unwrap();
        receiver.shutdown_handle().shutdown().unwrap();
        assert_eq!(receiver.run().unwrap(), ReceiverSummary::default());
    }

    #[test]
    fn test_zero_message_limit_returns_immediately() {
        let config = LinkConfig {
            addr: "127.0.0.1:0".to_string(),
            max_messages: Some(0),
            ..LinkConfig::default()
        };
        let mut receiver = Receiver::bind(&config).unwrap();
        assert_eq!(receiver.run().unwrap().units(), 0);
    }
}
