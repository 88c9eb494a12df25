//! Connection handling untuk receiver
//!
//! Satu koneksi = satu transmission unit (satu pesan). Byte wire ditampung
//! sampai peer menutup sisi tulisnya (EOF), baru unit di-decode. Buffer
//! di-alokasikan sekali saat koneksi dibuat.

use std::io::{self, Read};
use std::net::SocketAddr;

use mio::net::TcpStream;

/// Hasil membaca socket sampai WouldBlock atau EOF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Unit belum selesai, tunggu event berikutnya
    Pending,
    /// Peer sudah EOF, unit lengkap ada di `unit()`
    Complete,
    /// Peer mengirim lebih dari kapasitas buffer
    Overflow,
}

/// Peer connection dengan pre-allocated read buffer
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    read_buffer: Box<[u8]>,
    filled: usize,
}

impl Connection {
    /// Wrap stream yang sudah di-accept
    pub fn new(stream: TcpStream, peer: SocketAddr, recv_buffer: usize) -> io::Result<Self> {
        stream.set_nodelay(true)?;

        Ok(Self {
            stream,
            peer,
            read_buffer: vec![0u8; recv_buffer].into_boxed_slice(),
            filled: 0,
        })
    }

    /// Baca semua data yang tersedia ke buffer
    pub fn fill(&mut self) -> io::Result<ReadOutcome> {
        loop {
            if self.filled == self.read_buffer.len() {
                // Buffer penuh: unit valid hanya jika berikutnya EOF
                let mut extra = [0u8; 1];
                return match self.stream.read(&mut extra) {
                    Ok(0) => Ok(ReadOutcome::Complete),
                    Ok(_) => Ok(ReadOutcome::Overflow),
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => Ok(ReadOutcome::Pending),
                    Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => Err(e),
                };
            }

            match self.stream.read(&mut self.read_buffer[self.filled..]) {
                Ok(0) => return Ok(ReadOutcome::Complete),
                Ok(n) => self.filled += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadOutcome::Pending)
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Byte wire yang sudah diterima (zero-copy)
    #[inline(always)]
    pub fn unit(&self) -> &[u8] {
        &self.read_buffer[..self.filled]
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.read_buffer.len()
    }

    #[inline(always)]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Stream untuk registrasi poll
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}

/// Set SO_SNDBUF / SO_RCVBUF. Error diabaikan, tidak semua platform support.
#[cfg(unix)]
pub(crate) fn tune_socket_buffer<S: std::os::unix::io::AsRawFd>(
    socket: &S,
    option: libc::c_int,
    bytes: usize,
) {
    let fd = socket.as_raw_fd();
    let optval: libc::c_int = bytes.min(libc::c_int::MAX as usize) as libc::c_int;
    // SAFETY: fd valid selama `socket` hidup, optval hidup sepanjang panggilan
    let rc = unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            option,
            &optval as *const _ as *const libc::c_void,
            std::mem::size_of::<libc::c_int>() as libc::socklen_t,
        )
    };
    if rc != 0 {
        tracing::debug!(
            option,
            bytes,
            error = %io::Error::last_os_error(),
            "setsockopt failed"
        );
    }
}
