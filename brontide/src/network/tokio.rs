//! [super::Network] implementation over TCP using [tokio].

use super::Error;
use std::{net::SocketAddr, time::Duration};
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpListener, TcpStream,
    },
    time::timeout,
};
use tracing::warn;

/// Implementation of [super::Sink] for TCP.
pub struct Sink {
    write_timeout: Duration,
    sink: OwnedWriteHalf,
}

impl super::Sink for Sink {
    async fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        // Time out if we take too long to write
        timeout(self.write_timeout, self.sink.write_all(msg))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|_| Error::SendFailed)
    }

    async fn close(&mut self) -> Result<(), Error> {
        timeout(self.write_timeout, self.sink.shutdown())
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|_| Error::Closed)
    }
}

/// Implementation of [super::Stream] for TCP.
///
/// Uses a [BufReader] to reduce syscall overhead. Multiple small reads
/// can be satisfied from the buffer without additional network operations.
pub struct Stream {
    read_timeout: Duration,
    stream: BufReader<OwnedReadHalf>,
}

impl super::Stream for Stream {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }

        // Time out if we wait too long for any data
        timeout(self.read_timeout, self.stream.read(buf))
            .await
            .map_err(|_| Error::Timeout)?
            .map_err(|_| Error::RecvFailed)
    }
}

/// Implementation of [super::Listener] for TCP.
pub struct Listener {
    cfg: Config,
    listener: TcpListener,
}

impl super::Listener for Listener {
    type Sink = Sink;
    type Stream = Stream;

    async fn accept(&mut self) -> Result<(SocketAddr, Self::Sink, Self::Stream), Error> {
        // Accept a new TCP stream
        let (stream, addr) = self.listener.accept().await.map_err(|_| Error::Closed)?;
        let (sink, stream) = self.cfg.split(stream);
        Ok((addr, sink, stream))
    }

    fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }
}

/// Configuration for the TCP [Network].
#[derive(Clone, Debug)]
pub struct Config {
    /// `TCP_NODELAY` applied to every socket (left at the system default if `None`).
    ///
    /// Handshake acts and frames are written in a single call each, so disabling Nagle's
    /// algorithm does not fragment them but avoids delaying small frames.
    tcp_nodelay: Option<bool>,
    /// Maximum time to wait for any data on a read.
    read_timeout: Duration,
    /// Maximum time to write a handshake act or frame.
    write_timeout: Duration,
    /// Capacity of the buffer raw reads are batched into.
    read_buffer_size: usize,
}

impl Config {
    /// See [Config]
    pub const fn with_tcp_nodelay(mut self, tcp_nodelay: Option<bool>) -> Self {
        self.tcp_nodelay = tcp_nodelay;
        self
    }
    /// See [Config]
    pub const fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }
    /// See [Config]
    pub const fn with_write_timeout(mut self, write_timeout: Duration) -> Self {
        self.write_timeout = write_timeout;
        self
    }
    /// See [Config]
    pub const fn with_read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    /// Apply socket options and split `stream` into a [Sink] and [Stream].
    fn split(&self, stream: TcpStream) -> (Sink, Stream) {
        // Set TCP_NODELAY if configured
        if let Some(tcp_nodelay) = self.tcp_nodelay {
            if let Err(err) = stream.set_nodelay(tcp_nodelay) {
                warn!(?err, "failed to set TCP_NODELAY");
            }
        }

        let (read_half, sink) = stream.into_split();
        (
            Sink {
                write_timeout: self.write_timeout,
                sink,
            },
            Stream {
                read_timeout: self.read_timeout,
                stream: BufReader::with_capacity(self.read_buffer_size, read_half),
            },
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tcp_nodelay: Some(true),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(30),
            read_buffer_size: 64 * 1024, // 64 KB
        }
    }
}

/// [super::Network] implementation over TCP.
#[derive(Clone, Debug)]
pub struct Network {
    cfg: Config,
}

impl From<Config> for Network {
    fn from(cfg: Config) -> Self {
        Self { cfg }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::from(Config::default())
    }
}

impl super::Network for Network {
    type Listener = Listener;

    async fn bind(&self, socket: SocketAddr) -> Result<Self::Listener, Error> {
        TcpListener::bind(socket)
            .await
            .map_err(|_| Error::BindFailed)
            .map(|listener| Listener {
                cfg: self.cfg.clone(),
                listener,
            })
    }

    async fn dial(&self, socket: SocketAddr) -> Result<(Sink, Stream), Error> {
        let stream = TcpStream::connect(socket)
            .await
            .map_err(|_| Error::ConnectionFailed)?;
        Ok(self.cfg.split(stream))
    }
}
