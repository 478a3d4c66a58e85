//! Byte-stream transports that encrypted connections are layered on.
//!
//! A connection is made of a [Sink] and a [Stream], which carry raw (unencrypted) bytes. They are
//! produced by a [Network], either by dialing an address or by accepting from a [Listener].
//! [tokio] provides an implementation over TCP and [crate::mocks] an in-memory one.

use std::{future::Future, net::SocketAddr};
use thiserror::Error;

pub mod tokio;

/// Errors that can occur when interacting with a byte-stream transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("closed")]
    Closed,
    #[error("timeout")]
    Timeout,
    #[error("bind failed")]
    BindFailed,
    #[error("connection failed")]
    ConnectionFailed,
    #[error("send failed")]
    SendFailed,
    #[error("recv failed")]
    RecvFailed,
}

/// Syntactic sugar for the type of [Sink] used by a given [Network].
pub type SinkOf<N> = <<N as Network>::Listener as Listener>::Sink;

/// Syntactic sugar for the type of [Stream] used by a given [Network].
pub type StreamOf<N> = <<N as Network>::Listener as Listener>::Stream;

/// Interface for binding and dialing byte-stream transports.
pub trait Network: Clone + Send + Sync + 'static {
    /// The type of [Listener] that's returned when binding to a socket.
    type Listener: Listener;

    /// Bind to the given socket address.
    fn bind(
        &self,
        socket: SocketAddr,
    ) -> impl Future<Output = Result<Self::Listener, Error>> + Send;

    /// Dial the given socket address.
    fn dial(
        &self,
        socket: SocketAddr,
    ) -> impl Future<Output = Result<(SinkOf<Self>, StreamOf<Self>), Error>> + Send;
}

/// Interface for accepting incoming byte-stream transports.
pub trait Listener: Send + 'static {
    /// The type of [Sink] that's returned when accepting a connection.
    type Sink: Sink;
    /// The type of [Stream] that's returned when accepting a connection.
    type Stream: Stream;

    /// Accept an incoming connection.
    fn accept(
        &mut self,
    ) -> impl Future<Output = Result<(SocketAddr, Self::Sink, Self::Stream), Error>> + Send;

    /// Returns the local address of the listener.
    fn local_addr(&self) -> Result<SocketAddr, std::io::Error>;
}

/// The outbound half of a byte-stream transport.
pub trait Sink: Send + 'static {
    /// Write all of `msg`.
    fn send(&mut self, msg: &[u8]) -> impl Future<Output = Result<(), Error>> + Send;

    /// Close the outbound half. The peer observes end-of-stream once buffered bytes are read.
    fn close(&mut self) -> impl Future<Output = Result<(), Error>> + Send;
}

/// The inbound half of a byte-stream transport.
pub trait Stream: Send + 'static {
    /// Receive up to `buf.len()` bytes into the front of `buf`, returning how many were received.
    ///
    /// Fewer bytes than requested may be returned. `Ok(0)` (for a non-empty `buf`) means the peer
    /// closed its outbound half.
    ///
    /// Implementations must be cancel-safe: if the returned future is dropped before completing,
    /// no bytes have been consumed.
    fn recv(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Error>> + Send;
}
