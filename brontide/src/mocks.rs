//! An in-memory byte-stream transport for testing.

use crate::network::{self, Error};
use bytes::{Buf, BytesMut};
use futures::channel::oneshot;
use std::sync::{Arc, Mutex};

/// A mock channel struct that is used internally by [Sink] and [Stream].
pub struct Channel {
    /// Stores the bytes sent by the sink that are not yet read by the stream.
    buffer: BytesMut,

    /// If the stream is waiting to read data, the waiter is woken when bytes arrive or the
    /// sink is closed.
    waiter: Option<oneshot::Sender<()>>,

    /// Whether the sink has been closed (or dropped).
    closed: bool,

    /// Maximum number of bytes returned by a single call to [Stream::recv].
    max_read: usize,
}

impl Channel {
    /// Returns an async-safe Sink/Stream pair that share an underlying buffer of bytes.
    pub fn init() -> (Sink, Stream) {
        Self::init_with_max_read(usize::MAX)
    }

    /// Returns a Sink/Stream pair whose [Stream] never returns more than `max_read` bytes at
    /// once, simulating a transport that fragments data arbitrarily.
    pub fn init_with_max_read(max_read: usize) -> (Sink, Stream) {
        assert!(max_read > 0, "max_read must be positive");
        let channel = Arc::new(Mutex::new(Channel {
            buffer: BytesMut::new(),
            waiter: None,
            closed: false,
            max_read,
        }));
        (
            Sink {
                channel: channel.clone(),
            },
            Stream { channel },
        )
    }
}

/// A mock sink that implements the [network::Sink] trait.
pub struct Sink {
    channel: Arc<Mutex<Channel>>,
}

impl Sink {
    fn shutdown(&self) {
        let waiter = {
            let mut channel = self.channel.lock().unwrap();
            channel.closed = true;
            channel.waiter.take()
        };
        if let Some(waiter) = waiter {
            let _ = waiter.send(());
        }
    }
}

impl network::Sink for Sink {
    async fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        let waiter = {
            let mut channel = self.channel.lock().unwrap();
            if channel.closed {
                return Err(Error::Closed);
            }
            channel.buffer.extend_from_slice(msg);
            channel.waiter.take()
        };

        // Notify the stream that data is available
        if let Some(waiter) = waiter {
            let _ = waiter.send(());
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.shutdown();
        Ok(())
    }
}

impl Drop for Sink {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// A mock stream that implements the [network::Stream] trait.
pub struct Stream {
    channel: Arc<Mutex<Channel>>,
}

impl network::Stream for Stream {
    async fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let receiver = {
                let mut channel = self.channel.lock().unwrap();

                // Serve buffered bytes first, even if the sink is closed
                if !channel.buffer.is_empty() {
                    let n = buf.len().min(channel.buffer.len()).min(channel.max_read);
                    channel.buffer.copy_to_slice(&mut buf[..n]);
                    return Ok(n);
                }
                if channel.closed {
                    return Ok(0);
                }

                let (sender, receiver) = oneshot::channel();
                channel.waiter = Some(sender);
                receiver
            };

            // Wait for more bytes (or closure). A dropped sender means the waiter was replaced or
            // the channel is gone, and both are handled by checking again.
            let _ = receiver.await;
        }
    }
}
