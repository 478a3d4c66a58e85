use crate::{
    handshake::{Initiator, Responder, Session, ACT_ONE_LENGTH, ACT_THREE_LENGTH, ACT_TWO_LENGTH},
    network::{Sink, Stream},
    reader::Reader,
    CipherState, Config, Error, PrivateKey, PublicKey, ENCRYPTED_HEADER_LENGTH,
    MAX_PAYLOAD_LENGTH, TAG_LENGTH,
};
use bytes::Bytes;
use rand::{CryptoRng, Rng};
use tokio::time::timeout;
use tracing::debug;

/// Fill `buf` with a handshake act from `stream`, failing if the stream ends first.
async fn recv_act<St: Stream>(stream: &mut St, buf: &mut [u8]) -> Result<(), Error> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = stream.recv(&mut buf[filled..]).await?;
        if n == 0 {
            return Err(Error::TruncatedAct(filled));
        }
        filled += n;
    }
    Ok(())
}

/// A fully initialized connection with some peer.
pub struct Connection<Si: Sink, St: Stream> {
    remote_static: PublicKey,
    sender: Sender<Si>,
    receiver: Receiver<St>,
}

impl<Si: Sink, St: Stream> Connection<Si, St> {
    /// Create a new connection from pre-established components.
    ///
    /// This is useful in tests, or when the handshake was driven by other means.
    pub fn from_preestablished(
        sink: Si,
        stream: St,
        remote_static: PublicKey,
        cipher_send: CipherState,
        cipher_recv: CipherState,
    ) -> Self {
        Self {
            remote_static,
            sender: Sender {
                sink,
                cipher: cipher_send,
                terminated: false,
            },
            receiver: Receiver {
                reader: Reader::new(stream, cipher_recv),
            },
        }
    }

    fn from_session(sink: Si, stream: St, session: Session) -> Self {
        Self::from_preestablished(
            sink,
            stream,
            session.remote_static,
            session.send,
            session.recv,
        )
    }

    /// Attempt to upgrade a raw connection we initiated to the peer with static key `peer`.
    ///
    /// The dialer:
    /// 1. Sends Act One, proving it knows the listener's static key
    /// 2. Receives Act Two, authenticating the listener
    /// 3. Sends Act Three, revealing (encrypted) and proving its own static key
    pub async fn upgrade_dialer<R: Rng + CryptoRng>(
        rng: &mut R,
        config: Config,
        mut sink: Si,
        mut stream: St,
        peer: PublicKey,
    ) -> Result<Self, Error> {
        // Ensure we are not trying to connect to ourselves
        if peer == config.static_key.public_key() {
            return Err(Error::DialSelf);
        }

        let ephemeral = PrivateKey::from_rng(rng);
        let initiator = Initiator::new(config.static_key, peer);
        let session = timeout(config.handshake_timeout, async {
            // Send Act One
            let (initiator, act_one) = initiator.act_one(ephemeral)?;
            sink.send(&act_one).await?;

            // Receive Act Two
            let mut act_two = [0u8; ACT_TWO_LENGTH];
            recv_act(&mut stream, &mut act_two).await?;

            // Send Act Three
            let (act_three, session) = initiator.act_three(&act_two)?;
            sink.send(&act_three).await?;
            Ok::<_, Error>(session)
        })
        .await
        .map_err(|_| Error::HandshakeTimeout)??;

        debug!(peer = %session.remote_static, "dialer completed handshake");
        Ok(Self::from_session(sink, stream, session))
    }

    /// Attempt to upgrade a connection initiated by some peer.
    ///
    /// The listener learns the dialer's static key from Act Three. It is available afterwards
    /// from [Connection::remote_static].
    pub async fn upgrade_listener<R: Rng + CryptoRng>(
        rng: &mut R,
        config: Config,
        mut sink: Si,
        mut stream: St,
    ) -> Result<Self, Error> {
        let ephemeral = PrivateKey::from_rng(rng);
        let responder = Responder::new(config.static_key);
        let session = timeout(config.handshake_timeout, async {
            // Receive Act One
            let mut act_one = [0u8; ACT_ONE_LENGTH];
            recv_act(&mut stream, &mut act_one).await?;
            let responder = responder.recv_act_one(&act_one)?;

            // Send Act Two
            let (responder, act_two) = responder.act_two(ephemeral)?;
            sink.send(&act_two).await?;

            // Receive Act Three
            let mut act_three = [0u8; ACT_THREE_LENGTH];
            recv_act(&mut stream, &mut act_three).await?;
            responder.recv_act_three(&act_three)
        })
        .await
        .map_err(|_| Error::HandshakeTimeout)??;

        debug!(peer = %session.remote_static, "listener completed handshake");
        Ok(Self::from_session(sink, stream, session))
    }

    /// The authenticated static public key of the peer.
    pub fn remote_static(&self) -> PublicKey {
        self.remote_static
    }

    /// Split the connection into a [Sender] and [Receiver].
    ///
    /// This pattern is commonly used to efficiently send and receive messages
    /// over the same connection concurrently.
    pub fn split(self) -> (Sender<Si>, Receiver<St>) {
        (self.sender, self.receiver)
    }

    /// See [Sender::write].
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        self.sender.write(buf).await
    }

    /// See [Sender::send].
    pub async fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        self.sender.send(msg).await
    }

    /// See [Receiver::read].
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.receiver.read(buf).await
    }

    /// See [Receiver::recv].
    pub async fn recv(&mut self) -> Result<Bytes, Error> {
        self.receiver.recv().await
    }

    /// See [Sender::close].
    pub async fn close(&mut self) -> Result<(), Error> {
        self.sender.close().await
    }
}

/// The outbound half of a [Connection].
pub struct Sender<Si: Sink> {
    sink: Si,
    cipher: CipherState,
    terminated: bool,
}

impl<Si: Sink> Sender<Si> {
    /// Encrypt and write all of `buf`, split into as many frames as needed.
    ///
    /// Returns the number of bytes written, which is always `buf.len()`.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize, Error> {
        for chunk in buf.chunks(MAX_PAYLOAD_LENGTH) {
            self.send_frame(chunk).await?;
        }
        Ok(buf.len())
    }

    /// Encrypt and write `msg` as exactly one frame.
    pub async fn send(&mut self, msg: &[u8]) -> Result<(), Error> {
        if msg.len() > MAX_PAYLOAD_LENGTH {
            return Err(Error::MessageTooLarge(msg.len()));
        }
        self.send_frame(msg).await
    }

    /// Close the underlying sink. The peer reads end-of-stream after the last frame.
    pub async fn close(&mut self) -> Result<(), Error> {
        self.terminated = true;
        self.sink.close().await?;
        Ok(())
    }

    async fn send_frame(&mut self, payload: &[u8]) -> Result<(), Error> {
        if self.terminated {
            return Err(Error::Terminated);
        }

        let length =
            u16::try_from(payload.len()).map_err(|_| Error::MessageTooLarge(payload.len()))?;

        // Cleared only once the frame is fully written
        self.terminated = true;
        let mut frame = Vec::with_capacity(ENCRYPTED_HEADER_LENGTH + payload.len() + TAG_LENGTH);
        frame.extend_from_slice(&self.cipher.seal(&length.to_be_bytes())?);
        frame.extend_from_slice(&self.cipher.seal(payload)?);
        self.sink.send(&frame).await?;
        self.terminated = false;
        Ok(())
    }
}

/// The inbound half of a [Connection].
pub struct Receiver<St: Stream> {
    reader: Reader<St>,
}

impl<St: Stream> Receiver<St> {
    /// Read up to `buf.len()` bytes of plaintext.
    ///
    /// Bytes left over from a frame larger than `buf` are returned by the next call. Returns
    /// `Ok(0)` once the peer has closed the connection.
    ///
    /// # Cancellation
    ///
    /// This method is cancel-safe. If the returned future is dropped before completing, no
    /// data is lost and the next call resumes where this one left off.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.reader.read(buf).await
    }

    /// Receive the next frame (or what remains of one partially consumed by [Self::read]).
    ///
    /// Fails with [Error::StreamClosed] once the peer has closed the connection.
    ///
    /// # Cancellation
    ///
    /// This method is cancel-safe.
    pub async fn recv(&mut self) -> Result<Bytes, Error> {
        self.reader.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        handshake::{Initiator, Responder},
        mocks::{self, Channel},
        network::Sink as _,
        utils::from_hex_formatted,
        REKEY_INTERVAL,
    };
    use futures::join;
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::Duration;

    type MockConnection = Connection<mocks::Sink, mocks::Stream>;

    /// Establish a connection over in-memory channels that deliver at most `max_read` bytes per
    /// read.
    async fn connect(max_read: usize) -> (MockConnection, MockConnection) {
        let dialer_key = PrivateKey::from_seed(0);
        let listener_key = PrivateKey::from_seed(1);
        let (dialer_sink, listener_stream) = Channel::init_with_max_read(max_read);
        let (listener_sink, dialer_stream) = Channel::init_with_max_read(max_read);

        let mut dialer_rng = StdRng::seed_from_u64(2);
        let mut listener_rng = StdRng::seed_from_u64(3);
        let (dialer, listener) = join!(
            Connection::upgrade_dialer(
                &mut dialer_rng,
                Config::new(dialer_key),
                dialer_sink,
                dialer_stream,
                listener_key.public_key(),
            ),
            Connection::upgrade_listener(
                &mut listener_rng,
                Config::new(listener_key),
                listener_sink,
                listener_stream,
            ),
        );
        (dialer.unwrap(), listener.unwrap())
    }

    /// Read until `len` bytes have been received, using reads of at most `chunk` bytes.
    async fn read_all(connection: &mut MockConnection, len: usize, chunk: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(len);
        let mut buf = vec![0u8; chunk];
        while out.len() < len {
            let n = connection.read(&mut buf).await.unwrap();
            assert!(n > 0);
            out.extend_from_slice(&buf[..n]);
        }
        out
    }

    #[tokio::test]
    async fn test_handshake_identities() {
        let (dialer, listener) = connect(usize::MAX).await;
        assert_eq!(dialer.remote_static(), PrivateKey::from_seed(1).public_key());
        assert_eq!(listener.remote_static(), PrivateKey::from_seed(0).public_key());

        // Both sides derived matching keys
        assert_eq!(
            dialer.sender.cipher.key(),
            listener.receiver.reader.cipher().key()
        );
        assert_eq!(
            listener.sender.cipher.key(),
            dialer.receiver.reader.cipher().key()
        );
    }

    #[tokio::test]
    async fn test_round_trip_any_read_size() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();

        for chunk in [1, 7, 100, 4096, 65_535, 100_000] {
            dialer.write(&data[..3000]).await.unwrap();
            dialer.write(&data[3000..]).await.unwrap();
            let received = read_all(&mut listener, data.len(), chunk).await;
            assert_eq!(received, data);
        }
    }

    #[tokio::test]
    async fn test_write_larger_than_frame() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
        assert_eq!(dialer.write(&data).await.unwrap(), data.len());

        // Split into frames of at most 65535 bytes
        let mut sizes = Vec::new();
        let mut received = Vec::new();
        while received.len() < data.len() {
            let frame = listener.recv().await.unwrap();
            sizes.push(frame.len());
            received.extend_from_slice(&frame);
        }
        assert_eq!(sizes, vec![65_535, 65_535, 65_535, 3_395]);
        assert_eq!(received, data);
    }

    #[tokio::test]
    async fn test_trickled_stream() {
        // Both the handshake and the frames arrive one byte at a time
        let (mut dialer, mut listener) = connect(1).await;
        for i in 0..20u8 {
            dialer.send(&[i; 300]).await.unwrap();
        }
        let received = read_all(&mut listener, 20 * 300, 128).await;
        for (i, chunk) in received.chunks(300).enumerate() {
            assert_eq!(chunk, &[i as u8; 300][..]);
        }

        listener.send(b"reply").await.unwrap();
        assert_eq!(dialer.recv().await.unwrap().as_ref(), b"reply");
    }

    #[tokio::test]
    async fn test_send_too_large() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        let msg = vec![0u8; MAX_PAYLOAD_LENGTH + 1];
        let result = dialer.send(&msg).await;
        assert!(matches!(result, Err(Error::MessageTooLarge(n)) if n == MAX_PAYLOAD_LENGTH + 1));

        // The rejected message was never encrypted, so the connection is still usable
        let msg = vec![1u8; MAX_PAYLOAD_LENGTH];
        dialer.send(&msg).await.unwrap();
        assert_eq!(listener.recv().await.unwrap().len(), MAX_PAYLOAD_LENGTH);
    }

    #[tokio::test]
    async fn test_rotation_schedule() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        let frames_per_rotation = REKEY_INTERVAL / 2;
        let original = dialer.sender.cipher.key();

        for _ in 0..frames_per_rotation - 1 {
            dialer.send(b"x").await.unwrap();
            listener.recv().await.unwrap();
        }
        assert_eq!(dialer.sender.cipher.generation(), 0);
        assert_eq!(dialer.sender.cipher.key(), original);

        // The 500th frame rotates the key after it is sealed
        dialer.send(b"x").await.unwrap();
        assert_eq!(dialer.sender.cipher.generation(), 1);
        assert_ne!(dialer.sender.cipher.key(), original);
        listener.recv().await.unwrap();
        assert_eq!(listener.receiver.reader.cipher().generation(), 1);

        // The next frame round-trips under the new key
        dialer.send(b"after").await.unwrap();
        assert_eq!(listener.recv().await.unwrap().as_ref(), b"after");
    }

    #[tokio::test]
    async fn test_independent_rotation() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        let listener_send_key = listener.sender.cipher.key();

        for i in 0..1500u32 {
            dialer.send(&i.to_be_bytes()).await.unwrap();
        }
        for i in 0..10u32 {
            listener.send(&i.to_be_bytes()).await.unwrap();
        }

        for i in 0..1500u32 {
            assert_eq!(listener.recv().await.unwrap().as_ref(), i.to_be_bytes());
        }
        for i in 0..10u32 {
            assert_eq!(dialer.recv().await.unwrap().as_ref(), i.to_be_bytes());
        }

        // 1500 frames are 3000 operations: three rotations
        assert_eq!(dialer.sender.cipher.generation(), 3);
        assert_eq!(listener.receiver.reader.cipher().generation(), 3);

        // The quiet direction never rotated
        assert_eq!(listener.sender.cipher.generation(), 0);
        assert_eq!(listener.sender.cipher.nonce(), 20);
        assert_eq!(listener.sender.cipher.key(), listener_send_key);
        assert_eq!(dialer.receiver.reader.cipher().generation(), 0);
    }

    #[tokio::test]
    async fn test_bolt8_message_vectors() {
        // Complete the handshake with the fixed keys of the test vectors
        let key = |byte: u8| PrivateKey::try_from(&[byte; 32][..]).unwrap();
        let initiator = Initiator::new(key(0x11), key(0x21).public_key());
        let responder = Responder::new(key(0x21));
        let (initiator, act_one) = initiator.act_one(key(0x12)).unwrap();
        let responder = responder.recv_act_one(&act_one).unwrap();
        let (_, act_two) = responder.act_two(key(0x22)).unwrap();
        let (_, session) = initiator.act_three(&act_two).unwrap();

        let (sink, mut raw) = Channel::init();
        let (_, stream) = Channel::init();
        let mut connection = Connection::from_session(sink, stream, session);

        let expected = [
            (0, "0xcf2b30ddf0cf3f80e7c35a6e6730b59fe802473180f396d88a8fb0db8cbcf25d2f214cf9ea1d95"),
            (1, "0x72887022101f0b6753e0c7de21657d35a4cb2a1f5cde2650528bbc8f837d0f0d7ad833b1a256a1"),
            (500, "0x178cb9d7387190fa34db9c2d50027d21793c9bc2d40b1e14dcf30ebeeeb220f48364f7a4c68bf8"),
            (501, "0x1b186c57d44eb6de4c057c49940d79bb838a145cb528d6e8fd26dbe50a60ca2c104b56b60e45bd"),
            (1000, "0x4a2f3cc3b5e78ddb83dcb426d9863d9d9a723b0337c89dd0b005d89f8d3c05c52b76b29b740f09"),
            (1001, "0x2ecd8c8a5629d0d02ab457a0fdd0f7b90a192cd46be5ecb6ca570bfc5e268338b1a16cf4ef2d36"),
        ];
        let mut expected = expected.iter().peekable();
        let mut frame = [0u8; ENCRYPTED_HEADER_LENGTH + 5 + TAG_LENGTH];
        for i in 0..1002 {
            connection.send(b"hello").await.unwrap();
            let mut filled = 0;
            while filled < frame.len() {
                filled += raw.recv(&mut frame[filled..]).await.unwrap();
            }
            if let Some((index, hex)) = expected.peek() {
                if *index == i {
                    assert_eq!(frame.to_vec(), from_hex_formatted(hex).unwrap(), "message {i}");
                    expected.next();
                }
            }
        }
        assert!(expected.next().is_none());
    }

    #[tokio::test]
    async fn test_tampered_frame() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        dialer.send(b"first").await.unwrap();
        assert_eq!(listener.recv().await.unwrap().as_ref(), b"first");

        // Seal a frame with the dialer's cipher but corrupt it on the wire
        let mut frame = dialer.sender.cipher.seal(&5u16.to_be_bytes()).unwrap();
        frame.extend(dialer.sender.cipher.seal(b"evil!").unwrap());
        let last = frame.len() - 1;
        frame[last] ^= 0x80;
        dialer.sender.sink.send(&frame).await.unwrap();

        let result = listener.recv().await;
        assert!(matches!(result, Err(Error::DecryptionFailed)));

        // The receiver refuses to continue
        dialer.send(b"after").await.unwrap();
        assert!(matches!(listener.recv().await, Err(Error::Terminated)));
    }

    #[tokio::test]
    async fn test_close() {
        let (mut dialer, mut listener) = connect(usize::MAX).await;
        dialer.write(b"last words").await.unwrap();
        dialer.close().await.unwrap();

        let received = read_all(&mut listener, 10, 64).await;
        assert_eq!(received, b"last words");
        let mut buf = [0u8; 8];
        assert_eq!(listener.read(&mut buf).await.unwrap(), 0);
        assert!(matches!(listener.recv().await, Err(Error::StreamClosed)));

        // Nothing can be sent after closing
        assert!(matches!(dialer.send(b"more").await, Err(Error::Terminated)));
    }

    #[tokio::test]
    async fn test_split_concurrent() {
        let (dialer, listener) = connect(usize::MAX).await;
        let (mut dialer_sender, mut dialer_receiver) = dialer.split();
        let (mut listener_sender, mut listener_receiver) = listener.split();

        // Echo on the listener side
        let echo = tokio::spawn(async move {
            for _ in 0..100 {
                let msg = listener_receiver.recv().await.unwrap();
                listener_sender.send(&msg).await.unwrap();
            }
        });

        let writer = tokio::spawn(async move {
            for i in 0..100u32 {
                dialer_sender.send(&i.to_le_bytes()).await.unwrap();
            }
            dialer_sender
        });
        for i in 0..100u32 {
            let msg = dialer_receiver.recv().await.unwrap();
            assert_eq!(msg.as_ref(), i.to_le_bytes());
        }
        writer.await.unwrap();
        echo.await.unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_reads() {
        let mut send = CipherState::new([3u8; 32], [4u8; 32]);
        let recv = CipherState::new([3u8; 32], [4u8; 32]);
        let mut frames = Vec::new();
        for i in 0..10u8 {
            frames.extend(send.seal(&3u16.to_be_bytes()).unwrap());
            frames.extend(send.seal(&[i; 3]).unwrap());
        }

        // Trickle frames in one byte at a time while reads keep timing out
        let (mut sink, stream) = Channel::init_with_max_read(1);
        let mut receiver = Receiver {
            reader: Reader::new(stream, recv),
        };
        let writer = tokio::spawn(async move {
            for byte in frames {
                sink.send(&[byte]).await.unwrap();
                tokio::time::sleep(Duration::from_micros(50)).await;
            }
            sink
        });

        let mut received = Vec::new();
        while received.len() < 10 {
            if let Ok(result) = timeout(Duration::from_micros(100), receiver.recv()).await {
                received.push(result.unwrap());
            }
        }
        for (i, msg) in received.iter().enumerate() {
            assert_eq!(msg.as_ref(), &[i as u8; 3]);
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_dial_self() {
        let key = PrivateKey::from_seed(0);
        let (sink, _) = Channel::init();
        let (_, stream) = Channel::init();
        let result = Connection::upgrade_dialer(
            &mut StdRng::seed_from_u64(0),
            Config::new(key.clone()),
            sink,
            stream,
            key.public_key(),
        )
        .await;
        assert!(matches!(result, Err(Error::DialSelf)));
    }

    #[tokio::test]
    async fn test_wrong_peer() {
        let dialer_key = PrivateKey::from_seed(0);
        let listener_key = PrivateKey::from_seed(1);
        let expected_key = PrivateKey::from_seed(2);
        let (dialer_sink, listener_stream) = Channel::init();
        let (listener_sink, dialer_stream) = Channel::init();

        let mut dialer_rng = StdRng::seed_from_u64(3);
        let mut listener_rng = StdRng::seed_from_u64(4);
        let (dialer, listener) = join!(
            Connection::upgrade_dialer(
                &mut dialer_rng,
                Config::new(dialer_key),
                dialer_sink,
                dialer_stream,
                expected_key.public_key(),
            ),
            Connection::upgrade_listener(
                &mut listener_rng,
                Config::new(listener_key),
                listener_sink,
                listener_stream,
            ),
        );

        // The listener can't authenticate Act One and drops the stream before Act Two
        assert!(matches!(listener, Err(Error::HandshakeAuthentication)));
        assert!(matches!(dialer, Err(Error::TruncatedAct(0))));
    }

    #[tokio::test]
    async fn test_handshake_timeout() {
        let (dialer_sink, _listener_stream) = Channel::init();
        let (_listener_sink, dialer_stream) = Channel::init();

        // Nobody answers Act One
        let config = Config::new(PrivateKey::from_seed(0))
            .with_handshake_timeout(Duration::from_millis(50));
        let result = Connection::upgrade_dialer(
            &mut StdRng::seed_from_u64(0),
            config,
            dialer_sink,
            dialer_stream,
            PrivateKey::from_seed(1).public_key(),
        )
        .await;
        assert!(matches!(result, Err(Error::HandshakeTimeout)));
    }

    #[tokio::test]
    async fn test_truncated_act() {
        let (mut dialer_sink, listener_stream) = Channel::init();
        let (listener_sink, _dialer_stream) = Channel::init();

        // Send half of Act One, then hang up
        dialer_sink.send(&[0u8; ACT_ONE_LENGTH / 2]).await.unwrap();
        drop(dialer_sink);

        let result = Connection::upgrade_listener(
            &mut StdRng::seed_from_u64(0),
            Config::new(PrivateKey::from_seed(1)),
            listener_sink,
            listener_stream,
        )
        .await;
        assert!(matches!(result, Err(Error::TruncatedAct(n)) if n == ACT_ONE_LENGTH / 2));
    }

    #[tokio::test]
    async fn test_truncated_act_two() {
        let (dialer_sink, _listener_stream) = Channel::init();
        let (mut listener_sink, dialer_stream) = Channel::init();

        // The listener answers with a partial Act Two, then hangs up
        listener_sink.send(&[0u8; 10]).await.unwrap();
        drop(listener_sink);

        let result = Connection::upgrade_dialer(
            &mut StdRng::seed_from_u64(0),
            Config::new(PrivateKey::from_seed(0)),
            dialer_sink,
            dialer_stream,
            PrivateKey::from_seed(1).public_key(),
        )
        .await;
        assert!(matches!(result, Err(Error::TruncatedAct(10))));
    }
}
