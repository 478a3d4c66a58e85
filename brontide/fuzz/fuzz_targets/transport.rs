#![no_main]

use arbitrary::Arbitrary;
use commonware_brontide::{
    mocks,
    network::{Sink as _, Stream as _},
    CipherState, Connection, PrivateKey, ENCRYPTED_HEADER_LENGTH, TAG_LENGTH,
};
use futures::executor::block_on;
use libfuzzer_sys::fuzz_target;

const MAX_MESSAGES: usize = 64;
const MAX_READ_SIZE: usize = 4096;

#[derive(Debug, Arbitrary)]
enum Operation {
    /// Bytes written directly to the wire of the receiving side.
    Raw(Vec<u8>),
    /// A message sent by a well-behaved peer.
    Send(Vec<u8>),
}

#[derive(Debug, Arbitrary)]
pub struct FuzzInput {
    key: [u8; 32],
    chaining_key: [u8; 32],
    max_read: u8,
    read_size: u16,
    operations: Vec<Operation>,
}

fn fuzz(input: FuzzInput) {
    let remote = PrivateKey::from_seed(0).public_key();
    let max_read = (input.max_read as usize).max(1);
    let read_size = (input.read_size as usize).clamp(1, MAX_READ_SIZE);

    let (mut wire, stream) = mocks::Channel::init_with_max_read(max_read);
    let (sink, _) = mocks::Channel::init();
    let mut receiver = Connection::from_preestablished(
        sink,
        stream,
        remote,
        CipherState::new([0u8; 32], [0u8; 32]),
        CipherState::new(input.key, input.chaining_key),
    );

    // Frames produced by a well-behaved peer are captured and forwarded onto the wire
    let (peer_sink, mut peer_stream) = mocks::Channel::init();
    let (_, unused) = mocks::Channel::init();
    let mut peer = Connection::from_preestablished(
        peer_sink,
        unused,
        remote,
        CipherState::new(input.key, input.chaining_key),
        CipherState::new([0u8; 32], [0u8; 32]),
    );

    block_on(async {
        let mut expected = Vec::new();
        let mut corrupted = false;
        for op in input.operations.into_iter().take(MAX_MESSAGES) {
            match op {
                Operation::Raw(bytes) => {
                    if !bytes.is_empty() {
                        corrupted = true;
                    }
                    wire.send(&bytes).await.unwrap();
                }
                Operation::Send(msg) => {
                    let msg: Vec<u8> = msg.into_iter().take(MAX_READ_SIZE).collect();
                    peer.send(&msg).await.unwrap();
                    let mut buf = vec![0u8; ENCRYPTED_HEADER_LENGTH + msg.len() + TAG_LENGTH];
                    let mut filled = 0;
                    while filled < buf.len() {
                        filled += peer_stream.recv(&mut buf[filled..]).await.unwrap();
                    }
                    wire.send(&buf).await.unwrap();
                    expected.extend_from_slice(&msg);
                }
            }
        }
        wire.close().await.unwrap();

        // Read everything back until the stream ends or fails
        let mut received = Vec::new();
        let mut buf = vec![0u8; read_size];
        let mut failed = false;
        loop {
            match receiver.read(&mut buf).await {
                Ok(0) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }

        // Without injected bytes, every message is delivered intact
        if !corrupted {
            assert!(!failed);
            assert_eq!(received, expected);
        }

        // A failed receiver stays failed
        if failed {
            assert!(receiver.recv().await.is_err());
        }
    });
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
