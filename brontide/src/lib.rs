//! Encrypt and authenticate a byte stream with the Noise XK handshake used by Lightning peers.
//!
//! This crate replaces a plain byte-stream connection with one where every byte is encrypted
//! and authenticated. Peers are identified by long-term secp256k1 keys. The dialer must know the
//! listener's static public key in advance, while the listener learns (and authenticates) the
//! dialer's static public key during the handshake.
//!
//! # Design
//!
//! ## Handshake
//!
//! The handshake is `Noise_XK_secp256k1_ChaChaPoly_SHA256` with the prologue `lightning`. It
//! consists of three fixed-size acts:
//!
//! ```txt
//! <- s
//! ...
//! -> e, es        (Act One,   50 bytes: version || ephemeral || tag)
//! <- e, ee        (Act Two,   50 bytes: version || ephemeral || tag)
//! -> s, se        (Act Three, 66 bytes: version || encrypted static || tag)
//! ```
//!
//! Each side threads a chaining key and a transcript hash through every step. The initiator and
//! responder are modelled as two distinct typestate machines (see [handshake]) so that each act
//! consumes the previous state and an act can never be replayed or skipped.
//!
//! ## Encryption
//!
//! After the final act, the chaining key is split into two directional ChaCha20-Poly1305 keys.
//! Every AEAD operation uses a 12-byte nonce made of 4 zero bytes followed by a little-endian
//! 64-bit counter. After 1000 operations under one key, the key is rotated with
//! `(ck', k') = HKDF(ck, k)` and the counter is reset, so a nonce is never reused under a key.
//! Send and receive keys rotate independently.
//!
//! ## Framing
//!
//! Each frame carries at most 65535 bytes of plaintext:
//!
//! ```txt
//! [ 2-byte big-endian length ][ 16-byte tag ][ payload (length bytes) ][ 16-byte tag ]
//! ```
//!
//! The length and the payload are sealed as two independent AEAD units. Writes larger than one
//! frame are split into several frames, and reads smaller than one frame keep the remaining
//! plaintext buffered for the next call.
//!
//! # Security
//!
//! ## Provided
//!
//! - **Mutual Authentication**: The listener's identity is proven in Act Two (only the holder of
//!   its static key can derive the Act One key) and the dialer's identity in Act Three.
//! - **Forward Secrecy**: Traffic keys depend on ephemeral Diffie-Hellman exchanges.
//! - **Identity Hiding**: The dialer's static key is only ever sent encrypted.
//!
//! ## Not Provided
//!
//! - **Padding**: Frame lengths are hidden but payload sizes can be inferred from frame sizes.
//! - **Recovery**: Any authentication failure is fatal for the connection. There is no attempt to
//!   resynchronize with a peer whose state has diverged.
//!
//! # Status
//!
//! `commonware-brontide` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.

#![doc(
    html_logo_url = "https://commonware.xyz/imgs/rustdoc_logo.svg",
    html_favicon_url = "https://commonware.xyz/favicon.ico"
)]

mod cipher;
pub use cipher::{CipherState, Rotation, REKEY_INTERVAL};
mod connection;
pub use connection::{Connection, Receiver, Sender};
mod dialer;
pub use dialer::dial;
pub mod handshake;
mod keys;
pub use keys::{PrivateKey, PublicKey, PUBLIC_KEY_LENGTH};
mod listener;
pub use listener::{Listener, DEFAULT_MAX_HANDSHAKES};
pub mod mocks;
pub mod network;
mod nonce;
mod reader;
pub mod utils;

use std::time::Duration;
use thiserror::Error;

/// Maximum number of plaintext bytes carried by a single frame.
pub const MAX_PAYLOAD_LENGTH: usize = u16::MAX as usize;

/// Size of the authentication tag appended to every sealed unit.
pub const TAG_LENGTH: usize = 16;

/// Size of the plaintext length prefix of a frame.
pub const LENGTH_PREFIX_LENGTH: usize = 2;

/// Size of a sealed length prefix (prefix plus its tag).
pub const ENCRYPTED_HEADER_LENGTH: usize = LENGTH_PREFIX_LENGTH + TAG_LENGTH;

/// Errors that can occur when establishing or using an encrypted connection.
#[derive(Error, Debug)]
pub enum Error {
    // Key errors
    #[error("invalid public key")]
    InvalidPublicKey,
    #[error("invalid private key")]
    InvalidPrivateKey,

    // Handshake errors
    #[error("invalid handshake version: {0}")]
    InvalidVersion(u8),
    #[error("handshake authentication failed")]
    HandshakeAuthentication,
    #[error("handshake act truncated after {0} bytes")]
    TruncatedAct(usize),
    #[error("handshake timeout")]
    HandshakeTimeout,
    #[error("HKDF expansion failed")]
    HkdfExpansion,
    #[error("cannot dial self")]
    DialSelf,

    // Transport errors
    #[error("encryption failed")]
    EncryptionFailed,
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("malformed frame")]
    MalformedFrame,
    #[error("message too large: {0} bytes")]
    MessageTooLarge(usize),
    #[error("stream closed")]
    StreamClosed,
    #[error("connection terminated by a previous failure")]
    Terminated,

    // Network errors
    #[error("network error: {0}")]
    Network(#[from] network::Error),
}

/// Configuration for dialing and listening.
///
/// The static key is only ever read, so a single [Config] may be cloned into many concurrent
/// handshakes.
#[derive(Clone)]
pub struct Config {
    /// The long-term private key that identifies us to peers.
    pub static_key: PrivateKey,

    /// Maximum time allowed for completing all three acts of the handshake.
    pub handshake_timeout: Duration,
}

impl Config {
    /// Create a new [Config] with a handshake timeout of 15 seconds.
    pub fn new(static_key: PrivateKey) -> Self {
        Self {
            static_key,
            handshake_timeout: Duration::from_secs(15),
        }
    }

    /// See [Config].
    pub fn with_handshake_timeout(mut self, handshake_timeout: Duration) -> Self {
        self.handshake_timeout = handshake_timeout;
        self
    }
}
