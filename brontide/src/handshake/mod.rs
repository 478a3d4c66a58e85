//! Typestate machines for the three-act handshake.
//!
//! The dialer drives an [Initiator] and the listener drives a [Responder]. Every act consumes the
//! previous state and returns the next one, so acts can only be produced or processed once and in
//! order:
//!
//! ```txt
//! Initiator --act_one--> AwaitingActTwo --act_three--> Session
//! Responder --recv_act_one--> ReceivedActOne --act_two--> AwaitingActThree --recv_act_three--> Session
//! ```
//!
//! These machines perform no I/O. Ephemeral keys are supplied by the caller, which allows the
//! handshake to be driven with fixed keys in tests.

use crate::{CipherState, PublicKey};

mod initiator;
pub use initiator::{AwaitingActTwo, Initiator};
mod responder;
pub use responder::{AwaitingActThree, ReceivedActOne, Responder};
mod symmetric;

/// Name of the Noise protocol, hashed into the initial handshake state.
pub const PROTOCOL_NAME: &[u8] = b"Noise_XK_secp256k1_ChaChaPoly_SHA256";

/// Prologue mixed into the handshake hash by both parties.
pub const PROLOGUE: &[u8] = b"lightning";

/// The only handshake version understood.
pub const VERSION: u8 = 0;

/// `version || ephemeral || tag`
pub const ACT_ONE_LENGTH: usize = 50;

/// `version || ephemeral || tag`
pub const ACT_TWO_LENGTH: usize = 50;

/// `version || encrypted static || tag`
pub const ACT_THREE_LENGTH: usize = 66;

/// The outcome of a completed handshake.
#[derive(Debug)]
pub struct Session {
    /// The authenticated static public key of the peer.
    pub remote_static: PublicKey,
    /// Cipher for outbound traffic.
    pub send: CipherState,
    /// Cipher for inbound traffic.
    pub recv: CipherState,
}
