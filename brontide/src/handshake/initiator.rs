use super::{
    symmetric::SymmetricState, Session, ACT_ONE_LENGTH, ACT_THREE_LENGTH, ACT_TWO_LENGTH,
    PROLOGUE, PROTOCOL_NAME, VERSION,
};
use crate::{keys::ecdh, Error, PrivateKey, PublicKey, PUBLIC_KEY_LENGTH, TAG_LENGTH};

/// The dialing side of a handshake, before any act has been sent.
///
/// The initiator must know the static public key of the responder in advance.
pub struct Initiator {
    static_key: PrivateKey,
    remote_static: PublicKey,
    state: SymmetricState,
}

impl Initiator {
    /// Begin a handshake with the responder identified by `remote_static`.
    pub fn new(static_key: PrivateKey, remote_static: PublicKey) -> Self {
        let mut state = SymmetricState::new(PROTOCOL_NAME, PROLOGUE);
        state.mix_hash(remote_static.as_ref());
        Self {
            static_key,
            remote_static,
            state,
        }
    }

    /// Generate Act One (`e, es`) using the provided ephemeral key.
    pub fn act_one(
        mut self,
        ephemeral: PrivateKey,
    ) -> Result<(AwaitingActTwo, [u8; ACT_ONE_LENGTH]), Error> {
        let ephemeral_public = ephemeral.public_key();
        self.state.mix_hash(ephemeral_public.as_ref());
        let es = ecdh(&ephemeral, &self.remote_static)?;
        self.state.mix_key(&es)?;
        let tag = self.state.encrypt_and_hash(&[])?;

        let mut act = [0u8; ACT_ONE_LENGTH];
        act[0] = VERSION;
        act[1..1 + PUBLIC_KEY_LENGTH].copy_from_slice(ephemeral_public.as_ref());
        act[1 + PUBLIC_KEY_LENGTH..].copy_from_slice(&tag);

        Ok((
            AwaitingActTwo {
                static_key: self.static_key,
                remote_static: self.remote_static,
                ephemeral,
                state: self.state,
            },
            act,
        ))
    }
}

/// The dialing side of a handshake, after Act One has been sent.
pub struct AwaitingActTwo {
    static_key: PrivateKey,
    remote_static: PublicKey,
    ephemeral: PrivateKey,
    state: SymmetricState,
}

impl AwaitingActTwo {
    /// Process Act Two (`e, ee`) and generate Act Three (`s, se`).
    ///
    /// On success, the handshake is complete and the returned [Session] holds the transport
    /// ciphers. Act Three must still be delivered to the responder.
    pub fn act_three(
        mut self,
        act_two: &[u8; ACT_TWO_LENGTH],
    ) -> Result<([u8; ACT_THREE_LENGTH], Session), Error> {
        // Process Act Two
        if act_two[0] != VERSION {
            return Err(Error::InvalidVersion(act_two[0]));
        }
        let remote_ephemeral = PublicKey::try_from(&act_two[1..1 + PUBLIC_KEY_LENGTH])?;
        self.state.mix_hash(remote_ephemeral.as_ref());
        let ee = ecdh(&self.ephemeral, &remote_ephemeral)?;
        self.state.mix_key(&ee)?;
        self.state.decrypt_and_hash(&act_two[1 + PUBLIC_KEY_LENGTH..])?;

        // Generate Act Three
        let encrypted_static = self
            .state
            .encrypt_and_hash(self.static_key.public_key().as_ref())?;
        let se = ecdh(&self.static_key, &remote_ephemeral)?;
        self.state.mix_key(&se)?;
        let tag = self.state.encrypt_and_hash(&[])?;

        let mut act = [0u8; ACT_THREE_LENGTH];
        act[0] = VERSION;
        act[1..1 + PUBLIC_KEY_LENGTH + TAG_LENGTH].copy_from_slice(&encrypted_static);
        act[1 + PUBLIC_KEY_LENGTH + TAG_LENGTH..].copy_from_slice(&tag);

        // The initiator sends with the first key
        let (send, recv) = self.state.split()?;
        Ok((
            act,
            Session {
                remote_static: self.remote_static,
                send,
                recv,
            },
        ))
    }
}
