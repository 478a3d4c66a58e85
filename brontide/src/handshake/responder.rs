use super::{
    symmetric::SymmetricState, Session, ACT_ONE_LENGTH, ACT_THREE_LENGTH, ACT_TWO_LENGTH,
    PROLOGUE, PROTOCOL_NAME, VERSION,
};
use crate::{keys::ecdh, Error, PrivateKey, PublicKey, PUBLIC_KEY_LENGTH, TAG_LENGTH};

/// The listening side of a handshake, before Act One has been received.
pub struct Responder {
    static_key: PrivateKey,
    state: SymmetricState,
}

impl Responder {
    /// Prepare to answer a handshake addressed to `static_key`.
    pub fn new(static_key: PrivateKey) -> Self {
        let mut state = SymmetricState::new(PROTOCOL_NAME, PROLOGUE);
        state.mix_hash(static_key.public_key().as_ref());
        Self { static_key, state }
    }

    /// Process Act One (`e, es`).
    ///
    /// Fails with [Error::HandshakeAuthentication] if the initiator does not know our static key.
    pub fn recv_act_one(mut self, act_one: &[u8; ACT_ONE_LENGTH]) -> Result<ReceivedActOne, Error> {
        if act_one[0] != VERSION {
            return Err(Error::InvalidVersion(act_one[0]));
        }
        let remote_ephemeral = PublicKey::try_from(&act_one[1..1 + PUBLIC_KEY_LENGTH])?;
        self.state.mix_hash(remote_ephemeral.as_ref());
        let es = ecdh(&self.static_key, &remote_ephemeral)?;
        self.state.mix_key(&es)?;
        self.state.decrypt_and_hash(&act_one[1 + PUBLIC_KEY_LENGTH..])?;

        Ok(ReceivedActOne {
            remote_ephemeral,
            state: self.state,
        })
    }
}

/// The listening side of a handshake, after a valid Act One.
pub struct ReceivedActOne {
    remote_ephemeral: PublicKey,
    state: SymmetricState,
}

impl ReceivedActOne {
    /// Generate Act Two (`e, ee`) using the provided ephemeral key.
    pub fn act_two(
        mut self,
        ephemeral: PrivateKey,
    ) -> Result<(AwaitingActThree, [u8; ACT_TWO_LENGTH]), Error> {
        let ephemeral_public = ephemeral.public_key();
        self.state.mix_hash(ephemeral_public.as_ref());
        let ee = ecdh(&ephemeral, &self.remote_ephemeral)?;
        self.state.mix_key(&ee)?;
        let tag = self.state.encrypt_and_hash(&[])?;

        let mut act = [0u8; ACT_TWO_LENGTH];
        act[0] = VERSION;
        act[1..1 + PUBLIC_KEY_LENGTH].copy_from_slice(ephemeral_public.as_ref());
        act[1 + PUBLIC_KEY_LENGTH..].copy_from_slice(&tag);

        Ok((
            AwaitingActThree {
                ephemeral,
                state: self.state,
            },
            act,
        ))
    }
}

/// The listening side of a handshake, after Act Two has been sent.
pub struct AwaitingActThree {
    ephemeral: PrivateKey,
    state: SymmetricState,
}

impl AwaitingActThree {
    /// Process Act Three (`s, se`), learning and authenticating the initiator's static key.
    pub fn recv_act_three(mut self, act_three: &[u8; ACT_THREE_LENGTH]) -> Result<Session, Error> {
        if act_three[0] != VERSION {
            return Err(Error::InvalidVersion(act_three[0]));
        }
        let (encrypted_static, tag) = act_three[1..].split_at(PUBLIC_KEY_LENGTH + TAG_LENGTH);
        let remote_static = self.state.decrypt_and_hash(encrypted_static)?;
        let remote_static = PublicKey::try_from(remote_static.as_slice())?;
        let se = ecdh(&self.ephemeral, &remote_static)?;
        self.state.mix_key(&se)?;
        self.state.decrypt_and_hash(tag)?;

        // The responder receives with the first key
        let (recv, send) = self.state.split()?;
        Ok(Session {
            remote_static,
            send,
            recv,
        })
    }
}
