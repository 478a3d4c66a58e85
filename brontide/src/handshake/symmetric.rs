use crate::{
    cipher::{decrypt_with_ad, encrypt_with_ad, hkdf, KEY_LENGTH},
    nonce, CipherState, Error,
};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// The state threaded through every step of the handshake: the chaining key, the hash of the
/// transcript so far, and the temporary key (and its nonce) derived by the latest [Self::mix_key].
pub(super) struct SymmetricState {
    chaining_key: [u8; KEY_LENGTH],
    handshake_hash: [u8; KEY_LENGTH],
    temp_key: [u8; KEY_LENGTH],
    nonce: nonce::Info,
}

impl SymmetricState {
    /// Initialize the state for `protocol_name`, mixing in the `prologue`.
    pub fn new(protocol_name: &[u8], prologue: &[u8]) -> Self {
        let handshake_hash: [u8; KEY_LENGTH] = Sha256::digest(protocol_name).into();
        let mut state = Self {
            chaining_key: handshake_hash,
            handshake_hash,
            temp_key: [0u8; KEY_LENGTH],
            nonce: nonce::Info::default(),
        };
        state.mix_hash(prologue);
        state
    }

    /// `h = SHA256(h || data)`
    pub fn mix_hash(&mut self, data: &[u8]) {
        let mut hasher = Sha256::new();
        hasher.update(self.handshake_hash);
        hasher.update(data);
        self.handshake_hash = hasher.finalize().into();
    }

    /// `(ck, temp_k) = HKDF(ck, input_key_material)`
    pub fn mix_key(&mut self, input_key_material: &[u8]) -> Result<(), Error> {
        let (chaining_key, temp_key) = hkdf(&self.chaining_key, input_key_material)?;
        self.chaining_key.zeroize();
        self.temp_key.zeroize();
        self.chaining_key = chaining_key;
        self.temp_key = temp_key;
        self.nonce.reset();
        Ok(())
    }

    /// Encrypt `plaintext` with the temporary key (using the transcript hash as associated data)
    /// and mix the ciphertext into the transcript.
    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let ciphertext = encrypt_with_ad(
            &self.temp_key,
            &mut self.nonce,
            &self.handshake_hash,
            plaintext,
        )?;
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    /// Decrypt `ciphertext` with the temporary key (using the transcript hash as associated data)
    /// and mix the ciphertext into the transcript.
    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let plaintext = decrypt_with_ad(
            &self.temp_key,
            &mut self.nonce,
            &self.handshake_hash,
            ciphertext,
        )
        .map_err(|_| Error::HandshakeAuthentication)?;
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// Derive the two transport ciphers. The first is used by the initiator to send.
    pub fn split(mut self) -> Result<(CipherState, CipherState), Error> {
        let (first, second) = hkdf(&self.chaining_key, &[])?;
        let chaining_key = self.chaining_key;
        self.chaining_key.zeroize();
        Ok((
            CipherState::new(first, chaining_key),
            CipherState::new(second, chaining_key),
        ))
    }
}

impl Drop for SymmetricState {
    fn drop(&mut self) {
        self.chaining_key.zeroize();
        self.temp_key.zeroize();
    }
}
