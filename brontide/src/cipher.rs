use crate::{nonce, Error};
use chacha20poly1305::{
    aead::{Aead, Payload},
    ChaCha20Poly1305, Key, KeyInit, KeySizeUser,
};
use hkdf::{hmac::digest::typenum::Unsigned, Hkdf};
use sha2::Sha256;
use std::fmt;
use tracing::trace;
use zeroize::Zeroize;

/// The size of the key used by the ChaCha20Poly1305 cipher.
pub(crate) const KEY_LENGTH: usize = <ChaCha20Poly1305 as KeySizeUser>::KeySize::USIZE;

/// Number of AEAD operations performed under a key before it is rotated.
pub const REKEY_INTERVAL: u64 = 1000;

/// HKDF-SHA256 with an empty info, expanded to two keys.
///
/// Used to mix key material into the chaining key during the handshake, to split the final
/// chaining key into directional keys and to rotate transport keys.
pub(crate) fn hkdf(
    salt: &[u8; KEY_LENGTH],
    ikm: &[u8],
) -> Result<([u8; KEY_LENGTH], [u8; KEY_LENGTH]), Error> {
    let prk = Hkdf::<Sha256>::new(Some(salt.as_ref()), ikm);
    let mut okm = [0u8; 2 * KEY_LENGTH];
    prk.expand(&[], &mut okm).map_err(|_| Error::HkdfExpansion)?;

    let mut first = [0u8; KEY_LENGTH];
    let mut second = [0u8; KEY_LENGTH];
    first.copy_from_slice(&okm[..KEY_LENGTH]);
    second.copy_from_slice(&okm[KEY_LENGTH..]);
    okm.zeroize();
    Ok((first, second))
}

/// Seal `plaintext` under `key`, authenticating `ad`.
pub(crate) fn encrypt_with_ad(
    key: &[u8; KEY_LENGTH],
    nonce: &mut nonce::Info,
    ad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .encrypt(&nonce.next(), Payload { msg: plaintext, aad: ad })
        .map_err(|_| Error::EncryptionFailed)
}

/// Open `ciphertext` under `key`, verifying `ad`.
pub(crate) fn decrypt_with_ad(
    key: &[u8; KEY_LENGTH],
    nonce: &mut nonce::Info,
    ad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, Error> {
    let cipher = ChaCha20Poly1305::new(Key::from_slice(key));
    cipher
        .decrypt(&nonce.next(), Payload { msg: ciphertext, aad: ad })
        .map_err(|_| Error::DecryptionFailed)
}

/// A key rotation performed by a [CipherState].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Rotation {
    /// Generation of the key that was retired.
    pub from: u64,
    /// Generation of the key now in use.
    pub to: u64,
}

/// One direction of an established connection.
///
/// Holds a ChaCha20-Poly1305 key, the nonce counter used with it, and the chaining key used as
/// salt when the key is rotated. After [REKEY_INTERVAL] operations the key is replaced with
/// `HKDF(chaining_key, key)` and the nonce is reset to zero.
pub struct CipherState {
    key: [u8; KEY_LENGTH],
    chaining_key: [u8; KEY_LENGTH],
    cipher: ChaCha20Poly1305,
    nonce: nonce::Info,
    generation: u64,
}

impl CipherState {
    /// Create a new [CipherState] from a key and the chaining key it was split from.
    pub fn new(key: [u8; KEY_LENGTH], chaining_key: [u8; KEY_LENGTH]) -> Self {
        Self {
            cipher: ChaCha20Poly1305::new(Key::from_slice(&key)),
            key,
            chaining_key,
            nonce: nonce::Info::default(),
            generation: 0,
        }
    }

    /// Encrypt and authenticate `plaintext`.
    ///
    /// If this was the last operation allowed under the current key, the key is rotated before
    /// returning.
    pub fn seal(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let nonce = self.nonce.next();
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| Error::EncryptionFailed)?;
        self.maybe_rotate()?;
        Ok(ciphertext)
    }

    /// Verify and decrypt `ciphertext`.
    ///
    /// The nonce is consumed (and the key possibly rotated) even if verification fails. A failed
    /// open means both sides are no longer in lockstep, so the caller must stop using this state.
    pub fn open(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, Error> {
        let nonce = self.nonce.next();
        let plaintext = self
            .cipher
            .decrypt(&nonce, ciphertext)
            .map_err(|_| Error::DecryptionFailed);
        self.maybe_rotate()?;
        plaintext
    }

    /// Replace the current key with `HKDF(chaining_key, key)` and reset the nonce.
    pub fn rotate(&mut self) -> Result<Rotation, Error> {
        let (chaining_key, key) = hkdf(&self.chaining_key, &self.key)?;
        self.chaining_key.zeroize();
        self.key.zeroize();
        self.chaining_key = chaining_key;
        self.key = key;
        self.cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        self.nonce.reset();

        let rotation = Rotation {
            from: self.generation,
            to: self.generation + 1,
        };
        self.generation = rotation.to;
        trace!(from = rotation.from, to = rotation.to, "rotated key");
        Ok(rotation)
    }

    /// Number of operations performed under the current key.
    pub fn nonce(&self) -> u64 {
        self.nonce.value()
    }

    /// Number of rotations performed since the handshake.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn maybe_rotate(&mut self) -> Result<(), Error> {
        if self.nonce.value() == REKEY_INTERVAL {
            self.rotate()?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn key(&self) -> [u8; KEY_LENGTH] {
        self.key
    }
}

impl Drop for CipherState {
    fn drop(&mut self) {
        self.key.zeroize();
        self.chaining_key.zeroize();
    }
}

impl fmt::Debug for CipherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherState")
            .field("nonce", &self.nonce.value())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
