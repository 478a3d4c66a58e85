//! Static and ephemeral secp256k1 keys.
//!
//! Public keys are always handled in compressed form (SEC 1, Version 2.0, Section 2.3.3). Every
//! public key read from the wire is validated to be a point on the curve before it is used in a
//! Diffie-Hellman exchange.

use crate::{utils::hex, Error};
use k256::{elliptic_curve::sec1::ToEncodedPoint, ProjectivePoint, SecretKey};
use rand::{rngs::StdRng, CryptoRng, Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

const PRIVATE_KEY_LENGTH: usize = 32;

/// Length of a compressed public key (Y-Parity || X).
pub const PUBLIC_KEY_LENGTH: usize = 33;

/// Length of the output of [ecdh].
pub(crate) const SHARED_SECRET_LENGTH: usize = 32;

/// A secp256k1 private key.
///
/// The underlying scalar is zeroized when the key is dropped.
#[derive(Clone)]
pub struct PrivateKey {
    key: SecretKey,
}

impl PrivateKey {
    /// Generate a new private key from the provided source of randomness.
    pub fn from_rng<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        Self {
            key: SecretKey::random(rng),
        }
    }

    /// Deterministically derive a private key from a seed.
    ///
    /// This is useful for tests and demos. Never use it to create keys that protect real traffic.
    pub fn from_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::from_rng(&mut rng)
    }

    /// Returns the public key associated with this private key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from(self.key.public_key())
    }

    /// Returns the big-endian encoding of the private scalar.
    pub fn to_bytes(&self) -> [u8; PRIVATE_KEY_LENGTH] {
        self.key.to_bytes().into()
    }
}

impl TryFrom<&[u8]> for PrivateKey {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        if value.len() != PRIVATE_KEY_LENGTH {
            return Err(Error::InvalidPrivateKey);
        }
        let key = SecretKey::from_slice(value).map_err(|_| Error::InvalidPrivateKey)?;
        Ok(Self { key })
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}

/// A validated secp256k1 public key.
#[derive(Clone, Copy)]
pub struct PublicKey {
    raw: [u8; PUBLIC_KEY_LENGTH],
    key: k256::PublicKey,
}

impl PublicKey {
    /// Returns the compressed encoding of the public key.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.raw
    }
}

impl From<k256::PublicKey> for PublicKey {
    fn from(key: k256::PublicKey) -> Self {
        let mut raw = [0u8; PUBLIC_KEY_LENGTH];
        raw.copy_from_slice(key.to_encoded_point(true).as_bytes());
        Self { raw, key }
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        // Only accept compressed points (rejects the identity, uncompressed and compact encodings)
        if value.len() != PUBLIC_KEY_LENGTH || !matches!(value[0], 0x02 | 0x03) {
            return Err(Error::InvalidPublicKey);
        }
        let key = k256::PublicKey::from_sec1_bytes(value).map_err(|_| Error::InvalidPublicKey)?;
        Ok(Self::from(key))
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.raw
    }
}

impl PartialEq for PublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for PublicKey {}

impl Hash for PublicKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.raw.cmp(&other.raw)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex(&self.raw))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex(&self.raw))
    }
}

/// Perform a Diffie-Hellman exchange, returning the SHA-256 digest of the compressed shared point.
pub(crate) fn ecdh(
    private: &PrivateKey,
    public: &PublicKey,
) -> Result<[u8; SHARED_SECRET_LENGTH], Error> {
    let scalar = private.key.to_nonzero_scalar();
    let point = ProjectivePoint::from(public.key) * *scalar.as_ref();

    // A valid point multiplied by a non-zero scalar is never the identity on a prime-order curve,
    // but the conversion is fallible so we surface it rather than assume it.
    let shared =
        k256::PublicKey::from_affine(point.to_affine()).map_err(|_| Error::InvalidPublicKey)?;
    let mut hasher = Sha256::new();
    hasher.update(shared.to_encoded_point(true).as_bytes());
    Ok(hasher.finalize().into())
}
