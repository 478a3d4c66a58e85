use chacha20poly1305::Nonce;

/// A struct that holds the nonce information. Holds a counter value that is incremented each time
/// the nonce is used.
///
/// The counter never approaches overflow: the owning [crate::CipherState] rotates its key (and
/// calls [Info::reset]) long before that.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Info {
    counter: u64,
}

impl Info {
    /// Encodes the nonce information into a 12-byte array and increments the nonce by 1 (to prevent
    /// reuse).
    pub fn next(&mut self) -> Nonce {
        let result = self.encode();
        self.counter += 1;
        result
    }

    /// Returns the number of nonces used since the last reset.
    pub fn value(&self) -> u64 {
        self.counter
    }

    /// Resets the counter to zero. Only safe when the key it is used with has changed.
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Encodes the nonce information into a 12-byte array: 4 zero bytes followed by the
    /// little-endian counter.
    fn encode(&self) -> Nonce {
        let mut result = Nonce::default();
        result[4..].copy_from_slice(&self.counter.to_le_bytes());
        result
    }
}
