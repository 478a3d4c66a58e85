use crate::{
    network::Stream, CipherState, Error, ENCRYPTED_HEADER_LENGTH, LENGTH_PREFIX_LENGTH, TAG_LENGTH,
};
use bytes::Bytes;

/// Reassembles and decrypts frames from a [Stream].
///
/// All progress is recorded in the struct itself: the bytes of a partially received header or
/// payload, the length of a frame whose header was already opened, and the decrypted bytes not
/// yet handed to the caller. Dropping a pending `read` or `recv` future and calling again
/// resumes where the previous call left off.
pub(crate) struct Reader<St: Stream> {
    stream: St,
    cipher: CipherState,

    header: [u8; ENCRYPTED_HEADER_LENGTH],
    body: Vec<u8>,
    filled: usize,
    pending: Option<usize>,

    residual: Bytes,
    terminated: bool,
}

impl<St: Stream> Reader<St> {
    pub fn new(stream: St, cipher: CipherState) -> Self {
        Self {
            stream,
            cipher,
            header: [0u8; ENCRYPTED_HEADER_LENGTH],
            body: Vec::new(),
            filled: 0,
            pending: None,
            residual: Bytes::new(),
            terminated: false,
        }
    }

    /// Read up to `buf.len()` bytes of plaintext.
    ///
    /// Returns `Ok(0)` once the peer has closed the stream on a frame boundary.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        while self.residual.is_empty() {
            match self.next_frame().await? {
                Some(frame) => self.residual = frame,
                None => return Ok(0),
            }
        }
        let n = buf.len().min(self.residual.len());
        buf[..n].copy_from_slice(&self.residual.split_to(n));
        Ok(n)
    }

    /// Receive the buffered plaintext if there is any, otherwise the next frame.
    pub async fn recv(&mut self) -> Result<Bytes, Error> {
        if !self.residual.is_empty() {
            return Ok(std::mem::take(&mut self.residual));
        }
        self.next_frame().await?.ok_or(Error::StreamClosed)
    }

    pub fn cipher(&self) -> &CipherState {
        &self.cipher
    }

    /// Read and open the next frame, or return `None` if the stream ended cleanly.
    async fn next_frame(&mut self) -> Result<Option<Bytes>, Error> {
        if self.terminated {
            return Err(Error::Terminated);
        }
        let result = self.read_frame().await;
        if result.is_err() {
            self.terminated = true;
        }
        result
    }

    async fn read_frame(&mut self) -> Result<Option<Bytes>, Error> {
        // Read and open the length (unless already done by a cancelled call)
        let length = match self.pending {
            Some(length) => length,
            None => {
                while self.filled < ENCRYPTED_HEADER_LENGTH {
                    let n = self.stream.recv(&mut self.header[self.filled..]).await?;
                    if n == 0 {
                        if self.filled == 0 {
                            return Ok(None);
                        }
                        return Err(Error::MalformedFrame);
                    }
                    self.filled += n;
                }
                self.filled = 0;

                let prefix = self.cipher.open(&self.header)?;
                let prefix: [u8; LENGTH_PREFIX_LENGTH] = prefix
                    .as_slice()
                    .try_into()
                    .map_err(|_| Error::MalformedFrame)?;
                let length = u16::from_be_bytes(prefix) as usize;
                self.body.resize(length + TAG_LENGTH, 0);
                self.pending = Some(length);
                length
            }
        };

        // Read and open the payload
        let size = length + TAG_LENGTH;
        while self.filled < size {
            let n = self.stream.recv(&mut self.body[self.filled..size]).await?;
            if n == 0 {
                return Err(Error::MalformedFrame);
            }
            self.filled += n;
        }
        self.filled = 0;
        self.pending = None;

        let payload = self.cipher.open(&self.body[..size])?;
        Ok(Some(Bytes::from(payload)))
    }
}
