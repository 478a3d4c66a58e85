use crate::{
    network::{self, Network, SinkOf, StreamOf},
    Config, Connection, Error, PublicKey,
};
use futures::{
    future::{select, BoxFuture, Either},
    stream::{FuturesUnordered, StreamExt as _},
    FutureExt as _,
};
use rand::{rngs::StdRng, CryptoRng, Rng, SeedableRng as _};
use std::{net::SocketAddr, pin::pin};
use tracing::debug;

/// Default maximum number of handshakes a [Listener] drives at once.
pub const DEFAULT_MAX_HANDSHAKES: usize = 128;

type Handshake<N> =
    BoxFuture<'static, (SocketAddr, Result<Connection<SinkOf<N>, StreamOf<N>>, Error>)>;

/// Accepts connections and authenticates the dialers as the responder of the handshake.
///
/// Handshakes run concurrently: a dialer that stalls (or fails) its handshake does not delay
/// the dialers accepted after it.
pub struct Listener<N: Network> {
    listener: N::Listener,
    config: Config,
    max_handshakes: usize,
    handshakes: FuturesUnordered<Handshake<N>>,
}

impl<N: Network> Listener<N> {
    /// Bind to `address`, answering handshakes with `config.static_key`.
    pub async fn bind(network: &N, address: SocketAddr, config: Config) -> Result<Self, Error> {
        let listener = network.bind(address).await?;
        Ok(Self {
            listener,
            config,
            max_handshakes: DEFAULT_MAX_HANDSHAKES,
            handshakes: FuturesUnordered::new(),
        })
    }

    /// Limit the number of handshakes in flight. Connections accepted while the limit is
    /// reached are dropped.
    pub fn with_max_handshakes(mut self, max_handshakes: usize) -> Self {
        self.max_handshakes = max_handshakes;
        self
    }

    /// Returns the local address of the listener.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        network::Listener::local_addr(&self.listener)
    }

    /// Returns the static public key dialers must know to connect.
    pub fn public_key(&self) -> PublicKey {
        self.config.static_key.public_key()
    }

    /// Returns the next connection that completed its handshake.
    ///
    /// Raw connections are accepted and their handshakes driven (each bounded by
    /// `config.handshake_timeout`) while this is awaited. Failed handshakes are logged and the
    /// raw connection dropped. Only a failure of the underlying listener is returned as an error.
    ///
    /// # Cancellation
    ///
    /// This method is cancel-safe. Handshakes in flight are kept and resumed by the next call.
    pub async fn accept<R: Rng + CryptoRng>(
        &mut self,
        rng: &mut R,
    ) -> Result<(SocketAddr, Connection<SinkOf<N>, StreamOf<N>>), Error> {
        loop {
            // Wait for a new raw connection or a finished handshake
            let event = if self.handshakes.is_empty() {
                Either::Left(network::Listener::accept(&mut self.listener).await)
            } else {
                let accept = pin!(network::Listener::accept(&mut self.listener));
                let selected = select(accept, self.handshakes.next()).await;
                match selected {
                    Either::Left((accepted, _)) => Either::Left(accepted),
                    Either::Right((finished, _)) => Either::Right(finished),
                }
            };

            match event {
                Either::Left(accepted) => {
                    let (address, sink, stream) = accepted?;
                    if self.handshakes.len() >= self.max_handshakes {
                        debug!(%address, "maximum concurrent handshakes reached");
                        continue;
                    }

                    // Each handshake draws its ephemeral key from its own generator
                    let mut handshake_rng = StdRng::from_seed(rng.gen());
                    let config = self.config.clone();
                    self.handshakes.push(
                        async move {
                            let result = Connection::upgrade_listener(
                                &mut handshake_rng,
                                config,
                                sink,
                                stream,
                            )
                            .await;
                            (address, result)
                        }
                        .boxed(),
                    );
                }
                Either::Right(Some((address, Ok(connection)))) => {
                    return Ok((address, connection));
                }
                Either::Right(Some((address, Err(err)))) => {
                    debug!(?err, %address, "failed to upgrade connection");
                }
                Either::Right(None) => {}
            }
        }
    }
}
