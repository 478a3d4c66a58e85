use crate::{
    network::{Network, SinkOf, StreamOf},
    Config, Connection, Error, PublicKey,
};
use rand::{CryptoRng, Rng};
use std::net::SocketAddr;

/// Connect to `address` and authenticate the peer holding the static key `peer`.
///
/// Dialing our own static key is rejected before any connection is opened.
pub async fn dial<N: Network, R: Rng + CryptoRng>(
    rng: &mut R,
    network: &N,
    config: Config,
    peer: PublicKey,
    address: SocketAddr,
) -> Result<Connection<SinkOf<N>, StreamOf<N>>, Error> {
    if peer == config.static_key.public_key() {
        return Err(Error::DialSelf);
    }
    let (sink, stream) = network.dial(address).await?;
    Connection::upgrade_dialer(rng, config, sink, stream, peer).await
}
