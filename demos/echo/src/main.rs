//! Echo messages over an encrypted and authenticated connection.
//!
//! A server accepts connections from any dialer, logs the static public key each dialer
//! authenticated with, and writes back every byte it reads. A client dials a server whose static
//! public key it derives from a seed, sends a number of random messages, and verifies that each
//! one is echoed back unchanged.
//!
//! # Usage
//!
//! ## Server
//!
//! ```sh
//! cargo run --release --bin commonware-brontide-echo -- --me 1@3000
//! ```
//!
//! ## Client
//!
//! ```sh
//! cargo run --release --bin commonware-brontide-echo -- --me 2@0 --peer 1@127.0.0.1:3000 --messages 1000
//! ```

use clap::{value_parser, Arg, Command};
use commonware_brontide::{
    dial,
    network::{tokio as tcp, SinkOf, StreamOf},
    Config, Connection, Listener, PrivateKey,
};
use rand::{rngs::OsRng, Rng, RngCore};
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Largest message sent by the client (spans several frames).
const MAX_MESSAGE_SIZE: usize = 100_000;

/// Size of the buffer the server reads into.
const READ_BUFFER_SIZE: usize = 16 * 1024;

type TokioConnection = Connection<SinkOf<tcp::Network>, StreamOf<tcp::Network>>;

fn parse_identity(value: &str) -> (u64, &str) {
    let parts = value.split('@').collect::<Vec<&str>>();
    if parts.len() != 2 {
        panic!("Identity not well-formed");
    }
    let seed = parts[0].parse::<u64>().expect("Seed not well-formed");
    (seed, parts[1])
}

async fn echo(mut connection: TokioConnection, address: SocketAddr) {
    let peer = connection.remote_static();
    let mut buf = vec![0u8; READ_BUFFER_SIZE];
    let mut total = 0usize;
    loop {
        let n = match connection.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                warn!(?err, %peer, %address, "read failed");
                return;
            }
        };
        if let Err(err) = connection.write(&buf[..n]).await {
            warn!(?err, %peer, %address, "write failed");
            return;
        }
        total += n;
    }
    let _ = connection.close().await;
    info!(%peer, %address, bytes = total, "connection closed");
}

async fn serve(network: tcp::Network, config: Config, port: u16) {
    let address = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
    let mut listener = Listener::bind(&network, address, config)
        .await
        .expect("Failed to bind listener");
    info!(%address, key = %listener.public_key(), "listening");

    let mut rng = OsRng;
    loop {
        match listener.accept(&mut rng).await {
            Ok((address, connection)) => {
                info!(peer = %connection.remote_static(), %address, "accepted connection");
                tokio::spawn(echo(connection, address));
            }
            Err(err) => warn!(?err, "failed to accept connection"),
        }
    }
}

async fn run_client(
    network: tcp::Network,
    config: Config,
    peer: u64,
    address: SocketAddr,
    messages: usize,
) {
    let peer = PrivateKey::from_seed(peer).public_key();
    let mut rng = OsRng;
    let mut connection = dial(&mut rng, &network, config, peer, address)
        .await
        .expect("Failed to dial peer");
    info!(%peer, %address, "connected");

    let start = Instant::now();
    let mut total = 0usize;
    for i in 0..messages {
        let mut msg = vec![0u8; rng.gen_range(1..=MAX_MESSAGE_SIZE)];
        rng.fill_bytes(&mut msg);
        connection.write(&msg).await.expect("Failed to send message");

        // The echo may arrive in any number of pieces
        let mut echoed = vec![0u8; msg.len()];
        let mut filled = 0;
        while filled < echoed.len() {
            let n = connection
                .read(&mut echoed[filled..])
                .await
                .expect("Failed to receive echo");
            if n == 0 {
                panic!("Server closed the connection");
            }
            filled += n;
        }
        assert_eq!(echoed, msg, "echo mismatch");
        total += msg.len();
        debug!(message = i, size = msg.len(), "echoed");
    }
    connection.close().await.expect("Failed to close connection");
    info!(
        messages,
        bytes = total,
        elapsed = ?start.elapsed(),
        "all messages echoed"
    );
}

#[tokio::main]
async fn main() {
    // Parse arguments
    let matches = Command::new("commonware-brontide-echo")
        .about("echo messages over an encrypted and authenticated connection")
        .arg(Arg::new("me").long("me").required(true))
        .arg(
            Arg::new("peer")
                .long("peer")
                .required(false)
                .help("Dial <seed>@<address> instead of listening"),
        )
        .arg(
            Arg::new("messages")
                .long("messages")
                .required(false)
                .default_value("100")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("handshake-timeout")
                .long("handshake-timeout")
                .required(false)
                .default_value("15")
                .value_parser(value_parser!(u64))
                .help("Seconds allowed for the handshake"),
        )
        .get_matches();

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Configure my identity
    let me = matches
        .get_one::<String>("me")
        .expect("Please provide identity");
    let (seed, port) = parse_identity(me);
    let key = PrivateKey::from_seed(seed);
    info!(key = %key.public_key(), "loaded static key");
    let port = port.parse::<u16>().expect("Port not well-formed");
    let handshake_timeout = *matches
        .get_one::<u64>("handshake-timeout")
        .expect("Please provide handshake timeout");
    let config = Config::new(key).with_handshake_timeout(Duration::from_secs(handshake_timeout));

    // Serve or dial
    let network = tcp::Network::default();
    match matches.get_one::<String>("peer") {
        None => serve(network, config, port).await,
        Some(peer) => {
            let (peer, address) = parse_identity(peer);
            let address = address
                .parse::<SocketAddr>()
                .expect("Peer address not well-formed");
            let messages = *matches
                .get_one::<usize>("messages")
                .expect("Please provide message count");
            run_client(network, config, peer, address, messages).await;
        }
    }
}
