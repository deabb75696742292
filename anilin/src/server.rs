//! The DNS server: accept loops, per-request dispatch, and the reply
//! pipeline.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use anilin_proto::Message;
use tokio::io::AsyncReadExt;
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::Mutex;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, warn};

use crate::conn::BoxStream;
use crate::error::Error;
use crate::handler::Handler;
use crate::transport::Transport;
use crate::writer::{MessageWriter, Recursor};
use crate::{Context, NetAddr, Query, MAX_PACKET_LEN};

/// A DNS server.
///
/// The server listens for queries over UDP, TCP, and optionally TCP-over-TLS
/// and dispatches each to its [`Handler`] in a fresh task, so a slow handler
/// never blocks the accept loops or the other queries on a shared stream.
#[derive(Clone)]
pub struct Server {
    /// The address to bind.
    pub addr: SocketAddr,
    /// The handler queries are dispatched to.
    pub handler: Arc<dyn Handler>,
    /// TLS configuration, required by the TLS listeners.
    pub tls_config: Option<Arc<rustls::ServerConfig>>,
    /// The maximum size of an outbound UDP response; larger responses are
    /// truncated.
    pub max_packet_len: usize,

    forwarder: Option<Recursor>,
}

impl Server {
    pub fn new(addr: SocketAddr, handler: Arc<dyn Handler>) -> Self {
        Self {
            addr,
            handler,
            tls_config: None,
            max_packet_len: MAX_PACKET_LEN,
            forwarder: None,
        }
    }

    /// Sets the TLS configuration used by [`serve_tls`][Server::serve_tls]
    /// and [`listen_and_serve_tls`][Server::listen_and_serve_tls].
    pub fn with_tls_config(mut self, config: Arc<rustls::ServerConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    /// Names an upstream server that stream-connection handlers may
    /// [`recur`][MessageWriter::recur] to. Without a forwarder, recursion on
    /// server writers fails with [`Error::UnsupportedOp`].
    pub fn with_forwarder(mut self, transport: Transport, addr: NetAddr) -> Self {
        self.forwarder = Some(Recursor::new(
            Arc::new(transport),
            addr,
            Arc::new(AtomicU32::new(0)),
        ));
        self
    }

    /// Listens on both the TCP and UDP network address `self.addr` and
    /// serves queries on incoming connections. Returns only on a listener
    /// error.
    pub async fn listen_and_serve(&self) -> Result<(), Error> {
        let ln = TcpListener::bind(self.addr).await?;
        let conn = UdpSocket::bind(self.addr).await?;

        tokio::select! {
            result = self.serve(ln) => result,
            result = self.serve_packet(conn) => result,
        }
    }

    /// Listens on the TCP network address `self.addr` and serves queries on
    /// incoming TLS connections (RFC 7858).
    pub async fn listen_and_serve_tls(&self) -> Result<(), Error> {
        let ln = TcpListener::bind(self.addr).await?;
        self.serve_tls(ln).await
    }

    /// Accepts stream connections from `ln` and serves the queries read from
    /// each. Each connection gets its own task, and each query on a
    /// connection gets its own handler task; a shared write lock keeps the
    /// outbound frames of concurrent handlers from interleaving.
    pub async fn serve(&self, ln: TcpListener) -> Result<(), Error> {
        loop {
            let (stream, peer) = ln.accept().await?;

            let srv = self.clone();
            tokio::spawn(async move {
                srv.serve_stream(Box::new(stream), NetAddr::tcp(peer)).await;
            });
        }
    }

    /// Accepts TLS connections from `ln`, performing the server handshake
    /// before reading queries. Fails with [`Error::UnsupportedOp`] if the
    /// server has no TLS configuration.
    pub async fn serve_tls(&self, ln: TcpListener) -> Result<(), Error> {
        let config = self.tls_config.clone().ok_or(Error::UnsupportedOp)?;
        let acceptor = TlsAcceptor::from(config);

        loop {
            let (stream, peer) = ln.accept().await?;

            let acceptor = acceptor.clone();
            let srv = self.clone();
            tokio::spawn(async move {
                match acceptor.accept(stream).await {
                    Ok(stream) => {
                        srv.serve_stream(Box::new(stream), NetAddr::tcp(peer).over_tls())
                            .await
                    }
                    Err(err) => warn!(error = %err, "dns handshake"),
                }
            });
        }
    }

    /// Reads datagram queries from `conn` and serves each in a fresh task.
    ///
    /// Malformed packets are logged and skipped; a packet is also malformed
    /// when parsing leaves trailing bytes.
    pub async fn serve_packet(&self, conn: UdpSocket) -> Result<(), Error> {
        let conn = Arc::new(conn);
        let mut buf = vec![0; self.max_packet_len.max(MAX_PACKET_LEN)];

        loop {
            let (n, peer) = conn.recv_from(&mut buf).await?;

            let msg = match unpack_query(&buf[..n]) {
                Some(msg) => msg,
                None => continue,
            };

            let w = MessageWriter::packet(msg.clone(), conn.clone(), peer, self.max_packet_len);
            let query = Query {
                message: msg,
                remote_addr: NetAddr::udp(peer),
            };

            tokio::spawn(handle(self.handler.clone(), w, query));
        }
    }

    async fn serve_stream(&self, stream: BoxStream, peer: NetAddr) {
        let (mut rd, wr) = tokio::io::split(stream);
        let wr = Arc::new(Mutex::new(wr));

        loop {
            let mut lbuf = [0; 2];
            match rd.read_exact(&mut lbuf).await {
                Ok(_) => {}
                Err(err) => {
                    if err.kind() != std::io::ErrorKind::UnexpectedEof {
                        warn!(error = %err, "dns read");
                    }
                    return;
                }
            }

            let mut buf = vec![0; usize::from(u16::from_be_bytes(lbuf))];
            if let Err(err) = rd.read_exact(&mut buf).await {
                warn!(error = %err, "dns read");
                return;
            }

            let msg = match unpack_query(&buf) {
                Some(msg) => msg,
                None => continue,
            };

            let w = MessageWriter::stream(msg.clone(), wr.clone(), self.forwarder.clone());
            let query = Query {
                message: msg,
                remote_addr: peer,
            };

            tokio::spawn(handle(self.handler.clone(), w, query));
        }
    }
}

fn unpack_query(buf: &[u8]) -> Option<Message> {
    let (msg, rest) = match Message::unpack(buf) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(error = %err, "dns unpack");
            return None;
        }
    };
    if !rest.is_empty() {
        warn!("dns unpack: malformed packet, extra message bytes");
        return None;
    }

    Some(msg)
}

async fn handle(handler: Arc<dyn Handler>, mut w: MessageWriter, query: Query) {
    let cx = Context::new();

    handler.serve_dns(&cx, &mut w, &query).await;

    if !w.replied() {
        match w.reply(&cx).await {
            Ok(()) => {}
            // already sent, in truncated form; log for observability
            Err(Error::Truncated(_)) => debug!("dns reply: response truncated"),
            Err(err) => warn!(error = %err, "dns reply"),
        }
    }
}
