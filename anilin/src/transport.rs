//! Resolution of an abstract address to a live connection.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::{Arc, LazyLock};

use rustls::pki_types::ServerName;
use tokio::net::{TcpStream, UdpSocket};
use tokio_rustls::TlsConnector;
use tracing::debug;

use crate::addr::{Net, NetAddr};
use crate::conn::{Conn, PacketConn, StreamConn};
use crate::error::Error;
use crate::{within_deadline, Context};

/// Rewrites the address of the DNS server to dial. Nameserver selectors
/// (see [`NameServers`][crate::NameServers]) are proxy functions.
pub type ProxyFn = Arc<dyn Fn(&Context, NetAddr) -> Result<NetAddr, Error> + Send + Sync>;

static DEFAULT_TLS_CONFIG: LazyLock<Arc<rustls::ClientConfig>> = LazyLock::new(|| {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
});

/// Manages connections to DNS servers. A `Transport` may modify where
/// messages are sent (via [`proxy`][Transport::proxy]) but never modifies
/// messages.
#[derive(Clone, Default)]
pub struct Transport {
    /// TLS configuration for `-tls` targets. When absent, a configuration
    /// trusting the standard web roots is used.
    pub tls_config: Option<Arc<rustls::ClientConfig>>,

    /// The name presented for TLS server certificate verification. When
    /// absent, the host part of the dialed address is used.
    pub tls_server_name: Option<String>,

    /// Rewrites the address of the DNS server to dial.
    pub proxy: Option<ProxyFn>,
}

impl Transport {
    /// Dials an address and returns a connection ready for
    /// [`send`][Conn::send]/[`recv`][Conn::recv].
    ///
    /// The proxy function (if any) is consulted first; the resulting
    /// address's network picks the connection kind, with an `over_tls`
    /// marker driving a TLS client handshake after connecting.
    pub async fn dial_addr(&self, cx: &Context, addr: NetAddr) -> Result<Conn, Error> {
        let addr = match &self.proxy {
            Some(proxy) => proxy(cx, addr)?,
            None => addr,
        };

        within_deadline(cx, self.dial(addr)).await
    }

    async fn dial(&self, addr: NetAddr) -> Result<Conn, Error> {
        match (addr.net, addr.over_tls) {
            (Net::Udp, false) => {
                let socket = UdpSocket::bind(unspecified_for(addr.addr)).await?;
                socket.connect(addr.addr).await?;
                Ok(Conn::Packet(PacketConn::new(socket)))
            }
            (Net::Tcp, false) => {
                let stream = TcpStream::connect(addr.addr).await?;
                Ok(Conn::Stream(StreamConn::new(stream)))
            }
            (Net::Tcp, true) => {
                let stream = TcpStream::connect(addr.addr).await?;
                let stream = self.upgrade(addr.addr, stream).await?;
                Ok(Conn::Stream(StreamConn::new(stream)))
            }
            // there is no TLS upgrade for datagram sockets
            (Net::Udp, true) => Err(Error::UnsupportedNetwork),
        }
    }

    async fn upgrade(
        &self,
        addr: SocketAddr,
        stream: TcpStream,
    ) -> Result<tokio_rustls::client::TlsStream<TcpStream>, Error> {
        let config = self
            .tls_config
            .clone()
            .unwrap_or_else(|| DEFAULT_TLS_CONFIG.clone());

        let host = self
            .tls_server_name
            .clone()
            .unwrap_or_else(|| addr.ip().to_string());
        let server_name =
            ServerName::try_from(host).map_err(|err| Error::InvalidServerName(err.to_string()))?;

        let stream = TlsConnector::from(config)
            .connect(server_name, stream)
            .await?;
        debug!(addr = %addr, "tls session established");

        Ok(stream)
    }
}

fn unspecified_for(addr: SocketAddr) -> SocketAddr {
    let ip = if addr.is_ipv4() {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    } else {
        IpAddr::V6(Ipv6Addr::UNSPECIFIED)
    };
    SocketAddr::new(ip, 0)
}
