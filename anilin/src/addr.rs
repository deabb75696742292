//! Dial target addresses.

use std::fmt::{self, Display};
use std::net::SocketAddr;

/// The network class of a dial target.
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub enum Net {
    Udp,
    Tcp,
}

impl Net {
    fn as_str(self) -> &'static str {
        match self {
            Net::Udp => "udp",
            Net::Tcp => "tcp",
        }
    }
}

/// The address of a DNS server (or, in a server-side [`Query`][crate::Query],
/// of the querying client).
///
/// A `NetAddr` pairs a socket address with the network to dial it on. The
/// `over_tls` marker requests a TLS upgrade after connecting; the transport
/// strips it to find the underlying network.
///
/// # Examples
/// ```rust
/// use anilin::NetAddr;
///
/// let plain = NetAddr::tcp("9.9.9.9:53".parse().unwrap());
/// assert_eq!(plain.network(), "tcp");
///
/// let dot = NetAddr::tcp("9.9.9.9:853".parse().unwrap()).over_tls();
/// assert_eq!(dot.network(), "tcp-tls");
/// ```
#[derive(PartialEq, Eq, Copy, Clone, Hash, Debug)]
pub struct NetAddr {
    /// The network to dial.
    pub net: Net,
    /// The socket address to dial.
    pub addr: SocketAddr,
    /// Whether to upgrade the connection to TLS after dialing.
    pub over_tls: bool,
}

impl NetAddr {
    /// A datagram target.
    pub fn udp(addr: SocketAddr) -> Self {
        Self {
            net: Net::Udp,
            addr,
            over_tls: false,
        }
    }

    /// A stream target.
    pub fn tcp(addr: SocketAddr) -> Self {
        Self {
            net: Net::Tcp,
            addr,
            over_tls: false,
        }
    }

    /// Marks the target for a TLS upgrade after connecting (RFC 7858).
    pub fn over_tls(mut self) -> Self {
        self.over_tls = true;
        self
    }

    /// The network string of this target: `"udp"`, `"tcp"`, or the same with
    /// a `"-tls"` suffix when a TLS upgrade is requested.
    ///
    /// Nameserver selectors group their entries by this string.
    pub fn network(&self) -> String {
        if self.over_tls {
            format!("{}-tls", self.net.as_str())
        } else {
            self.net.as_str().to_string()
        }
    }
}

impl Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.addr)
    }
}
