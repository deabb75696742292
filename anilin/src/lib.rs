//! `anilin` is a DNS library: a client capable of sending queries over UDP,
//! TCP, and TCP-over-TLS (RFC 7858), a server that dispatches queries to
//! user-supplied handlers, a TTL-expiring answer cache, and a static zone
//! handler answering from an in-memory table.
//!
//! The wire format lives in [`anilin_proto`], re-exported here as the
//! [`proto`] module along with its most common types.
//!
//! # Client example
//! ```rust,no_run
//! use anilin::{Client, Context, NetAddr, Query};
//! use anilin::proto::{Class, Message, Question, RecordType};
//!
//! # async fn run() -> Result<(), anilin::Error> {
//! let client = Client::new();
//!
//! let query = Query {
//!     message: Message {
//!         recursion_desired: true,
//!         questions: vec![Question {
//!             qname: "example.com.".to_string(),
//!             qtype: RecordType::A,
//!             qclass: Class::IN,
//!         }],
//!         ..Default::default()
//!     },
//!     remote_addr: NetAddr::udp("9.9.9.9:53".parse().unwrap()),
//! };
//!
//! let res = client.exchange(&Context::new(), &query).await?;
//! println!("{:?}", res.answers);
//! # Ok(())
//! # }
//! ```
//!
//! # Server example
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use anilin::proto::rdata::A;
//! use anilin::proto::Rdata;
//! use anilin::{HandlerFunc, Server};
//!
//! # async fn run() -> Result<(), anilin::Error> {
//! let handler = HandlerFunc(|_cx: &anilin::Context, w: &mut anilin::MessageWriter, _q: &anilin::Query| {
//!     w.authoritative(true);
//!     w.answer("test.local.", Duration::from_secs(60), Rdata::A(A { addr: [127, 0, 0, 1].into() }));
//! });
//!
//! let server = Server::new("0.0.0.0:53".parse().unwrap(), Arc::new(handler));
//! server.listen_and_serve().await
//! # }
//! ```

use std::future::Future;
use std::time::{Duration, Instant};

pub use anilin_proto as proto;

pub mod addr;
pub mod cache;
pub mod client;
pub mod conn;
pub mod error;
pub mod handler;
pub mod nameservers;
pub mod server;
pub mod session;
pub mod transport;
pub mod writer;
pub mod zone;

pub use addr::{Net, NetAddr};
pub use cache::Cache;
pub use client::Client;
pub use conn::{Conn, PacketConn, StreamConn};
pub use error::Error;
pub use handler::{Handler, HandlerFunc, Refuse};
pub use nameservers::NameServers;
pub use proto::{Message, Question, Rdata, Resource};
pub use server::Server;
pub use session::Session;
pub use transport::{ProxyFn, Transport};
pub use writer::MessageWriter;
pub use zone::{RRSet, Zone};

/// The default maximum size of a DNS-over-UDP message, in bytes (RFC 1035
/// Section 4.2.1).
pub const MAX_PACKET_LEN: usize = 512;

/// The well-known port for plain DNS.
pub const DOMAIN_PORT: u16 = 53;

/// The well-known port for DNS over TLS (RFC 7858).
pub const DOMAIN_TLS_PORT: u16 = 853;

/// A DNS query in flight.
///
/// On the client side `remote_addr` names the server to query; inside a
/// server handler it names the querying peer.
#[derive(Clone, Debug)]
pub struct Query {
    /// The query message.
    pub message: Message,
    /// The remote end of the exchange.
    pub remote_addr: NetAddr,
}

/// Deadline and routing hints carried across dials, exchanges, and handlers.
///
/// The `upstream` marker is read by the
/// [`NameServers::upstream`] selector to pick a
/// non-primary server for one exchange.
#[derive(Clone, Copy, Default, Debug)]
pub struct Context {
    /// When the operation should give up with [`Error::DeadlineExceeded`].
    pub deadline: Option<Instant>,
    /// Routes the exchange to a non-primary nameserver.
    pub upstream: bool,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..Self::default()
        }
    }

    /// Marks the context for upstream nameserver selection.
    pub fn upstream(mut self) -> Self {
        self.upstream = true;
        self
    }

    fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}

/// Runs `fut` to completion, bounded by the context deadline if one is set.
pub(crate) async fn within_deadline<T, F>(cx: &Context, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match cx.remaining() {
        Some(remaining) => tokio::time::timeout(remaining, fut)
            .await
            .map_err(|_| Error::DeadlineExceeded)?,
        None => fut.await,
    }
}
