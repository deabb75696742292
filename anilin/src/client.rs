//! The DNS client.

use std::sync::atomic::AtomicU32;
use std::sync::Arc;

use anilin_proto::Message;

use crate::error::Error;
use crate::handler::Handler;
use crate::session::Session;
use crate::transport::Transport;
use crate::writer::{MessageWriter, Recursor};
use crate::{Context, NetAddr, Query};

/// A DNS client.
///
/// The zero-configuration client ([`Client::new`]) dials the queried address
/// directly over its default transport. A [`resolver`][Client::with_resolver]
/// intercepts queries locally: the handler runs before any network I/O and
/// decides per query whether to answer inline or to
/// [`recur`][MessageWriter::recur] upstream.
#[derive(Clone, Default)]
pub struct Client {
    transport: Arc<Transport>,
    resolver: Option<Arc<dyn Handler>>,
    next_id: Arc<AtomicU32>,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the transport managing connections to DNS servers.
    pub fn with_transport(mut self, transport: Transport) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Installs a handler that intercepts queries before any network I/O.
    pub fn with_resolver(mut self, resolver: Arc<dyn Handler>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sends a DNS query and returns the response message.
    ///
    /// The outbound message carries the client's next 16-bit ID (wrapping);
    /// the caller's own ID is restored on the response.
    pub async fn exchange(&self, cx: &Context, query: &Query) -> Result<Message, Error> {
        if let Some(resolver) = &self.resolver {
            let mut w = MessageWriter::client(&query.message, self.recursor(query.remote_addr));
            resolver.serve_dns(cx, &mut w, query).await;

            let mut res = w.into_message();
            res.id = query.message.id;
            return Ok(res);
        }

        self.recursor(query.remote_addr)
            .exchange(cx, &query.message)
            .await
    }

    /// Dials an address and returns a [`Session`] for callers that want to
    /// multiplex many queries over one connection.
    pub async fn dial(&self, cx: &Context, addr: NetAddr) -> Result<Session, Error> {
        let conn = self.transport.dial_addr(cx, addr).await?;
        Ok(Session::new(conn, self.next_id.clone()))
    }

    fn recursor(&self, addr: NetAddr) -> Recursor {
        Recursor::new(self.transport.clone(), addr, self.next_id.clone())
    }
}
