//! The response builder handed to query handlers.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU32;
use std::sync::Arc;
use std::time::Duration;

use anilin_proto::{Class, Message, Question, RCode, Rdata, Resource};
use byteorder::{ByteOrder, NetworkEndian};
use tokio::io::{AsyncWriteExt, WriteHalf};
use tokio::net::UdpSocket;
use tokio::sync::Mutex;

use crate::conn::BoxStream;
use crate::error::Error;
use crate::session::Session;
use crate::transport::Transport;
use crate::{within_deadline, Context, NetAddr};

/// Builds and sends the response to one DNS query.
///
/// Handlers accumulate header bits and records through the mutators, and may
/// either finish explicitly with [`reply`][MessageWriter::reply] or simply
/// return and let the server send the accumulated state.
pub struct MessageWriter {
    req: Message,
    res: Message,
    replied: bool,
    sink: Sink,
    recursor: Option<Recursor>,
    max_packet_len: usize,
}

#[derive(Clone)]
enum Sink {
    /// One datagram back to the querying peer.
    Packet {
        socket: Arc<UdpSocket>,
        peer: SocketAddr,
    },
    /// A length-prefixed frame on a shared stream; the mutex serializes
    /// whole frames across the connection's concurrent handlers.
    Stream {
        wr: Arc<Mutex<WriteHalf<BoxStream>>>,
    },
    /// No transport: the response is handed back to the local caller
    /// (client-side resolver interception).
    Client,
}

impl MessageWriter {
    pub(crate) fn packet(
        req: Message,
        socket: Arc<UdpSocket>,
        peer: SocketAddr,
        max_packet_len: usize,
    ) -> Self {
        let res = response(&req);
        Self {
            req,
            res,
            replied: false,
            sink: Sink::Packet { socket, peer },
            recursor: None,
            max_packet_len,
        }
    }

    pub(crate) fn stream(
        req: Message,
        wr: Arc<Mutex<WriteHalf<BoxStream>>>,
        recursor: Option<Recursor>,
    ) -> Self {
        let res = response(&req);
        Self {
            req,
            res,
            replied: false,
            sink: Sink::Stream { wr },
            recursor,
            max_packet_len: usize::from(u16::MAX),
        }
    }

    pub(crate) fn client(req: &Message, recursor: Recursor) -> Self {
        Self {
            req: req.clone(),
            res: response(req),
            replied: false,
            sink: Sink::Client,
            recursor: Some(recursor),
            max_packet_len: usize::from(u16::MAX),
        }
    }

    /// Sets the Authoritative Answer (AA) bit of the response header.
    pub fn authoritative(&mut self, aa: bool) {
        self.res.authoritative = aa;
    }

    /// Sets the Recursion Available (RA) bit of the response header.
    pub fn recursion(&mut self, ra: bool) {
        self.res.recursion_available = ra;
    }

    /// Sets the response code of the response header.
    pub fn status(&mut self, rcode: RCode) {
        self.res.rcode = rcode;
    }

    /// Adds a record to the answers section.
    pub fn answer(&mut self, fqdn: impl Into<String>, ttl: Duration, rdata: Rdata) {
        self.res.answers.push(rr(fqdn.into(), ttl, rdata));
    }

    /// Adds a record to the authority section.
    pub fn authority(&mut self, fqdn: impl Into<String>, ttl: Duration, rdata: Rdata) {
        self.res.authorities.push(rr(fqdn.into(), ttl, rdata));
    }

    /// Adds a record to the additional section.
    pub fn additional(&mut self, fqdn: impl Into<String>, ttl: Duration, rdata: Rdata) {
        self.res.additionals.push(rr(fqdn.into(), ttl, rdata));
    }

    /// Forwards the still-unanswered questions upstream and splices the
    /// response into the reply under construction.
    ///
    /// Client-side writers recurse through the client's own transport;
    /// server-side stream writers through the server's configured forwarder.
    /// Writers without an upstream transport (packet writers always, stream
    /// writers on a server with no forwarder) fail with
    /// [`Error::UnsupportedOp`].
    pub async fn recur(&mut self, cx: &Context) -> Result<Message, Error> {
        let recursor = self.recursor.clone().ok_or(Error::UnsupportedOp)?;

        let questions: Vec<Question> = self
            .req
            .questions
            .iter()
            .filter(|q| !answered(&self.res, q))
            .cloned()
            .collect();

        let query = Message {
            opcode: self.req.opcode,
            recursion_desired: self.req.recursion_desired,
            questions,
            ..Default::default()
        };

        let msg = recursor.exchange(cx, &query).await?;

        for resource in &msg.answers {
            self.answer(resource.name.clone(), resource.ttl, resource.rdata.clone());
        }
        for resource in &msg.authorities {
            self.authority(resource.name.clone(), resource.ttl, resource.rdata.clone());
        }
        for resource in &msg.additionals {
            self.additional(resource.name.clone(), resource.ttl, resource.rdata.clone());
        }
        if msg.rcode != RCode::NoError {
            self.res.rcode = msg.rcode;
        }

        Ok(msg)
    }

    /// Finalizes and sends the response.
    ///
    /// Called automatically after the handler returns if the handler did not
    /// call it; calling it a second time fails with
    /// [`Error::AlreadyReplied`].
    ///
    /// On a packet sink, a response that does not fit the maximum packet
    /// length is re-sent in truncated form: the truncation bit is set and
    /// trailing records are discarded until the message fits. The records
    /// that fit still reach the client; [`Error::Truncated`] reports the
    /// event to the server.
    pub async fn reply(&mut self, _cx: &Context) -> Result<(), Error> {
        if self.replied {
            return Err(Error::AlreadyReplied);
        }
        self.replied = true;

        match self.sink.clone() {
            Sink::Client => Ok(()),
            Sink::Stream { wr } => {
                let mut buf = self.res.pack(vec![0; 2], true)?;
                let len = buf.len() - 2;
                if len > usize::from(u16::MAX) {
                    return Err(Error::OversizedMessage);
                }
                NetworkEndian::write_u16(&mut buf[..2], len as u16);

                let mut wr = wr.lock().await;
                wr.write_all(&buf).await?;
                wr.flush().await?;
                Ok(())
            }
            Sink::Packet { socket, peer } => {
                let buf = self.res.pack(Vec::new(), true)?;
                if buf.len() > self.max_packet_len {
                    return self.truncate(&socket, peer).await;
                }

                socket.send_to(&buf, peer).await?;
                Ok(())
            }
        }
    }

    async fn truncate(&mut self, socket: &UdpSocket, peer: SocketAddr) -> Result<(), Error> {
        self.res.truncated = true;

        let mut buf = self.res.pack(Vec::new(), true)?;
        while buf.len() > self.max_packet_len {
            if self.res.additionals.pop().is_none()
                && self.res.authorities.pop().is_none()
                && self.res.answers.pop().is_none()
            {
                break;
            }
            buf = self.res.pack(Vec::new(), true)?;
        }

        socket.send_to(&buf, peer).await?;
        Err(Error::Truncated(Box::new(self.res.clone())))
    }

    pub(crate) fn replied(&self) -> bool {
        self.replied
    }

    pub(crate) fn into_message(self) -> Message {
        self.res
    }
}

fn rr(fqdn: String, ttl: Duration, rdata: Rdata) -> Resource {
    Resource {
        name: fqdn,
        class: Class::IN,
        ttl,
        rdata,
    }
}

fn answered(res: &Message, q: &Question) -> bool {
    res.answers.iter().any(|resource| resource.name == q.qname)
}

/// The response skeleton for a query: a copy with the response bit set.
pub(crate) fn response(req: &Message) -> Message {
    let mut res = req.clone();
    res.response = true;
    res
}

/// Performs upstream exchanges for [`MessageWriter::recur`]: a dial target
/// plus the transport and ID counter to reach it with.
#[derive(Clone)]
pub(crate) struct Recursor {
    transport: Arc<Transport>,
    addr: NetAddr,
    next_id: Arc<AtomicU32>,
}

impl Recursor {
    pub(crate) fn new(transport: Arc<Transport>, addr: NetAddr, next_id: Arc<AtomicU32>) -> Self {
        Self {
            transport,
            addr,
            next_id,
        }
    }

    pub(crate) async fn exchange(&self, cx: &Context, query: &Message) -> Result<Message, Error> {
        let conn = self.transport.dial_addr(cx, self.addr).await?;
        let session = Session::new(conn, self.next_id.clone());
        within_deadline(cx, session.send(query)).await
    }
}
