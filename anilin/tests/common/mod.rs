#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::{Class, Message, Question, Rdata, RecordType};
use anilin::{Context, Handler, MessageWriter, Query, Server};
use async_trait::async_trait;
use tokio::net::{TcpListener, UdpSocket};

/// Serves `handler` on the same ephemeral port over both TCP and UDP and
/// returns the bound address.
pub async fn spawn_server(handler: Arc<dyn Handler>) -> SocketAddr {
    let (ln, socket) = bind_pair().await;
    let addr = ln.local_addr().unwrap();

    let server = Server::new(addr, handler);
    let stream_server = server.clone();
    tokio::spawn(async move {
        let _ = stream_server.serve(ln).await;
    });
    tokio::spawn(async move {
        let _ = server.serve_packet(socket).await;
    });

    addr
}

/// Binds a TCP listener and a UDP socket to the same ephemeral port,
/// retrying until a port is free on both.
pub async fn bind_pair() -> (TcpListener, UdpSocket) {
    loop {
        let ln = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = ln.local_addr().unwrap();

        match UdpSocket::bind(addr).await {
            Ok(socket) => return (ln, socket),
            Err(_) => continue,
        }
    }
}

/// A single-question A query for `qname`.
pub fn a_query(id: u16, qname: &str) -> Message {
    Message {
        id,
        recursion_desired: true,
        questions: vec![Question {
            qname: qname.to_string(),
            qtype: RecordType::A,
            qclass: Class::IN,
        }],
        ..Default::default()
    }
}

/// A handler that answers every query with a fixed A record and counts how
/// often it ran.
pub struct CountingHandler {
    pub addr: [u8; 4],
    pub ttl: Duration,
    pub hits: AtomicUsize,
}

impl CountingHandler {
    pub fn new(addr: [u8; 4], ttl: Duration) -> Arc<Self> {
        Arc::new(Self {
            addr,
            ttl,
            hits: AtomicUsize::new(0),
        })
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Handler for CountingHandler {
    async fn serve_dns(&self, _cx: &Context, w: &mut MessageWriter, query: &Query) {
        self.hits.fetch_add(1, Ordering::SeqCst);

        for q in &query.message.questions {
            w.answer(
                q.qname.clone(),
                self.ttl,
                Rdata::A(A {
                    addr: self.addr.into(),
                }),
            );
        }
    }
}
