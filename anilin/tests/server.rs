mod common;

use std::sync::Arc;
use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::{Class, RCode, Rdata, Resource};
use anilin::{Client, Context, Error, HandlerFunc, MessageWriter, NetAddr, Query};

#[tokio::test]
async fn serves_udp_and_tcp() {
    let handler = HandlerFunc(|_cx: &Context, w: &mut MessageWriter, _q: &Query| {
        w.answer(
            "test.local.",
            Duration::from_secs(60),
            Rdata::A(A {
                addr: [127, 0, 0, 1].into(),
            }),
        );
    });
    let addr = common::spawn_server(Arc::new(handler)).await;

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));

    let query = Query {
        message: common::a_query(0x1234, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let res_udp = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(res_udp.id, 0x1234);
    assert!(res_udp.response);
    assert!(res_udp.recursion_desired);
    assert_eq!(res_udp.questions, query.message.questions);
    assert_eq!(
        res_udp.answers,
        vec![Resource {
            name: "test.local.".to_string(),
            class: Class::IN,
            ttl: Duration::from_secs(60),
            rdata: Rdata::A(A {
                addr: [127, 0, 0, 1].into(),
            }),
        }]
    );

    let query = Query {
        remote_addr: NetAddr::tcp(addr),
        ..query
    };
    let res_tcp = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(res_udp, res_tcp);
}

#[tokio::test]
async fn truncates_oversized_udp_responses() {
    let handler = HandlerFunc(|_cx: &Context, w: &mut MessageWriter, q: &Query| {
        let qname = q.message.questions[0].qname.clone();
        for i in 0u16..120 {
            w.answer(
                qname.clone(),
                Duration::from_secs(60),
                Rdata::A(A {
                    addr: [10, 0, (i >> 8) as u8, i as u8].into(),
                }),
            );
        }
    });
    let addr = common::spawn_server(Arc::new(handler)).await;

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(7, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let err = client.exchange(&cx, &query).await.unwrap_err();
    let Error::Truncated(partial) = err else {
        panic!("want truncated message error, got {err:?}");
    };

    assert!(partial.truncated);
    assert_eq!(partial.id, 7);
    assert!(!partial.answers.is_empty());
    assert!(partial.answers.len() < 120);
}

#[tokio::test]
async fn survives_malformed_packets() {
    let handler = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));
    let addr = common::spawn_server(handler.clone()).await;

    // garbage must be logged and skipped, not kill the accept loop
    let socket = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    socket.send_to(&[0xFF, 0x00, 0xAB], addr).await.unwrap();
    socket.send_to(&[], addr).await.unwrap();

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(1, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(res.answers.len(), 1);
}

#[tokio::test]
async fn packet_writers_cannot_recur() {
    struct Recurring;

    #[async_trait::async_trait]
    impl anilin::Handler for Recurring {
        async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, _query: &Query) {
            match w.recur(cx).await {
                Err(Error::UnsupportedOp) => w.status(RCode::ServerFailure),
                other => panic!("want unsupported op, got {other:?}"),
            }
        }
    }

    let addr = common::spawn_server(Arc::new(Recurring)).await;

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(2, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(res.rcode, RCode::ServerFailure);
    assert!(res.answers.is_empty());
}

#[tokio::test]
async fn stream_writers_recur_through_the_forwarder() {
    struct Forwarding;

    #[async_trait::async_trait]
    impl anilin::Handler for Forwarding {
        async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, _query: &Query) {
            // recur splices the upstream records into the reply
            let _ = w.recur(cx).await;
        }
    }

    let upstream = common::CountingHandler::new([8, 8, 8, 8], Duration::from_secs(60));
    let upstream_addr = common::spawn_server(upstream.clone()).await;

    let ln = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = ln.local_addr().unwrap();
    let server = anilin::Server::new(addr, Arc::new(Forwarding)).with_forwarder(
        anilin::Transport::default(),
        NetAddr::udp(upstream_addr),
    );
    tokio::spawn(async move {
        let _ = server.serve(ln).await;
    });

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(3, "test.goog."),
        remote_addr: NetAddr::tcp(addr),
    };

    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(upstream.hits(), 1);
    assert_eq!(
        res.answers[0].rdata,
        Rdata::A(A {
            addr: [8, 8, 8, 8].into(),
        })
    );
}
