mod common;

use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::Rdata;
use anilin::{Client, Context, Error, NameServers, NetAddr, Query, Transport};

#[tokio::test]
async fn proxy_rewrites_the_dial_target() {
    let handler = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));
    let addr = common::spawn_server(handler.clone()).await;

    let client = Client::new().with_transport(Transport {
        proxy: Some(NameServers(vec![NetAddr::udp(addr)]).round_robin()),
        ..Transport::default()
    });

    // the dialed address is ignored; the proxy supplies the real server
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(1, "test.local."),
        remote_addr: NetAddr::udp("127.0.0.1:1".parse().unwrap()),
    };

    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(
        res.answers[0].rdata,
        Rdata::A(A {
            addr: [127, 0, 0, 1].into(),
        })
    );
    assert_eq!(handler.hits(), 1);
}

#[tokio::test]
async fn tls_over_udp_is_unsupported() {
    let transport = Transport::default();
    let cx = Context::new();

    let err = transport
        .dial_addr(&cx, NetAddr::udp("127.0.0.1:853".parse().unwrap()).over_tls())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedNetwork));
}

#[tokio::test]
async fn deadlines_bound_the_exchange() {
    // a socket that never answers
    let silent = tokio::net::UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = silent.local_addr().unwrap();

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_millis(50));
    let query = Query {
        message: common::a_query(1, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let err = client.exchange(&cx, &query).await.unwrap_err();
    assert!(matches!(err, Error::DeadlineExceeded));
}
