mod common;

use std::sync::Arc;
use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::Rdata;
use anilin::{Cache, Client, Context, NetAddr, Query};

#[tokio::test]
async fn serves_hits_from_the_cache_within_the_ttl() {
    let upstream = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));
    let addr = common::spawn_server(upstream.clone()).await;

    let client = Client::new().with_resolver(Arc::new(Cache::new()));
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(1, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    let first = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(
        first.answers[0].rdata,
        Rdata::A(A {
            addr: [127, 0, 0, 1].into(),
        })
    );

    let second = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(second.answers[0].name, first.answers[0].name);
    assert_eq!(second.answers[0].rdata, first.answers[0].rdata);
    // the cached record is served with its remaining lifetime
    assert!(second.answers[0].ttl <= Duration::from_secs(60));

    assert_eq!(upstream.hits(), 1, "upstream must be fetched exactly once");
}

#[tokio::test]
async fn refetches_after_the_ttl_elapses() {
    let upstream = common::CountingHandler::new([127, 0, 0, 1], Duration::ZERO);
    let addr = common::spawn_server(upstream.clone()).await;

    let client = Client::new().with_resolver(Arc::new(Cache::new()));
    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(2, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };

    client.exchange(&cx, &query).await.unwrap();
    client.exchange(&cx, &query).await.unwrap();

    assert_eq!(upstream.hits(), 2, "expired entries must be refetched");
}
