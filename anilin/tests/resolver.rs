mod common;

use std::sync::Arc;
use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::Rdata;
use anilin::{Client, Context, Handler, MessageWriter, NetAddr, Query};
use async_trait::async_trait;

/// Answers `*.local.` inline and recurses for everything else.
struct LocalResolver;

#[async_trait]
impl Handler for LocalResolver {
    async fn serve_dns(&self, cx: &Context, w: &mut MessageWriter, query: &Query) {
        let fqdn = query.message.questions[0].qname.clone();
        if !fqdn.ends_with(".local.") {
            let _ = w.recur(cx).await;
            return;
        }

        w.answer(
            fqdn,
            Duration::from_secs(60),
            Rdata::A(A {
                addr: [127, 0, 0, 1].into(),
            }),
        );
    }
}

#[tokio::test]
async fn resolver_intercepts_local_names_and_recurses_otherwise() {
    let upstream = common::CountingHandler::new([8, 8, 8, 8], Duration::from_secs(60));
    let addr = common::spawn_server(upstream.clone()).await;

    let client = Client::new().with_resolver(Arc::new(LocalResolver));
    let cx = Context::with_timeout(Duration::from_secs(5));

    let query = Query {
        message: common::a_query(1, "test.local."),
        remote_addr: NetAddr::udp(addr),
    };
    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(
        res.answers[0].rdata,
        Rdata::A(A {
            addr: [127, 0, 0, 1].into(),
        })
    );
    assert_eq!(upstream.hits(), 0, "local names must not hit the network");

    let query = Query {
        message: common::a_query(2, "test.goog."),
        remote_addr: NetAddr::udp(addr),
    };
    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(
        res.answers[0].rdata,
        Rdata::A(A {
            addr: [8, 8, 8, 8].into(),
        })
    );
    assert_eq!(res.id, 2, "the caller's ID is restored on the response");
    assert_eq!(upstream.hits(), 1);
}
