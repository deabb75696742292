mod common;

use std::sync::Arc;
use std::time::Duration;

use anilin::{Client, Context, NetAddr};

#[tokio::test]
async fn stream_session_multiplexes_concurrent_queries() {
    let handler = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));
    let addr = common::spawn_server(handler.clone()).await;

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let session = Arc::new(client.dial(&cx, NetAddr::tcp(addr)).await.unwrap());

    let mut handles = Vec::new();
    for i in 0u16..16 {
        let session = session.clone();
        handles.push(tokio::spawn(async move {
            let qname = format!("host{i}.test.");
            let query = common::a_query(i * 7, &qname);

            let res = session.send(&query).await.unwrap();
            (i, qname, query.id, res)
        }));
    }

    for handle in handles {
        let (_, qname, id, res) = handle.await.unwrap();
        // each caller gets the response to its own question, with its own ID
        assert_eq!(res.id, id);
        assert_eq!(res.questions[0].qname, qname);
        assert_eq!(res.answers[0].name, qname);
    }

    assert_eq!(handler.hits(), 16);
}

#[tokio::test]
async fn session_survives_a_timed_out_caller() {
    let handler = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));
    let addr = common::spawn_server(handler).await;

    let client = Client::new();
    let cx = Context::with_timeout(Duration::from_secs(5));
    let session = client.dial(&cx, NetAddr::tcp(addr)).await.unwrap();

    // give up on a query almost immediately; the late response must be
    // discarded without disturbing the session
    let _ = tokio::time::timeout(
        Duration::from_micros(1),
        session.send(&common::a_query(1, "slow.test.")),
    )
    .await;

    let res = session.send(&common::a_query(2, "fast.test.")).await.unwrap();
    assert_eq!(res.id, 2);
    assert_eq!(res.questions[0].qname, "fast.test.");
}
