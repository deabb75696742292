mod common;

use std::sync::Arc;
use std::time::Duration;

use anilin::proto::rdata::A;
use anilin::proto::Rdata;
use anilin::{Client, Context, NetAddr, Query, Server, Transport};
use tokio::net::TcpListener;

const CA_PEM: &[u8] = include_bytes!("testdata/ca.pem");
const SERVER_PEM: &[u8] = include_bytes!("testdata/server.pem");
const SERVER_KEY: &[u8] = include_bytes!("testdata/server.key");

fn server_tls_config() -> Arc<rustls::ServerConfig> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let certs = rustls_pemfile::certs(&mut &SERVER_PEM[..])
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = rustls_pemfile::private_key(&mut &SERVER_KEY[..])
        .unwrap()
        .unwrap();

    Arc::new(
        rustls::ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .unwrap(),
    )
}

fn client_tls_config() -> Arc<rustls::ClientConfig> {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let mut roots = rustls::RootCertStore::empty();
    for cert in rustls_pemfile::certs(&mut &CA_PEM[..]) {
        roots.add(cert.unwrap()).unwrap();
    }

    Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth(),
    )
}

#[tokio::test]
async fn exchanges_over_tls() {
    let handler = common::CountingHandler::new([127, 0, 0, 1], Duration::from_secs(60));

    let ln = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = ln.local_addr().unwrap();
    let server = Server::new(addr, handler.clone()).with_tls_config(server_tls_config());
    tokio::spawn(async move {
        let _ = server.serve_tls(ln).await;
    });

    let client = Client::new().with_transport(Transport {
        tls_config: Some(client_tls_config()),
        tls_server_name: Some("dns-server.dev".to_string()),
        proxy: None,
    });

    let cx = Context::with_timeout(Duration::from_secs(5));
    let query = Query {
        message: common::a_query(0x0853, "test.local."),
        remote_addr: NetAddr::tcp(addr).over_tls(),
    };

    let res = client.exchange(&cx, &query).await.unwrap();
    assert_eq!(res.id, 0x0853);
    assert_eq!(
        res.answers[0].rdata,
        Rdata::A(A {
            addr: [127, 0, 0, 1].into(),
        })
    );
    assert_eq!(handler.hits(), 1);
}
