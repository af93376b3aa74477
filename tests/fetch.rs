//! Fetch against a one-shot local HTTP server.

use coinmap::config::Config;
use coinmap::feed::SnapshotFetcher;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const FIXTURE: &str = include_str!("fixtures/coins.json");

/// Serve a single response; the handle yields the raw request head.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = sock.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        sock.write_all(resp.as_bytes()).await.unwrap();
        sock.shutdown().await.ok();
        String::from_utf8_lossy(&buf).into_owned()
    });
    (format!("http://{}/site-api", addr), handle)
}

fn config(api_base: String) -> Config {
    Config {
        api_base,
        http_timeout_secs: 5,
        ..Config::default()
    }
}

#[tokio::test]
async fn fetch_requests_ranking_and_decodes() {
    let (base, server) = serve_once("200 OK", FIXTURE).await;
    let fetcher = SnapshotFetcher::new(&config(base)).unwrap();
    let snapshot = fetcher.fetch().await.unwrap();
    assert_eq!(snapshot.data.len(), 7);
    assert_eq!(snapshot.categories.len(), 5);

    let request = server.await.unwrap();
    assert!(
        request.starts_with("GET /site-api/coins?currency=USD&period=24h&ranking=top100 HTTP/1.1"),
        "unexpected request: {}",
        request
    );
}

#[tokio::test]
async fn fetch_fails_on_http_error() {
    let (base, server) = serve_once("503 Service Unavailable", "{}").await;
    let fetcher = SnapshotFetcher::new(&config(base)).unwrap();
    let err = fetcher.fetch().await.unwrap_err();
    assert!(format!("{:#}", err).contains("503"));
    server.await.unwrap();
}

#[tokio::test]
async fn fetch_fails_on_malformed_body() {
    let (base, server) = serve_once("200 OK", "<html>maintenance</html>").await;
    let fetcher = SnapshotFetcher::new(&config(base)).unwrap();
    assert!(fetcher.fetch().await.is_err());
    server.await.unwrap();
}
