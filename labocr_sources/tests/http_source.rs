//! Integration tests for the HTTP image source against a local test server.

use labocr_core::{ImageSource, SourceError};
use labocr_sources::{HttpImageSource, HttpSourceConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Routes = HashMap<&'static str, (u16, Vec<u8>)>;

struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

/// Serve fixed responses by path; unknown paths get 404.
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn serve(routes: Routes) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let routes = Arc::new(routes);
    let requests = Arc::new(Mutex::new(Vec::new()));

    let seen = Arc::clone(&requests);
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            let seen = Arc::clone(&seen);
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&head).to_string();
                let path = head
                    .split_whitespace()
                    .nth(1)
                    .unwrap_or("/")
                    .to_string();
                seen.lock().expect("lock").push(head);

                let (status, body) = routes
                    .get(path.as_str())
                    .cloned()
                    .unwrap_or((404, b"not found".to_vec()));
                let response = format!(
                    "HTTP/1.1 {status} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.write_all(&body).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{addr}"),
        requests,
    }
}

fn chart_page() -> Vec<u8> {
    br#"<html><body>
        <img class="scan" src="/scans/1.png">
        <p>Report 2</p><img alt="lab" src='scans/2.png' />
        <img src="data:image/png;base64,AAAA">
    </body></html>"#
        .to_vec()
}

#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
fn source(server: &TestServer, max_image_bytes: usize) -> HttpImageSource {
    HttpImageSource::new(HttpSourceConfig {
        base_url: server.base_url.clone(),
        cookie: Some("ci_session=abc123".to_string()),
        timeout: 5,
        max_image_bytes,
        retry_delays: vec![],
        ..HttpSourceConfig::default()
    })
    .expect("valid config")
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn test_lists_and_fetches_images_in_page_order() {
    let server = serve(HashMap::from([
        ("/ci/paper/sign2/8/4/42", (200, chart_page())),
        ("/scans/1.png", (200, b"first".to_vec())),
        ("/ci/paper/sign2/8/4/scans/2.png", (200, b"second".to_vec())),
    ]))
    .await;
    let source = source(&server, 1024);

    let images = source.list_images("42").await.expect("page fetched");
    let locators: Vec<_> = images.iter().map(|i| i.locator.clone()).collect();
    assert_eq!(
        locators,
        vec![
            format!("{}/scans/1.png", server.base_url),
            format!("{}/ci/paper/sign2/8/4/scans/2.png", server.base_url),
        ]
    );

    let first = source.fetch_image(&images[0]).await.expect("image fetched");
    let second = source.fetch_image(&images[1]).await.expect("image fetched");
    assert_eq!(first, b"first");
    assert_eq!(second, b"second");

    let requests = server.requests.lock().expect("lock");
    assert!(
        requests
            .iter()
            .all(|r| r.to_ascii_lowercase().contains("cookie: ci_session=abc123"))
    );
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn test_missing_image_reports_status() {
    let server = serve(HashMap::from([(
        "/ci/paper/sign2/8/4/42",
        (200, chart_page()),
    )]))
    .await;
    let source = source(&server, 1024);

    let images = source.list_images("42").await.expect("page fetched");
    let result = source.fetch_image(&images[0]).await;
    assert!(matches!(result, Err(SourceError::Status { status: 404, .. })));
}

#[tokio::test]
#[expect(clippy::expect_used, reason = "Test failure should panic with context")]
async fn test_oversized_image_is_rejected() {
    let server = serve(HashMap::from([
        ("/ci/paper/sign2/8/4/42", (200, chart_page())),
        ("/scans/1.png", (200, vec![0u8; 64])),
    ]))
    .await;
    let source = source(&server, 16);

    let images = source.list_images("42").await.expect("page fetched");
    let result = source.fetch_image(&images[0]).await;
    assert!(matches!(
        result,
        Err(SourceError::TooLarge {
            size: 64,
            limit: 16,
            ..
        })
    ));
}

#[tokio::test]
async fn test_page_error_fails_listing() {
    let server = serve(HashMap::from([(
        "/ci/paper/sign2/8/4/42",
        (500, b"boom".to_vec()),
    )]))
    .await;
    let result = source(&server, 1024).list_images("42").await;
    assert!(matches!(result, Err(SourceError::Status { status: 500, .. })));
}
