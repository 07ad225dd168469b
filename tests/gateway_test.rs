//! HTTPゲートウェイの契約テスト
//!
//! ローカルの使い捨てサーバーに1リクエストだけ受けさせ、
//! 送られたメソッド・パス・ヘッダー・本文と応答の分類を検証する。

use catalog_client::config::Config;
use catalog_client::datasheet::save_datasheet;
use catalog_client::gateway::HttpGateway;
use catalog_common::session::TOKEN_KEY;
use catalog_common::{
    AuthError, CatalogClient, CatalogGateway, Credential, DatasheetFile, GatewayError,
    KeyValueStorage, MemoryStorage, Notice, ProductDraft,
};
use std::net::SocketAddr;
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// サーバーが受け取ったリクエスト
#[derive(Debug)]
struct Received {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl Received {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == &name.to_lowercase())
            .map(|(_, v)| v.as_str())
    }

    fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 返す応答。`declared_length` を本文より長くすると途中切断になる。
struct Reply {
    status: u16,
    body: &'static str,
    declared_length: Option<usize>,
}

impl Reply {
    fn json(status: u16, body: &'static str) -> Self {
        Self {
            status,
            body,
            declared_length: None,
        }
    }

    fn truncated(body: &'static str, declared_length: usize) -> Self {
        Self {
            status: 200,
            body,
            declared_length: Some(declared_length),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// 1接続だけ受けて `reply` を返すサーバーを起動する
async fn serve_once(reply: Reply) -> (SocketAddr, JoinHandle<Received>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let header_end = loop {
            let n = stream.read(&mut chunk).await.expect("read request");
            assert!(n > 0, "connection closed before headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = find_header_end(&buf) {
                break end;
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
        let mut lines = head.split("\r\n");
        let mut request_line = lines.next().unwrap_or_default().split(' ');
        let method = request_line.next().unwrap_or_default().to_string();
        let path = request_line.next().unwrap_or_default().to_string();
        let headers: Vec<(String, String)> = lines
            .filter_map(|line| line.split_once(':'))
            .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
            .collect();

        let content_length = headers
            .iter()
            .find(|(k, _)| k == "content-length")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(0);
        let mut body = buf[header_end + 4..].to_vec();
        while body.len() < content_length {
            let n = stream.read(&mut chunk).await.expect("read body");
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }

        let length = reply.declared_length.unwrap_or(reply.body.len());
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.status,
            reason(reply.status),
            length,
            reply.body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("write response");
        let _ = stream.shutdown().await;

        Received {
            method,
            path,
            headers,
            body,
        }
    });

    (addr, handle)
}

fn gateway_for(addr: SocketAddr) -> HttpGateway {
    let config = Config {
        base_url: format!("http://{}", addr),
        timeout_seconds: 5,
    };
    HttpGateway::new(&config).expect("gateway")
}

fn token() -> Credential {
    Credential::new("abc123")
}

#[tokio::test]
async fn test_login_posts_form_without_bearer() {
    let (addr, server) = serve_once(Reply::json(
        200,
        r#"{"access_token":"abc123","token_type":"bearer"}"#,
    ))
    .await;
    let gateway = gateway_for(addr);

    let credential = gateway
        .authenticate("alice", "secret")
        .await
        .expect("login");
    assert_eq!(credential.as_str(), "abc123");

    let received = server.await.expect("server");
    assert_eq!(received.method, "POST");
    assert_eq!(received.path, "/token");
    assert_eq!(
        received.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(received.body_text(), "username=alice&password=secret");
    assert!(received.header("authorization").is_none());
}

#[tokio::test]
async fn test_login_rejection_carries_server_text() {
    let (addr, server) = serve_once(Reply::json(
        401,
        r#"{"detail":"Incorrect username or password"}"#,
    ))
    .await;
    let gateway = gateway_for(addr);

    let error = gateway.authenticate("alice", "wrong").await.unwrap_err();
    server.await.expect("server");

    match error {
        GatewayError::Auth(AuthError::LoginRejected(body)) => {
            assert!(body.contains("Incorrect username or password"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_search_sends_bearer_and_json() {
    let (addr, server) = serve_once(Reply::json(
        200,
        r#"{"products":[{"product_id":3,"company":"Acme","name":"MD-10","match_score":92.5}]}"#,
    ))
    .await;
    let gateway = gateway_for(addr);

    let products = gateway
        .search("10A motor driver", &token())
        .await
        .expect("search");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, Some(3));
    assert_eq!(products[0].match_score, Some(92.5));

    let received = server.await.expect("server");
    assert_eq!(received.method, "POST");
    assert_eq!(received.path, "/api/semantic_search");
    assert_eq!(received.header("authorization"), Some("Bearer abc123"));
    assert_eq!(received.header("content-type"), Some("application/json"));
    let body: serde_json::Value = serde_json::from_slice(&received.body).expect("json body");
    assert_eq!(body, serde_json::json!({ "requirements": "10A motor driver" }));
}

#[tokio::test]
async fn test_list_products_is_authorized_get() {
    let (addr, server) = serve_once(Reply::json(200, r#"{"products":[]}"#)).await;
    let gateway = gateway_for(addr);

    let products = gateway.list_products(&token()).await.expect("list");
    assert!(products.is_empty());

    let received = server.await.expect("server");
    assert_eq!(received.method, "GET");
    assert_eq!(received.path, "/api/products");
    assert_eq!(received.header("authorization"), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_save_product_posts_draft() {
    let (addr, server) = serve_once(Reply::json(200, r#"{"product_id":41}"#)).await;
    let gateway = gateway_for(addr);
    let draft = ProductDraft {
        company_name: "Acme".into(),
        product_name: "MD-10".into(),
        product_type: "driver".into(),
        datasheet_path: "N/A".into(),
        specs: "10A".into(),
    };

    let ack = gateway.save_product(&draft, &token()).await.expect("save");
    assert_eq!(ack.product_id, 41);

    let received = server.await.expect("server");
    assert_eq!(received.method, "POST");
    assert_eq!(received.path, "/api/products");
    assert_eq!(received.header("authorization"), Some("Bearer abc123"));
    let body: serde_json::Value = serde_json::from_slice(&received.body).expect("json body");
    assert_eq!(body["company_name"], "Acme");
    assert_eq!(body["product_name"], "MD-10");
    assert_eq!(body["datasheet_path"], "N/A");
}

#[tokio::test]
async fn test_upload_uses_multipart_file_part() {
    let (addr, server) = serve_once(Reply::json(
        200,
        r#"{"product_id":9,"datasheet_path":"datasheets/md10.pdf"}"#,
    ))
    .await;
    let gateway = gateway_for(addr);
    let file = DatasheetFile::new("md10.pdf", b"%PDF-1.4 test".to_vec());

    let ack = gateway.upload_datasheet(&file, &token()).await.expect("upload");
    assert_eq!(ack.product_id, Some(9));

    let received = server.await.expect("server");
    assert_eq!(received.method, "POST");
    assert_eq!(received.path, "/api/upload");
    assert_eq!(received.header("authorization"), Some("Bearer abc123"));
    assert!(received
        .header("content-type")
        .is_some_and(|v| v.starts_with("multipart/form-data; boundary=")));
    let body = received.body_text();
    assert!(body.contains(r#"name="file"; filename="md10.pdf""#));
    assert!(body.contains("Content-Type: application/pdf"));
    assert!(body.contains("%PDF-1.4 test"));
}

#[tokio::test]
async fn test_download_path_and_bearer() {
    let (addr, server) = serve_once(Reply::json(200, "%PDF")).await;
    let gateway = gateway_for(addr);

    let response = gateway
        .download_datasheet(7, &token())
        .await
        .expect("download");
    assert_eq!(response.bytes().await.expect("body").as_ref(), b"%PDF");

    let received = server.await.expect("server");
    assert_eq!(received.method, "GET");
    assert_eq!(received.path, "/api/datasheet/7");
    assert_eq!(received.header("authorization"), Some("Bearer abc123"));
}

#[tokio::test]
async fn test_server_error_keeps_body_as_message() {
    let (addr, server) = serve_once(Reply::json(500, "vector index unavailable")).await;
    let gateway = gateway_for(addr);

    let error = gateway.search("relay", &token()).await.unwrap_err();
    server.await.expect("server");

    assert!(matches!(
        error,
        GatewayError::Request { status: Some(500), ref message } if message == "vector index unavailable"
    ));
}

/// 実際の401でクライアントがログアウトする
#[tokio::test]
async fn test_unauthorized_response_ends_session() {
    let (addr, server) = serve_once(Reply::json(401, r#"{"detail":"Not authenticated"}"#)).await;
    let storage = MemoryStorage::new();
    storage.set(TOKEN_KEY, "abc123").expect("seed token");
    let client = CatalogClient::new(gateway_for(addr), storage.clone());

    let notice = client.search("relay").await.unwrap_err();
    server.await.expect("server");

    assert_eq!(notice, Notice::SessionExpired);
    assert!(!client.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY), None);
}

/// 途中で切れたダウンロードはファイルを残さない
#[tokio::test]
async fn test_interrupted_download_leaves_no_file() {
    let (addr, server) = serve_once(Reply::truncated("%PDF-1.4", 4096)).await;
    let gateway = gateway_for(addr);
    let dir = tempdir().expect("Failed to create temp dir");

    let response = gateway
        .download_datasheet(7, &token())
        .await
        .expect("headers arrive");
    let result = save_datasheet(response, 7, Some("datasheets/md10.pdf"), dir.path()).await;
    server.await.expect("server");

    assert!(result.is_err());
    assert!(!dir.path().join("md10.pdf").exists());
}
