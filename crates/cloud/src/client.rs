//! Cloud API client.
//!
//! Async HTTP client using `reqwest` with Bearer token authentication.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use tracing::debug;

/// Errors from the cloud client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid API token")]
    InvalidToken,

    #[error("invalid content type: {0}")]
    InvalidContentType(String),
}

/// A successful (2xx) reply.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Cloud API client.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    /// Creates a new client.
    ///
    /// An empty `token` sends no `Authorization` header.
    pub fn new(token: &str, timeout: Option<Duration>) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if !token.is_empty() {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| Error::InvalidToken)?,
            );
        }

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("matsync/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
        })
    }

    /// Performs a PUT with the given body and content type.
    pub async fn put(
        &self,
        url: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Response, Error> {
        let value = HeaderValue::from_str(content_type)
            .map_err(|_| Error::InvalidContentType(content_type.to_string()))?;
        debug!(url, bytes = body.len(), "PUT");
        let resp = self
            .http
            .put(url)
            .header(CONTENT_TYPE, value)
            .body(body)
            .send()
            .await?;
        read_response(resp).await
    }

    /// Performs a GET.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        debug!(url, "GET");
        let resp = self.http.get(url).send().await?;
        read_response(resp).await
    }
}

async fn read_response(resp: reqwest::Response) -> Result<Response, Error> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(Response {
        status: status.as_u16(),
        body: resp.bytes().await?.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Starts a mock HTTP server that answers one request with `status`
    /// and `body`, and hands back the raw request head it received.
    async fn mock_server(
        status: u16,
        body: &str,
    ) -> (String, oneshot::Receiver<String>, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let url = format!("http://127.0.0.1:{port}");
        let body = body.to_string();
        let (req_tx, req_rx) = oneshot::channel();

        let handle = tokio::spawn(async move {
            if let Ok((mut stream, _)) = listener.accept().await {
                let mut buf = vec![0u8; 8192];
                let n = stream.read(&mut buf).await.unwrap_or(0);
                let _ = req_tx.send(String::from_utf8_lossy(&buf[..n]).into_owned());

                let resp = format!(
                    "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes()).await;
                let _ = stream.shutdown().await;
            }
        });

        (url, req_rx, handle)
    }

    #[tokio::test]
    async fn put_sends_token_and_content_type() {
        let (url, req_rx, handle) =
            mock_server(200, r#"{"upload_url":"u","material_profile_id":"m"}"#).await;

        let client = Client::new("secret", None).unwrap();
        let resp = client
            .put(&format!("{url}/connect/v1/materials/upload"), "application/json", b"{}".to_vec())
            .await
            .unwrap();

        assert_eq!(resp.status, 200);
        assert!(String::from_utf8_lossy(&resp.body).contains("material_profile_id"));

        let head = req_rx.await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("put /connect/v1/materials/upload"));
        assert!(head.contains("authorization: bearer secret"));
        assert!(head.contains("content-type: application/json"));

        handle.abort();
    }

    #[tokio::test]
    async fn get_without_token_has_no_auth_header() {
        let (url, req_rx, handle) = mock_server(200, "{}").await;

        let client = Client::new("", None).unwrap();
        let resp = client.get(&format!("{url}/confirm")).await.unwrap();
        assert_eq!(resp.body, b"{}");

        let head = req_rx.await.unwrap().to_ascii_lowercase();
        assert!(head.starts_with("get /confirm"));
        assert!(!head.contains("authorization:"));

        handle.abort();
    }

    #[tokio::test]
    async fn non_success_status_is_api_error() {
        let (url, _req_rx, handle) = mock_server(503, r#"{"errors":["down"]}"#).await;

        let client = Client::new("t", None).unwrap();
        let err = client.get(&url).await.unwrap_err();
        match err {
            Error::Api { status, body } => {
                assert_eq!(status, 503);
                assert!(body.contains("down"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }

        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_host_is_http_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = Client::new("", Some(Duration::from_secs(5))).unwrap();
        let err = client
            .get(&format!("http://127.0.0.1:{port}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[test]
    fn invalid_token_rejected() {
        assert!(matches!(
            Client::new("bad\ntoken", None),
            Err(Error::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn invalid_content_type_rejected() {
        let client = Client::new("", None).unwrap();
        let err = client
            .put("http://127.0.0.1:1/", "bad\ncontent", Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidContentType(_)));
    }
}
