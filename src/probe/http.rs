//! HTTP transport implementation.

use std::time::Duration;
use async_trait::async_trait;
use super::{ProbeError, Transport};

/// Issues probe requests through a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProbeError::Config(e.to_string()))?;

        Ok(Self::with_client(client))
    }

    /// Use a preconfigured client, e.g. one that bypasses proxies.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// Add an `http://` scheme to bare host addresses.
pub fn normalize_url(address: &str) -> String {
    if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<u16, ProbeError> {
        let url = normalize_url(url);

        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        let status = response.status().as_u16();

        // The timeout covers the body too, so a stalled body counts as down
        response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(e, timeout))?;

        Ok(status)
    }
}

fn map_reqwest_error(e: reqwest::Error, timeout: Duration) -> ProbeError {
    if e.is_timeout() {
        ProbeError::Timeout(timeout)
    } else {
        ProbeError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{probe, NO_RESPONSE};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn local_transport() -> HttpTransport {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpTransport::with_client(client)
    }

    /// Serve one canned HTTP response per connection.
    async fn serve(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = match listener.accept().await {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}/health", addr)
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("example.com"), "http://example.com");
        assert_eq!(normalize_url("http://example.com"), "http://example.com");
        assert_eq!(normalize_url("https://example.com/x"), "https://example.com/x");
    }

    #[tokio::test]
    async fn test_http_probe_invalid_url() {
        let transport = local_transport();
        let result = transport.get("http://256.256.256.256", Duration::from_millis(100)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_probe_ok() {
        let url = serve("200 OK").await;
        let result = probe(&local_transport(), &url, Duration::from_secs(2)).await;
        assert!(result.success);
        assert_eq!(result.status_code, 200);
    }

    #[tokio::test]
    async fn test_http_probe_service_unavailable() {
        let url = serve("503 Service Unavailable").await;
        let result = probe(&local_transport(), &url, Duration::from_secs(2)).await;
        assert!(!result.success);
        assert_eq!(result.status_code, 503);
    }

    #[tokio::test]
    async fn test_http_probe_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            // Accept and hold the connection without answering
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport = local_transport();
        let url = format!("http://{}/", addr);
        let err = transport.get(&url, Duration::from_millis(200)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Timeout(_)));

        let result = probe(&transport, &url, Duration::from_millis(200)).await;
        assert!(!result.success);
        assert_eq!(result.status_code, NO_RESPONSE);
    }

    #[tokio::test]
    async fn test_http_probe_connection_refused() {
        // Bind then drop to get a port nothing listens on
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };
        let url = format!("http://{}/", addr);
        let result = probe(&local_transport(), &url, Duration::from_secs(1)).await;
        assert!(!result.success);
        assert_eq!(result.status_code, NO_RESPONSE);
    }
}
