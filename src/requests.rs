use std::time::Duration;

use reqwest::{Client, ClientBuilder, Response};

use crate::error::FetchError;

const USER_AGENT: &str = concat!("pib_tracker/", env!("CARGO_PKG_VERSION"));

pub struct RequestClient {
    client: Client,
}

impl RequestClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = ClientBuilder::new()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    pub async fn fetch_url_response(&self, url: &str) -> Result<Response, FetchError> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    pub async fn fetch_url_body(&self, url: &str) -> Result<String, FetchError> {
        let response = self.fetch_url_response(url).await?;
        let body = response.text().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Answers a single request with `status_line` and `body`, returning the
    /// URL to hit.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![];
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/allRel.aspx")
    }

    fn client() -> RequestClient {
        RequestClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let url = serve_once("503 Service Unavailable", "busy").await;

        let result = client().fetch_url_body(&url).await;

        match result {
            Err(FetchError::Status { url: failed, status }) => {
                assert_eq!(status, 503);
                assert_eq!(failed, url);
            }
            other => panic!("expected a status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn success_returns_the_body() {
        let url = serve_once("200 OK", "<ul class=\"num\"></ul>").await;

        let body = client().fetch_url_body(&url).await.unwrap();

        assert_eq!(body, "<ul class=\"num\"></ul>");
    }

    #[tokio::test]
    async fn unreachable_host_is_an_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client().fetch_url_body(&format!("http://{addr}/")).await;

        assert!(matches!(result, Err(FetchError::Http(_))));
    }
}
