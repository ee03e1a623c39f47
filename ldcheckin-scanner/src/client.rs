use crate::error::{DiscoveryError, Result};
use crate::result::ActionResponse;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

pub const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
pub const SCRIPT_ACCEPT: &str = "*/*";

/// Upper bound on a server action response body.
pub const MAX_ACTION_BODY_BYTES: usize = 2_000_000;

/// HTTP client shared by page/script fetches and server action POSTs.
///
/// Every request carries the configured user agent and timeout. Cookies are
/// passed per request as a raw header; the client keeps no cookie store.
#[derive(Debug, Clone)]
pub struct ShopClient {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl ShopClient {
    pub fn new(timeout_secs: u64, user_agent: impl Into<String>) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2).max(1)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            timeout,
            user_agent: user_agent.into(),
        })
    }

    /// GET `url` and return at most `max_bytes` of its body, decoded lossily.
    ///
    /// 4xx/5xx responses still have their (capped) body read for the debug
    /// log before failing with [`DiscoveryError::FetchStatus`].
    pub async fn fetch_text(
        &self,
        url: &Url,
        accept: &str,
        cookie: &str,
        max_bytes: usize,
    ) -> Result<String> {
        debug!("Fetching {}", url);

        let mut request = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .header("user-agent", &self.user_agent)
            .header("accept", accept);
        if !cookie.trim().is_empty() {
            request = request.header("cookie", cookie);
        }

        let response = request
            .send()
            .await
            .map_err(|source| DiscoveryError::FetchNetwork {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = read_capped(response, max_bytes).await.unwrap_or_default();
            debug!(
                "HTTP {} for {} ({} body bytes)",
                status.as_u16(),
                url,
                body.len()
            );
            return Err(DiscoveryError::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = read_capped(response, max_bytes)
            .await
            .map_err(|source| DiscoveryError::FetchNetwork {
                url: url.to_string(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// POST an empty argument list to the server action `action_id`.
    ///
    /// Never fails on HTTP status; only transport errors are returned.
    pub async fn post_action(
        &self,
        base_url: &Url,
        action_id: &str,
        cookie: &str,
    ) -> Result<ActionResponse> {
        let origin = base_url.as_str().trim_end_matches('/').to_string();

        let mut request = self
            .client
            .post(base_url.clone())
            .timeout(self.timeout)
            .header("accept", "text/x-component")
            .header("content-type", "text/plain;charset=UTF-8")
            .header("next-action", action_id)
            .header("origin", origin)
            .header("referer", base_url.as_str())
            .header("user-agent", &self.user_agent)
            .body("[]");
        if !cookie.trim().is_empty() {
            request = request.header("cookie", cookie);
        }

        let to_probe_error = |source: reqwest::Error| DiscoveryError::Probe {
            action_id: action_id.to_string(),
            source,
        };

        let response = request.send().await.map_err(to_probe_error)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let body = read_capped(response, MAX_ACTION_BODY_BYTES)
            .await
            .map_err(to_probe_error)?;

        Ok(ActionResponse {
            url: base_url.to_string(),
            status,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Read the body chunk by chunk, stopping once `max_bytes` have been kept.
async fn read_capped(mut response: Response, max_bytes: usize) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();
    while body.len() < max_bytes {
        match response.chunk().await? {
            Some(chunk) => {
                let room = max_bytes - body.len();
                body.extend_from_slice(&chunk[..chunk.len().min(room)]);
            }
            None => break,
        }
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn url_for(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_text_caps_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/big.js"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 10_000]))
            .mount(&mock_server)
            .await;

        let client = ShopClient::new(5, "test-agent").unwrap();
        let text = client
            .fetch_text(&url_for(&mock_server, "/big.js"), SCRIPT_ACCEPT, "", 1_000)
            .await
            .unwrap();

        assert_eq!(text.len(), 1_000);
    }

    #[tokio::test]
    async fn test_fetch_text_replaces_invalid_utf8() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'o', b'k', 0xff]))
            .mount(&mock_server)
            .await;

        let client = ShopClient::new(5, "test-agent").unwrap();
        let text = client
            .fetch_text(&url_for(&mock_server, "/"), HTML_ACCEPT, "", 100)
            .await
            .unwrap();

        assert_eq!(text, "ok\u{fffd}");
    }

    #[tokio::test]
    async fn test_fetch_text_reports_status_and_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone.js"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&mock_server)
            .await;

        let client = ShopClient::new(5, "test-agent").unwrap();
        let url = url_for(&mock_server, "/gone.js");
        let err = client
            .fetch_text(&url, SCRIPT_ACCEPT, "", 100)
            .await
            .unwrap_err();

        match &err {
            DiscoveryError::FetchStatus { status, url: u } => {
                assert_eq!(*status, 503);
                assert_eq!(u, url.as_str());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_text_sends_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(header("user-agent", "test-agent"))
            .and(header("cookie", "sid=1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&mock_server)
            .await;

        let client = ShopClient::new(5, "test-agent").unwrap();
        let text = client
            .fetch_text(&url_for(&mock_server, "/"), HTML_ACCEPT, "sid=1", 100)
            .await
            .unwrap();

        assert_eq!(text, "hello");
        let requests = mock_server.received_requests().await.unwrap();
        let accept = requests[0].headers.get("accept").unwrap();
        assert_eq!(accept.to_str().unwrap(), HTML_ACCEPT);
    }

    #[tokio::test]
    async fn test_post_action_returns_error_statuses() {
        let mock_server = MockServer::start().await;
        let id = "00".repeat(21);
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("next-action", id.as_str()))
            .and(header("accept", "text/x-component"))
            .respond_with(
                ResponseTemplate::new(404)
                    .insert_header("content-type", "text/plain")
                    .set_body_string("Server action not found."),
            )
            .mount(&mock_server)
            .await;

        let client = ShopClient::new(5, "test-agent").unwrap();
        let base = url_for(&mock_server, "/");
        let resp = client.post_action(&base, &id, "").await.unwrap();

        assert_eq!(resp.status, 404);
        assert_eq!(resp.content_type, "text/plain");
        assert_eq!(resp.body, "Server action not found.");
        assert_eq!(resp.url, base.as_str());

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests[0].body, b"[]");
        assert!(requests[0].headers.get("cookie").is_none());
    }
}
