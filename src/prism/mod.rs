//! HTTP client for the Prism semantic-search and document API.

pub mod types;

use std::future::Future;
use std::time::Duration;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};
use url::form_urlencoded;

use types::{Document, DocumentList, ListParams, SearchHit, SearchRequest, SearchResponse};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 250;

/// Characters escaped in a single path segment. Unlike a full path, `/`
/// must be encoded so a document id cannot address another route.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, thiserror::Error)]
pub enum PrismError {
    #[error("Prism service not reachable at {0}. Is it running?")]
    Unreachable(String),

    #[error("Prism request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Prism rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Prism API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PrismError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            PrismError::RateLimited
                | PrismError::Api {
                    code: 500..=599,
                    ..
                }
        )
    }
}

#[derive(Clone)]
pub struct PrismClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl PrismClient {
    pub fn new(http: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub async fn search(&self, request: &SearchRequest<'_>) -> Result<Vec<SearchHit>, PrismError> {
        let url = format!("{}/api/v1/search", self.base_url);
        let url = url.as_str();
        let body: SearchResponse = self
            .with_retry(move || async move {
                let response = self.send(self.http.post(url).json(request), url).await?;
                Ok::<_, PrismError>(response.json().await?)
            })
            .await?;
        debug!(
            query = request.query,
            domain = request.domain.unwrap_or("*"),
            hits = body.results.len(),
            "prism search complete"
        );
        Ok(body.results)
    }

    pub async fn list_documents(&self, params: &ListParams<'_>) -> Result<DocumentList, PrismError> {
        let query = document_query(params);

        let url = if query.is_empty() {
            format!("{}/api/v1/documents", self.base_url)
        } else {
            format!("{}/api/v1/documents?{query}", self.base_url)
        };

        let url = url.as_str();
        self.with_retry(move || async move {
            let response = self.send(self.http.get(url), url).await?;
            Ok::<_, PrismError>(response.json().await?)
        })
        .await
    }

    /// Fetch one document. A 404 is reported as `Ok(None)`.
    pub async fn get_document(&self, id: &str) -> Result<Option<Document>, PrismError> {
        let url = format!(
            "{}/api/v1/documents/{}",
            self.base_url,
            utf8_percent_encode(id, SEGMENT_ENCODE_SET)
        );
        let url = url.as_str();
        let outcome = self
            .with_retry(move || async move {
                let response = self.send(self.http.get(url), url).await?;
                Ok::<_, PrismError>(response.json::<Document>().await?)
            })
            .await;

        match outcome {
            Ok(doc) => Ok(Some(doc)),
            Err(PrismError::NotFound(_)) => {
                debug!(id, "document not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, PrismError> {
        let response = request
            .header("User-Agent", crate::USER_AGENT)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match status {
            StatusCode::NOT_FOUND => Err(PrismError::NotFound(url.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Prism API rate limited");
                Err(PrismError::RateLimited)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                let message = extract_error_message(&text, status);
                warn!(status = %status, %message, "Prism API error");
                Err(PrismError::Api {
                    code: status.as_u16(),
                    message,
                })
            }
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> PrismError {
        if e.is_connect() {
            warn!(base_url = %self.base_url, error = %e, "Prism connection failed");
            PrismError::Unreachable(self.base_url.clone())
        } else if e.is_timeout() {
            PrismError::Timeout(self.timeout)
        } else {
            PrismError::Network(e)
        }
    }

    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, PrismError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, PrismError>>,
    {
        let mut last_err = None;
        for attempt in 0..MAX_RETRIES {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retriable() => {
                    last_err = Some(e);
                    if attempt + 1 < MAX_RETRIES {
                        let delay_ms = jittered_backoff(attempt);
                        debug!(
                            attempt = attempt + 1,
                            delay_ms, "retrying after transient error"
                        );
                        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or(PrismError::RateLimited))
    }
}

/// Equal jitter backoff: base/2 + rand(0, base/2).
/// Encode listing parameters. The serializer is not `Sync`, so it must not
/// live across an await in a `Send` future.
fn document_query(params: &ListParams<'_>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(domain) = params.domain {
        query.append_pair("domain", domain);
    }
    if let Some(limit) = params.limit {
        query.append_pair("limit", &limit.to_string());
    }
    if let Some(offset) = params.offset {
        query.append_pair("offset", &offset.to_string());
    }
    for (key, value) in &params.filters {
        query.append_pair(key, value);
    }
    query.finish()
}

fn jittered_backoff(attempt: u32) -> u64 {
    let base = INITIAL_BACKOFF_MS * 2u64.pow(attempt);
    let half = base / 2;
    half + fastrand::u64(..half.max(1))
}

/// Pull a readable message out of an error body. Prism (FastAPI) reports
/// `{"detail": ...}`; other proxies use `message` or `error`.
fn extract_error_message(body: &str, status: StatusCode) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let structured = parsed.as_ref().and_then(|v| {
        ["detail", "message", "error"]
            .iter()
            .find_map(|k| v[*k].as_str().map(String::from))
    });
    match structured {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => body.chars().take(200).collect(),
    }
}


#[cfg(test)]
mod http_tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(uri: &str) -> PrismClient {
        PrismClient::new(Client::new(), uri, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn search_posts_body_and_decodes_hits() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search"))
            .and(body_json(serde_json::json!({
                "query": "shepherd",
                "domain": "bible/kjv",
                "top_k": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "results": [{
                    "document_id": "kjv-19-23-1",
                    "content": "1 The LORD is my shepherd; I shall not want.",
                    "score": 0.87,
                    "metadata": {"book": "Psalms", "chapter": 23, "verse_start": 1}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let hits = client(&server.uri())
            .search(&SearchRequest {
                query: "shepherd",
                domain: Some("bible/kjv"),
                top_k: 10,
                similarity_threshold: None,
            })
            .await
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document_id, "kjv-19-23-1");
        assert_eq!(hits[0].score, Some(0.87));
    }

    #[tokio::test]
    async fn list_documents_sends_query_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/documents"))
            .and(query_param("domain", "geography"))
            .and(query_param("place_type", "mountain"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "documents": [{"id": "sinai", "title": "Sinai", "content": ""}],
                "total": 1
            })))
            .mount(&server)
            .await;

        let list = client(&server.uri())
            .list_documents(&ListParams {
                domain: Some("geography"),
                filters: vec![("place_type", "mountain".into())],
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(list.total, 1);
        assert_eq!(list.documents[0].id, "sinai");
    }

    #[tokio::test]
    async fn get_document_404_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/documents/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let doc = client(&server.uri()).get_document("missing").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn get_document_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/documents/kjv-43-3-16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "kjv-43-3-16",
                "title": "John 3:16 (kjv)",
                "content": "16 For God so loved the world...",
                "domain": "bible/kjv"
            })))
            .mount(&server)
            .await;

        let doc = client(&server.uri())
            .get_document("kjv-43-3-16")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.title.as_deref(), Some("John 3:16 (kjv)"));
        assert_eq!(doc.domain.as_deref(), Some("bible/kjv"));
    }

    #[tokio::test]
    async fn server_error_is_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(serde_json::json!({"detail": "warming up"})),
            )
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .search(&SearchRequest {
                query: "grace",
                domain: None,
                top_k: 5,
                similarity_threshold: None,
            })
            .await
            .unwrap_err();

        match err {
            PrismError::Api { code: 503, message } => assert_eq!(message, "warming up"),
            other => panic!("expected Api(503), got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad body"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server.uri())
            .search(&SearchRequest {
                query: "grace",
                domain: None,
                top_k: 5,
                similarity_threshold: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PrismError::Api { code: 422, .. }));
    }

    #[tokio::test]
    async fn unreachable_service_names_base_url() {
        // Port 9 (discard) is not expected to accept connections.
        let err = client("http://127.0.0.1:9")
            .get_document("x")
            .await
            .unwrap_err();
        assert!(
            err.to_string().contains("Is it running?"),
            "got: {err}"
        );
    }
}
