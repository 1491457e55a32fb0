// Collection loading: transport seam, HTTP transport, and the panel loader.
//
// A load is one GET, one status check and one JSON decode. Any failure along
// the way becomes a `FetchError` naming the endpoint, is reported once to the
// diagnostic sink, and is handed back to the board as the panel's result.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};

use crate::diagnostics::DiagnosticSink;
use crate::model::Record;
use crate::protocol::PanelResult;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a fetch failed.
#[derive(Debug, Error)]
pub enum FetchCause {
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("malformed body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A fetch-or-parse failure for one panel endpoint.
#[derive(Debug, Error)]
#[error("error fetching {endpoint}: {cause}")]
pub struct FetchError {
    pub endpoint: String,
    #[source]
    pub cause: FetchCause,
}

impl FetchError {
    pub fn new(endpoint: impl Into<String>, cause: FetchCause) -> Self {
        FetchError {
            endpoint: endpoint.into(),
            cause,
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Issues a read-only GET and returns the body of a 2xx response.
///
/// Non-2xx responses must come back as `FetchCause::Status`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchCause>;
}

/// Transport backed by a shared `reqwest::Client`. No timeout, no retries.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchCause> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchCause::Transport(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchCause::Status(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchCause::Transport(Box::new(e)))?;
        debug!("GET {url} -> {status} ({} bytes)", body.len());
        Ok(body.to_vec())
    }
}

/// A canned response for [`StaticTransport`].
#[derive(Debug, Clone)]
pub enum StaticResponse {
    /// Respond with this status and body.
    Body { status: u16, body: String },
    /// Fail as if the host could not be reached.
    Unreachable(String),
}

impl StaticResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        StaticResponse::Body {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        StaticResponse::Body {
            status,
            body: String::new(),
        }
    }
}

/// In-memory transport serving canned responses keyed by URL. Unknown URLs
/// answer 404.
#[derive(Debug, Clone, Default)]
pub struct StaticTransport {
    responses: HashMap<String, StaticResponse>,
}

impl StaticTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, response: StaticResponse) -> Self {
        self.responses.insert(url.into(), response);
        self
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchCause> {
        match self.responses.get(url) {
            Some(StaticResponse::Body { status, body }) if (200..300).contains(status) => {
                Ok(body.clone().into_bytes())
            }
            Some(StaticResponse::Body { status, .. }) => Err(FetchCause::Status(*status)),
            Some(StaticResponse::Unreachable(reason)) => Err(FetchCause::Transport(
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, reason.clone()).into(),
            )),
            None => Err(FetchCause::Status(404)),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Fetch `url` and decode the body as an ordered sequence of `R`.
pub async fn fetch_collection<R: Record>(transport: &dyn Transport, url: &str) -> PanelResult<R> {
    let body = transport
        .get(url)
        .await
        .map_err(|cause| FetchError::new(url, cause))?;
    serde_json::from_slice::<Vec<R>>(&body).map_err(|e| FetchError::new(url, FetchCause::Decode(e)))
}

/// Load one panel's collection, reporting any failure to `sink`.
///
/// Each call produces at most one diagnostic entry.
pub async fn load_panel<R: Record>(
    transport: Arc<dyn Transport>,
    sink: Arc<dyn DiagnosticSink>,
    url: String,
) -> PanelResult<R> {
    let result = fetch_collection::<R>(transport.as_ref(), &url).await;
    match &result {
        Ok(rows) => info!("Fetched {} {} records from {}", rows.len(), R::PANEL, url),
        Err(err) => sink.report(err),
    }
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::RecordingSink;
    use crate::model::{LiveScore, PlayerRecommendation, Team};

    const BASE: &str = "http://localhost:5000";

    fn url(path: &str) -> String {
        format!("{BASE}{path}")
    }

    #[tokio::test]
    async fn fetch_collection_decodes_in_order() {
        let transport = StaticTransport::new().with(
            url("/teams"),
            StaticResponse::ok(
                r#"[{"team_name":"Hawks","team_id":1,"team_code":"ATL"},
                    {"team_name":"Celtics","team_id":2,"team_code":"BOS"},
                    {"team_name":"Nets","team_id":3,"team_code":"BKN"}]"#,
            ),
        );
        let teams = fetch_collection::<Team>(&transport, &url("/teams")).await.unwrap();
        let codes: Vec<&str> = teams.iter().map(|t| t.team_code.as_str()).collect();
        assert_eq!(codes, vec!["ATL", "BOS", "BKN"]);
    }

    #[tokio::test]
    async fn fetch_collection_status_error_names_endpoint() {
        let transport = StaticTransport::new().with(url("/livescores"), StaticResponse::status(500));
        let err = fetch_collection::<LiveScore>(&transport, &url("/livescores"))
            .await
            .unwrap_err();
        assert_eq!(err.endpoint, url("/livescores"));
        assert!(matches!(err.cause, FetchCause::Status(500)));
        assert!(err.to_string().contains("/livescores"));
    }

    #[tokio::test]
    async fn fetch_collection_malformed_body_is_decode_error() {
        let transport = StaticTransport::new()
            .with(url("/recommendations"), StaticResponse::ok("<html>oops</html>"));
        let err = fetch_collection::<PlayerRecommendation>(&transport, &url("/recommendations"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause, FetchCause::Decode(_)));
    }

    #[tokio::test]
    async fn fetch_collection_unreachable_is_transport_error() {
        let transport =
            StaticTransport::new().with(url("/teams"), StaticResponse::Unreachable("refused".into()));
        let err = fetch_collection::<Team>(&transport, &url("/teams")).await.unwrap_err();
        assert!(matches!(err.cause, FetchCause::Transport(_)));
    }

    #[tokio::test]
    async fn unknown_url_is_404() {
        let transport = StaticTransport::new();
        let err = fetch_collection::<Team>(&transport, &url("/teams")).await.unwrap_err();
        assert!(matches!(err.cause, FetchCause::Status(404)));
    }

    #[tokio::test]
    async fn load_panel_reports_failure_exactly_once() {
        let sink = RecordingSink::new();
        let transport: Arc<dyn Transport> =
            Arc::new(StaticTransport::new().with(url("/teams"), StaticResponse::status(502)));
        let result =
            load_panel::<Team>(transport, Arc::new(sink.clone()), url("/teams")).await;
        assert!(result.is_err());

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].endpoint, url("/teams"));
        assert!(entries[0].message.contains("502"));
    }

    #[tokio::test]
    async fn load_panel_success_reports_nothing() {
        let sink = RecordingSink::new();
        let transport: Arc<dyn Transport> =
            Arc::new(StaticTransport::new().with(url("/teams"), StaticResponse::ok("[]")));
        let rows = load_panel::<Team>(transport, Arc::new(sink.clone()), url("/teams"))
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert!(sink.entries().is_empty());
    }

    // -- HttpTransport against a mock TCP server --

    async fn serve_once(response: &'static str) -> String {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();

            // Read the HTTP request (discard it).
            let mut buf = vec![0u8; 4096];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;

            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        });

        format!("http://{addr}")
    }

    #[tokio::test]
    async fn http_transport_returns_body_on_200() {
        let base = serve_once(concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Type: application/json\r\n",
            "Content-Length: 94\r\n",
            "Connection: close\r\n",
            "\r\n",
            "[{\"home_team\":\"LAL\",\"away_team\":\"BOS\",\"home_score\":100,\"away_score\":98,\"game_status\":\"Final\"}]",
        ))
        .await;

        let transport = HttpTransport::new();
        let scores = fetch_collection::<LiveScore>(&transport, &format!("{base}/livescores"))
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].cells(), vec!["LAL", "BOS", "100", "98", "Final"]);
    }

    #[tokio::test]
    async fn http_transport_maps_non_2xx_to_status() {
        let base = serve_once(concat!(
            "HTTP/1.1 503 Service Unavailable\r\n",
            "Content-Length: 0\r\n",
            "Connection: close\r\n",
            "\r\n",
        ))
        .await;

        let transport = HttpTransport::new();
        let err = fetch_collection::<Team>(&transport, &format!("{base}/teams"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause, FetchCause::Status(503)), "got {err}");
    }

    #[tokio::test]
    async fn http_transport_connection_refused_is_transport_error() {
        // Bind then drop to get a port nothing is listening on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new();
        let err = fetch_collection::<Team>(&transport, &format!("http://{addr}/teams"))
            .await
            .unwrap_err();
        assert!(matches!(err.cause, FetchCause::Transport(_)), "got {err}");
    }
}
