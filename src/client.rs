//! HTTP client for persisting segment lists.

use std::sync::Arc;

use reqwest::multipart::Form;
use reqwest::{Client, StatusCode};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::page::DocumentId;
use crate::types::segments::SegmentList;

/// Tracing target for save requests.
pub const TRACING_TARGET: &str = "incident_segmenter::client";

/// Multipart field carrying the JSON segment list.
pub const INCIDENT_PAGES_FIELD: &str = "incident_pgs";
/// Header carrying the CSRF token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

struct SegmentClientInner {
    http: Client,
    server_url: String,
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub document: DocumentId,
    pub status: StatusCode,
    pub segments: SegmentList,
}

/// Client for the `save-segments` endpoint.
#[derive(Clone)]
pub struct SegmentClient {
    inner: Arc<SegmentClientInner>,
}

impl std::fmt::Debug for SegmentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentClient")
            .field("server_url", &self.inner.server_url)
            .finish_non_exhaustive()
    }
}

impl SegmentClient {
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = config.request_timeout();
        tracing::debug!(
            target: TRACING_TARGET,
            timeout_ms = timeout.as_millis(),
            server_url = config.server_url(),
            "Creating segment client"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent())
            .build()?;

        Ok(SegmentClient {
            inner: Arc::new(SegmentClientInner {
                http,
                server_url: config.server_url().to_string(),
            }),
        })
    }

    pub fn save_url(&self, document: DocumentId) -> String {
        format!("{}/api/save-segments/{}", self.inner.server_url, document)
    }

    /// Posts a segment list. The CSRF header is omitted when no token is known;
    /// the server is left to reject such requests.
    pub async fn save_segments(
        &self,
        document: DocumentId,
        segments: &SegmentList,
        csrf_token: Option<&str>,
    ) -> Result<SaveReceipt> {
        let body = segments.to_json()?;
        let url = self.save_url(document);

        tracing::info!(
            target: TRACING_TARGET,
            %document,
            segments = segments.len(),
            has_csrf = csrf_token.is_some(),
            "Saving segments"
        );

        let form = Form::new().text(INCIDENT_PAGES_FIELD, body);
        let mut request = self.inner.http.post(&url).multipart(form);
        if let Some(token) = csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await.inspect_err(|e| {
            tracing::warn!(target: TRACING_TARGET, %document, error = %e, "Save request failed");
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(target: TRACING_TARGET, %document, %status, "Server rejected segments");
            return Err(Error::Status { document, status });
        }

        tracing::info!(target: TRACING_TARGET, %document, %status, "Segments saved");
        Ok(SaveReceipt {
            document,
            status,
            segments: segments.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_url_strips_trailing_slash() {
        let config = Config {
            server_url: "http://review.local/".to_string(),
            ..Default::default()
        };
        let client = SegmentClient::new(&config).unwrap();
        assert_eq!(
            client.save_url(DocumentId(42)),
            "http://review.local/api/save-segments/42"
        );
    }
}
