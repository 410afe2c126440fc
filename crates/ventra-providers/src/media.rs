// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media download-and-embed with graceful degradation.
//!
//! Media messages may need an out-of-band fetch before the AI collaborator
//! can read them. A failed fetch never fails the message: the normalizer
//! keeps the raw URL or media id and the pipeline continues degraded.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tracing::warn;

use ventra_core::VentraError;

/// Upper bound on embedded media size (16 MB, WhatsApp's own media cap).
const MAX_MEDIA_BYTES: usize = 16 * 1024 * 1024;

/// Downloads media and inlines it as base64.
#[derive(Debug, Clone)]
pub struct MediaFetcher {
    client: reqwest::Client,
}

impl MediaFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Build a fetcher sharing an existing HTTP client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Fetch a URL and return its body base64-encoded.
    ///
    /// `headers` carries provider auth (e.g. an `apikey` or bearer token).
    pub async fn fetch_base64(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<String, VentraError> {
        let mut req = self.client.get(url);
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        let response = req.send().await.map_err(|e| VentraError::MediaFetchFailed {
            reference: url.to_string(),
            source: Some(Box::new(e)),
        })?;

        if !response.status().is_success() {
            return Err(VentraError::MediaFetchFailed {
                reference: format!("{url} ({})", response.status()),
                source: None,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VentraError::MediaFetchFailed {
                reference: url.to_string(),
                source: Some(Box::new(e)),
            })?;

        if bytes.len() > MAX_MEDIA_BYTES {
            return Err(VentraError::MediaFetchFailed {
                reference: format!("{url} (body exceeds {MAX_MEDIA_BYTES} bytes)"),
                source: None,
            });
        }

        Ok(BASE64.encode(&bytes))
    }

    /// Fetch and embed, degrading to `None` with a warning on any failure.
    pub async fn try_embed(&self, url: &str, headers: &[(&str, &str)]) -> Option<String> {
        match self.fetch_base64(url, headers).await {
            Ok(b64) => Some(b64),
            Err(e) => {
                warn!(error = %e, "media embed failed, degrading to url reference");
                None
            }
        }
    }
}

impl Default for MediaFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetch_base64_encodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"hello".to_vec()))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let b64 = fetcher
            .fetch_base64(&format!("{}/media/abc", server.uri()), &[])
            .await
            .unwrap();
        assert_eq!(b64, "aGVsbG8=");
    }

    #[tokio::test]
    async fn fetch_sends_auth_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/abc"))
            .and(header("apikey", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        fetcher
            .fetch_base64(&format!("{}/media/abc", server.uri()), &[("apikey", "secret")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn http_error_maps_to_media_fetch_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/media/gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = MediaFetcher::new();
        let err = fetcher
            .fetch_base64(&format!("{}/media/gone", server.uri()), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, VentraError::MediaFetchFailed { .. }));
    }

    #[tokio::test]
    async fn try_embed_degrades_to_none() {
        let fetcher = MediaFetcher::new();
        // Unroutable address: the fetch fails, the embed degrades.
        let embedded = fetcher.try_embed("http://127.0.0.1:1/media", &[]).await;
        assert!(embedded.is_none());
    }
}
