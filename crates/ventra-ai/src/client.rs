// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external AI collaborator.
//!
//! Handles request construction, authentication, and transient error
//! retry for the transcription and vision endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use ventra_config::model::AiConfig;
use ventra_core::traits::decision::Decision;
use ventra_core::traits::{AiService, DecisionEngine};
use ventra_core::{BotProfile, ChatTurn, ConversationKey, VentraError};

#[derive(Debug, Clone, Serialize)]
struct TranscribeRequest<'a> {
    source: &'a str,
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranscribeResponse {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
struct VisionRequest<'a> {
    image: &'a str,
    instruction: &'a str,
    context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct VisionResponse {
    description: String,
}

#[derive(Debug, Clone, Serialize)]
struct HistoryEntry<'a> {
    author: &'static str,
    message: &'a str,
    date: i64,
}

#[derive(Debug, Clone, Serialize)]
struct DecideRequest<'a> {
    number: &'a str,
    bot_id: &'a str,
    bot_name: &'a str,
    context: Option<&'a str>,
    message: &'a str,
    history: Vec<HistoryEntry<'a>>,
}

#[derive(Debug, Deserialize)]
struct DecideResponse {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    actions: Vec<String>,
    #[serde(default)]
    metadata: serde_json::Value,
}

/// HTTP client for the AI collaborator's transcription and vision API.
///
/// Retries once after a 1-second delay on transient errors (429, 500,
/// 503).
#[derive(Debug, Clone)]
pub struct AiClient {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
}

impl AiClient {
    pub fn new(config: &AiConfig) -> Result<Self, VentraError> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let bearer = format!("Bearer {api_key}");
            headers.insert(
                "authorization",
                HeaderValue::from_str(&bearer)
                    .map_err(|e| VentraError::Config(format!("invalid AI api key: {e}")))?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| VentraError::AiInterpretationFailed {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    async fn post_json<T: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        route: &str,
        body: &T,
    ) -> Result<R, VentraError> {
        let url = format!("{}/{route}", self.endpoint);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, route, "retrying AI request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self.client.post(&url).json(body).send().await.map_err(|e| {
                VentraError::AiInterpretationFailed {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                }
            })?;

            let status = response.status();
            debug!(status = %status, attempt, route, "AI response received");

            if status.is_success() {
                return response.json::<R>().await.map_err(|e| {
                    VentraError::AiInterpretationFailed {
                        message: format!("failed to parse AI response: {e}"),
                        source: Some(Box::new(e)),
                    }
                });
            }

            let body_text = response.text().await.unwrap_or_default();
            let error = VentraError::AiInterpretationFailed {
                message: format!("AI endpoint returned {status}: {body_text}"),
                source: None,
            };
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient AI error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| VentraError::AiInterpretationFailed {
            message: "AI request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl AiService for AiClient {
    async fn transcribe_audio(
        &self,
        source: &str,
        bot: &BotProfile,
    ) -> Result<String, VentraError> {
        let request = TranscribeRequest {
            source,
            context: bot.context.as_deref(),
        };
        let response: TranscribeResponse = self.post_json("transcribe", &request).await?;
        Ok(response.text)
    }

    async fn analyze_image(
        &self,
        data_uri: &str,
        instruction: &str,
        bot: &BotProfile,
    ) -> Result<String, VentraError> {
        let request = VisionRequest {
            image: data_uri,
            instruction,
            context: bot.context.as_deref(),
        };
        let response: VisionResponse = self.post_json("vision", &request).await?;
        Ok(response.description)
    }
}

#[async_trait]
impl DecisionEngine for AiClient {
    async fn decide(
        &self,
        key: &ConversationKey,
        bot: &BotProfile,
        ai_text: &str,
        history: &[ChatTurn],
    ) -> Result<Decision, VentraError> {
        let request = DecideRequest {
            number: &key.number,
            bot_id: &key.bot_id,
            bot_name: &bot.name,
            context: bot.context.as_deref(),
            message: ai_text,
            history: history
                .iter()
                .map(|t| HistoryEntry {
                    author: t.author.code(),
                    message: &t.message,
                    date: t.date,
                })
                .collect(),
        };
        let response: DecideResponse = self.post_json("decide", &request).await?;
        Ok(Decision {
            reply: response.reply,
            actions: response.actions,
            metadata: response.metadata,
        })
    }
}

fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(endpoint: &str) -> AiClient {
        AiClient::new(&AiConfig {
            endpoint: endpoint.to_string(),
            api_key: Some("test-key".into()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    fn bot() -> BotProfile {
        BotProfile {
            id: "ventra".into(),
            name: "Ventra".into(),
            context: Some("tienda de zapatos".into()),
        }
    }

    #[tokio::test]
    async fn transcribes_audio_with_auth_and_context() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "source": "https://cdn/audio.ogg",
                "context": "tienda de zapatos"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"text": "quiero dos pares"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client
            .transcribe_audio("https://cdn/audio.ogg", &bot())
            .await
            .unwrap();
        assert_eq!(text, "quiero dos pares");
    }

    #[tokio::test]
    async fn analyzes_image() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vision"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "description": "{\"is_proof_payment\": true}"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let description = client
            .analyze_image("data:image/jpeg;base64,abc", "verifica el pago", &bot())
            .await
            .unwrap();
        assert!(description.contains("is_proof_payment"));
    }

    #[tokio::test]
    async fn retries_once_on_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/transcribe"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "listo"})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.transcribe_audio("data:audio/ogg;base64,a", &bot()).await.unwrap();
        assert_eq!(text, "listo");
    }

    #[tokio::test]
    async fn decide_round_trips_history_and_actions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/decide"))
            .and(body_partial_json(serde_json::json!({
                "number": "5215550001111",
                "bot_id": "ventra",
                "message": "quiero comprar el ebook"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "reply": "Perfecto, te inicio la compra",
                "actions": ["create-sale"],
                "metadata": {"product": "ebook"}
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let key = ConversationKey::new("5215550001111", "ventra");
        let history = vec![ChatTurn::bot("hola", 100)];
        let decision = client
            .decide(&key, &bot(), "quiero comprar el ebook", &history)
            .await
            .unwrap();
        assert_eq!(decision.reply.as_deref(), Some("Perfecto, te inicio la compra"));
        assert_eq!(decision.actions, ["create-sale"]);
        assert_eq!(decision.metadata["product"], "ebook");
    }

    #[tokio::test]
    async fn decide_tolerates_minimal_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/decide"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let key = ConversationKey::new("5215550001111", "ventra");
        let decision = client.decide(&key, &bot(), "hola", &[]).await.unwrap();
        assert!(decision.reply.is_none());
        assert!(decision.actions.is_empty());
    }

    #[tokio::test]
    async fn surfaces_non_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vision"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad image"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .analyze_image("not-a-uri", "x", &bot())
            .await
            .unwrap_err();
        assert!(matches!(err, VentraError::AiInterpretationFailed { .. }));
    }
}
