// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Ventra ingestion pipeline.

use thiserror::Error;

/// The primary error type used across all Ventra components.
///
/// Failures inside a single batch or message never abort sibling batches;
/// callers at component boundaries log and continue rather than letting
/// these cross the webhook-handling request.
#[derive(Debug, Error)]
pub enum VentraError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// No registered provider adapter claimed the webhook payload.
    #[error("unknown provider: no adapter claimed the payload")]
    UnknownProvider,

    /// A provider payload was claimed but its shape could not be normalized.
    #[error("malformed payload from {provider}: {message}")]
    MalformedPayload { provider: String, message: String },

    /// Media download-and-embed failed. Callers degrade to the raw URL or
    /// media id instead of aborting the message.
    #[error("media fetch failed for {reference}")]
    MediaFetchFailed {
        reference: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The external AI collaborator failed to interpret audio or an image.
    /// The inbound message is still logged before this is surfaced.
    #[error("ai interpretation failed: {message}")]
    AiInterpretationFailed {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Every configured outbound provider failed for a delivery attempt.
    #[error("all outbound providers failed: {last_error}")]
    AllProvidersFailed { last_error: String },

    /// Outbound channel errors (connection failure, rejected request).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Conversation log storage errors (connection, query, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An action handler failed while executing.
    #[error("action '{name}' failed: {message}")]
    ActionFailed { name: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert_eq!(
            VentraError::UnknownProvider.to_string(),
            "unknown provider: no adapter claimed the payload"
        );
        let err = VentraError::MediaFetchFailed {
            reference: "https://cdn.example/abc".into(),
            source: None,
        };
        assert!(err.to_string().contains("https://cdn.example/abc"));
        let err = VentraError::AllProvidersFailed {
            last_error: "503".into(),
        };
        assert!(err.to_string().contains("503"));
    }

    #[test]
    fn errors_carry_sources() {
        let err = VentraError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
