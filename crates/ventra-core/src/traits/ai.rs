// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! External AI collaborator contract: transcription and vision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VentraError;
use crate::types::BotProfile;

/// Structured verdict the vision model returns for payment-proof images.
///
/// The collaborator encodes this as a JSON object inside its description;
/// fields default so partially filled verdicts still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentProofVerdict {
    pub is_proof_payment: bool,
    pub valid_amount: bool,
    pub amount_found: Option<String>,
    pub valid_name: bool,
    pub name_found: Option<String>,
    /// Short natural-language summary of what the image shows.
    pub resume: Option<String>,
}

/// The transcription/vision service the processors delegate to.
///
/// Failures map to [`VentraError::AiInterpretationFailed`]; the inbound
/// message is always logged before the failure is surfaced, so no audit
/// trail is lost.
#[async_trait]
pub trait AiService: Send + Sync + 'static {
    /// Transcribe an audio message. `source` is a URL or `data:` URI.
    async fn transcribe_audio(
        &self,
        source: &str,
        bot: &BotProfile,
    ) -> Result<String, VentraError>;

    /// Describe an image following `instruction`. Returns the raw
    /// description text; payment-proof flows decode it with
    /// [`PaymentProofVerdict`].
    async fn analyze_image(
        &self,
        data_uri: &str,
        instruction: &str,
        bot: &BotProfile,
    ) -> Result<String, VentraError>;
}

impl PaymentProofVerdict {
    /// Decode a verdict from the description text, tolerating surrounding
    /// prose by extracting the first `{...}` block.
    pub fn from_description(description: &str) -> Option<Self> {
        let start = description.find('{')?;
        let end = description.rfind('}')?;
        if end < start {
            return None;
        }
        serde_json::from_str(&description[start..=end]).ok()
    }
}
