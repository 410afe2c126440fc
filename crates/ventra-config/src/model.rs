// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Ventra pipeline.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. Provider configuration is explicit per instance;
//! there is no process-wide mutable provider state.

use serde::{Deserialize, Serialize};
use ventra_core::types::BotProfile;

/// Top-level Ventra configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values; providers without credentials are simply not registered.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VentraConfig {
    /// Bot identity and behavior settings.
    #[serde(default)]
    pub bot: BotConfig,

    /// Webhook server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Conversation debounce buffer settings.
    #[serde(default)]
    pub buffer: BufferConfig,

    /// Outbound provider priority and credentials.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// AI collaborator settings.
    #[serde(default)]
    pub ai: AiConfig,

    /// Conversation log storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Bot identity and conversational behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Stable bot id used in conversation keys.
    #[serde(default = "default_bot_id")]
    pub id: String,

    /// Display name of the bot.
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Free-form context forwarded to AI calls.
    #[serde(default)]
    pub ai_context: Option<String>,

    /// Short acknowledgment sent while audio/images are being interpreted
    /// and a sale is pending.
    #[serde(default = "default_holding_message")]
    pub holding_message: String,
}

impl BotConfig {
    /// Build the profile handed to AI calls and action handlers.
    pub fn profile(&self) -> BotProfile {
        BotProfile {
            id: self.id.clone(),
            name: self.name.clone(),
            context: self.ai_context.clone(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            id: default_bot_id(),
            name: default_bot_name(),
            log_level: default_log_level(),
            ai_context: None,
            holding_message: default_holding_message(),
        }
    }
}

fn default_bot_id() -> String {
    "ventra".to_string()
}

fn default_bot_name() -> String {
    "Ventra".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_holding_message() -> String {
    "Un momento, estoy revisando tu mensaje...".to_string()
}

/// Webhook server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the webhook server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Path the providers POST webhooks to.
    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            webhook_path: default_webhook_path(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8520".to_string()
}

fn default_webhook_path() -> String {
    "/webhook".to_string()
}

/// Debounce buffer timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BufferConfig {
    /// Idle seconds after which a pending batch is flushed.
    #[serde(default = "default_debounce_secs")]
    pub debounce_secs: u64,

    /// Maximum total seconds a batch may accumulate before a forced flush.
    #[serde(default = "default_hard_ceiling_secs")]
    pub hard_ceiling_secs: u64,

    /// Waiter poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            debounce_secs: default_debounce_secs(),
            hard_ceiling_secs: default_hard_ceiling_secs(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_debounce_secs() -> u64 {
    10
}

fn default_hard_ceiling_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Provider priority and per-provider credentials.
///
/// `priority` lists provider names in fallback order; providers without a
/// config section are skipped with a warning at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProvidersConfig {
    /// Outbound fallback order (e.g. `["evolution", "cloud"]`).
    #[serde(default = "default_priority")]
    pub priority: Vec<String>,

    /// Per-call timeout for outbound provider requests, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    #[serde(default)]
    pub evolution: Option<EvolutionConfig>,

    #[serde(default)]
    pub wppconnect: Option<WppConnectConfig>,

    #[serde(default)]
    pub cloud: Option<CloudConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            send_timeout_secs: default_send_timeout_secs(),
            evolution: None,
            wppconnect: None,
            cloud: None,
        }
    }
}

fn default_priority() -> Vec<String> {
    vec!["evolution".to_string()]
}

fn default_send_timeout_secs() -> u64 {
    30
}

/// Evolution API credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EvolutionConfig {
    pub server_url: String,
    pub instance: String,
    pub api_key: String,
}

/// WPPConnect server credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WppConnectConfig {
    pub server_url: String,
    pub session: String,
    pub token: String,
}

/// Meta WhatsApp Cloud API credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CloudConfig {
    pub phone_number_id: String,
    pub access_token: String,

    /// Graph API base, overridable for tests.
    #[serde(default = "default_graph_base")]
    pub graph_base: String,
}

fn default_graph_base() -> String {
    "https://graph.facebook.com/v18.0".to_string()
}

/// AI collaborator endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AiConfig {
    /// Base URL of the transcription/vision service.
    #[serde(default = "default_ai_endpoint")]
    pub endpoint: String,

    /// API key; `None` disables audio/image interpretation.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ai_endpoint(),
            api_key: None,
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

fn default_ai_endpoint() -> String {
    "http://127.0.0.1:8600".to_string()
}

fn default_ai_timeout_secs() -> u64 {
    60
}

/// Conversation log storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "ventra.db".to_string()
}
