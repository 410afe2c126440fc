// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Ventra configuration system.

use ventra_config::load_config_from_str;

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_ventra_config() {
    let toml = r#"
[bot]
id = "bot-7"
name = "Tienda"
log_level = "debug"
holding_message = "dame un segundo"

[server]
bind_address = "0.0.0.0:9000"
webhook_path = "/hooks/wa"

[buffer]
debounce_secs = 8
hard_ceiling_secs = 45
poll_interval_ms = 250

[providers]
priority = ["evolution", "cloud"]
send_timeout_secs = 20

[providers.evolution]
server_url = "https://evo.example"
instance = "shop"
api_key = "evo-key"

[providers.cloud]
phone_number_id = "123456"
access_token = "EAAG..."

[ai]
endpoint = "https://ai.example"
api_key = "ai-key"
timeout_secs = 90

[storage]
database_path = "/tmp/ventra-test.db"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.bot.id, "bot-7");
    assert_eq!(config.bot.holding_message, "dame un segundo");
    assert_eq!(config.server.bind_address, "0.0.0.0:9000");
    assert_eq!(config.buffer.debounce_secs, 8);
    assert_eq!(config.buffer.hard_ceiling_secs, 45);
    assert_eq!(config.buffer.poll_interval_ms, 250);
    assert_eq!(config.providers.priority, vec!["evolution", "cloud"]);
    assert_eq!(config.providers.send_timeout_secs, 20);
    let evo = config.providers.evolution.expect("evolution section");
    assert_eq!(evo.server_url, "https://evo.example");
    assert_eq!(evo.instance, "shop");
    let cloud = config.providers.cloud.expect("cloud section");
    assert_eq!(cloud.phone_number_id, "123456");
    assert!(cloud.graph_base.contains("graph.facebook.com"));
    assert!(config.providers.wppconnect.is_none());
    assert_eq!(config.ai.api_key.as_deref(), Some("ai-key"));
    assert_eq!(config.storage.database_path, "/tmp/ventra-test.db");
}

/// Empty config falls back to compiled defaults everywhere.
#[test]
fn empty_config_uses_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.bot.id, "ventra");
    assert_eq!(config.buffer.debounce_secs, 10);
    assert_eq!(config.buffer.hard_ceiling_secs, 60);
    assert_eq!(config.buffer.poll_interval_ms, 500);
    assert_eq!(config.providers.priority, vec!["evolution"]);
    assert_eq!(config.providers.send_timeout_secs, 30);
    assert!(config.ai.api_key.is_none());
    assert!(!config.bot.holding_message.is_empty());
}

/// Unknown field in a section is rejected at load time.
#[test]
fn unknown_field_produces_error() {
    let toml = r#"
[buffer]
debounce_sces = 5
"#;
    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("debounce_sces"),
        "error should mention the bad key, got: {err_str}"
    );
}

/// Unknown top-level section is rejected.
#[test]
fn unknown_section_produces_error() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    assert!(load_config_from_str(toml).is_err());
}

/// Bot profile carries the AI context through.
#[test]
fn bot_profile_is_built_from_config() {
    let toml = r#"
[bot]
id = "b1"
name = "Tienda"
ai_context = "vendemos cursos"
"#;
    let config = load_config_from_str(toml).unwrap();
    let profile = config.bot.profile();
    assert_eq!(profile.id, "b1");
    assert_eq!(profile.context.as_deref(), Some("vendemos cursos"));
}
