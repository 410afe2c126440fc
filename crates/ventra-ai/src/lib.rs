// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the external AI collaborator (transcription, vision).

pub mod client;

pub use client::AiClient;
