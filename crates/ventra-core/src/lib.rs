// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Ventra ingestion pipeline.
//!
//! This crate provides the canonical message model, the conversation log
//! types and derived-state readers, the error taxonomy, and the trait
//! definitions for every seam: provider normalization, outbound delivery,
//! business actions, the AI collaborator, and log persistence.

pub mod error;
pub mod state;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::VentraError;
pub use types::{
    BotProfile, CanonicalMessage, ChatTurn, ConversationBatch, ConversationKey, DeliveryReport,
    MessageKind, Provider, SaleState, TurnAuthor,
};

// Re-export all seam traits at crate root.
pub use traits::{
    ActionHandler, AiService, ChatLogStore, DecisionEngine, OutboundProvider, ProviderNormalizer,
};
