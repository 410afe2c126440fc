// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the seams between pipeline components.
//!
//! All traits use `#[async_trait]` for dynamic dispatch compatibility;
//! external collaborators (AI, decision layer, persistence) are reached
//! only through these traits.

pub mod action;
pub mod ai;
pub mod chatlog;
pub mod decision;
pub mod normalizer;
pub mod outbound;

// Re-export all traits at the traits module level for convenience.
pub use action::ActionHandler;
pub use ai::AiService;
pub use chatlog::ChatLogStore;
pub use decision::DecisionEngine;
pub use normalizer::ProviderNormalizer;
pub use outbound::OutboundProvider;
