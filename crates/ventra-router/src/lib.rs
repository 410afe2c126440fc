// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batch classification and type-specific interpretation.
//!
//! A flushed batch is classified by its most specific content type and
//! handed to that type's processor. Processors interpret into AI-ready
//! text, call the vision/transcription collaborator when needed, and
//! guarantee every inbound message was logged before any outcome is
//! returned.

pub mod classify;
pub mod processor;
pub mod processors;
pub mod router;

pub use classify::{additional_text, classify};
pub use processor::{ProcessOutcome, ProcessorContext, TypeProcessor};
pub use router::MessageRouter;
