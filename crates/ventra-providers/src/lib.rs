// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat-provider adapters: webhook normalization and outbound channels.
//!
//! Each supported provider gets a normalizer (raw webhook JSON to
//! [`ventra_core::CanonicalMessage`]) and a sender (the outbound half of
//! the same API). Detection is structural: an adapter claims a payload
//! when a majority of its shape heuristics hold, so a provider that adds
//! fields keeps working.

pub mod cloud;
pub mod evolution;
pub mod media;
pub mod phone;
pub mod registry;
pub mod wppconnect;

pub use cloud::{CloudNormalizer, CloudSender};
pub use evolution::{EvolutionNormalizer, EvolutionSender};
pub use media::MediaFetcher;
pub use registry::NormalizerRegistry;
pub use wppconnect::{WppConnectNormalizer, WppConnectSender};
