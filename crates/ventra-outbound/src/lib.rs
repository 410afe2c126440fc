// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery: priority fallback dispatch and dispatcher caching.

pub mod cache;
pub mod dispatcher;

pub use cache::{ProviderCache, build_dispatcher};
pub use dispatcher::OutboundDispatcher;
