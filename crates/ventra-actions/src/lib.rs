// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lazy business-action registry and the built-in sale handlers.

pub mod handlers;
pub mod registry;

pub use handlers::register_builtin;
pub use registry::{ActionRegistry, DispatchOutcome};
