// SPDX-FileCopyrightText: 2026 Ventra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Ventra pipeline.
//!
//! TOML configuration with layered merging (defaults, system, XDG, local,
//! environment) and strict unknown-key rejection.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::VentraConfig;
