// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # islegrid-observability
//!
//! Logging setup shared by every islegrid crate, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: Timestamped, rotating log files with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known islegrid crate names for debug flags
///
/// These double as the `target:` used by each crate's `tracing` macros.
pub const KNOWN_CRATES: &[&str] = &[
    "islegrid-config",
    "islegrid-locator",
    "islegrid-observability",
];
