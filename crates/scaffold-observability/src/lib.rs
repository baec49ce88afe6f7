// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # scaffold-observability
//!
//! Logging infrastructure shared by the scaffold crates, with per-crate
//! debug flag support and the compiler's numeric verbosity levels.
//!
//! ## Features
//! - `file-logging`: JSON log files per run (desktop only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known scaffold crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &["scaffold", "scaffold-compiler", "scaffold-config"];
