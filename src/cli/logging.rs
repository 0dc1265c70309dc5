// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Logger setup for the command line tool
//!
//! `RUST_LOG` wins when set; otherwise only this crate logs, at the level the
//! binary asks for.

use log::LevelFilter;

/// Build the `RUST_LOG`-style filter enabling `crates` at `level`
pub fn filter_string(crates: &[&str], level: LevelFilter) -> String {
    let level = level.to_string().to_lowercase();
    crates
        .iter()
        .map(|name| format!("{}={}", name, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Default level: info for debug builds, warn for release builds
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else if cfg!(debug_assertions) {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    }
}

/// Initialize `env_logger` once for the process
pub fn init_with_level(crates: &[&str], level: LevelFilter) {
    if std::env::var("RUST_LOG").is_err() {
        let filter = filter_string(crates, level);
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    } else {
        env_logger::init();
    }
}
