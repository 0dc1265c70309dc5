// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for emesh

pub mod checker;
pub mod logging;
pub mod reporter;

pub use checker::{collect_files, Checker, DocumentStats, FileReport};
pub use logging::init_with_level;
pub use reporter::Reporter;
