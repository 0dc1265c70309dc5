// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - tokenizing, parsing, and writing E files

mod exporter;
mod importer;
mod parser;
pub mod tokenizer;
pub mod writer;

pub use exporter::export_e_file;
pub use importer::import_e_file;
pub use parser::parse_e;
pub use tokenizer::{Token, TokenKind, Tokenizer};
pub use writer::{to_string, write_document, WriteOptions};
