// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for E file parsing

use thiserror::Error;

/// Failure while reading E file text.
///
/// Carries the message and, when known, the 1-based line and column of the
/// offending token. Parsing is all-or-nothing: the first error aborts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", render(.message, .line, .column))]
pub struct ParseError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ParseError {
    /// Error without a source location
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Error at a line and column
    pub fn at(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Error at a line only
    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
            column: None,
        }
    }
}

fn render(message: &str, line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!("{}:{}: {}", line, column, message),
        (Some(line), None) => format!("{}: {}", line, message),
        _ => message.to_string(),
    }
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;
