// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! E file importer

use crate::model::Document;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read an .e file and parse it into a document
pub fn import_e_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read E file: {}", path.display()))?;

    let document = super::parse_e(&source)
        .with_context(|| format!("Not a valid E file: {}", path.display()))?;

    log::info!(
        "imported {}: {} materials, {} objects",
        path.display(),
        document.materials.len(),
        document.objects.len()
    );
    Ok(document)
}
