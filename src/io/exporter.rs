// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! E file exporter

use super::writer::{write_document, WriteOptions};
use crate::model::Document;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write a document to an .e file
pub fn export_e_file(document: &Document, path: impl AsRef<Path>, options: &WriteOptions) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create E file: {}", path.display()))?;

    let mut out = BufWriter::new(file);
    write_document(document, &mut out, options)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write E file: {}", path.display()))?;

    log::info!(
        "exported {}: {} materials, {} objects",
        path.display(),
        document.materials.len(),
        document.objects.len()
    );
    Ok(())
}
