// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! emesh - E file mesh format
//!
//! Reads and writes the line-oriented text format consumed by the BIN
//! converter: a material table followed by objects with points, polygon
//! parts and optional texture mappings. Parsing yields a [`Document`];
//! serialization writes one back byte for byte, and [`scene`] prepares a
//! document from host scene data.

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod scene;

pub use config::ExportConfig;
pub use error::{ParseError, ParseResult};
pub use io::{export_e_file, import_e_file, parse_e, to_string, write_document, WriteOptions};
pub use model::{ColorSource, Document, Face, Material, Object, Shading, Uv};
pub use scene::{build_document, Export, Scene, SceneError};

use anyhow::{Context, Result};
use std::path::Path;

/// Read a JSON scene description from disk
pub fn load_scene(path: impl AsRef<Path>) -> Result<Scene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    Scene::from_json(&json).with_context(|| format!("Invalid scene file: {}", path.display()))
}

/// Build the document for `scene` and write it to `output`
pub fn export_scene(scene: &Scene, output: impl AsRef<Path>, config: &ExportConfig) -> Result<Export> {
    let export = build_document(scene, config).context("Scene cannot be exported")?;
    export_e_file(&export.document, output, &config.write_options())?;
    Ok(export)
}
