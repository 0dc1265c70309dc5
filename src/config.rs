// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export configuration

use crate::io::WriteOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up by [`ExportConfig::load`]
pub const CONFIG_FILE: &str = "emesh.toml";

/// Settings applied when turning a scene into an E file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Text of the leading COMMENT block; empty leaves the block out
    pub comment: String,
    /// AI meshes leave ILLUM and TRANSP out of the material table
    pub ai_mesh: bool,
    /// Split polygons into triangle fans
    pub triangulate: bool,
    /// Lower-case object names
    pub lowercase_names: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            comment: format!("//  Exported by emesh {}", env!("CARGO_PKG_VERSION")),
            ai_mesh: false,
            triangulate: true,
            lowercase_names: true,
        }
    }
}

impl ExportConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: ExportConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `emesh.toml` if present, then apply environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(ai_mesh) = std::env::var("EMESH_AI_MESH") {
            config.ai_mesh = ai_mesh.parse().unwrap_or(config.ai_mesh);
        }

        if let Ok(triangulate) = std::env::var("EMESH_TRIANGULATE") {
            config.triangulate = triangulate.parse().unwrap_or(config.triangulate);
        }

        if let Ok(comment) = std::env::var("EMESH_COMMENT") {
            config.comment = comment;
        }

        log::debug!("export config: {:?}", config);
        Ok(config)
    }

    /// Serializer options derived from this configuration
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            comment: (!self.comment.is_empty()).then(|| self.comment.clone()),
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }
}
