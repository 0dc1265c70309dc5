// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Host scene description consumed by the exporter
//!
//! A host application hands over its objects already resolved to plain data:
//! vertices with a world matrix, polygons referring into a material catalog,
//! and per-corner UVs. [`build_document`] turns that into a [`Document`]
//! following the exporter's conventions.
//!
//! [`Document`]: crate::model::Document

mod convert;

pub use convert::{build_document, file_transparency, Export};

use crate::model::{Shading, Uv};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems with scene data that would not produce a valid E file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("\"{0}\" has no materials")]
    NoMaterials(String),

    #[error("\"{0}\" has no vertices")]
    NoPoints(String),

    #[error("{0:?} cannot be written: names may not contain '\"'")]
    QuotedName(String),

    #[error("comment cannot be written: it may not contain '}}'")]
    BadComment,

    #[error("object \"{object}\" uses unknown material {material}")]
    UnknownMaterial { object: String, material: usize },

    #[error("object \"{object}\" polygon {polygon} refers to missing vertex {vertex}")]
    BadVertex {
        object: String,
        polygon: usize,
        vertex: usize,
    },

    #[error("object \"{object}\" polygon {polygon} has fewer than 3 vertices")]
    DegeneratePolygon { object: String, polygon: usize },

    #[error("object \"{object}\" polygon {polygon} has {uv} UVs for {vertices} vertices")]
    UvMismatch {
        object: String,
        polygon: usize,
        uv: usize,
        vertices: usize,
    },
}

/// Material as resolved by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMaterial {
    pub name: String,
    #[serde(default)]
    pub shading: Shading,
    /// Diffuse colour in the unit range
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    /// Diffuse texture, which takes precedence over the colour
    #[serde(default)]
    pub texture: Option<String>,
    #[serde(default)]
    pub transp: i32,
    #[serde(default)]
    pub illum: i32,
    #[serde(default)]
    pub dbl: bool,
    /// Texture is already installed and must not be copied
    #[serde(default)]
    pub nocopy: bool,
}

fn default_color() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

impl SceneMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shading: Shading::Flat,
            color: default_color(),
            texture: None,
            transp: 0,
            illum: 0,
            dbl: false,
            nocopy: false,
        }
    }

    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }
}

/// Polygon referring into the scene's material catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePolygon {
    #[serde(default)]
    pub material: Option<usize>,
    pub vertices: Vec<usize>,
    /// One coordinate per corner, from the active UV layer
    #[serde(default)]
    pub uv: Option<Vec<Uv>>,
}

impl ScenePolygon {
    pub fn new(material: usize, vertices: Vec<usize>) -> Self {
        Self {
            material: Some(material),
            vertices,
            uv: None,
        }
    }

    pub fn with_uv(mut self, uv: Vec<Uv>) -> Self {
        self.uv = Some(uv);
        self
    }
}

/// Mesh object with its world transform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(default = "Matrix4::identity")]
    pub matrix_world: Matrix4<f64>,
    pub vertices: Vec<Point3<f64>>,
    #[serde(default)]
    pub polygons: Vec<ScenePolygon>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, vertices: Vec<Point3<f64>>) -> Self {
        Self {
            name: name.into(),
            matrix_world: Matrix4::identity(),
            vertices,
            polygons: Vec::new(),
        }
    }

    /// Axle and pivot helpers may be exported without materials
    pub fn is_helper(&self) -> bool {
        self.name.starts_with("@x") || self.name.starts_with("@z")
    }
}

/// Everything selected for export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub materials: Vec<SceneMaterial>,
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Read a scene from its JSON description
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
