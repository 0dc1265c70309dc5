// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! In-memory representation of an E file

use nalgebra::{Point3, Vector2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Texture coordinate of one face corner
pub type Uv = Vector2<f64>;

/// Shading mode of a material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Shading {
    #[default]
    Flat,
    Gouraud,
    Phong,
    Metal,
}

impl Shading {
    /// Keywords accepted in a MATERIALS entry
    pub const KEYWORDS: [&'static str; 4] = ["FLAT", "GOURAUD", "PHONG", "METAL"];

    pub fn keyword(&self) -> &'static str {
        match self {
            Shading::Flat => "FLAT",
            Shading::Gouraud => "GOURAUD",
            Shading::Phong => "PHONG",
            Shading::Metal => "METAL",
        }
    }
}

impl fmt::Display for Shading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Shading {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FLAT" => Ok(Shading::Flat),
            "GOURAUD" => Ok(Shading::Gouraud),
            "PHONG" => Ok(Shading::Phong),
            "METAL" => Ok(Shading::Metal),
            other => Err(format!("unknown shading mode {:?}", other)),
        }
    }
}

/// Where a material takes its colour from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSource {
    /// Flat colour, 0-255 per channel
    Rgb([u8; 3]),
    /// Texture map with its intensity / palette index
    Texture { file: String, intensity: i32 },
}

/// Material declared in the MATERIALS block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Declared 1-based index
    pub index: u32,
    pub name: Option<String>,
    pub shading: Shading,
    pub color: ColorSource,
    pub transparency: Option<i32>,
    pub illumination: Option<i32>,
    pub double_sided: bool,
    pub wireframe: bool,
}

impl Material {
    pub fn new(index: u32, color: ColorSource) -> Self {
        Self {
            index,
            name: None,
            shading: Shading::Flat,
            color,
            transparency: None,
            illumination: None,
            double_sided: false,
            wireframe: false,
        }
    }

    pub fn rgb(index: u32, rgb: [u8; 3]) -> Self {
        Self::new(index, ColorSource::Rgb(rgb))
    }

    pub fn texture_map(index: u32, file: impl Into<String>, intensity: i32) -> Self {
        Self::new(
            index,
            ColorSource::Texture {
                file: file.into(),
                intensity,
            },
        )
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }

    /// Texture file, if the colour comes from a texture map
    pub fn texture(&self) -> Option<&str> {
        match &self.color {
            ColorSource::Texture { file, .. } => Some(file.as_str()),
            ColorSource::Rgb(_) => None,
        }
    }

    /// RGB colour scaled to the unit range, for hosts working in floats
    pub fn unit_color(&self) -> Option<[f32; 3]> {
        match self.color {
            ColorSource::Rgb(rgb) => Some(rgb.map(|c| c as f32 / 255.0)),
            ColorSource::Texture { .. } => None,
        }
    }
}

/// Polygon of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Face {
    /// Flag word, only kept when non-zero
    pub flags: Option<i32>,
    /// Visibility token, passed through untouched
    pub visibility: String,
    /// 0-based index into the document's materials
    pub material: usize,
    pub vertices: Vec<usize>,
    /// One coordinate per vertex, when the face was mapped
    pub uv: Option<Vec<Uv>>,
}

impl Face {
    pub fn new(material: usize, vertices: Vec<usize>) -> Self {
        Self {
            flags: None,
            visibility: "N".to_string(),
            material,
            vertices,
            uv: None,
        }
    }

    pub fn with_uv(mut self, uv: Vec<Uv>) -> Self {
        self.uv = Some(uv);
        self
    }
}

/// Named mesh with its points and faces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub points: Vec<Point3<f64>>,
    /// Faces in slot order; the slot is the position
    pub faces: Vec<Face>,
}

impl Object {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            points: Vec::new(),
            faces: Vec::new(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Whether any face carries texture coordinates
    pub fn has_uv(&self) -> bool {
        self.faces.iter().any(|face| face.uv.is_some())
    }
}

/// Parsed E file: global materials plus objects
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub materials: Vec<Material>,
    pub objects: Vec<Object>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Material a face refers to
    pub fn material_for(&self, face: &Face) -> Option<&Material> {
        self.materials.get(face.material)
    }

    pub fn object(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn point_count(&self) -> usize {
        self.objects.iter().map(Object::point_count).sum()
    }

    pub fn face_count(&self) -> usize {
        self.objects.iter().map(Object::face_count).sum()
    }
}
