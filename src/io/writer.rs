// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! E file serializer
//!
//! Output must be accepted byte for byte by the external BIN converter, so
//! every number goes through the formatting helpers below: coordinates use
//! six fixed decimals and material references are hex, right-aligned in four
//! columns. Names are quoted without escaping; a name holding `"` cannot be
//! read back.

use crate::model::{ColorSource, Document, Face, Material, Object};
use std::io::{self, Write};

/// Options for serializing a document
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Text of the leading COMMENT block, omitted when `None`. The block ends
    /// at the first `}`, so the text must not contain one.
    pub comment: Option<String>,
}

impl WriteOptions {
    pub fn with_comment(comment: impl Into<String>) -> Self {
        Self {
            comment: Some(comment.into()),
        }
    }
}

/// Serialize a document to E file text
pub fn to_string(document: &Document, options: &WriteOptions) -> String {
    let mut text = String::new();

    if let Some(ref comment) = options.comment {
        text.push_str(&format!("COMMENT{{\n{}\n}}\n\n", comment));
    }

    text.push_str("MATERIALS{\n");
    for material in &document.materials {
        push_line(&mut text, material_line(material));
    }
    text.push_str("}\n\n");

    for object in &document.objects {
        write_object(object, &mut text);
    }

    text.push_str("END\n");
    text
}

/// Serialize a document into a writer
pub fn write_document<W: Write>(
    document: &Document,
    out: &mut W,
    options: &WriteOptions,
) -> io::Result<()> {
    out.write_all(to_string(document, options).as_bytes())
}

fn push_line(text: &mut String, line: String) {
    text.push_str(&line);
    text.push('\n');
}

fn write_object(object: &Object, text: &mut String) {
    text.push_str(&format!("BEGIN \"{}\"\n\n", object.name));

    text.push_str("POINTS{\n");
    for point in &object.points {
        push_line(
            text,
            format!(
                "{},{},{};",
                format_coord(point.x),
                format_coord(point.y),
                format_coord(point.z)
            ),
        );
    }
    text.push_str("}\n\n");

    if object.faces.is_empty() {
        return;
    }

    text.push_str("PARTS{\n");
    for (slot, face) in object.faces.iter().enumerate() {
        push_line(text, face_line(slot, face));
    }
    text.push_str("}\n\n");

    if object.has_uv() {
        text.push_str("PART_MAPPINGS{\n");
        for (slot, face) in object.faces.iter().enumerate() {
            push_line(text, mapping_line(slot, face));
        }
        text.push_str("}\n\n");
    }
}

/// Fixed six-decimal rendering, never exponential
pub fn format_coord(value: f64) -> String {
    format!("{:.6}", value)
}

/// `index,"name",SHADING,colour[,ILLUM n][,TRANSP n][,DBL][,WIRE];`
pub fn material_line(material: &Material) -> String {
    let mut fields = vec![material.index.to_string()];
    fields.push(match material.name {
        Some(ref name) => format!("\"{}\"", name),
        None => String::new(),
    });
    fields.push(material.shading.keyword().to_string());

    fields.push(match material.color {
        ColorSource::Rgb([r, g, b]) => format!("RGB {},{},{}", r, g, b),
        ColorSource::Texture {
            ref file,
            intensity,
        } => format!("TMAP \"{}\",{}", file, intensity),
    });

    if let Some(illum) = material.illumination {
        fields.push(format!("ILLUM {}", illum));
    }
    if let Some(transp) = material.transparency {
        fields.push(format!("TRANSP {}", transp));
    }
    if material.double_sided {
        fields.push("DBL".to_string());
    }
    if material.wireframe {
        fields.push("WIRE".to_string());
    }

    fields.join(",") + ";"
}

/// `flags,visibility,slot,material,(v0,v1,...);` with the material 1-based hex
pub fn face_line(slot: usize, face: &Face) -> String {
    let vertices: Vec<String> = face.vertices.iter().map(|v| v.to_string()).collect();
    format!(
        "{},{},{},{:>4x},({});",
        face.flags.unwrap_or(0),
        face.visibility,
        slot,
        face.material + 1,
        vertices.join(",")
    )
}

/// `slot,(u,v),(u,v),...;`, with `(-1,-1)` corners for unmapped faces
pub fn mapping_line(slot: usize, face: &Face) -> String {
    let pairs: Vec<String> = match face.uv {
        Some(ref uv) => uv
            .iter()
            .map(|uv| format!("({},{})", format_coord(uv.x), format_coord(uv.y)))
            .collect(),
        None => vec!["(-1.000000,-1.000000)".to_string(); face.vertices.len()],
    };
    format!("{},{};", slot, pairs.join(","))
}
