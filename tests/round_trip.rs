// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Round-trip serialize/parse tests

use anyhow::Result;
use approx::assert_relative_eq;
use emesh::{
    export_e_file, import_e_file, parse_e, to_string, Document, Face, Material, Object, Shading,
    Uv, WriteOptions,
};
use nalgebra::Point3;
use tempfile::NamedTempFile;

fn sample_document() -> Document {
    let mut stone = Material::texture_map(2, "stone.pcx", 0)
        .with_name("stone")
        .with_shading(Shading::Phong);
    stone.double_sided = true;

    let mut red = Material::rgb(1, [255, 0, 0]).with_name("red");
    red.illumination = Some(0);
    red.transparency = Some(70);

    let mut wire = Material::rgb(3, [10, 20, 30]);
    wire.wireframe = true;

    let mut body = Object::new("body");
    body.points = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.5, 0.0, -2.25),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(-1.0, -1.0, 8.0),
    ];
    body.faces = vec![
        Face::new(0, vec![0, 1, 2]),
        Face::new(2, vec![0, 2, 3, 1]),
    ];
    body.faces[1].flags = Some(3);

    let mut lid = Object::new("lid");
    lid.points = vec![
        Point3::new(0.0, 0.0, 1.0),
        Point3::new(1.0, 0.0, 1.0),
        Point3::new(0.0, 1.0, 1.0),
    ];
    lid.faces = vec![Face::new(1, vec![2, 1, 0]).with_uv(vec![
        Uv::new(0.0, 0.0),
        Uv::new(1.0, 0.25),
        Uv::new(0.5, 1.0),
    ])];

    let mut axle = Object::new("@x_axle");
    axle.points = vec![Point3::origin(), Point3::new(0.0, 0.0, 2.0)];

    Document {
        materials: vec![red, stone, wire],
        objects: vec![body, lid, axle],
    }
}

#[test]
fn test_document_round_trip() -> Result<()> {
    let document = sample_document();

    let text = to_string(&document, &WriteOptions::with_comment("//  round trip"));
    let parsed = parse_e(&text)?;

    assert_eq!(parsed, document);
    assert!(!parsed.objects[0].has_uv());
    assert!(parsed.objects[1].has_uv());

    // A second pass produces identical text
    assert_eq!(to_string(&parsed, &WriteOptions::with_comment("//  round trip")), text);

    Ok(())
}

#[test]
fn test_file_round_trip() -> Result<()> {
    let document = sample_document();
    let file = NamedTempFile::with_suffix(".e")?;

    export_e_file(&document, file.path(), &WriteOptions::default())?;
    let imported = import_e_file(file.path())?;

    assert_eq!(imported, document);
    Ok(())
}

#[test]
fn test_round_trip_rounds_to_six_decimals() -> Result<()> {
    let mut object = Object::new("third");
    object.points = vec![
        Point3::new(1.0 / 3.0, -2.0 / 3.0, 0.1),
        Point3::new(1e-7, 123456.789, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ];
    object.faces.push(Face::new(0, vec![0, 1, 2]));
    let document = Document {
        materials: vec![Material::rgb(1, [0, 0, 0])],
        objects: vec![object],
    };

    let parsed = parse_e(&to_string(&document, &WriteOptions::default()))?;
    let points = &parsed.objects[0].points;

    assert_relative_eq!(points[0].x, 1.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(points[0].y, -2.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(points[0].z, 0.1);
    assert_relative_eq!(points[1].x, 0.0);
    assert_relative_eq!(points[1].y, 123456.789, epsilon = 1e-6);

    Ok(())
}

#[test]
fn test_mixed_uv_object_gains_placeholder_mappings() -> Result<()> {
    let mut object = Object::new("mixed");
    object.points = vec![Point3::origin(); 3];
    object.faces = vec![
        Face::new(0, vec![0, 1, 2]),
        Face::new(1, vec![0, 1, 2]).with_uv(vec![Uv::new(0.5, 0.5); 3]),
    ];
    let document = Document {
        materials: vec![
            Material::rgb(1, [1, 1, 1]),
            Material::texture_map(2, "t.pcx", 0),
        ],
        objects: vec![object],
    };

    let parsed = parse_e(&to_string(&document, &WriteOptions::default()))?;
    let faces = &parsed.objects[0].faces;

    assert_eq!(faces[0].uv.as_deref(), Some(&[Uv::new(-1.0, -1.0); 3][..]));
    assert_eq!(faces[1].uv, document.objects[0].faces[1].uv);

    Ok(())
}
