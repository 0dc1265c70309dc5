// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene to document conversion

use super::{Scene, SceneError, SceneMaterial, SceneObject, ScenePolygon};
use crate::config::ExportConfig;
use crate::model::{ColorSource, Document, Face, Material, Object, Shading, Uv};
use std::collections::HashMap;

/// Result of preparing a scene for export
#[derive(Debug, Clone, PartialEq)]
pub struct Export {
    pub document: Document,
    /// Texture files of the exported materials that should be copied
    /// alongside the model, in material order
    pub textures: Vec<String>,
}

/// Transparency as written to the file: values strictly between 0 and 100
/// are inverted, 0 and 100 pass through.
pub fn file_transparency(transp: i32) -> i32 {
    if transp > 0 && transp < 100 {
        100 - transp
    } else {
        transp
    }
}

/// Build the document for a scene.
///
/// Materials are numbered in the order polygons first use them, across all
/// objects; two catalog entries with the same name and texture share one
/// material.
pub fn build_document(scene: &Scene, config: &ExportConfig) -> Result<Export, SceneError> {
    if config.comment.contains('}') {
        return Err(SceneError::BadComment);
    }

    let mut table = MaterialTable::new(scene, config.ai_mesh);
    let mut objects = Vec::with_capacity(scene.objects.len());

    for object in &scene.objects {
        validate_object(object, &scene.materials)?;
        objects.push(convert_object(object, &mut table, config));
    }

    let textures = table.textures();
    log::info!(
        "prepared {} objects with {} materials, {} textures to copy",
        objects.len(),
        table.materials.len(),
        textures.len()
    );

    Ok(Export {
        document: Document {
            materials: table.materials,
            objects,
        },
        textures,
    })
}

/// Names are written between double quotes with no escaping
fn check_name(name: &str) -> Result<(), SceneError> {
    if name.contains('"') {
        return Err(SceneError::QuotedName(name.to_string()));
    }
    Ok(())
}

fn validate_object(object: &SceneObject, catalog: &[SceneMaterial]) -> Result<(), SceneError> {
    check_name(&object.name)?;
    if object.vertices.is_empty() {
        return Err(SceneError::NoPoints(object.name.clone()));
    }

    let has_material = object.polygons.iter().any(|p| p.material.is_some());
    if !has_material && !object.is_helper() {
        return Err(SceneError::NoMaterials(object.name.clone()));
    }

    for (index, polygon) in object.polygons.iter().enumerate() {
        if let Some(index) = polygon.material {
            let material = catalog.get(index).ok_or_else(|| SceneError::UnknownMaterial {
                object: object.name.clone(),
                material: index,
            })?;
            check_name(&material.name)?;
            if let Some(ref texture) = material.texture {
                check_name(texture)?;
            }
        }
        if polygon.vertices.len() < 3 {
            return Err(SceneError::DegeneratePolygon {
                object: object.name.clone(),
                polygon: index,
            });
        }
        if let Some(&vertex) = polygon.vertices.iter().find(|v| **v >= object.vertices.len()) {
            return Err(SceneError::BadVertex {
                object: object.name.clone(),
                polygon: index,
                vertex,
            });
        }
        if let Some(uv) = polygon.uv.as_ref().filter(|uv| uv.len() != polygon.vertices.len()) {
            return Err(SceneError::UvMismatch {
                object: object.name.clone(),
                polygon: index,
                uv: uv.len(),
                vertices: polygon.vertices.len(),
            });
        }
    }
    Ok(())
}

fn convert_object(object: &SceneObject, table: &mut MaterialTable<'_>, config: &ExportConfig) -> Object {
    let name = if config.lowercase_names {
        object.name.to_lowercase()
    } else {
        object.name.clone()
    };

    let points = object
        .vertices
        .iter()
        .map(|p| object.matrix_world.transform_point(p))
        .collect();

    let mut faces = Vec::new();
    for polygon in &object.polygons {
        let material = table.resolve(polygon.material);
        let textured = table.materials[material].texture().is_some();

        for (vertices, uv) in split_polygon(polygon, config.triangulate) {
            let mut face = Face::new(material, vertices);
            if textured {
                let corners = face.vertices.len();
                face.uv = Some(uv.unwrap_or_else(|| vec![Uv::zeros(); corners]));
            }
            faces.push(face);
        }
    }

    log::debug!(
        "object {:?}: {} points, {} parts",
        name,
        object.vertices.len(),
        faces.len()
    );

    Object {
        name,
        points,
        faces,
    }
}

type Corners = (Vec<usize>, Option<Vec<Uv>>);

/// Split a polygon into a triangle fan, or keep it whole
fn split_polygon(polygon: &ScenePolygon, triangulate: bool) -> Vec<Corners> {
    if !triangulate || polygon.vertices.len() == 3 {
        return vec![(polygon.vertices.clone(), polygon.uv.clone())];
    }

    (1..polygon.vertices.len() - 1)
        .map(|i| {
            let corners = [0, i, i + 1];
            let vertices = corners.iter().map(|&c| polygon.vertices[c]).collect();
            let uv = polygon
                .uv
                .as_ref()
                .map(|uv| corners.iter().map(|&c| uv[c]).collect());
            (vertices, uv)
        })
        .collect()
}

/// First-use ordered material list
struct MaterialTable<'a> {
    catalog: &'a [SceneMaterial],
    ai_mesh: bool,
    slots: HashMap<(String, Option<String>), usize>,
    nocopy: Vec<bool>,
    materials: Vec<Material>,
}

impl<'a> MaterialTable<'a> {
    fn new(scene: &'a Scene, ai_mesh: bool) -> Self {
        Self {
            catalog: &scene.materials,
            ai_mesh,
            slots: HashMap::new(),
            nocopy: Vec::new(),
            materials: Vec::new(),
        }
    }

    /// 0-based document material for a catalog reference
    fn resolve(&mut self, reference: Option<usize>) -> usize {
        let source = reference.and_then(|index| self.catalog.get(index));
        let key = match source {
            Some(material) => (material.name.clone(), material.texture.clone()),
            None => (String::new(), None),
        };

        if let Some(&slot) = self.slots.get(&key) {
            return slot;
        }

        let slot = self.materials.len();
        let index = slot as u32 + 1;
        let material = match source {
            Some(material) => convert_material(index, material, self.ai_mesh),
            None => fallback_material(index),
        };
        self.materials.push(material);
        self.nocopy.push(source.is_some_and(|m| m.nocopy));
        self.slots.insert(key, slot);
        slot
    }

    fn textures(&self) -> Vec<String> {
        let mut textures: Vec<String> = Vec::new();
        for (material, nocopy) in self.materials.iter().zip(&self.nocopy) {
            if let Some(texture) = material.texture().filter(|_| !nocopy) {
                if !textures.iter().any(|t| t == texture) {
                    textures.push(texture.to_string());
                }
            }
        }
        textures
    }
}

/// Material line for a catalog entry; only PHONG survives, other modes are FLAT
fn convert_material(index: u32, source: &SceneMaterial, ai_mesh: bool) -> Material {
    let shading = match source.shading {
        Shading::Phong => Shading::Phong,
        _ => Shading::Flat,
    };

    let color = match source.texture {
        Some(ref texture) => ColorSource::Texture {
            file: texture.clone(),
            intensity: 0,
        },
        // `as` truncates toward zero and saturates at 0 and 255
        None => ColorSource::Rgb(source.color.map(|c| (c * 255.0) as u8)),
    };

    let (illumination, transparency) = if ai_mesh {
        (None, None)
    } else {
        (Some(source.illum), Some(file_transparency(source.transp)))
    };

    Material {
        index,
        name: Some(source.name.clone()),
        shading,
        color,
        transparency,
        illumination,
        double_sided: source.dbl,
        wireframe: false,
    }
}

/// Stand-in for polygons without a material slot
fn fallback_material(index: u32) -> Material {
    let mut material = Material::rgb(index, [204, 204, 204]).with_name("");
    material.transparency = Some(0);
    material
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{to_string, WriteOptions};
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Point3, Vector3};

    fn square(name: &str) -> SceneObject {
        SceneObject::new(
            name,
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
        )
    }

    fn config() -> ExportConfig {
        ExportConfig {
            comment: String::new(),
            ..ExportConfig::default()
        }
    }

    #[test]
    fn test_transparency_inversion() {
        assert_eq!(file_transparency(30), 70);
        assert_eq!(file_transparency(0), 0);
        assert_eq!(file_transparency(100), 100);
        assert_eq!(file_transparency(1), 99);
        assert_eq!(file_transparency(99), 1);
    }

    #[test]
    fn test_material_conversion() {
        let mut source = SceneMaterial::new("Paint").with_color([1.0, 0.5, 0.0039]);
        source.shading = Shading::Gouraud;
        source.transp = 30;
        source.illum = 50;
        source.dbl = true;

        let material = convert_material(1, &source, false);
        assert_eq!(material.shading, Shading::Flat);
        // 0.5 * 255 = 127.5 and 0.0039 * 255 = 0.99 both truncate
        assert_eq!(material.color, ColorSource::Rgb([255, 127, 0]));
        assert_eq!(material.transparency, Some(70));
        assert_eq!(material.illumination, Some(50));
        assert!(material.double_sided);

        let ai = convert_material(1, &source, true);
        assert!(ai.transparency.is_none());
        assert!(ai.illumination.is_none());
    }

    #[test]
    fn test_phong_and_texture() {
        let mut source = SceneMaterial::new("Metal").with_texture("metal.pcx");
        source.shading = Shading::Phong;
        let material = convert_material(2, &source, false);
        assert_eq!(material.shading, Shading::Phong);
        assert_eq!(material.texture(), Some("metal.pcx"));
        assert_eq!(
            to_string(
                &Document {
                    materials: vec![material],
                    objects: Vec::new()
                },
                &WriteOptions::default()
            ),
            "MATERIALS{\n2,\"Metal\",PHONG,TMAP \"metal.pcx\",0,ILLUM 0,TRANSP 0;\n}\n\nEND\n"
        );
    }

    #[test]
    fn test_out_of_range_color_saturates() {
        let source = SceneMaterial::new("Hot").with_color([1.5, -0.2, 0.999]);
        let material = convert_material(1, &source, false);
        assert_eq!(material.color, ColorSource::Rgb([255, 0, 254]));
    }

    #[test]
    fn test_first_use_material_order() {
        let scene = Scene {
            materials: vec![
                SceneMaterial::new("a"),
                SceneMaterial::new("b"),
                SceneMaterial::new("c"),
            ],
            objects: vec![
                {
                    let mut object = square("first");
                    object.polygons = vec![
                        ScenePolygon::new(2, vec![0, 1, 2]),
                        ScenePolygon::new(0, vec![0, 2, 3]),
                        ScenePolygon::new(2, vec![0, 1, 3]),
                    ];
                    object
                },
                {
                    let mut object = square("second");
                    object.polygons = vec![ScenePolygon::new(1, vec![0, 1, 2])];
                    object
                },
            ],
        };

        let export = build_document(&scene, &config()).unwrap();
        let names: Vec<_> = export
            .document
            .materials
            .iter()
            .map(|m| (m.index, m.name.clone().unwrap()))
            .collect();
        assert_eq!(
            names,
            vec![
                (1, "c".to_string()),
                (2, "a".to_string()),
                (3, "b".to_string())
            ]
        );

        let first = &export.document.objects[0];
        let refs: Vec<_> = first.faces.iter().map(|f| f.material).collect();
        assert_eq!(refs, vec![0, 1, 0]);
        assert_eq!(export.document.objects[1].faces[0].material, 2);
    }

    #[test]
    fn test_duplicate_catalog_entries_share_material() {
        let scene = Scene {
            materials: vec![SceneMaterial::new("same"), SceneMaterial::new("same")],
            objects: vec![{
                let mut object = square("o");
                object.polygons = vec![
                    ScenePolygon::new(0, vec![0, 1, 2]),
                    ScenePolygon::new(1, vec![0, 2, 3]),
                ];
                object
            }],
        };

        let export = build_document(&scene, &config()).unwrap();
        assert_eq!(export.document.materials.len(), 1);
    }

    #[test]
    fn test_world_matrix_and_names() {
        let mut object = square("Lever_Arm");
        object.matrix_world = Matrix4::new_translation(&Vector3::new(10.0, 0.0, -2.0))
            * Matrix4::new_scaling(2.0);
        object.polygons = vec![ScenePolygon::new(0, vec![0, 1, 2])];
        let scene = Scene {
            materials: vec![SceneMaterial::new("m")],
            objects: vec![object],
        };

        let export = build_document(&scene, &config()).unwrap();
        let converted = &export.document.objects[0];
        assert_eq!(converted.name, "lever_arm");
        assert_relative_eq!(converted.points[2].x, 12.0);
        assert_relative_eq!(converted.points[2].y, 2.0);
        assert_relative_eq!(converted.points[2].z, -2.0);

        let keep_case = ExportConfig {
            lowercase_names: false,
            ..config()
        };
        let export = build_document(&scene, &keep_case).unwrap();
        assert_eq!(export.document.objects[0].name, "Lever_Arm");
    }

    #[test]
    fn test_fan_triangulation_keeps_uv() {
        let mut object = square("quad");
        object.polygons = vec![ScenePolygon::new(0, vec![0, 1, 2, 3]).with_uv(vec![
            Uv::new(0.0, 0.0),
            Uv::new(1.0, 0.0),
            Uv::new(1.0, 1.0),
            Uv::new(0.0, 1.0),
        ])];
        let scene = Scene {
            materials: vec![SceneMaterial::new("tex").with_texture("tex.pcx")],
            objects: vec![object],
        };

        let export = build_document(&scene, &config()).unwrap();
        let faces = &export.document.objects[0].faces;
        assert_eq!(faces.len(), 2);
        assert_eq!(faces[0].vertices, vec![0, 1, 2]);
        assert_eq!(faces[1].vertices, vec![0, 2, 3]);
        assert_eq!(
            faces[1].uv.as_deref(),
            Some(&[Uv::new(0.0, 0.0), Uv::new(1.0, 1.0), Uv::new(0.0, 1.0)][..])
        );

        let whole = ExportConfig {
            triangulate: false,
            ..config()
        };
        let export = build_document(&scene, &whole).unwrap();
        assert_eq!(export.document.objects[0].faces[0].vertices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_uv_only_for_textured_faces() {
        let mut object = square("mixed");
        object.polygons = vec![
            ScenePolygon::new(0, vec![0, 1, 2]).with_uv(vec![Uv::new(0.5, 0.5); 3]),
            ScenePolygon::new(1, vec![0, 2, 3]),
        ];
        let scene = Scene {
            materials: vec![
                SceneMaterial::new("plain"),
                SceneMaterial::new("tex").with_texture("tex.pcx"),
            ],
            objects: vec![object],
        };

        let export = build_document(&scene, &config()).unwrap();
        let faces = &export.document.objects[0].faces;
        assert!(faces[0].uv.is_none());
        assert_eq!(faces[1].uv.as_deref(), Some(&[Uv::zeros(); 3][..]));

        let text = to_string(&export.document, &WriteOptions::default());
        assert!(text.contains("PART_MAPPINGS{\n0,(-1.000000,-1.000000),(-1.000000,-1.000000),(-1.000000,-1.000000);\n"));
        assert!(text.contains("\n1,(0.000000,0.000000),(0.000000,0.000000),(0.000000,0.000000);\n"));
    }

    #[test]
    fn test_textures_to_copy() {
        let mut installed = SceneMaterial::new("stock").with_texture("stock.pcx");
        installed.nocopy = true;
        let mut object = square("o");
        object.polygons = vec![
            ScenePolygon::new(0, vec![0, 1, 2]),
            ScenePolygon::new(1, vec![0, 2, 3]),
            ScenePolygon::new(2, vec![0, 1, 3]),
        ];
        let scene = Scene {
            materials: vec![
                SceneMaterial::new("custom").with_texture("custom.pcx"),
                installed,
                SceneMaterial::new("plain"),
            ],
            objects: vec![object],
        };

        let export = build_document(&scene, &config()).unwrap();
        assert_eq!(export.textures, vec!["custom.pcx".to_string()]);
    }

    #[test]
    fn test_missing_materials() {
        let mut object = square("Lever");
        object.polygons = vec![ScenePolygon {
            material: None,
            vertices: vec![0, 1, 2],
            uv: None,
        }];
        let scene = Scene {
            materials: Vec::new(),
            objects: vec![object],
        };

        let err = build_document(&scene, &config()).unwrap_err();
        assert_eq!(err, SceneError::NoMaterials("Lever".to_string()));
    }

    #[test]
    fn test_helper_without_materials() {
        let axle = SceneObject::new(
            "@x_axle",
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0)],
        );
        let scene = Scene {
            materials: Vec::new(),
            objects: vec![axle],
        };

        let export = build_document(&scene, &config()).unwrap();
        assert!(export.document.materials.is_empty());
        assert!(export.document.objects[0].faces.is_empty());
    }

    #[test]
    fn test_objects_need_points() {
        let scene = Scene {
            materials: Vec::new(),
            objects: vec![SceneObject::new("@x_empty", Vec::new())],
        };

        let err = build_document(&scene, &config()).unwrap_err();
        assert_eq!(err, SceneError::NoPoints("@x_empty".to_string()));
    }

    #[test]
    fn test_unwritable_names() {
        let scene_with = |object_name: &str, material: SceneMaterial| {
            let mut object = square(object_name);
            object.polygons = vec![ScenePolygon::new(0, vec![0, 1, 2])];
            Scene {
                materials: vec![material],
                objects: vec![object],
            }
        };

        let err = build_document(&scene_with("say \"hi\"", SceneMaterial::new("m")), &config());
        assert_eq!(err, Err(SceneError::QuotedName("say \"hi\"".to_string())));

        let err = build_document(&scene_with("o", SceneMaterial::new("6\" pipe")), &config());
        assert!(matches!(err, Err(SceneError::QuotedName(_))));

        let textured = SceneMaterial::new("m").with_texture("a\"b.pcx");
        let err = build_document(&scene_with("o", textured), &config());
        assert!(matches!(err, Err(SceneError::QuotedName(_))));

        let closing = ExportConfig {
            comment: "// done }".to_string(),
            ..config()
        };
        let err = build_document(&scene_with("o", SceneMaterial::new("m")), &closing);
        assert_eq!(err, Err(SceneError::BadComment));
    }

    #[test]
    fn test_polygon_without_slot_uses_fallback() {
        let mut object = square("o");
        object.polygons = vec![
            ScenePolygon::new(0, vec![0, 1, 2]),
            ScenePolygon {
                material: None,
                vertices: vec![0, 2, 3],
                uv: None,
            },
        ];
        let scene = Scene {
            materials: vec![SceneMaterial::new("m")],
            objects: vec![object],
        };

        let export = build_document(&scene, &config()).unwrap();
        let fallback = &export.document.materials[1];
        assert_eq!(fallback.name.as_deref(), Some(""));
        assert_eq!(fallback.color, ColorSource::Rgb([204, 204, 204]));
        assert_eq!(fallback.transparency, Some(0));
    }

    #[test]
    fn test_invalid_polygons() {
        let scene_with = |polygon: ScenePolygon| {
            let mut object = square("bad");
            object.polygons = vec![polygon];
            Scene {
                materials: vec![SceneMaterial::new("m")],
                objects: vec![object],
            }
        };

        let err = build_document(&scene_with(ScenePolygon::new(3, vec![0, 1, 2])), &config());
        assert!(matches!(err, Err(SceneError::UnknownMaterial { material: 3, .. })));

        let err = build_document(&scene_with(ScenePolygon::new(0, vec![0, 1, 9])), &config());
        assert!(matches!(err, Err(SceneError::BadVertex { vertex: 9, .. })));

        let err = build_document(&scene_with(ScenePolygon::new(0, vec![0, 1])), &config());
        assert!(matches!(err, Err(SceneError::DegeneratePolygon { .. })));

        let polygon = ScenePolygon::new(0, vec![0, 1, 2]).with_uv(vec![Uv::zeros(); 2]);
        let err = build_document(&scene_with(polygon), &config());
        assert!(matches!(err, Err(SceneError::UvMismatch { uv: 2, vertices: 3, .. })));
    }
}
