// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Recursive-descent parser for E files
//!
//! The file is a sequence of keyword blocks. Materials are global; every
//! `BEGIN` starts a new object that collects the following `POINTS`, `PARTS`
//! and `PART_MAPPINGS` blocks until the next `BEGIN` or the final `END`.

use super::tokenizer::{Token, Tokenizer};
use crate::error::{ParseError, ParseResult};
use crate::model::{ColorSource, Document, Face, Material, Object, Shading, Uv};
use nalgebra::Point3;
use std::collections::BTreeMap;

/// Parse E file text into a document
pub fn parse_e(source: &str) -> ParseResult<Document> {
    Parser::new(source).parse()
}

/// Top-level blocks of an E file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Begin,
    Points,
    Parts,
    PartMappings,
    Materials,
    Comment,
    End,
}

impl Block {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "BEGIN" => Some(Block::Begin),
            "POINTS" => Some(Block::Points),
            "PARTS" => Some(Block::Parts),
            "PART_MAPPINGS" => Some(Block::PartMappings),
            "MATERIALS" => Some(Block::Materials),
            "COMMENT" => Some(Block::Comment),
            "END" => Some(Block::End),
            _ => None,
        }
    }
}

/// Object being filled between `BEGIN` and the next `BEGIN`/`END`
struct ObjectBuilder {
    name: String,
    line: usize,
    points: Vec<Point3<f64>>,
    faces: BTreeMap<usize, Face>,
}

impl ObjectBuilder {
    fn finish(self) -> ParseResult<Object> {
        if self.points.is_empty() {
            return Err(ParseError::at_line(
                format!("object {} has no points", self.name),
                self.line,
            ));
        }
        if self.faces.keys().enumerate().any(|(i, slot)| i != *slot) {
            return Err(ParseError::at_line(
                format!("object {} has non-consecutive parts", self.name),
                self.line,
            ));
        }

        log::debug!(
            "parsed object {:?}: {} points, {} parts",
            self.name,
            self.points.len(),
            self.faces.len()
        );

        Ok(Object {
            name: self.name,
            points: self.points,
            faces: self.faces.into_values().collect(),
        })
    }
}

struct Parser<'a> {
    tokens: Tokenizer<'a>,
    document: Document,
    current: Option<ObjectBuilder>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            tokens: Tokenizer::new(source),
            document: Document::new(),
            current: None,
        }
    }

    fn parse(mut self) -> ParseResult<Document> {
        loop {
            let token = self
                .tokens
                .next()
                .ok_or_else(|| self.tokens.error("END expected"))?;
            let block = Block::from_keyword(token.text).ok_or_else(|| {
                ParseError::at(format!("unexpected '{}'", token.text), token.line, token.column)
            })?;

            match block {
                Block::Begin => self.parse_begin()?,
                Block::Points => self.parse_points(token)?,
                Block::Parts => self.parse_parts(token)?,
                Block::PartMappings => self.parse_part_mappings(token)?,
                Block::Materials => self.parse_materials()?,
                Block::Comment => self.parse_comment()?,
                Block::End => {
                    self.parse_end()?;
                    break;
                }
            }
        }

        log::debug!(
            "parsed {} materials, {} objects",
            self.document.materials.len(),
            self.document.objects.len()
        );
        Ok(self.document)
    }

    fn commit_current(&mut self) -> ParseResult<()> {
        if let Some(builder) = self.current.take() {
            let object = builder.finish()?;
            self.document.objects.push(object);
        }
        Ok(())
    }

    fn parse_comment(&mut self) -> ParseResult<()> {
        self.tokens.expect("{")?;
        self.tokens.skip_to("}")?;
        Ok(())
    }

    fn parse_begin(&mut self) -> ParseResult<()> {
        self.commit_current()?;
        let line = self.tokens.position().0;
        let name = parse_string(&mut self.tokens)?;
        self.current = Some(ObjectBuilder {
            name,
            line,
            points: Vec::new(),
            faces: BTreeMap::new(),
        });
        Ok(())
    }

    fn parse_end(&mut self) -> ParseResult<()> {
        self.commit_current()?;
        self.tokens.expect_end()
    }

    fn parse_materials(&mut self) -> ParseResult<()> {
        self.tokens.expect("{")?;
        while entries_remain(&mut self.tokens) {
            let material = parse_material(&mut self.tokens)?;
            let position = self.document.materials.len() + 1;
            if material.index as usize != position {
                log::warn!(
                    "material {} declared at position {}; parts refer to materials by position",
                    material.index,
                    position
                );
            }
            self.document.materials.push(material);
        }
        self.tokens.expect("}")?;
        Ok(())
    }

    fn parse_points(&mut self, keyword: Token<'a>) -> ParseResult<()> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| ParseError::at_line("POINTS before BEGIN", keyword.line))?;
        let tokens = &mut self.tokens;

        tokens.expect("{")?;
        while entries_remain(tokens) {
            let x = parse_float(tokens.next_then(",")?)?;
            let y = parse_float(tokens.next_then(",")?)?;
            let z = parse_float(tokens.next_then(";")?)?;
            current.points.push(Point3::new(x, y, z));
        }
        tokens.expect("}")?;
        Ok(())
    }

    fn parse_parts(&mut self, keyword: Token<'a>) -> ParseResult<()> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| ParseError::at_line("PARTS before BEGIN", keyword.line))?;
        let materials = &self.document.materials;
        let tokens = &mut self.tokens;

        tokens.expect("{")?;
        while entries_remain(tokens) {
            let flags = parse_i32(tokens.next_then(",")?)?;
            let visibility = tokens.next_then(",")?.text.to_string();

            let slot_token = tokens.next_then(",")?;
            let slot = usize::try_from(parse_int(slot_token)?)
                .map_err(|_| located("bad part index", slot_token))?;

            let material_token = tokens.next_then(",")?;
            let material = parse_hex_byte(material_token)? as usize;
            if material < 1 || material > materials.len() {
                return Err(located("bad material index", material_token));
            }

            tokens.expect("(")?;
            let mut vertices = Vec::new();
            let mut next = tokens.lookahead();
            while next.is_some_and(|token| !token.is(")")) {
                let vertex_token = tokens.next_required()?;
                let vertex = usize::try_from(parse_int(vertex_token)?)
                    .ok()
                    .filter(|v| *v < current.points.len())
                    .ok_or_else(|| located("bad vertex", vertex_token))?;
                vertices.push(vertex);
                next = Some(tokens.expect_one_of(&[",", ")"])?);
            }
            if vertices.len() < 3 {
                return Err(tokens.error("expected number"));
            }
            tokens.expect(";")?;

            current.faces.insert(
                slot,
                Face {
                    flags: (flags != 0).then_some(flags),
                    visibility,
                    material: material - 1,
                    vertices,
                    uv: None,
                },
            );
        }
        tokens.expect("}")?;
        Ok(())
    }

    fn parse_part_mappings(&mut self, keyword: Token<'a>) -> ParseResult<()> {
        let current = self
            .current
            .as_mut()
            .ok_or_else(|| ParseError::at_line("PART_MAPPINGS before BEGIN", keyword.line))?;
        let tokens = &mut self.tokens;

        tokens.expect("{")?;
        while entries_remain(tokens) {
            let slot_token = tokens.next_required()?;
            let face = usize::try_from(parse_int(slot_token)?)
                .ok()
                .and_then(|slot| current.faces.get_mut(&slot))
                .ok_or_else(|| located("bad part index", slot_token))?;

            let mut uv = Vec::with_capacity(face.vertices.len());
            for _ in 0..face.vertices.len() {
                tokens.expect(",")?;
                tokens.expect("(")?;
                let u = parse_float(tokens.next_then(",")?)?;
                let v = parse_float(tokens.next_then(")")?)?;
                uv.push(Uv::new(u, v));
            }
            tokens.expect(";")?;

            face.uv = Some(uv);
        }
        tokens.expect("}")?;
        Ok(())
    }
}

/// `index,["name"],[shading,]colour[,TRANSP n][,ILLUM n][,DBL][,WIRE];`
fn parse_material(tokens: &mut Tokenizer<'_>) -> ParseResult<Material> {
    let index_token = tokens.next_then(",")?;
    let index = u32::try_from(parse_int(index_token)?)
        .ok()
        .filter(|index| *index >= 1)
        .ok_or_else(|| located("bad material index", index_token))?;

    let name = if tokens.peek_is(",") {
        tokens.next();
        None
    } else {
        let name = parse_string(tokens)?;
        tokens.expect(",")?;
        Some(name)
    };

    let shading = if tokens.peek_is(",") {
        tokens.next();
        Shading::Flat
    } else if tokens.peek_is("RGB") || tokens.peek_is("TMAP") {
        Shading::Flat
    } else {
        let token = tokens.expect_one_of(&Shading::KEYWORDS)?;
        tokens.expect(",")?;
        token
            .text
            .parse()
            .map_err(|message: String| located(message, token))?
    };

    let color = match tokens.expect_one_of(&["RGB", "TMAP"])?.text {
        "RGB" => {
            let r = parse_channel(tokens.next_then(",")?)?;
            let g = parse_channel(tokens.next_then(",")?)?;
            let b = parse_channel(tokens.next_required()?)?;
            ColorSource::Rgb([r, g, b])
        }
        _ => {
            let file = parse_string(tokens)?;
            tokens.expect(",")?;
            let intensity = parse_i32(tokens.next_required()?)?;
            ColorSource::Texture { file, intensity }
        }
    };

    let mut material = Material {
        index,
        name,
        shading,
        color,
        transparency: None,
        illumination: None,
        double_sided: false,
        wireframe: false,
    };

    while tokens.lookahead().is_some_and(|token| !token.is(";")) {
        tokens.expect(",")?;
        match tokens.expect_one_of(&["TRANSP", "ILLUM", "DBL", "WIRE"])?.text {
            "TRANSP" => material.transparency = Some(parse_i32(tokens.next_required()?)?),
            "ILLUM" => material.illumination = Some(parse_i32(tokens.next_required()?)?),
            "DBL" => material.double_sided = true,
            _ => material.wireframe = true,
        }
    }
    tokens.expect(";")?;

    Ok(material)
}

/// `"raw text"`
fn parse_string(tokens: &mut Tokenizer<'_>) -> ParseResult<String> {
    tokens.expect("\"")?;
    tokens.skip_to("\"")
}

/// Whether another entry follows before the closing brace
fn entries_remain(tokens: &mut Tokenizer<'_>) -> bool {
    tokens.lookahead().is_some_and(|token| !token.is("}"))
}

fn located(message: impl Into<String>, token: Token<'_>) -> ParseError {
    ParseError::at(message, token.line, token.column)
}

fn parse_int(token: Token<'_>) -> ParseResult<i64> {
    token
        .text
        .parse()
        .map_err(|_| located("bad number", token))
}

fn parse_i32(token: Token<'_>) -> ParseResult<i32> {
    i32::try_from(parse_int(token)?).map_err(|_| located("bad number", token))
}

fn parse_channel(token: Token<'_>) -> ParseResult<u8> {
    u8::try_from(parse_int(token)?).map_err(|_| located("bad number", token))
}

fn parse_float(token: Token<'_>) -> ParseResult<f64> {
    token
        .text
        .parse()
        .map_err(|_| located("bad number", token))
}

/// Low byte of a base-16 integer with optional sign and `0x` prefix.
///
/// Only the last two digits can affect the byte, so references of any
/// length are accepted.
fn parse_hex_byte(token: Token<'_>) -> ParseResult<u8> {
    let text = token.text;
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(located("bad number", token));
    }
    let tail = &digits[digits.len().saturating_sub(2)..];
    let byte = u8::from_str_radix(tail, 16).map_err(|_| located("bad number", token))?;
    Ok(if negative { byte.wrapping_neg() } else { byte })
}
