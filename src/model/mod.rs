// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Document model shared by the importer and the exporter

mod document;

pub use document::{ColorSource, Document, Face, Material, Object, Shading, Uv};
