// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch validation of E files

use crate::io::parse_e;
use crate::model::Document;
use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use walkdir::WalkDir;

/// Counts for a document that parsed cleanly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub materials: usize,
    pub objects: usize,
    pub points: usize,
    pub faces: usize,
}

impl DocumentStats {
    pub fn of(document: &Document) -> Self {
        Self {
            materials: document.materials.len(),
            objects: document.objects.len(),
            points: document.point_count(),
            faces: document.face_count(),
        }
    }
}

/// Outcome of checking one file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub duration: Duration,
    /// Statistics, or the rendered read/parse error
    pub outcome: Result<DocumentStats, String>,
}

impl FileReport {
    pub fn passed(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Expand the given paths into the list of files to check.
///
/// Directories are walked for `.e` files in sorted order; explicit file
/// arguments are kept whatever their extension.
pub fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_e_file(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            log::debug!("{}: {} E files", path.display(), found.len());
            files.extend(found);
        } else if path.exists() {
            files.push(path.clone());
        } else {
            bail!("Path not found: {}", path.display());
        }
    }

    Ok(files)
}

fn is_e_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("e"))
        .unwrap_or(false)
}

/// Parses files in parallel and collects per-file reports
pub struct Checker {
    show_progress: bool,
}

impl Checker {
    pub fn new() -> Self {
        Self {
            show_progress: false,
        }
    }

    pub fn with_progress() -> Self {
        Self {
            show_progress: true,
        }
    }

    /// Check a single file
    pub fn check_file(path: &Path) -> FileReport {
        let start = Instant::now();
        let outcome = match fs::read_to_string(path) {
            Ok(source) => parse_e(&source)
                .map(|document| DocumentStats::of(&document))
                .map_err(|e| e.to_string()),
            Err(e) => Err(format!("Failed to read file: {}", e)),
        };

        if let Err(ref message) = outcome {
            log::debug!("{}: {}", path.display(), message);
        }

        FileReport {
            path: path.to_path_buf(),
            duration: start.elapsed(),
            outcome,
        }
    }

    /// Check every file, keeping the input order in the result
    pub fn check_all(&self, files: &[PathBuf]) -> Vec<FileReport> {
        let progress = self.show_progress.then(|| {
            let pb = ProgressBar::new(files.len() as u64);
            let style = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
            )
            .map(|style| style.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        });

        let reports: Vec<FileReport> = files
            .par_iter()
            .map(|path| {
                let report = Self::check_file(path);
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
                report
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let failed = reports.iter().filter(|r| !r.passed()).count();
        log::info!("checked {} files, {} failed", reports.len(), failed);
        reports
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}
