// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! emesh command line tool

use anyhow::Result;
use clap::{Parser, Subcommand};
use emesh::cli::{collect_files, init_with_level, logging, Checker, DocumentStats, Reporter};
use emesh::{export_scene, import_e_file, load_scene, ExportConfig};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "emesh")]
#[command(about = "Parse, validate and export E mesh files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an E file and output the document as JSON
    Parse {
        /// Input E file
        input: PathBuf,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check E files or directories of E files
    Check {
        /// Files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Export a JSON scene description to an E file
    Export {
        /// Input scene JSON
        scene: PathBuf,

        /// Output E file
        #[arg(short, long)]
        output: PathBuf,

        /// Configuration file (defaults to ./emesh.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_with_level(&["emesh"], logging::default_level(cli.verbose));

    let result = match cli.command {
        Commands::Parse { input, output } => parse_command(&input, output.as_deref(), cli.verbose),
        Commands::Check { paths } => check_command(&paths, cli.verbose),
        Commands::Export {
            scene,
            output,
            config,
        } => export_command(&scene, &output, config.as_deref()),
        Commands::Version => {
            println!("emesh v{}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            Reporter::report_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn parse_command(input: &Path, output: Option<&Path>, verbose: bool) -> Result<bool> {
    let start = Instant::now();
    let document = import_e_file(input)?;
    let duration = start.elapsed();

    let json = serde_json::to_string_pretty(&document)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)?;
            if verbose {
                Reporter::report_document(input, &DocumentStats::of(&document), duration);
            }
            Reporter::report_info(&format!("Document written to: {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(true)
}

fn check_command(paths: &[PathBuf], verbose: bool) -> Result<bool> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        Reporter::report_info("No E files found");
        return Ok(true);
    }

    let checker = if files.len() > 1 {
        Checker::with_progress()
    } else {
        Checker::new()
    };
    let reports = checker.check_all(&files);

    for report in &reports {
        if verbose || !report.passed() {
            Reporter::report_file(report, verbose);
        }
    }
    Reporter::report_summary(&reports);

    Ok(reports.iter().all(|r| r.passed()))
}

fn export_command(scene: &Path, output: &Path, config: Option<&Path>) -> Result<bool> {
    let config = match config {
        Some(path) => ExportConfig::from_file(path)?,
        None => ExportConfig::load()?,
    };

    let scene = load_scene(scene)?;
    let export = export_scene(&scene, output, &config)?;

    Reporter::report_export(output, &DocumentStats::of(&export.document), &export.textures);
    Ok(true)
}
