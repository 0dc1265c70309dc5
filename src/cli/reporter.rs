// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use super::checker::{DocumentStats, FileReport};
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report one checked file on a single line
    pub fn report_file(report: &FileReport, verbose: bool) {
        let path = report.path.display().to_string();
        match report.outcome {
            Ok(ref stats) if verbose => println!(
                "{} {} {}",
                "✅".green(),
                path.cyan(),
                format!(
                    "({} materials, {} objects, {} points, {} parts, {})",
                    stats.materials,
                    stats.objects,
                    stats.points,
                    stats.faces,
                    Self::format_duration(report.duration)
                )
                .bright_black()
            ),
            Ok(_) => println!("{} {}", "✅".green(), path.cyan()),
            Err(ref message) => println!("{} {}: {}", "❌".red(), path.cyan(), message.red()),
        }
    }

    /// Summary after a batch check
    pub fn report_summary(reports: &[FileReport]) {
        let total = reports.len();
        let passed = reports.iter().filter(|r| r.passed()).count();
        let failed = total - passed;

        println!("\n{}", "═".repeat(80).bright_black());
        println!(
            "{} {} | {} {} | {} {}",
            "Total:".bright_black(),
            total.to_string().cyan(),
            "Passed:".bright_black(),
            passed.to_string().green(),
            "Failed:".bright_black(),
            if failed > 0 {
                failed.to_string().red()
            } else {
                failed.to_string().green()
            }
        );
        println!("{}", "═".repeat(80).bright_black());
    }

    /// Report a parsed document
    pub fn report_document(file: &Path, stats: &DocumentStats, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Parsed:".bold(), file.display().to_string().cyan());
        println!("{}", "━".repeat(80).bright_black());
        Self::print_count("Materials:", stats.materials);
        Self::print_count("Objects:", stats.objects);
        Self::print_count("Points:", stats.points);
        Self::print_count("Parts:", stats.faces);
        println!(
            "  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report a written export
    pub fn report_export(output: &Path, stats: &DocumentStats, textures: &[String]) {
        println!(
            "{} {} ({} objects, {} materials)",
            "✅".green(),
            output.display().to_string().green(),
            stats.objects,
            stats.materials
        );
        if !textures.is_empty() {
            println!("  {}", "Textures to copy:".bright_black());
            for texture in textures {
                println!("    {}", texture.cyan());
            }
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report info
    pub fn report_info(message: &str) {
        println!("{} {}", "ℹ️".bright_blue(), message);
    }

    fn print_count(name: &str, count: usize) {
        println!("  {} {}", name.bright_black(), count.to_string().cyan());
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
