//! Markdown manifest generation
//!
//! The manifest maps every downloaded file name back to its source URL, since
//! file names are assigned by dispatch order and carry no URL information.

use crate::output::CrawlReport;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the manifest inside the output directory
pub const MANIFEST_FILE: &str = "manifest.md";

/// Writes `manifest.md` into `output_dir`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written manifest
/// * `Err(io::Error)` - Failed to write the file
pub fn write_manifest(report: &CrawlReport, output_dir: &Path) -> std::io::Result<PathBuf> {
    let path = output_dir.join(MANIFEST_FILE);
    let markdown = format_manifest(report);

    let mut file = File::create(&path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(path)
}

/// Formats a crawl report as a markdown manifest
pub fn format_manifest(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Sumi-Sieve Image Manifest\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!("- **Status**: {}\n", report.status()));
    md.push_str(&format!("- **Pages Visited**: {}\n", report.visited.len()));
    md.push_str(&format!("- **Images Discovered**: {}\n", report.images.len()));
    md.push_str(&format!(
        "- **Images Downloaded**: {}\n\n",
        report.download.downloaded.len()
    ));

    md.push_str("## Files\n\n");
    md.push_str("| File | Source URL |\n");
    md.push_str("|------|------------|\n");
    for image in &report.download.downloaded {
        let name = image
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        md.push_str(&format!("| {} | {} |\n", name, escape_cell(&image.url)));
    }

    md
}

/// Escapes pipes so a URL cannot break the table row
fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
