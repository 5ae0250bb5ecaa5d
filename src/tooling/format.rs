//! Format listings, image stats, and build reports for the terminal.

use crate::image::{BuildReport, ImageStats};
use crate::path::ImagePath;
use crate::tree::IndexTree;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;

/// Format a directory listing: a quoted header, subdirectories in blue, then
/// files in green, and a closing blank line.
pub fn format_listing_text(path: &ImagePath, table: &IndexTree, color: bool) -> String {
    let mut out = String::new();
    let header = format!("'{}':", path);
    if color {
        out.push_str(&format!("\t{}\n", header.white()));
    } else {
        out.push_str(&format!("\t{}\n", header));
    }
    for name in table.nested().keys() {
        if color {
            out.push_str(&format!("{}\n", name.blue()));
        } else {
            out.push_str(&format!("{}\n", name));
        }
    }
    for name in table.contained().keys() {
        if color {
            out.push_str(&format!("{}\n", name.green()));
        } else {
            out.push_str(&format!("{}\n", name));
        }
    }
    out.push('\n');
    out
}

/// Format a directory listing as JSON.
pub fn format_listing_json(path: &ImagePath, table: &IndexTree) -> String {
    let files: Vec<_> = table
        .contained()
        .iter()
        .map(|(name, offset)| json!({ "name": name, "offset": offset }))
        .collect();
    let value = json!({
        "path": path.to_string(),
        "directories": table.nested().keys().collect::<Vec<_>>(),
        "files": files,
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

/// Format image stats as a two-column table.
pub fn format_stats_text(stats: &ImageStats) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec!["Image size".to_string(), stats.image_size.to_string()]);
    table.add_row(vec!["Index size".to_string(), stats.table_size.to_string()]);
    table.add_row(vec![
        "Payload offset".to_string(),
        stats.payload_offset.to_string(),
    ]);
    table.add_row(vec!["Payload size".to_string(), stats.payload_size.to_string()]);
    table.add_row(vec!["Directories".to_string(), stats.directories.to_string()]);
    table.add_row(vec!["Files".to_string(), stats.files.to_string()]);
    format!("{}\n", table)
}

/// Format image stats as JSON.
pub fn format_stats_json(stats: &ImageStats) -> String {
    serde_json::to_string_pretty(stats).unwrap_or_default()
}

/// One-line summary of a finished build.
pub fn format_build_report(report: &BuildReport) -> String {
    format!(
        "tables {} bytes, bunch {} bytes, {} directories, {} files",
        report.table_size, report.payload_size, report.directories, report.files
    )
}
