//! Output formatting for CLI operations.

use serde_json::json;
use xarc::progress::format_bytes_iec;
use xarc::{CreateResult, ExtractResult};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats creation results
    fn format_create_result(&self, output: &std::path::Path, result: &CreateResult) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_create_result(&self, output: &std::path::Path, result: &CreateResult) -> String {
        let noun = if result.entries_written == 1 { "entry" } else { "entries" };
        format!(
            "Created {} ({}): {} {}, {} read\n",
            output.display(),
            result.format,
            result.entries_written,
            noun,
            format_bytes_iec(result.bytes_read)
        )
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Extracted {} files and {} directories ({}) to {}\n",
            result.entries_extracted,
            result.directories_created,
            format_bytes_iec(result.bytes_written),
            result.output.display()
        ));
        if result.entries_skipped > 0 {
            output.push_str(&format!("Skipped {} entries\n", result.entries_skipped));
        }

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_create_result(&self, output: &std::path::Path, result: &CreateResult) -> String {
        let obj = json!({
            "success": true,
            "output": output.display().to_string(),
            "format": result.format.to_string(),
            "role": result.role.name(),
            "entries_written": result.entries_written,
            "bytes_read": result.bytes_read,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "success": true,
            "output": result.output.display().to_string(),
            "format": result.format.to_string(),
            "entries_extracted": result.entries_extracted,
            "directories_created": result.directories_created,
            "entries_skipped": result.entries_skipped,
            "bytes_written": result.bytes_written,
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string()) + "\n"
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
