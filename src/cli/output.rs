//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::args::{LocalMlFlowArgs, OutputFormat};
use crate::error::Result;

/// Result of a handler invocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvocationResult {
    pub function: String,
    pub request_id: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
    pub duration_ms: u64,
}

/// Result of a dataset upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResult {
    pub bucket: String,
    pub key: String,
    pub bytes: u64,
    pub row_count: usize,
}

/// Summary of the stored dataset.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub bucket: String,
    pub key: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

/// Header of one stored artifact, or `status: "missing"`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactEntry {
    pub location: String,
    pub status: String,
    pub kind: Option<String>,
    pub version: Option<u32>,
    pub created_at: Option<String>,
    pub payload_bytes: Option<usize>,
}

/// Headers of the artifacts written by ingestion.
#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactListing {
    pub artifacts: Vec<ArtifactEntry>,
}

/// The stored score.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreInfo {
    pub bucket: String,
    pub key: String,
    pub score: String,
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize>(message: &str, result: &T, args: &LocalMlFlowArgs) -> Result<()> {
    let text = match args.output_format {
        OutputFormat::Human => render_human(message, result, args.verbosity())?,
        OutputFormat::Json => render_json(result, args.pretty)?,
    };
    println!("{text}");
    Ok(())
}

/// Render in human-readable format: the message (unless quiet) then one
/// `key: value` line per field.
fn render_human<T: Serialize>(message: &str, result: &T, verbosity: u8) -> Result<String> {
    let value = serde_json::to_value(result)?;
    let mut lines = Vec::new();

    if verbosity > 0 {
        lines.push(message.to_string());
        lines.push(String::new());
    }

    match &value {
        Value::Object(obj) => {
            for (key, val) in obj {
                if let Some(items) = val.as_array().filter(|a| a.iter().all(Value::is_object)) {
                    lines.push(format!("{key}:"));
                    lines.extend(items.iter().map(|item| format!("  - {}", format_inline(item))));
                    continue;
                }
                let formatted = if key == "bytes" {
                    val.as_u64().map(format_bytes).unwrap_or_else(|| format_value(val))
                } else {
                    format_value(val)
                };
                lines.push(format!("{key}: {formatted}"));
            }
        }
        other => lines.push(format_value(other)),
    }

    Ok(lines.join("\n"))
}

fn render_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}

/// Format a JSON value for display.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(arr) => {
            let formatted_values = arr.iter().map(format_value).collect::<Vec<_>>().join(", ");
            format!("[{formatted_values}]")
        }
        Value::Object(_) => "[object]".to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Format an object as `key=value` pairs on one line, skipping nulls.
fn format_inline(value: &Value) -> String {
    match value.as_object() {
        Some(obj) => obj
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| format!("{k}={}", format_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        None => format_value(value),
    }
}

/// Format bytes in human-readable format.
fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    let unit = UNITS[unit_index];
    if unit_index == 0 {
        format!("{bytes} {unit}")
    } else {
        format!("{size:.1} {unit}")
    }
}
