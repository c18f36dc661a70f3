//! Shared utilities for command implementations

use anyhow::Context;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{NimbusCtlError, Result as CliResult};

/// Truncate string to max length with ellipsis (Unicode-safe)
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let graphemes: Vec<&str> = s.graphemes(true).collect();

    if graphemes.len() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let truncated: String = graphemes[..max_len - 3].join("");
        format!("{}...", truncated)
    } else {
        graphemes[..max_len].join("")
    }
}

/// First few characters of an API key for display, never the whole secret
///
/// Char-based so keys containing multi-byte characters cannot panic a slice.
pub fn key_preview(key: &str) -> String {
    key.chars().take(8).collect()
}

/// Format status text with color
pub fn format_status_text(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "active" | "finished" => status.green().to_string(),
        "queued" | "saving" | "pending" | "down" | "new" | "running" => {
            status.yellow().to_string()
        }
        "error" | "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}

/// Format date in human-readable format
pub fn format_date(date_str: String) -> String {
    if date_str.is_empty() {
        return "-".to_string();
    }

    // If it's already formatted (e.g., "2024-04-09 02:22:05"), keep it
    if date_str.contains(' ') && !date_str.contains('T') {
        return date_str;
    }

    // Try to parse as ISO8601/RFC3339
    if let Ok(dt) = DateTime::parse_from_rfc3339(&date_str) {
        let utc: DateTime<Utc> = dt.into();
        let now = Utc::now();
        let duration = now.signed_duration_since(utc);

        // Show relative time for recent items
        if duration.num_days() == 0 {
            if duration.num_hours() == 0 {
                return format!("{} min ago", duration.num_minutes());
            }
            return format!("{} hours ago", duration.num_hours());
        } else if duration.num_days() < 7 {
            return format!("{} days ago", duration.num_days());
        }

        // Show date for older items
        return utc.format("%Y-%m-%d").to_string();
    }

    // Fallback to original string
    date_str
}

/// Format byte size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const GB: f64 = 1024.0 * 1024.0 * 1024.0;
    const MB: f64 = 1024.0 * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.1}GB", b / GB)
    } else if b >= MB {
        format!("{:.0}MB", b / MB)
    } else {
        format!("{}B", bytes)
    }
}

/// Apply JMESPath query to JSON data (using extended runtime with 400+ functions)
pub fn apply_jmespath(data: &Value, query: &str) -> CliResult<Value> {
    let expr = crate::output::compile_jmespath(query)
        .with_context(|| format!("Invalid JMESPath expression: {}", query))?;

    expr.search(data)
        .with_context(|| format!("Failed to apply JMESPath query: {}", query))
        .map_err(Into::into)
}

/// Prompts the user for confirmation
pub fn confirm_action(message: &str) -> CliResult<bool> {
    print!("Are you sure you want to {}? [y/N]: ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().eq_ignore_ascii_case("y") || input.trim().eq_ignore_ascii_case("yes"))
}

/// Read file input, supporting @filename notation
pub fn read_file_input(input: &str) -> CliResult<String> {
    if let Some(filename) = input.strip_prefix('@') {
        fs::read_to_string(filename)
            .with_context(|| format!("Failed to read file: {}", filename))
            .map_err(|e| NimbusCtlError::FileError {
                path: filename.to_string(),
                message: e.to_string(),
            })
    } else {
        Ok(input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write as _;

    #[test]
    fn test_truncate_string_ascii() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("hello", 5), "hello");
        assert_eq!(truncate_string("hello", 4), "h...");
        assert_eq!(truncate_string("abc", 2), "ab");
    }

    #[test]
    fn test_truncate_string_unicode() {
        // Each emoji is one grapheme cluster
        assert_eq!(truncate_string("Hello \u{1f44b} World", 10), "Hello \u{1f44b}...");
        assert_eq!(truncate_string("\u{4f60}\u{597d}\u{4e16}\u{754c}", 3), "\u{4f60}\u{597d}\u{4e16}");
    }

    #[test]
    fn test_truncate_string_edge_cases() {
        assert_eq!(truncate_string("", 10), "");
        assert_eq!(truncate_string("hello", 0), "");
        assert_eq!(truncate_string("hello", 1), "h");
        assert_eq!(truncate_string("abc", 3), "abc");
    }

    #[test]
    fn test_key_preview_truncates() {
        assert_eq!(key_preview("0123456789abcdef"), "01234567");
        assert_eq!(key_preview("short"), "short");
        assert_eq!(key_preview(""), "");
    }

    #[test]
    fn test_key_preview_multibyte_key() {
        // Byte 8 falls inside the third character; a byte slice would panic
        assert_eq!(key_preview("\u{79d8}\u{5bc6}\u{9375}\u{30c8}\u{30fc}\u{30af}\u{30f3}\u{9577}\u{3044}"), "\u{79d8}\u{5bc6}\u{9375}\u{30c8}\u{30fc}\u{30af}\u{30f3}\u{9577}");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(5 * 1024 * 1024), "5MB");
        assert_eq!(format_size(12 * 1024 * 1024 * 1024 + 512 * 1024 * 1024), "12.5GB");
    }

    #[test]
    fn test_format_date_empty() {
        assert_eq!(format_date(String::new()), "-");
    }

    #[test]
    fn test_format_date_already_formatted() {
        assert_eq!(
            format_date("2024-04-09 02:22:05".to_string()),
            "2024-04-09 02:22:05"
        );
    }

    #[test]
    fn test_format_date_old_rfc3339_shows_date() {
        assert_eq!(format_date("2020-01-15T10:30:00Z".to_string()), "2020-01-15");
    }

    #[test]
    fn test_format_date_invalid_passes_through() {
        assert_eq!(format_date("not-a-date".to_string()), "not-a-date");
    }

    #[test]
    fn test_apply_jmespath_filters_by_status() {
        let data = json!([
            {"id": "img-1", "status": "active"},
            {"id": "img-2", "status": "error"}
        ]);

        let result = apply_jmespath(&data, "[?status==`active`].id").unwrap();
        assert_eq!(result, json!(["img-1"]));
    }

    #[test]
    fn test_apply_jmespath_invalid_expression() {
        let data = json!({});
        let err = apply_jmespath(&data, "[?").unwrap_err();
        assert!(err.to_string().contains("Invalid JMESPath expression"));
    }

    #[test]
    fn test_read_file_input_literal() {
        let input = r#"{"name": "img"}"#;
        assert_eq!(read_file_input(input).unwrap(), input);
    }

    #[test]
    fn test_read_file_input_at_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "img"}}"#).unwrap();

        let arg = format!("@{}", file.path().display());
        assert_eq!(read_file_input(&arg).unwrap(), r#"{"name": "img"}"#);
    }

    #[test]
    fn test_read_file_input_missing_file() {
        let err = read_file_input("@/nonexistent/path.json").unwrap_err();
        assert!(matches!(err, NimbusCtlError::FileError { .. }));
    }
}
