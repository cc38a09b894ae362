use chrono::Local;
use std::collections::HashMap;

/// File extension used by action records.
pub const RECORD_EXTENSION: &str = "md";

/// Prefix applied to relocated payload files so they never collide with an
/// organically created note of the same name.
pub const PAYLOAD_PREFIX: &str = "FILE_";

const FRONTMATTER_DELIMITER: &str = "---";

/// The header of an action record: the fixed fields every record carries
/// plus caller-supplied key/value pairs, in insertion order.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub item_type: String,
    pub created: String,
    pub status: String,
    pub priority: String,
    pub fields: Vec<(String, String)>,
}

impl ActionRecord {
    pub fn new(item_type: &str) -> Self {
        ActionRecord {
            item_type: item_type.to_string(),
            created: Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            status: "pending".to_string(),
            priority: "normal".to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, key: &str, value: impl ToString) -> Self {
        self.fields.push((key.to_string(), value.to_string()));
        self
    }

    /// Render the `---` delimited header block.
    pub fn frontmatter(&self) -> String {
        let mut lines = vec![
            FRONTMATTER_DELIMITER.to_string(),
            format!("type: {}", self.item_type),
            format!("created: {}", self.created),
            format!("status: {}", self.status),
            format!("priority: {}", self.priority),
        ];
        for (key, value) in &self.fields {
            lines.push(format!("{}: {}", key, value));
        }
        lines.push(FRONTMATTER_DELIMITER.to_string());
        lines.join("\n")
    }
}

/// Tolerant line-oriented frontmatter parser.
///
/// Scans between the first pair of `---` delimiter lines; every line in
/// that region containing a `:` contributes one key/value pair (first `:`
/// splits, both sides trimmed). Lines without a separator are ignored, all
/// values stay plain text, and malformed or missing delimiters yield an
/// empty map rather than an error.
pub fn parse_frontmatter(content: &str) -> HashMap<String, String> {
    let mut frontmatter = HashMap::new();
    let mut in_frontmatter = false;

    for line in content.lines() {
        if line.trim() == FRONTMATTER_DELIMITER {
            if !in_frontmatter {
                in_frontmatter = true;
                continue;
            }
            break;
        }

        if in_frontmatter {
            if let Some((key, value)) = line.split_once(':') {
                frontmatter.insert(key.trim().to_string(), value.trim().to_string());
            }
        }
    }

    frontmatter
}

/// The text after the frontmatter block.
///
/// Only strips when the document's first line is the opening delimiter;
/// an unterminated block or a document without frontmatter is returned
/// whole, mirroring the tolerance of `parse_frontmatter`.
pub fn strip_frontmatter(content: &str) -> &str {
    let mut seen_open = false;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let end = offset + line.len();
        if line.trim() == FRONTMATTER_DELIMITER {
            if !seen_open {
                seen_open = true;
            } else {
                return &content[end..];
            }
        } else if !seen_open {
            return content;
        }
        offset = end;
    }

    content
}

/// Map a lowercase file extension (no leading dot) to its category.
/// Total: anything not in the table, including the empty extension, is
/// "unknown".
pub fn category_for_extension(extension: &str) -> &'static str {
    match extension {
        "pdf" | "doc" | "docx" | "txt" | "md" => "document",
        "xls" | "xlsx" | "csv" => "spreadsheet",
        "jpg" | "jpeg" | "png" | "gif" | "webp" => "image",
        "mp3" | "wav" => "audio",
        "mp4" | "mov" => "video",
        "zip" | "rar" | "tar" | "gz" => "archive",
        _ => "unknown",
    }
}

/// Suggested next actions per category, rendered into the record's
/// checklist. Unrecognized categories fall back to the "unknown" list.
pub fn suggested_actions(category: &str) -> &'static [&'static str] {
    match category {
        "document" => &[
            "Review document content",
            "Extract key information",
            "Categorize and file appropriately",
            "Take any required actions",
        ],
        "spreadsheet" => &[
            "Review data content",
            "Update accounting records if financial",
            "Archive after processing",
        ],
        "image" => &[
            "Review image content",
            "Add to appropriate project folder",
            "Extract text if OCR needed",
        ],
        "audio" => &[
            "Transcribe if needed",
            "Extract key points",
            "File appropriately",
        ],
        "video" => &[
            "Review video content",
            "Extract key information",
            "File appropriately",
        ],
        "archive" => &[
            "Extract archive contents",
            "Process extracted files",
            "Clean up archive",
        ],
        _ => &[
            "Identify file type",
            "Review content",
            "Process accordingly",
        ],
    }
}

/// Render action texts as unchecked markdown checklist lines.
pub fn render_checklist(actions: &[&str]) -> String {
    actions
        .iter()
        .map(|action| format!("- [ ] {}", action))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Human-readable file size with one decimal place.
pub fn format_size(size_bytes: u64) -> String {
    let mut size = size_bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if size < 1024.0 {
            return format!("{:.1} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1} TB", size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontmatter_round_trip() {
        let record = ActionRecord::new("file_drop")
            .with_field("original_name", "invoice 2024.pdf")
            .with_field("size", 50000u64)
            .with_field("category", "document")
            .with_field("hash", "deadbeef");

        let text = format!("{}\n\nbody text", record.frontmatter());
        let parsed = parse_frontmatter(&text);

        assert_eq!(parsed.get("type").map(String::as_str), Some("file_drop"));
        assert_eq!(parsed.get("status").map(String::as_str), Some("pending"));
        assert_eq!(parsed.get("priority").map(String::as_str), Some("normal"));
        assert_eq!(
            parsed.get("original_name").map(String::as_str),
            Some("invoice 2024.pdf")
        );
        assert_eq!(parsed.get("size").map(String::as_str), Some("50000"));
        assert_eq!(parsed.get("category").map(String::as_str), Some("document"));
        assert_eq!(parsed.get("hash").map(String::as_str), Some("deadbeef"));
        assert_eq!(parsed.len(), 8); // 4 fixed + 4 extra
    }

    #[test]
    fn parser_ignores_lines_without_separator() {
        let text = "---\ntype: note\njust some words\nstatus: pending\n---\n";
        let parsed = parse_frontmatter(text);
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn parser_stops_at_closing_delimiter() {
        let text = "---\ntype: note\n---\nbody: this is not a field\n";
        let parsed = parse_frontmatter(text);
        assert_eq!(parsed.len(), 1);
        assert!(!parsed.contains_key("body"));
    }

    #[test]
    fn missing_delimiters_yield_empty_map() {
        assert!(parse_frontmatter("no frontmatter here\nkey: value\n").is_empty());
        assert!(parse_frontmatter("").is_empty());
    }

    #[test]
    fn first_separator_splits_key_from_value() {
        let text = "---\ncreated: 2024-03-01T10:00:00\n---\n";
        let parsed = parse_frontmatter(text);
        assert_eq!(
            parsed.get("created").map(String::as_str),
            Some("2024-03-01T10:00:00")
        );
    }

    #[test]
    fn strip_frontmatter_returns_the_body() {
        let text = "---\ntype: note\nstatus: pending\n---\n\nThe body starts here.\n";
        assert_eq!(strip_frontmatter(text), "\nThe body starts here.\n");
    }

    #[test]
    fn strip_frontmatter_is_tolerant() {
        // No frontmatter at all.
        assert_eq!(strip_frontmatter("just text\n"), "just text\n");
        // Opening delimiter never closed.
        let unterminated = "---\ntype: note\nno closing line\n";
        assert_eq!(strip_frontmatter(unterminated), unterminated);
        assert_eq!(strip_frontmatter(""), "");
    }

    #[test]
    fn category_table_is_total() {
        assert_eq!(category_for_extension("pdf"), "document");
        assert_eq!(category_for_extension("md"), "document");
        assert_eq!(category_for_extension("csv"), "spreadsheet");
        assert_eq!(category_for_extension("webp"), "image");
        assert_eq!(category_for_extension("wav"), "audio");
        assert_eq!(category_for_extension("mov"), "video");
        assert_eq!(category_for_extension("gz"), "archive");
        assert_eq!(category_for_extension("xyz"), "unknown");
        assert_eq!(category_for_extension(""), "unknown");
    }

    #[test]
    fn document_category_has_four_actions() {
        assert_eq!(suggested_actions("document").len(), 4);
        assert_eq!(suggested_actions("never-heard-of-it").len(), 3);
    }

    #[test]
    fn checklist_lines_are_unchecked() {
        let rendered = render_checklist(suggested_actions("image"));
        for line in rendered.lines() {
            assert!(line.starts_with("- [ ] "));
        }
    }

    #[test]
    fn size_formatting() {
        assert_eq!(format_size(512), "512.0 B");
        assert_eq!(format_size(50000), "48.8 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
