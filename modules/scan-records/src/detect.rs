//! JSON-Lines vs. single-document detection.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Lines (blank ones included) read before giving up on finding content.
pub const DETECT_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// One JSON value per line.
    JsonLines,
    /// The whole file is one JSON value (usually a pretty-printed array).
    Document,
}

/// Classify `path` by its first non-blank line: if that line is a complete JSON
/// value the file is JSON-Lines, otherwise it is a single document.
///
/// Never fails. An unreadable or blank file is reported as `Document`, whose
/// whole-file parse then yields no records.
pub fn detect_format(path: &Path) -> Format {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot open for detection");
            return Format::Document;
        }
    };
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    for _ in 0..DETECT_WINDOW {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = String::from_utf8_lossy(&buf);
        let line = strip_bom(line.trim());
        if line.is_empty() {
            continue;
        }
        return classify_line(line);
    }
    Format::Document
}

fn classify_line(line: &str) -> Format {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(_) => Format::JsonLines,
        Err(_) => Format::Document,
    }
}

pub(crate) fn strip_bom(s: &str) -> &str {
    s.strip_prefix('\u{feff}').unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn object_per_line_is_jsonl() {
        let f = file_with("{\"ip\":\"10.0.0.1\"}\n{\"ip\":\"10.0.0.2\"}\n");
        assert_eq!(detect_format(f.path()), Format::JsonLines);
    }

    #[test]
    fn leading_blank_lines_are_skipped() {
        let f = file_with("\n   \n\t\n{\"ip\":\"10.0.0.1\"}\n");
        assert_eq!(detect_format(f.path()), Format::JsonLines);
    }

    #[test]
    fn pretty_array_is_document() {
        let f = file_with("[\n  {\"ip\": \"10.0.0.1\"}\n]\n");
        assert_eq!(detect_format(f.path()), Format::Document);
    }

    #[test]
    fn single_line_array_is_jsonl() {
        let f = file_with("[{\"ip\":\"10.0.0.1\"},{\"ip\":\"10.0.0.2\"}]");
        assert_eq!(detect_format(f.path()), Format::JsonLines);
    }

    #[test]
    fn blank_and_missing_files_are_document() {
        let f = file_with("\n\n\n");
        assert_eq!(detect_format(f.path()), Format::Document);
        assert_eq!(detect_format(Path::new("/definitely/not/here.json")), Format::Document);
    }

    #[test]
    fn content_past_the_window_is_not_seen() {
        let mut content = "\n".repeat(DETECT_WINDOW);
        content.push_str("{\"ip\":\"10.0.0.1\"}\n");
        let f = file_with(&content);
        assert_eq!(detect_format(f.path()), Format::Document);
    }

    #[test]
    fn bom_prefixed_jsonl_is_jsonl() {
        let f = file_with("\u{feff}{\"ip\":\"10.0.0.1\"}\n{\"ip\":\"10.0.0.2\"}\n");
        assert_eq!(detect_format(f.path()), Format::JsonLines);
    }

    #[test]
    fn garbage_first_line_is_document() {
        let f = file_with("not json at all\n{\"ip\":\"10.0.0.1\"}\n");
        assert_eq!(detect_format(f.path()), Format::Document);
    }
}
