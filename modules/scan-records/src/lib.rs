//! Record stream over scanner output files.
//!
//! A [`RecordSource`] remembers a path and its detected [`Format`]; every call
//! to [`RecordSource::records`] reopens the file and yields a fresh, single-pass
//! sequence of loosely-typed records. Unparseable content never surfaces as an
//! error: bad lines are dropped and a bad document yields nothing.

pub mod detect;

pub use detect::{detect_format, Format};

use detect::strip_bom;

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Keys checked, in order, on a top-level document object for a list of hosts.
pub const DOCUMENT_LIST_KEYS: &[&str] = &["hosts", "results"];

#[derive(Debug, Clone)]
pub struct RecordSource {
    path: PathBuf,
    format: Format,
}

impl RecordSource {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = detect_format(&path);
        tracing::debug!(path = %path.display(), ?format, "detected input format");
        RecordSource { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Start a new pass over the file.
    pub fn records(&self) -> Result<Records> {
        let inner = match self.format {
            Format::JsonLines => {
                let file = File::open(&self.path)
                    .with_context(|| format!("opening {}", self.path.display()))?;
                Inner::Lines { reader: BufReader::new(file), buf: Vec::new(), line_no: 0 }
            }
            Format::Document => {
                let bytes = std::fs::read(&self.path)
                    .with_context(|| format!("reading {}", self.path.display()))?;
                let text = String::from_utf8_lossy(&bytes);
                let items = match serde_json::from_str::<Value>(strip_bom(&text)) {
                    Ok(doc) => document_records(doc),
                    Err(e) => {
                        tracing::debug!(path = %self.path.display(), error = %e, "document does not parse, no records");
                        Vec::new()
                    }
                };
                Inner::Document(items.into_iter())
            }
        };
        Ok(Records { inner, pending: VecDeque::new() })
    }

    /// Whether a fresh pass yields at least one record. An unreadable file
    /// has none.
    pub fn has_records(&self) -> bool {
        match self.records() {
            Ok(mut records) => records.next().is_some(),
            Err(e) => {
                tracing::debug!(error = %format!("{:#}", e), "probe could not open source");
                false
            }
        }
    }
}

/// One pass over a [`RecordSource`].
pub struct Records {
    inner: Inner,
    // elements of a list line, handed out before the next line is read
    pending: VecDeque<Value>,
}

enum Inner {
    Lines { reader: BufReader<File>, buf: Vec<u8>, line_no: usize },
    Document(std::vec::IntoIter<Value>),
}

impl Iterator for Records {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        loop {
            if let Some(v) = self.pending.pop_front() {
                return Some(v);
            }
            match &mut self.inner {
                Inner::Document(items) => return items.next(),
                Inner::Lines { reader, buf, line_no } => {
                    buf.clear();
                    match reader.read_until(b'\n', buf) {
                        Ok(0) => return None,
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!(line = *line_no + 1, error = %e, "read failed, ending record stream");
                            return None;
                        }
                    }
                    *line_no += 1;
                    let text = String::from_utf8_lossy(buf);
                    let text = strip_bom(text.trim());
                    if text.is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<Value>(text) {
                        Ok(Value::Array(items)) => self.pending.extend(items),
                        Ok(v) => return Some(v),
                        Err(e) => tracing::trace!(line = *line_no, error = %e, "skipping unparseable line"),
                    }
                }
            }
        }
    }
}

/// Records held by a whole-file document: the elements of a top-level list,
/// the `hosts`/`results` list of a top-level object, or the object itself.
/// Scalars hold none.
pub fn document_records(doc: Value) -> Vec<Value> {
    match doc {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in DOCUMENT_LIST_KEYS {
                if let Some(Value::Array(_)) = map.get(*key) {
                    if let Some(Value::Array(items)) = map.remove(*key) {
                        return items;
                    }
                }
            }
            vec![Value::Object(map)]
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn source_with(content: &str) -> (tempfile::NamedTempFile, RecordSource) {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        let src = RecordSource::open(f.path());
        (f, src)
    }

    fn collect(src: &RecordSource) -> Vec<Value> {
        src.records().unwrap().collect()
    }

    #[test]
    fn jsonl_skips_blank_and_bad_lines() {
        let (_f, src) = source_with("{\"ip\":\"a\"}\n\nnot json\n{\"ip\":\"b\"}\n{broken\n");
        assert_eq!(src.format(), Format::JsonLines);
        assert_eq!(collect(&src), vec![json!({"ip": "a"}), json!({"ip": "b"})]);
    }

    #[test]
    fn jsonl_list_lines_are_flattened() {
        let (_f, src) = source_with("[{\"ip\":\"a\"},{\"ip\":\"b\"}]\n{\"ip\":\"c\"}\n[]\n");
        let ips: Vec<_> = collect(&src).into_iter().map(|v| v["ip"].clone()).collect();
        assert_eq!(ips, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn jsonl_yields_scalars_untouched() {
        let (_f, src) = source_with("42\n\"text\"\n");
        assert_eq!(collect(&src), vec![json!(42), json!("text")]);
    }

    #[test]
    fn document_array_yields_elements() {
        let (_f, src) = source_with("[\n  {\"ip\": \"a\"},\n  {\"ip\": \"b\"}\n]\n");
        assert_eq!(src.format(), Format::Document);
        assert_eq!(collect(&src).len(), 2);
    }

    #[test]
    fn document_object_prefers_hosts_then_results() {
        let doc = json!({"hosts": [{"ip": "a"}], "results": [{"ip": "b"}, {"ip": "c"}]});
        assert_eq!(document_records(doc), vec![json!({"ip": "a"})]);

        let doc = json!({"hosts": "nope", "results": [{"ip": "b"}, {"ip": "c"}]});
        assert_eq!(document_records(doc).len(), 2);

        let doc = json!({"ip": "10.0.0.9", "hosts": {"not": "a list"}});
        assert_eq!(document_records(doc.clone()), vec![doc]);
    }

    #[test]
    fn document_scalar_yields_nothing() {
        assert!(document_records(json!(7)).is_empty());
        assert!(document_records(Value::Null).is_empty());
    }

    #[test]
    fn document_wrapped_hosts_from_file() {
        let (_f, src) = source_with("{\n \"hosts\": [\n  {\"ip\": \"a\"}\n ]\n}\n");
        assert_eq!(collect(&src), vec![json!({"ip": "a"})]);
    }

    #[test]
    fn broken_document_yields_nothing() {
        let (_f, src) = source_with("[\n {\"ip\": \"a\"},\n");
        assert!(collect(&src).is_empty());
        assert!(!src.has_records());
    }

    #[test]
    fn blank_file_has_no_records() {
        let (_f, src) = source_with("\n\n  \n");
        assert!(!src.has_records());
    }

    #[test]
    fn passes_are_independent() {
        let (_f, src) = source_with("{\"ip\":\"a\"}\n{\"ip\":\"b\"}\n");
        assert!(src.has_records());
        assert_eq!(collect(&src).len(), 2);
        assert_eq!(collect(&src).len(), 2);
    }

    #[test]
    fn invalid_utf8_is_tolerated() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"{\"ip\":\"a\",\"hostname\":\"caf\xe9\"}\n").unwrap();
        let src = RecordSource::open(f.path());
        let recs = collect(&src);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0]["ip"], json!("a"));
    }

    #[test]
    fn bom_prefixed_jsonl_yields_every_line() {
        let (_f, src) = source_with("\u{feff}{\"ip\":\"a\"}\n{\"ip\":\"b\"}\n");
        assert_eq!(src.format(), Format::JsonLines);
        assert_eq!(collect(&src), vec![json!({"ip": "a"}), json!({"ip": "b"})]);
    }

    #[test]
    fn bom_prefixed_document_parses() {
        let (_f, src) = source_with("\u{feff}[\n  {\"ip\": \"a\"}\n]\n");
        assert_eq!(src.format(), Format::Document);
        assert_eq!(collect(&src), vec![json!({"ip": "a"})]);
    }

    #[test]
    fn missing_file_has_no_records() {
        let src = RecordSource::open("/definitely/not/here.jsonl");
        assert!(src.records().is_err());
        assert!(!src.has_records());
    }
}
