use crate::logging::LogFormat;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// File consulted when `--config` is not given.
pub const DEFAULT_CONFIG: &str = "importer.yaml";

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    /// `tracing` filter directive, e.g. `info` or `ingest=debug`.
    pub log_level: Option<String>,
    /// `text` or `json`.
    pub log_format: Option<LogFormat>,
    pub keep_source: bool,
    pub scanner_version: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new(DEFAULT_CONFIG);
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&s).ok()
}
