//! Scanner record normalization.
//!
//! Turns one loosely-typed record into canonical host, port and vulnerability
//! specs ready for the store. Nothing here touches the database; the importer
//! decides ids and linking when it persists a [`HostEntry`].

pub mod aliases;

use aliases::{
    first_present, lookup, HostField, PortField, VulnField, HOST_ALIASES, PORT_ALIASES,
    PORT_LIST_KEYS, VULN_ALIASES, VULN_LIST_KEYS,
};
use scan_db::{HostSpec, PortSpec, VulnSpec};
use serde_json::{Map, Value};

/// Ports are assumed reachable unless the record says otherwise.
pub const DEFAULT_PORT_STATE: &str = "open";

#[derive(Debug, Clone, PartialEq)]
pub struct HostEntry {
    pub host: HostSpec,
    /// In order of appearance; the first one anchors the host's vulnerabilities.
    pub ports: Vec<PortSpec>,
    pub vulns: Vec<VulnSpec>,
}

/// Normalize one raw record. Lists are flattened recursively, one entry per
/// object found; anything that is not an object produces nothing.
pub fn normalize(record: &Value) -> Vec<HostEntry> {
    let mut out = Vec::new();
    collect_hosts(record, &mut out);
    out
}

fn collect_hosts(record: &Value, out: &mut Vec<HostEntry>) {
    match record {
        Value::Array(items) => {
            for item in items {
                collect_hosts(item, out);
            }
        }
        Value::Object(map) => out.push(normalize_host(map, record)),
        other => tracing::debug!(kind = json_kind(other), "record is not an object, skipped"),
    }
}

fn normalize_host(map: &Map<String, Value>, record: &Value) -> HostEntry {
    let host = HostSpec {
        ip: lookup(HOST_ALIASES, map, HostField::Ip).map(as_text),
        hostname: lookup(HOST_ALIASES, map, HostField::Hostname).map(Value::to_string),
        status: lookup(HOST_ALIASES, map, HostField::Status).map(as_text),
        os: lookup(HOST_ALIASES, map, HostField::Os).map(Value::to_string),
        ttl: lookup(HOST_ALIASES, map, HostField::Ttl).cloned(),
        raw: record.to_string(),
    };
    HostEntry { host, ports: ports(map), vulns: vulnerabilities(map) }
}

fn ports(map: &Map<String, Value>) -> Vec<PortSpec> {
    match first_present(map, PORT_LIST_KEYS) {
        Some(Value::Array(items)) => items.iter().filter_map(normalize_port).collect(),
        _ => Vec::new(),
    }
}

/// One entry of a host's port list.
pub fn normalize_port(item: &Value) -> Option<PortSpec> {
    match item {
        Value::Number(_) | Value::String(_) => Some(PortSpec {
            port: coerce_port(item),
            protocol: None,
            service: None,
            state: DEFAULT_PORT_STATE.to_string(),
            banner: None,
            cpe: None,
            raw: item.to_string(),
        }),
        Value::Object(p) => Some(PortSpec {
            port: lookup(PORT_ALIASES, p, PortField::Number).and_then(coerce_port),
            protocol: lookup(PORT_ALIASES, p, PortField::Protocol).map(as_text),
            service: lookup(PORT_ALIASES, p, PortField::Service).map(as_text),
            state: lookup(PORT_ALIASES, p, PortField::State)
                .map(as_text)
                .unwrap_or_else(|| DEFAULT_PORT_STATE.to_string()),
            banner: lookup(PORT_ALIASES, p, PortField::Banner).map(as_text),
            cpe: lookup(PORT_ALIASES, p, PortField::Cpe).map(Value::to_string),
            raw: item.to_string(),
        }),
        other => {
            tracing::debug!(kind = json_kind(other), "unusable port entry skipped");
            None
        }
    }
}

/// Integer coercion for port numbers. Anything that does not read as an
/// integer becomes `None`; the port is still recorded.
pub fn coerce_port(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn vulnerabilities(map: &Map<String, Value>) -> Vec<VulnSpec> {
    match first_present(map, VULN_LIST_KEYS) {
        None => Vec::new(),
        Some(Value::String(s)) => split_ids(s)
            .map(|id| VulnSpec { cve: id.to_string(), note: None, raw: Value::from(id).to_string() })
            .collect(),
        Some(Value::Array(items)) => items.iter().filter_map(vuln_entry).collect(),
        Some(other) => vuln_entry(other).into_iter().collect(),
    }
}

/// Comma-separated identifiers, trimmed, empties dropped.
pub fn split_ids(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|id| !id.is_empty())
}

fn vuln_entry(item: &Value) -> Option<VulnSpec> {
    let (cve, note) = match item {
        Value::Null => return None,
        Value::String(s) => {
            let id = s.trim();
            if id.is_empty() {
                return None;
            }
            (id.to_string(), None)
        }
        Value::Object(v) => (
            lookup(VULN_ALIASES, v, VulnField::Id)
                .map(as_text)
                .unwrap_or_else(|| item.to_string()),
            lookup(VULN_ALIASES, v, VulnField::Note).map(as_text),
        ),
        other => (other.to_string(), None),
    };
    Some(VulnSpec { cve, note, raw: item.to_string() })
}

/// Strings as-is, any other JSON value as its JSON text.
fn as_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
