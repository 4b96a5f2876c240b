use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type ScanId = i64;
pub type HostId = i64;
pub type PortId = i64;
pub type VulnId = i64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMeta {
    /// RFC 3339, UTC, time of the import.
    pub scan_time: String,
    pub scanner_version: Option<String>,
    pub raw_file: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSpec {
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub status: Option<String>,
    pub os: Option<String>,
    /// Stored with its natural SQL type; scanners disagree on what a ttl is.
    pub ttl: Option<Value>,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub port: Option<i64>,
    pub protocol: Option<String>,
    pub service: Option<String>,
    pub state: String,
    pub banner: Option<String>,
    pub cpe: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VulnSpec {
    pub cve: String,
    pub note: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanRow {
    pub id: ScanId,
    pub scan_time: String,
    pub scanner_version: Option<String>,
    pub raw_file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostRow {
    pub id: HostId,
    pub scan_id: ScanId,
    pub ip: Option<String>,
    pub hostname: Option<String>,
    pub status: Option<String>,
    pub os: Option<String>,
    pub ttl: Option<Value>,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortRow {
    pub id: PortId,
    pub host_id: HostId,
    pub port: Option<i64>,
    pub protocol: Option<String>,
    pub service: Option<String>,
    pub state: Option<String>,
    pub banner: Option<String>,
    pub cpe: Option<String>,
    pub raw: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VulnRow {
    pub id: VulnId,
    pub scan_id: ScanId,
    pub host_id: HostId,
    pub port_id: Option<PortId>,
    pub cve: Option<String>,
    pub note: Option<String>,
    pub raw: String,
}
