use crate::{HostId, HostSpec, PortId, PortSpec, ScanId, ScanMeta, VulnId, VulnSpec};
use anyhow::Result;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, Connection};
use serde_json::Value;

/// Row inserts for one import. Implemented on `Connection`, so it is callable
/// on a `Transaction` or `Savepoint` through deref.
pub trait ScanWriter {
    fn insert_scan(&self, scan: &ScanMeta) -> Result<ScanId>;
    fn insert_host(&self, scan_id: ScanId, host: &HostSpec) -> Result<HostId>;
    fn insert_port(&self, host_id: HostId, port: &PortSpec) -> Result<PortId>;
    fn insert_vulnerability(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        port_id: Option<PortId>,
        vuln: &VulnSpec,
    ) -> Result<VulnId>;
}

impl ScanWriter for Connection {
    fn insert_scan(&self, scan: &ScanMeta) -> Result<ScanId> {
        self.execute(
            "INSERT INTO scans(scan_time, scanner_version, raw_file) VALUES (?,?,?)",
            params![scan.scan_time, scan.scanner_version, scan.raw_file],
        )?;
        Ok(self.last_insert_rowid())
    }

    fn insert_host(&self, scan_id: ScanId, host: &HostSpec) -> Result<HostId> {
        let ttl = host.ttl.as_ref().map(json_to_sql).unwrap_or(SqlValue::Null);
        self.execute(
            "INSERT INTO hosts(scan_id, ip, hostname, status, os, ttl, raw) VALUES (?,?,?,?,?,?,?)",
            params![scan_id, host.ip, host.hostname, host.status, host.os, ttl, host.raw],
        )?;
        Ok(self.last_insert_rowid())
    }

    fn insert_port(&self, host_id: HostId, port: &PortSpec) -> Result<PortId> {
        self.execute(
            "INSERT INTO ports(host_id, port, protocol, service, state, banner, cpe, raw) VALUES (?,?,?,?,?,?,?,?)",
            params![host_id, port.port, port.protocol, port.service, port.state, port.banner, port.cpe, port.raw],
        )?;
        Ok(self.last_insert_rowid())
    }

    fn insert_vulnerability(
        &self,
        scan_id: ScanId,
        host_id: HostId,
        port_id: Option<PortId>,
        vuln: &VulnSpec,
    ) -> Result<VulnId> {
        self.execute(
            "INSERT INTO vulnerabilities(scan_id, host_id, port_id, cve, note, raw) VALUES (?,?,?,?,?,?)",
            params![scan_id, host_id, port_id, vuln.cve, vuln.note, vuln.raw],
        )?;
        Ok(self.last_insert_rowid())
    }
}

/// Map a JSON scalar onto the closest SQLite storage class. Containers are
/// stored as their JSON text.
pub(crate) fn json_to_sql(v: &Value) -> SqlValue {
    match v {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => SqlValue::Integer(i),
            (None, Some(f)) => SqlValue::Real(f),
            (None, None) => SqlValue::Text(n.to_string()),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

pub(crate) fn sql_to_json(v: SqlValue) -> Option<Value> {
    match v {
        SqlValue::Null => None,
        SqlValue::Integer(i) => Some(Value::from(i)),
        SqlValue::Real(f) => Some(Value::from(f)),
        SqlValue::Text(s) => Some(Value::String(s)),
        SqlValue::Blob(b) => Some(Value::String(String::from_utf8_lossy(&b).into_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Db;

    fn scan_meta() -> ScanMeta {
        ScanMeta {
            scan_time: "2026-01-01T00:00:00Z".into(),
            scanner_version: None,
            raw_file: "/tmp/scan.jsonl".into(),
        }
    }

    fn port(n: Option<i64>) -> PortSpec {
        PortSpec {
            port: n,
            protocol: Some("tcp".into()),
            service: None,
            state: "open".into(),
            banner: None,
            cpe: None,
            raw: "{}".into(),
        }
    }

    #[test]
    fn inserts_return_increasing_ids() {
        let db = Db::open_in_memory().unwrap();
        let scan_id = db.conn.insert_scan(&scan_meta()).unwrap();
        let h1 = db.conn.insert_host(scan_id, &HostSpec { raw: "{}".into(), ..Default::default() }).unwrap();
        let h2 = db.conn.insert_host(scan_id, &HostSpec { raw: "{}".into(), ..Default::default() }).unwrap();
        assert!(h2 > h1);
        let p = db.conn.insert_port(h1, &port(Some(22))).unwrap();
        let vuln = VulnSpec { cve: "CVE-2020-1".into(), note: None, raw: "\"CVE-2020-1\"".into() };
        db.conn.insert_vulnerability(scan_id, h1, Some(p), &vuln).unwrap();
        assert_eq!(db.count_rows("vulnerabilities").unwrap(), 1);
    }

    #[test]
    fn dangling_host_reference_fails() {
        let db = Db::open_in_memory().unwrap();
        assert!(db.conn.insert_port(4242, &port(Some(80))).is_err());
    }

    #[test]
    fn any_integer_port_is_stored() {
        let db = Db::open_in_memory().unwrap();
        let scan_id = db.conn.insert_scan(&scan_meta()).unwrap();
        let host_id = db.conn.insert_host(scan_id, &HostSpec { raw: "{}".into(), ..Default::default() }).unwrap();
        db.conn.insert_port(host_id, &port(Some(70000))).unwrap();
        db.conn.insert_port(host_id, &port(None)).unwrap();
        let ports = db.ports_for_host(host_id).unwrap();
        assert_eq!(ports[0].port, Some(70000));
        assert_eq!(ports[1].port, None);
    }

    #[test]
    fn ttl_keeps_its_type() {
        let db = Db::open_in_memory().unwrap();
        let scan_id = db.conn.insert_scan(&scan_meta()).unwrap();
        let host = HostSpec { ttl: Some(Value::from(64)), raw: "{}".into(), ..Default::default() };
        db.conn.insert_host(scan_id, &host).unwrap();
        let host = HostSpec { ttl: Some(Value::from("unknown")), raw: "{}".into(), ..Default::default() };
        db.conn.insert_host(scan_id, &host).unwrap();
        let hosts = db.hosts_for_scan(scan_id).unwrap();
        assert_eq!(hosts[0].ttl, Some(Value::from(64)));
        assert_eq!(hosts[1].ttl, Some(Value::from("unknown")));
    }
}
