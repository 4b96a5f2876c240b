use anyhow::{Context, Result};
use normalize::{normalize, HostEntry};
use rusqlite::{Connection, Transaction};
use scan_db::{ScanId, ScanWriter};
use serde_json::Value;

/// Rows written for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Written {
    pub hosts: usize,
    pub ports: usize,
    pub vulnerabilities: usize,
}

/// Normalize one stream record and write it under its own savepoint: either
/// every row derived from the record lands in `tx`, or none does.
pub fn persist_record(tx: &mut Transaction<'_>, scan_id: ScanId, record: &Value) -> Result<Written> {
    let sp = tx.savepoint()?;
    let mut written = Written::default();
    for entry in normalize(record) {
        persist_host(&sp, scan_id, &entry, &mut written)
            .with_context(|| format!("host {}", entry.host.ip.as_deref().unwrap_or("<no ip>")))?;
    }
    sp.commit()?;
    Ok(written)
}

// Host, then ports, then vulnerabilities pointing at the first port.
fn persist_host(conn: &Connection, scan_id: ScanId, entry: &HostEntry, written: &mut Written) -> Result<()> {
    let host_id = conn.insert_host(scan_id, &entry.host)?;
    written.hosts += 1;

    let mut first_port = None;
    for port in &entry.ports {
        let port_id = conn
            .insert_port(host_id, port)
            .with_context(|| format!("port {}", port.raw))?;
        first_port.get_or_insert(port_id);
        written.ports += 1;
    }

    for vuln in &entry.vulns {
        conn.insert_vulnerability(scan_id, host_id, first_port, vuln)?;
        written.vulnerabilities += 1;
    }
    Ok(())
}
