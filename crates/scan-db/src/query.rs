use crate::insert::sql_to_json;
use crate::schema::TABLES;
use crate::{Db, HostId, HostRow, PortRow, ScanId, ScanRow, VulnRow};
use anyhow::{anyhow, Result};
use rusqlite::types::Value as SqlValue;

impl Db {
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let cnt: i64 = self.conn.query_row(
            "SELECT COUNT(1) FROM sqlite_master WHERE type='table' AND name=?",
            [name],
            |r| r.get(0),
        )?;
        Ok(cnt > 0)
    }

    /// Row count for one of the importer's own tables.
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        if !TABLES.contains(&table) {
            return Err(anyhow!("unknown table: {}", table));
        }
        let sql = format!("SELECT COUNT(1) FROM {}", table);
        Ok(self.conn.query_row(&sql, [], |r| r.get(0))?)
    }

    pub fn list_scans(&self) -> Result<Vec<ScanRow>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, scan_time, scanner_version, raw_file FROM scans ORDER BY id")?;
        let rows = stmt.query_map([], |r| {
            Ok(ScanRow { id: r.get(0)?, scan_time: r.get(1)?, scanner_version: r.get(2)?, raw_file: r.get(3)? })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn hosts_for_scan(&self, scan_id: ScanId) -> Result<Vec<HostRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scan_id, ip, hostname, status, os, ttl, raw FROM hosts WHERE scan_id=? ORDER BY id",
        )?;
        let rows = stmt.query_map([scan_id], |r| {
            Ok(HostRow {
                id: r.get(0)?,
                scan_id: r.get(1)?,
                ip: r.get(2)?,
                hostname: r.get(3)?,
                status: r.get(4)?,
                os: r.get(5)?,
                ttl: sql_to_json(r.get::<_, SqlValue>(6)?),
                raw: r.get(7)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn ports_for_host(&self, host_id: HostId) -> Result<Vec<PortRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, host_id, port, protocol, service, state, banner, cpe, raw FROM ports WHERE host_id=? ORDER BY id",
        )?;
        let rows = stmt.query_map([host_id], |r| {
            Ok(PortRow {
                id: r.get(0)?,
                host_id: r.get(1)?,
                port: r.get(2)?,
                protocol: r.get(3)?,
                service: r.get(4)?,
                state: r.get(5)?,
                banner: r.get(6)?,
                cpe: r.get(7)?,
                raw: r.get(8)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn vulnerabilities_for_host(&self, host_id: HostId) -> Result<Vec<VulnRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, scan_id, host_id, port_id, cve, note, raw FROM vulnerabilities WHERE host_id=? ORDER BY id",
        )?;
        let rows = stmt.query_map([host_id], |r| {
            Ok(VulnRow {
                id: r.get(0)?,
                scan_id: r.get(1)?,
                host_id: r.get(2)?,
                port_id: r.get(3)?,
                cve: r.get(4)?,
                note: r.get(5)?,
                raw: r.get(6)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

#[cfg(test)]
mod tests {
    use crate::Db;

    #[test]
    fn schema_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scans.db");
        drop(Db::open_or_create(&path).unwrap());
        let db = Db::open_or_create(&path).unwrap();
        for t in ["scans", "hosts", "ports", "vulnerabilities"] {
            assert!(db.table_exists(t).unwrap(), "missing table {}", t);
        }
    }

    #[test]
    fn indexes_exist() {
        let db = Db::open_in_memory().unwrap();
        let names: Vec<String> = db
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type='index' ORDER BY name")
            .unwrap()
            .query_map([], |r| r.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        for idx in ["idx_hosts_ip", "idx_ports_host", "idx_vuln_cve", "idx_vuln_host"] {
            assert!(names.iter().any(|n| n == idx), "missing index {}", idx);
        }
    }

    #[test]
    fn count_rows_rejects_foreign_tables() {
        let db = Db::open_in_memory().unwrap();
        assert_eq!(db.count_rows("scans").unwrap(), 0);
        assert!(db.count_rows("sqlite_master; DROP TABLE scans").is_err());
    }
}
